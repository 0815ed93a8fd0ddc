use serde::{Deserialize, Serialize};

use crate::error::{DeskError, DeskResult};
use crate::models::{DealStage, DocumentType};

const UNDERWRITING_DOCUMENTS: [DocumentType; 4] = [
    DocumentType::BankStatements,
    DocumentType::VoidedCheck,
    DocumentType::Coj,
    DocumentType::DriverLicense,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRule {
    pub stage: DealStage,
    pub label: String,
    /// Side states sit outside the forward funnel.
    pub in_funnel: bool,
    pub required_documents: Vec<DocumentType>,
}

impl StageRule {
    fn forward(stage: DealStage, label: &str, required_documents: &[DocumentType]) -> Self {
        Self {
            stage,
            label: label.to_string(),
            in_funnel: true,
            required_documents: required_documents.to_vec(),
        }
    }
}

/// Read-only stage configuration. Built once and handed to the engines by
/// reference; declared rule order is the pipeline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCatalog {
    rules: Vec<StageRule>,
}

impl StageCatalog {
    pub fn standard() -> Self {
        let mut app_out_documents = UNDERWRITING_DOCUMENTS.to_vec();
        app_out_documents.push(DocumentType::Application);

        Self {
            rules: vec![
                StageRule::forward(DealStage::Leads, "Leads", &[]),
                StageRule::forward(DealStage::ChaseDocs, "Chase Docs", &UNDERWRITING_DOCUMENTS),
                StageRule::forward(DealStage::DocsIn, "Docs In", &UNDERWRITING_DOCUMENTS),
                StageRule::forward(DealStage::AppOut, "App Out", &app_out_documents),
                StageRule::forward(DealStage::HotLeads, "Hot Leads", &[]),
                StageRule {
                    stage: DealStage::FollowUp,
                    label: "Follow Up".to_string(),
                    in_funnel: false,
                    required_documents: Vec::new(),
                },
            ],
        }
    }

    /// Builds a catalog from custom rules. Forward stages keep their relative
    /// order and are listed ahead of side states.
    pub fn from_rules(rules: Vec<StageRule>) -> DeskResult<Self> {
        for (index, rule) in rules.iter().enumerate() {
            if rules[..index].iter().any(|earlier| earlier.stage == rule.stage) {
                return Err(DeskError::InvalidStage(rule.stage.to_string()));
            }
        }

        let (forward, side): (Vec<_>, Vec<_>) = rules.into_iter().partition(|rule| rule.in_funnel);
        Ok(Self {
            rules: forward.into_iter().chain(side).collect(),
        })
    }

    pub fn rules(&self) -> &[StageRule] {
        &self.rules
    }

    pub fn rule(&self, stage: DealStage) -> DeskResult<&StageRule> {
        self.rules
            .iter()
            .find(|rule| rule.stage == stage)
            .ok_or_else(|| DeskError::InvalidStage(stage.to_string()))
    }

    pub fn contains(&self, stage: DealStage) -> bool {
        self.rules.iter().any(|rule| rule.stage == stage)
    }

    pub fn stages(&self) -> impl Iterator<Item = DealStage> + '_ {
        self.rules.iter().map(|rule| rule.stage)
    }

    pub fn forward_stages(&self) -> impl Iterator<Item = DealStage> + '_ {
        self.rules
            .iter()
            .filter(|rule| rule.in_funnel)
            .map(|rule| rule.stage)
    }

    pub fn side_stages(&self) -> impl Iterator<Item = DealStage> + '_ {
        self.rules
            .iter()
            .filter(|rule| !rule.in_funnel)
            .map(|rule| rule.stage)
    }

    pub fn is_forward(&self, stage: DealStage) -> DeskResult<bool> {
        Ok(self.rule(stage)?.in_funnel)
    }

    pub fn label(&self, stage: DealStage) -> DeskResult<&str> {
        Ok(self.rule(stage)?.label.as_str())
    }

    pub fn required_documents(&self, stage: DealStage) -> DeskResult<&[DocumentType]> {
        Ok(self.rule(stage)?.required_documents.as_slice())
    }

    /// The next forward stage, or `None` at the end of the funnel and for
    /// side states.
    pub fn next_stage(&self, stage: DealStage) -> DeskResult<Option<DealStage>> {
        if !self.is_forward(stage)? {
            return Ok(None);
        }

        Ok(self
            .forward_stages()
            .skip_while(|candidate| *candidate != stage)
            .nth(1))
    }
}

impl Default for StageCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
