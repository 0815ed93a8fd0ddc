use std::collections::HashSet;

use mcadesk_core::{Deal, DealStage, DeskResult, Document, DocumentType, RecordId, StageCatalog};
use serde::Serialize;

/// Stages where the deal view surfaces outstanding paperwork as a warning.
const WARNING_STAGES: [DealStage; 2] = [DealStage::ChaseDocs, DealStage::DocsIn];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentChecklist {
    pub stage: DealStage,
    pub required: Vec<DocumentType>,
    pub on_file: Vec<DocumentType>,
    pub missing: Vec<DocumentType>,
}

impl DocumentChecklist {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compares the documents on file for a deal with what its stage requires.
///
/// A type counts as on file whatever its status; verification is not needed.
#[derive(Debug, Clone, Copy)]
pub struct CompletenessEngine<'a> {
    catalog: &'a StageCatalog,
}

impl<'a> CompletenessEngine<'a> {
    pub fn new(catalog: &'a StageCatalog) -> Self {
        Self { catalog }
    }

    /// Required types for `stage` that no document covers, in catalog order.
    pub fn missing_documents<'d, I>(
        &self,
        stage: DealStage,
        documents: I,
    ) -> DeskResult<Vec<DocumentType>>
    where
        I: IntoIterator<Item = &'d Document>,
    {
        Ok(self.checklist(stage, documents)?.missing)
    }

    pub fn checklist<'d, I>(&self, stage: DealStage, documents: I) -> DeskResult<DocumentChecklist>
    where
        I: IntoIterator<Item = &'d Document>,
    {
        let required = self.catalog.required_documents(stage)?;
        let present: HashSet<DocumentType> = documents
            .into_iter()
            .map(|document| document.doc_type)
            .collect();

        let (on_file, missing): (Vec<_>, Vec<_>) = required
            .iter()
            .copied()
            .partition(|doc_type| present.contains(doc_type));

        Ok(DocumentChecklist {
            stage,
            required: required.to_vec(),
            on_file,
            missing,
        })
    }

    /// Missing types for the deal's current stage, looking only at documents
    /// attached to that deal.
    pub fn missing_for_deal(
        &self,
        deal: &Deal,
        documents: &[Document],
    ) -> DeskResult<Vec<DocumentType>> {
        self.missing_documents(deal.stage, documents_for_deal(&deal.id, documents))
    }

    /// Missing types worth flagging on the deal view. Empty outside the
    /// document-chasing stages.
    pub fn stage_warnings(
        &self,
        deal: &Deal,
        documents: &[Document],
    ) -> DeskResult<Vec<DocumentType>> {
        let missing = self.missing_for_deal(deal, documents)?;
        if WARNING_STAGES.contains(&deal.stage) {
            Ok(missing)
        } else {
            Ok(Vec::new())
        }
    }
}

/// Documents attached to `deal_id`. Merchant-level documents are excluded.
pub fn documents_for_deal<'d>(
    deal_id: &RecordId,
    documents: &'d [Document],
) -> Vec<&'d Document> {
    documents
        .iter()
        .filter(|document| document.deal_id.as_ref() == Some(deal_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use mcadesk_core::{DeskError, DocumentStatus, Priority, StageRule};
    use rust_decimal::Decimal;

    use super::*;

    fn doc(deal_id: Option<RecordId>, doc_type: DocumentType) -> Document {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Document::new(RecordId::generate(), deal_id, doc_type.as_str(), doc_type, now)
    }

    fn deal_in(stage: DealStage) -> Deal {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut deal =
            Deal::new(RecordId::generate(), Decimal::from(40_000), Priority::Medium, now).unwrap();
        deal.stage = stage;
        deal
    }

    #[test]
    fn missing_is_required_minus_present() {
        let catalog = StageCatalog::standard();
        let engine = CompletenessEngine::new(&catalog);
        let docs = vec![
            doc(None, DocumentType::Coj),
            doc(None, DocumentType::Coj),
            doc(None, DocumentType::Other),
            doc(None, DocumentType::BankStatements),
        ];

        assert_eq!(
            engine.missing_documents(DealStage::AppOut, &docs).unwrap(),
            vec![
                DocumentType::VoidedCheck,
                DocumentType::DriverLicense,
                DocumentType::Application,
            ]
        );
    }

    #[test]
    fn input_order_does_not_change_result() {
        let catalog = StageCatalog::standard();
        let engine = CompletenessEngine::new(&catalog);
        let mut docs = vec![doc(None, DocumentType::DriverLicense), doc(None, DocumentType::VoidedCheck)];
        let forward = engine.missing_documents(DealStage::DocsIn, &docs).unwrap();
        docs.reverse();
        assert_eq!(engine.missing_documents(DealStage::DocsIn, &docs).unwrap(), forward);
        assert_eq!(forward, vec![DocumentType::BankStatements, DocumentType::Coj]);
    }

    #[test]
    fn stages_without_requirements_never_miss_anything() {
        let catalog = StageCatalog::standard();
        let engine = CompletenessEngine::new(&catalog);
        for stage in [DealStage::Leads, DealStage::HotLeads, DealStage::FollowUp] {
            assert!(engine.missing_documents(stage, &[]).unwrap().is_empty());
        }
    }

    #[test]
    fn any_status_counts_as_on_file() {
        let catalog = StageCatalog::standard();
        let engine = CompletenessEngine::new(&catalog);
        let pending = doc(None, DocumentType::BankStatements);
        assert_eq!(pending.status, DocumentStatus::Pending);

        let checklist = engine.checklist(DealStage::ChaseDocs, [&pending]).unwrap();
        assert_eq!(checklist.on_file, vec![DocumentType::BankStatements]);
        assert_eq!(checklist.missing.len(), 3);
        assert!(!checklist.is_complete());
    }

    #[test]
    fn only_documents_of_the_deal_count() {
        let catalog = StageCatalog::standard();
        let engine = CompletenessEngine::new(&catalog);
        let deal = deal_in(DealStage::ChaseDocs);
        let docs = vec![
            doc(Some(deal.id.clone()), DocumentType::BankStatements),
            doc(Some(RecordId::generate()), DocumentType::VoidedCheck),
            doc(None, DocumentType::Coj),
        ];

        assert_eq!(documents_for_deal(&deal.id, &docs).len(), 1);
        assert_eq!(
            engine.missing_for_deal(&deal, &docs).unwrap(),
            vec![DocumentType::VoidedCheck, DocumentType::Coj, DocumentType::DriverLicense]
        );
    }

    #[test]
    fn warnings_only_in_document_stages() {
        let catalog = StageCatalog::standard();
        let engine = CompletenessEngine::new(&catalog);

        let chasing = deal_in(DealStage::DocsIn);
        assert_eq!(engine.stage_warnings(&chasing, &[]).unwrap().len(), 4);

        let submitted = deal_in(DealStage::AppOut);
        assert!(engine.stage_warnings(&submitted, &[]).unwrap().is_empty());
        assert_eq!(engine.missing_for_deal(&submitted, &[]).unwrap().len(), 5);
    }

    #[test]
    fn undeclared_stage_is_reported() {
        let catalog = StageCatalog::from_rules(vec![StageRule {
            stage: DealStage::Leads,
            label: "Leads".to_string(),
            in_funnel: true,
            required_documents: Vec::new(),
        }])
        .unwrap();
        let engine = CompletenessEngine::new(&catalog);
        assert_eq!(
            engine.missing_documents(DealStage::DocsIn, &[]),
            Err(DeskError::InvalidStage("docs_in".to_string()))
        );
    }
}
