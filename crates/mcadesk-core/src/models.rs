use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::error::{DeskError, DeskResult};
use crate::ids::RecordId;

/// Pipeline stages in declared order: the forward funnel first, then the
/// follow-up parking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    Leads,
    ChaseDocs,
    DocsIn,
    AppOut,
    HotLeads,
    FollowUp,
}

impl DealStage {
    pub const ALL: [DealStage; 6] = [
        DealStage::Leads,
        DealStage::ChaseDocs,
        DealStage::DocsIn,
        DealStage::AppOut,
        DealStage::HotLeads,
        DealStage::FollowUp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leads => "leads",
            Self::ChaseDocs => "chase_docs",
            Self::DocsIn => "docs_in",
            Self::AppOut => "app_out",
            Self::HotLeads => "hot_leads",
            Self::FollowUp => "follow_up",
        }
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealStage {
    type Err = DeskError;

    fn from_str(value: &str) -> DeskResult<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        DealStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| DeskError::InvalidStage(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    BankStatements,
    VoidedCheck,
    #[serde(rename = "COJ")]
    Coj,
    DriverLicense,
    Application,
    CreditPullAuthorization,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BankStatements => "bank_statements",
            Self::VoidedCheck => "voided_check",
            Self::Coj => "COJ",
            Self::DriverLicense => "driver_license",
            Self::Application => "application",
            Self::CreditPullAuthorization => "credit_pull_authorization",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered so that a forward move compares greater.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Received,
    Verified,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Received => "received",
            Self::Verified => "verified",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Funding terms offered on a deal. Only ever produced whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DealTerms {
    pub approved_amount: Decimal,
    pub factor_rate: Decimal,
    pub payback_amount: Decimal,
    pub term_in_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: RecordId,
    pub merchant_id: RecordId,
    pub stage: DealStage,
    pub requested_amount: Decimal,
    pub approved_amount: Option<Decimal>,
    pub factor_rate: Option<Decimal>,
    pub payback_amount: Option<Decimal>,
    pub term_in_days: Option<u32>,
    #[serde(default)]
    pub assigned_broker_id: Option<String>,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Deal {
    /// Opens a new lead in the first pipeline stage.
    pub fn new(
        merchant_id: RecordId,
        requested_amount: Decimal,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> DeskResult<Self> {
        if requested_amount <= Decimal::ZERO {
            return Err(DeskError::InvalidAmount(requested_amount));
        }

        Ok(Self {
            id: RecordId::generate(),
            merchant_id,
            stage: DealStage::Leads,
            requested_amount,
            approved_amount: None,
            factor_rate: None,
            payback_amount: None,
            term_in_days: None,
            assigned_broker_id: None,
            priority,
            created_at: now,
            updated_at: now,
            last_activity_at: now,
        })
    }

    /// Returns the funding terms when every term field is set.
    pub fn terms(&self) -> Option<DealTerms> {
        Some(DealTerms {
            approved_amount: self.approved_amount?,
            factor_rate: self.factor_rate?,
            payback_amount: self.payback_amount?,
            term_in_days: self.term_in_days?,
        })
    }
}

/// Canned figures extracted from a bank statement upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankStatementParsed {
    pub total_deposits: Decimal,
    pub nsf_count: u32,
    pub avg_daily_balance: Decimal,
    pub largest_deposit: Decimal,
    #[serde(default)]
    pub red_flags: Vec<String>,
    pub months_covered: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: RecordId,
    pub merchant_id: RecordId,
    #[serde(default)]
    pub deal_id: Option<RecordId>,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parsed_data: Option<BankStatementParsed>,
}

impl Document {
    pub fn new(
        merchant_id: RecordId,
        deal_id: Option<RecordId>,
        name: impl Into<String>,
        doc_type: DocumentType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            merchant_id,
            deal_id,
            name: name.into(),
            doc_type,
            status: DocumentStatus::Pending,
            url: String::new(),
            uploaded_at: now,
            verified_at: None,
            parsed_data: None,
        }
    }

    pub fn with_parsed_statement(mut self, parsed: BankStatementParsed) -> DeskResult<Self> {
        if self.doc_type != DocumentType::BankStatements {
            return Err(DeskError::UnexpectedStatement(self.doc_type));
        }
        self.parsed_data = Some(parsed);
        Ok(self)
    }

    /// Moves the document forward through pending, received and verified.
    /// Verification stamps `verified_at`, which may not precede the upload.
    pub fn advance(&self, to: DocumentStatus, now: DateTime<Utc>) -> DeskResult<Self> {
        if to <= self.status {
            return Err(DeskError::InvalidStatusTransition {
                from: self.status,
                to,
            });
        }

        let mut next = self.clone();
        next.status = to;
        if to == DocumentStatus::Verified {
            if now < self.uploaded_at {
                return Err(DeskError::VerifiedBeforeUpload {
                    uploaded_at: self.uploaded_at,
                    verified_at: now,
                });
            }
            next.verified_at = Some(now);
        }
        Ok(next)
    }
}
