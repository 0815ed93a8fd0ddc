use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ids::RecordId;
use crate::models::{DocumentStatus, DocumentType};

/// Recoverable failures raised by the pipeline rules. None of these are fatal:
/// a caller degrades the single derived figure and keeps rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeskError {
    #[error("unknown deal stage: {0}")]
    InvalidStage(String),

    /// Negative input, or a figure too large to represent.
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("ratio is undefined for a zero denominator")]
    DivisionUndefined,

    #[error("documents still missing: {}", format_types(.missing))]
    IncompleteDocuments { missing: Vec<DocumentType> },

    #[error("deal {0} has already been sent to lenders")]
    AlreadySubmitted(RecordId),

    #[error("document status cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },

    #[error("document uploaded at {uploaded_at} cannot be verified at {verified_at}")]
    VerifiedBeforeUpload {
        uploaded_at: DateTime<Utc>,
        verified_at: DateTime<Utc>,
    },

    #[error("parsed statement data is only valid on bank statements, not {0}")]
    UnexpectedStatement(DocumentType),

    #[error("deal {0} not found")]
    DealNotFound(RecordId),
}

pub type DeskResult<T> = std::result::Result<T, DeskError>;

fn format_types(types: &[DocumentType]) -> String {
    types
        .iter()
        .map(|doc_type| doc_type.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
