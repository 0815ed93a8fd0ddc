use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealEventKind {
    DealCreated,
    StageChanged,
    TermsRecorded,
    DocumentUploaded,
    DocumentStatusChanged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealEvent {
    pub id: Uuid,
    pub deal_id: RecordId,
    pub kind: DealEventKind,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl DealEvent {
    pub fn new(
        deal_id: RecordId,
        kind: DealEventKind,
        occurred_at: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            deal_id,
            kind,
            occurred_at,
            payload,
        }
    }
}
