use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::events::DealEvent;
use crate::ids::RecordId;
use crate::models::{Deal, Document};
use crate::timeline::{Communication, Note, Task};

#[derive(Debug, Clone)]
pub struct EventEnvelope {
    pub sequence: i64,
    pub deal_id: RecordId,
    pub event: DealEvent,
    pub stored_at: DateTime<Utc>,
}

/// Caller-owned collections of deals and documents. Writes replace whole
/// records; the store is the single writer.
#[async_trait]
pub trait DealStore: Send + Sync {
    async fn deals(&self) -> anyhow::Result<Vec<Deal>>;
    async fn deal(&self, deal_id: &RecordId) -> anyhow::Result<Option<Deal>>;
    /// Inserts or replaces a deal, returning the record it displaced.
    async fn put_deal(&self, deal: Deal) -> anyhow::Result<Option<Deal>>;
    /// Swaps the stored deal with id `expected.id` for `replacement` only while
    /// it still equals `expected`. `None` removes it. Returns whether the swap
    /// happened.
    async fn compare_and_swap_deal(
        &self,
        expected: &Deal,
        replacement: Option<Deal>,
    ) -> anyhow::Result<bool>;
    async fn documents(&self) -> anyhow::Result<Vec<Document>>;
    async fn document(&self, document_id: &RecordId) -> anyhow::Result<Option<Document>>;
    async fn put_document(&self, document: Document) -> anyhow::Result<Option<Document>>;
}

/// Follow-up work and contact history kept next to the deals.
#[async_trait]
pub trait TimelineStore: Send + Sync {
    async fn tasks(&self) -> anyhow::Result<Vec<Task>>;
    async fn put_task(&self, task: Task) -> anyhow::Result<Option<Task>>;
    async fn communications(&self) -> anyhow::Result<Vec<Communication>>;
    async fn put_communication(
        &self,
        communication: Communication,
    ) -> anyhow::Result<Option<Communication>>;
    async fn notes(&self) -> anyhow::Result<Vec<Note>>;
    async fn put_note(&self, note: Note) -> anyhow::Result<Option<Note>>;
}

#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn append(&self, event: DealEvent) -> anyhow::Result<EventEnvelope>;
    async fn stream(&self, deal_id: &RecordId) -> anyhow::Result<Vec<EventEnvelope>>;
}

/// Remote mirror of the deals table. Writes may fail; callers compensate.
#[async_trait]
pub trait RemoteSync: Send + Sync {
    async fn push_deal(&self, deal: &Deal) -> anyhow::Result<()>;
}
