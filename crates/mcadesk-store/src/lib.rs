pub mod snapshot;
pub mod sync;

use async_trait::async_trait;
use chrono::Utc;
use mcadesk_core::{
    ActivityLog, Communication, Deal, DealEvent, DealStore, Document, EventEnvelope, Note,
    RecordId, Task, TimelineStore,
};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

pub use snapshot::{Snapshot, load_snapshot, save_snapshot};
pub use sync::{NoopRemoteSync, OptimisticUpdater};

/// Session-scoped store. Each write swaps a whole record under its
/// collection lock; read-modify-write sequences spanning several calls are
/// serialized by `OptimisticUpdater`, or guarded with
/// `compare_and_swap_deal`.
#[derive(Default)]
pub struct InMemoryDealStore {
    deals: RwLock<Vec<Deal>>,
    documents: RwLock<Vec<Document>>,
    communications: RwLock<Vec<Communication>>,
    tasks: RwLock<Vec<Task>>,
    notes: RwLock<Vec<Note>>,
    extra: RwLock<Map<String, Value>>,
    events: RwLock<Vec<EventEnvelope>>,
    sequence: RwLock<i64>,
}

impl InMemoryDealStore {
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            deals: RwLock::new(snapshot.deals),
            documents: RwLock::new(snapshot.documents),
            communications: RwLock::new(snapshot.communications),
            tasks: RwLock::new(snapshot.tasks),
            notes: RwLock::new(snapshot.notes),
            extra: RwLock::new(snapshot.extra),
            ..Self::default()
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            deals: self.deals.read().await.clone(),
            documents: self.documents.read().await.clone(),
            communications: self.communications.read().await.clone(),
            tasks: self.tasks.read().await.clone(),
            notes: self.notes.read().await.clone(),
            extra: self.extra.read().await.clone(),
        }
    }
}

/// Replaces the record with the same id, or appends it.
fn upsert<T>(records: &mut Vec<T>, record: T, id: impl Fn(&T) -> &RecordId) -> Option<T> {
    match records.iter_mut().find(|existing| id(&**existing) == id(&record)) {
        Some(existing) => Some(std::mem::replace(existing, record)),
        None => {
            records.push(record);
            None
        }
    }
}

#[async_trait]
impl DealStore for InMemoryDealStore {
    async fn deals(&self) -> anyhow::Result<Vec<Deal>> {
        Ok(self.deals.read().await.clone())
    }

    async fn deal(&self, deal_id: &RecordId) -> anyhow::Result<Option<Deal>> {
        let deals = self.deals.read().await;
        Ok(deals.iter().find(|deal| &deal.id == deal_id).cloned())
    }

    async fn put_deal(&self, deal: Deal) -> anyhow::Result<Option<Deal>> {
        let mut deals = self.deals.write().await;
        debug!(deal_id = %deal.id, stage = %deal.stage, "storing deal");
        Ok(upsert(&mut deals, deal, |deal| &deal.id))
    }

    async fn compare_and_swap_deal(
        &self,
        expected: &Deal,
        replacement: Option<Deal>,
    ) -> anyhow::Result<bool> {
        let mut deals = self.deals.write().await;
        let Some(index) = deals.iter().position(|deal| deal.id == expected.id) else {
            return Ok(false);
        };
        if &deals[index] != expected {
            debug!(deal_id = %expected.id, "deal changed since read, swap skipped");
            return Ok(false);
        }

        match replacement {
            Some(deal) => deals[index] = deal,
            None => {
                deals.remove(index);
            }
        }
        Ok(true)
    }

    async fn documents(&self) -> anyhow::Result<Vec<Document>> {
        Ok(self.documents.read().await.clone())
    }

    async fn document(&self, document_id: &RecordId) -> anyhow::Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|document| &document.id == document_id)
            .cloned())
    }

    async fn put_document(&self, document: Document) -> anyhow::Result<Option<Document>> {
        let mut documents = self.documents.write().await;
        Ok(upsert(&mut documents, document, |document| &document.id))
    }
}

#[async_trait]
impl TimelineStore for InMemoryDealStore {
    async fn tasks(&self) -> anyhow::Result<Vec<Task>> {
        Ok(self.tasks.read().await.clone())
    }

    async fn put_task(&self, task: Task) -> anyhow::Result<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        Ok(upsert(&mut tasks, task, |task| &task.id))
    }

    async fn communications(&self) -> anyhow::Result<Vec<Communication>> {
        Ok(self.communications.read().await.clone())
    }

    async fn put_communication(
        &self,
        communication: Communication,
    ) -> anyhow::Result<Option<Communication>> {
        let mut communications = self.communications.write().await;
        Ok(upsert(&mut communications, communication, |communication| {
            &communication.id
        }))
    }

    async fn notes(&self) -> anyhow::Result<Vec<Note>> {
        Ok(self.notes.read().await.clone())
    }

    async fn put_note(&self, note: Note) -> anyhow::Result<Option<Note>> {
        let mut notes = self.notes.write().await;
        Ok(upsert(&mut notes, note, |note| &note.id))
    }
}

#[async_trait]
impl ActivityLog for InMemoryDealStore {
    async fn append(&self, event: DealEvent) -> anyhow::Result<EventEnvelope> {
        let mut sequence_guard = self.sequence.write().await;
        *sequence_guard += 1;

        let envelope = EventEnvelope {
            sequence: *sequence_guard,
            deal_id: event.deal_id.clone(),
            event,
            stored_at: Utc::now(),
        };

        self.events.write().await.push(envelope.clone());
        Ok(envelope)
    }

    async fn stream(&self, deal_id: &RecordId) -> anyhow::Result<Vec<EventEnvelope>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|envelope| &envelope.deal_id == deal_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use mcadesk_core::{DealEventKind, DealStage, Priority};
    use rust_decimal::Decimal;

    use super::*;

    fn deal() -> Deal {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 16, 0, 0).unwrap();
        Deal::new(RecordId::generate(), Decimal::from(35_000), Priority::Medium, now).unwrap()
    }

    #[tokio::test]
    async fn put_deal_replaces_whole_record() {
        let store = InMemoryDealStore::default();
        let original = deal();
        assert!(store.put_deal(original.clone()).await.unwrap().is_none());

        let mut moved = original.clone();
        moved.stage = DealStage::ChaseDocs;
        let displaced = store.put_deal(moved.clone()).await.unwrap();

        assert_eq!(displaced, Some(original));
        assert_eq!(store.deals().await.unwrap(), vec![moved.clone()]);
        assert_eq!(store.deal(&moved.id).await.unwrap(), Some(moved));
    }

    #[tokio::test]
    async fn compare_and_swap_leaves_newer_records_alone() {
        let store = InMemoryDealStore::default();
        let original = deal();
        store.put_deal(original.clone()).await.unwrap();

        let mut newer = original.clone();
        newer.stage = DealStage::HotLeads;
        store.put_deal(newer.clone()).await.unwrap();

        let mut stale = original.clone();
        stale.stage = DealStage::Leads;
        assert!(!store.compare_and_swap_deal(&original, Some(stale)).await.unwrap());
        assert!(!store.compare_and_swap_deal(&original, None).await.unwrap());
        assert_eq!(store.deal(&original.id).await.unwrap(), Some(newer.clone()));

        assert!(store.compare_and_swap_deal(&newer, None).await.unwrap());
        assert!(store.deals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn events_are_sequenced_per_store_and_streamed_per_deal() {
        let store = InMemoryDealStore::default();
        let first = RecordId::from("d-1");
        let second = RecordId::from("d-2");
        let now = Utc::now();

        store
            .append(DealEvent::new(first.clone(), DealEventKind::DealCreated, now, serde_json::json!({})))
            .await
            .unwrap();
        store
            .append(DealEvent::new(second, DealEventKind::DealCreated, now, serde_json::json!({})))
            .await
            .unwrap();
        let third = store
            .append(DealEvent::new(first.clone(), DealEventKind::StageChanged, now, serde_json::json!({})))
            .await
            .unwrap();

        assert_eq!(third.sequence, 3);
        let stream = store.stream(&first).await.unwrap();
        assert_eq!(stream.len(), 2);
        assert_eq!(stream[1].event.kind, DealEventKind::StageChanged);
    }

    #[tokio::test]
    async fn snapshot_reflects_current_records() {
        let stored = deal();
        let mut extra = Map::new();
        extra.insert("calendarEvents".to_string(), serde_json::json!([]));
        let store = InMemoryDealStore::from_snapshot(Snapshot {
            deals: vec![stored.clone()],
            extra,
            ..Snapshot::default()
        });

        let due = Utc::now() - Duration::days(1);
        let task = Task::new(
            stored.merchant_id.clone(),
            Some(stored.id.clone()),
            "Chase COJ",
            due,
            Priority::High,
        );
        store.put_task(task.clone()).await.unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.deals, vec![stored]);
        assert_eq!(snapshot.tasks, vec![task]);
        assert!(snapshot.extra.contains_key("calendarEvents"));
        assert!(store.documents().await.unwrap().is_empty());
    }
}
