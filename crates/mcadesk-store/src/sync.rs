use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mcadesk_core::{
    ActivityLog, Communication, Deal, DealEvent, DealEventKind, DealStage, DealStore, DeskError,
    Document, DocumentStatus, Note, RecordId, RemoteSync, StageCatalog, Task, TimelineStore,
};
use mcadesk_pipeline::DealPipeline;
use rust_decimal::Decimal;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Remote mirror for sessions that run without a backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRemoteSync;

#[async_trait]
impl RemoteSync for NoopRemoteSync {
    async fn push_deal(&self, _deal: &Deal) -> Result<()> {
        Ok(())
    }
}

/// Applies deal changes locally first, then mirrors them remotely. A failed
/// remote write restores the record the change displaced.
///
/// Writes through one updater run one at a time: load, local write, remote
/// push and rollback happen under a single lock. The rollback itself is a
/// compare-and-swap, so a record written meanwhile by another path is kept.
pub struct OptimisticUpdater<'a, S, R> {
    store: &'a S,
    remote: &'a R,
    catalog: &'a StageCatalog,
    writes: Mutex<()>,
}

impl<'a, S, R> OptimisticUpdater<'a, S, R>
where
    S: DealStore + ActivityLog,
    R: RemoteSync,
{
    pub fn new(store: &'a S, remote: &'a R, catalog: &'a StageCatalog) -> Self {
        Self {
            store,
            remote,
            catalog,
            writes: Mutex::new(()),
        }
    }

    pub async fn open_deal(&self, deal: Deal) -> Result<Deal> {
        let _writes = self.writes.lock().await;
        let displaced = self.store.put_deal(deal.clone()).await?;

        if let Err(err) = self.remote.push_deal(&deal).await {
            warn!(deal_id = %deal.id, error = %err, "remote insert failed, undoing local write");
            self.rollback(&deal, displaced).await?;
            return Err(err.context(format!("failed to open deal {}", deal.id)));
        }

        self.record(
            &deal.id,
            DealEventKind::DealCreated,
            deal.created_at,
            json!({ "requested_amount": deal.requested_amount }),
        )
        .await?;
        Ok(deal)
    }

    pub async fn move_stage(
        &self,
        deal_id: &RecordId,
        new_stage: DealStage,
        now: DateTime<Utc>,
    ) -> Result<Deal> {
        let _writes = self.writes.lock().await;
        let prior = self.load(deal_id).await?;
        let moved = DealPipeline::new(self.catalog).move_stage(&prior, new_stage, now)?;
        let payload = json!({ "from": prior.stage, "to": new_stage });

        self.commit(prior, moved, DealEventKind::StageChanged, now, payload)
            .await
    }

    pub async fn record_terms(
        &self,
        deal_id: &RecordId,
        approved_amount: Decimal,
        factor_rate: Decimal,
        term_in_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Deal> {
        let _writes = self.writes.lock().await;
        let prior = self.load(deal_id).await?;
        let offered =
            mcadesk_finance::record_terms(&prior, approved_amount, factor_rate, term_in_days, now)?;
        let payload = json!({
            "approved_amount": approved_amount,
            "factor_rate": factor_rate,
            "payback_amount": offered.payback_amount,
            "term_in_days": term_in_days,
        });

        self.commit(prior, offered, DealEventKind::TermsRecorded, now, payload)
            .await
    }

    /// Documents are kept locally only; the remote mirror covers deals.
    pub async fn upload_document(&self, document: Document) -> Result<Document> {
        let _writes = self.writes.lock().await;
        if let Some(deal_id) = &document.deal_id {
            self.load(deal_id).await?;
            self.record(
                deal_id,
                DealEventKind::DocumentUploaded,
                document.uploaded_at,
                json!({ "document_id": document.id, "type": document.doc_type }),
            )
            .await?;
        }

        self.store.put_document(document.clone()).await?;
        Ok(document)
    }

    pub async fn advance_document(
        &self,
        document_id: &RecordId,
        status: DocumentStatus,
        now: DateTime<Utc>,
    ) -> Result<Document> {
        let _writes = self.writes.lock().await;
        let current = self
            .store
            .document(document_id)
            .await?
            .ok_or_else(|| anyhow!("document {document_id} not found"))?;
        let advanced = current.advance(status, now)?;

        self.store.put_document(advanced.clone()).await?;
        if let Some(deal_id) = &advanced.deal_id {
            self.record(
                deal_id,
                DealEventKind::DocumentStatusChanged,
                now,
                json!({ "document_id": document_id, "from": current.status, "to": status }),
            )
            .await?;
        }
        Ok(advanced)
    }

    async fn load(&self, deal_id: &RecordId) -> Result<Deal> {
        let deal = self
            .store
            .deal(deal_id)
            .await?
            .ok_or_else(|| DeskError::DealNotFound(deal_id.clone()))?;
        Ok(deal)
    }

    async fn commit(
        &self,
        prior: Deal,
        updated: Deal,
        kind: DealEventKind,
        now: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<Deal> {
        let deal_id = updated.id.clone();
        self.store.put_deal(updated.clone()).await?;

        if let Err(err) = self.remote.push_deal(&updated).await {
            warn!(%deal_id, error = %err, "remote write failed, restoring prior deal");
            self.rollback(&updated, Some(prior)).await?;
            return Err(err.context(format!("remote write failed for deal {deal_id}")));
        }

        info!(%deal_id, kind = ?kind, "deal change committed");
        self.record(&deal_id, kind, now, payload).await?;
        Ok(updated)
    }

    /// Puts `restore` back only while the store still holds `written`.
    async fn rollback(&self, written: &Deal, restore: Option<Deal>) -> Result<()> {
        let restored = self
            .store
            .compare_and_swap_deal(written, restore)
            .await
            .context("failed to restore deal after remote error")?;
        if !restored {
            warn!(deal_id = %written.id, "deal rewritten before rollback, keeping newer record");
        }
        Ok(())
    }

    async fn record(
        &self,
        deal_id: &RecordId,
        kind: DealEventKind,
        occurred_at: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.store
            .append(DealEvent::new(deal_id.clone(), kind, occurred_at, payload))
            .await?;
        Ok(())
    }
}

/// Follow-up tasks, communications and notes. These stay local.
impl<S, R> OptimisticUpdater<'_, S, R>
where
    S: DealStore + ActivityLog + TimelineStore,
    R: RemoteSync,
{
    pub async fn add_task(&self, task: Task) -> Result<Task> {
        let _writes = self.writes.lock().await;
        self.store.put_task(task.clone()).await?;
        Ok(task)
    }

    pub async fn complete_task(&self, task_id: &RecordId) -> Result<Task> {
        let _writes = self.writes.lock().await;
        let mut task = self
            .store
            .tasks()
            .await?
            .into_iter()
            .find(|task| &task.id == task_id)
            .ok_or_else(|| anyhow!("task {task_id} not found"))?;

        task.completed = true;
        self.store.put_task(task.clone()).await?;
        info!(%task_id, "task completed");
        Ok(task)
    }

    pub async fn log_communication(&self, communication: Communication) -> Result<Communication> {
        let _writes = self.writes.lock().await;
        self.store.put_communication(communication.clone()).await?;
        Ok(communication)
    }

    pub async fn add_note(&self, note: Note) -> Result<Note> {
        let _writes = self.writes.lock().await;
        self.store.put_note(note.clone()).await?;
        Ok(note)
    }
}
