use chrono::{DateTime, Utc};
use mcadesk_core::{DealStage, DocumentType, Priority, RecordId};
use mcadesk_pipeline::FunnelReport;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HotLeadItem {
    pub deal_id: RecordId,
    pub merchant_id: RecordId,
    pub requested_amount: Decimal,
    pub approved_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttentionItem {
    pub deal_id: RecordId,
    pub merchant_id: RecordId,
    pub stage: DealStage,
    pub days_since_activity: i64,
    pub missing_documents: Vec<DocumentType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverdueTaskItem {
    pub task_id: RecordId,
    pub merchant_id: RecordId,
    pub deal_id: Option<RecordId>,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub days_overdue: i64,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardPack {
    pub generated_at: DateTime<Utc>,
    pub deals_total: usize,
    pub total_pipeline_value: Decimal,
    pub approved_value: Decimal,
    pub hot_leads_total: usize,
    pub new_leads_total: usize,
    pub average_factor_rate: Option<Decimal>,
    pub funnel: FunnelReport,
    pub hot_leads: Vec<HotLeadItem>,
    pub needs_attention: Vec<AttentionItem>,
    pub overdue_tasks: Vec<OverdueTaskItem>,
}

impl DashboardPack {
    /// Two-decimal factor rate for display, or "N/A" when no deal has one.
    pub fn average_factor_rate_label(&self) -> String {
        match self.average_factor_rate {
            Some(rate) => format!("{:.2}", rate.round_dp(2)),
            None => "N/A".to_string(),
        }
    }
}
