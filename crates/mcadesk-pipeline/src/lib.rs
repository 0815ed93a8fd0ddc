pub mod completeness;
pub mod followup;
pub mod pipeline;
pub mod projection;

pub use completeness::{CompletenessEngine, DocumentChecklist, documents_for_deal};
pub use followup::{
    TimelineEntry, days_overdue, deal_timeline, merchant_timeline, overdue_tasks, tasks_for_deal,
};
pub use pipeline::{
    DEFAULT_STALE_AFTER_DAYS, DealPipeline, FunnelReport, FunnelRow, SortKey, StageColumn,
    days_since_activity, find_deal, is_stale, needs_attention,
};
pub use projection::{active_deal_for_merchant, latest_stage_for_merchant};
