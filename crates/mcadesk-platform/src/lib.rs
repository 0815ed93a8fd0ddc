pub mod config;
pub mod contracts;

pub use config::DeskConfig;
pub use contracts::{AttentionItem, DashboardPack, HotLeadItem, OverdueTaskItem};
