use std::cmp::Reverse;

use chrono::{DateTime, Duration, Utc};
use mcadesk_core::{Deal, DealStage, DeskError, DeskResult, Document, RecordId, StageCatalog};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::completeness::CompletenessEngine;

pub const DEFAULT_STALE_AFTER_DAYS: i64 = 7;

const SHARE_DECIMAL_PLACES: u32 = 4;

/// Column ordering for the board. Every key sorts descending and ties keep
/// their input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    LastActivity,
    RequestedAmount,
    Priority,
    UpdatedAt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageColumn<'d> {
    pub stage: DealStage,
    pub deals: Vec<&'d Deal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelRow {
    pub stage: DealStage,
    pub label: String,
    pub count: usize,
    pub total_requested: Decimal,
    /// Fraction of forward-funnel deals in this stage; absent for side
    /// states and for an empty funnel.
    pub share: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelReport {
    pub forward: Vec<FunnelRow>,
    pub side: Vec<FunnelRow>,
    pub forward_deals: usize,
}

/// Stage transitions, board grouping and funnel figures over a caller-owned
/// deal collection. Nothing here mutates its inputs.
#[derive(Debug, Clone, Copy)]
pub struct DealPipeline<'a> {
    catalog: &'a StageCatalog,
}

impl<'a> DealPipeline<'a> {
    pub fn new(catalog: &'a StageCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a StageCatalog {
        self.catalog
    }

    /// Any stage may follow any other. Completeness is advisory and is not
    /// checked here.
    pub fn move_stage(
        &self,
        deal: &Deal,
        new_stage: DealStage,
        now: DateTime<Utc>,
    ) -> DeskResult<Deal> {
        if !self.catalog.contains(new_stage) {
            return Err(DeskError::InvalidStage(new_stage.to_string()));
        }

        debug!(deal_id = %deal.id, from = %deal.stage, to = %new_stage, "moving deal");

        let mut moved = deal.clone();
        moved.stage = new_stage;
        moved.updated_at = now;
        moved.last_activity_at = now;
        Ok(moved)
    }

    /// Partitions deals into one column per catalog stage, empty columns
    /// included. Without a sort key the input order is kept.
    pub fn group_by_stage<'d>(
        &self,
        deals: &'d [Deal],
        sort: Option<SortKey>,
    ) -> Vec<StageColumn<'d>> {
        let mut columns: Vec<StageColumn<'d>> = self
            .catalog
            .stages()
            .map(|stage| StageColumn {
                stage,
                deals: Vec::new(),
            })
            .collect();

        for deal in deals {
            match columns.iter_mut().find(|column| column.stage == deal.stage) {
                Some(column) => column.deals.push(deal),
                None => warn!(deal_id = %deal.id, stage = %deal.stage, "deal stage not in catalog"),
            }
        }

        if let Some(key) = sort {
            for column in &mut columns {
                sort_deals(&mut column.deals, key);
            }
        }

        columns
    }

    /// Fails with `InvalidAmount` when a stage total overflows.
    pub fn funnel(&self, deals: &[Deal]) -> DeskResult<FunnelReport> {
        let forward_deals = deals
            .iter()
            .filter(|deal| self.catalog.is_forward(deal.stage).unwrap_or(false))
            .count();

        let forward = self
            .catalog
            .forward_stages()
            .map(|stage| {
                let mut row = self.funnel_row(stage, deals)?;
                row.share = share_of(row.count, forward_deals);
                Ok(row)
            })
            .collect::<DeskResult<_>>()?;

        let side = self
            .catalog
            .side_stages()
            .map(|stage| self.funnel_row(stage, deals))
            .collect::<DeskResult<_>>()?;

        Ok(FunnelReport {
            forward,
            side,
            forward_deals,
        })
    }

    /// Guard for sending a deal to lenders: it must not already be out and
    /// its current stage must have every required document on file.
    pub fn ensure_ready_for_lenders(&self, deal: &Deal, documents: &[Document]) -> DeskResult<()> {
        if deal.stage == DealStage::AppOut {
            warn!(deal_id = %deal.id, "deal already sent to lenders");
            return Err(DeskError::AlreadySubmitted(deal.id.clone()));
        }
        self.ensure_documents_complete(deal, documents)
    }

    pub fn ensure_ready_for_application(
        &self,
        deal: &Deal,
        documents: &[Document],
    ) -> DeskResult<()> {
        self.ensure_documents_complete(deal, documents)
    }

    fn ensure_documents_complete(&self, deal: &Deal, documents: &[Document]) -> DeskResult<()> {
        let missing = CompletenessEngine::new(self.catalog).missing_for_deal(deal, documents)?;
        if missing.is_empty() {
            return Ok(());
        }

        warn!(deal_id = %deal.id, missing = missing.len(), "documents incomplete");
        Err(DeskError::IncompleteDocuments { missing })
    }

    fn funnel_row(&self, stage: DealStage, deals: &[Deal]) -> DeskResult<FunnelRow> {
        let mut in_stage = deals.iter().filter(|deal| deal.stage == stage);
        let (count, total_requested) =
            in_stage.try_fold((0usize, Decimal::ZERO), |(count, total), deal| {
                total
                    .checked_add(deal.requested_amount)
                    .map(|total| (count + 1, total))
                    .ok_or(DeskError::InvalidAmount(deal.requested_amount))
            })?;

        Ok(FunnelRow {
            stage,
            label: self.catalog.label(stage).unwrap_or(stage.as_str()).to_string(),
            count,
            total_requested,
            share: None,
        })
    }
}

/// True once strictly more than `threshold_days` have passed since the last
/// activity on the deal.
pub fn is_stale(deal: &Deal, now: DateTime<Utc>, threshold_days: i64) -> bool {
    now - deal.last_activity_at > Duration::days(threshold_days)
}

/// Whole days since the last activity, rounded down.
pub fn days_since_activity(deal: &Deal, now: DateTime<Utc>) -> i64 {
    (now - deal.last_activity_at).num_days()
}

/// Stale deals that need a follow-up. Hot leads are worked separately and
/// never flagged.
pub fn needs_attention(deals: &[Deal], now: DateTime<Utc>, threshold_days: i64) -> Vec<&Deal> {
    deals
        .iter()
        .filter(|deal| deal.stage != DealStage::HotLeads)
        .filter(|deal| is_stale(deal, now, threshold_days))
        .collect()
}

pub fn find_deal<'d>(deals: &'d [Deal], deal_id: &RecordId) -> DeskResult<&'d Deal> {
    deals
        .iter()
        .find(|deal| &deal.id == deal_id)
        .ok_or_else(|| DeskError::DealNotFound(deal_id.clone()))
}

fn sort_deals(deals: &mut [&Deal], key: SortKey) {
    match key {
        SortKey::LastActivity => deals.sort_by_key(|deal| Reverse(deal.last_activity_at)),
        SortKey::RequestedAmount => deals.sort_by_key(|deal| Reverse(deal.requested_amount)),
        SortKey::Priority => deals.sort_by_key(|deal| Reverse(deal.priority)),
        SortKey::UpdatedAt => deals.sort_by_key(|deal| Reverse(deal.updated_at)),
    }
}

fn share_of(count: usize, total: usize) -> Option<Decimal> {
    if total == 0 {
        return None;
    }
    let share = Decimal::from(count as u64) / Decimal::from(total as u64);
    Some(share.round_dp(SHARE_DECIMAL_PLACES))
}
