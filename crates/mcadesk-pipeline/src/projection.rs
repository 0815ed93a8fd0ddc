//! Read-only merchant views derived from the deal list.

use mcadesk_core::{Deal, DealStage, RecordId};

/// Stages in which a merchant counts as having a live deal.
const ACTIVE_STAGES: [DealStage; 3] = [DealStage::HotLeads, DealStage::AppOut, DealStage::DocsIn];

/// Stage of the merchant's most recently updated deal, or `Leads` when the
/// merchant has no deals yet.
pub fn latest_stage_for_merchant(deals: &[Deal], merchant_id: &RecordId) -> DealStage {
    deals
        .iter()
        .filter(|deal| &deal.merchant_id == merchant_id)
        .max_by_key(|deal| deal.updated_at)
        .map(|deal| deal.stage)
        .unwrap_or(DealStage::Leads)
}

/// First deal of the merchant that is in an active stage, in input order.
pub fn active_deal_for_merchant<'d>(
    deals: &'d [Deal],
    merchant_id: &RecordId,
) -> Option<&'d Deal> {
    deals
        .iter()
        .find(|deal| &deal.merchant_id == merchant_id && ACTIVE_STAGES.contains(&deal.stage))
}
