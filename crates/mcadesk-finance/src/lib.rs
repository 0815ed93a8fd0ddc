use chrono::{DateTime, Utc};
use mcadesk_core::{Deal, DeskError, DeskResult};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Calendar approximation used for display: every month is 30 days.
const DAYS_PER_MONTH: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostOfCapital {
    pub absolute: Decimal,
    /// Cost as a fraction of the approved amount (0.25 means 25%).
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub deals: usize,
    pub requested: Decimal,
    pub approved: Decimal,
}

/// Amount owed back: the approved amount times the factor rate, rounded to
/// whole currency units with halves away from zero.
///
/// The factor rate is lender policy and is not range checked.
pub fn payback_amount(approved_amount: Decimal, factor_rate: Decimal) -> DeskResult<Decimal> {
    if approved_amount < Decimal::ZERO {
        return Err(DeskError::InvalidAmount(approved_amount));
    }

    let payback = approved_amount
        .checked_mul(factor_rate)
        .ok_or(DeskError::InvalidAmount(approved_amount))?;
    Ok(payback.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

pub fn cost_of_capital(
    payback_amount: Decimal,
    approved_amount: Decimal,
) -> DeskResult<CostOfCapital> {
    if approved_amount.is_zero() {
        return Err(DeskError::DivisionUndefined);
    }

    let absolute = payback_amount
        .checked_sub(approved_amount)
        .ok_or(DeskError::InvalidAmount(payback_amount))?;
    let percentage = absolute
        .checked_div(approved_amount)
        .ok_or(DeskError::InvalidAmount(absolute))?;
    Ok(CostOfCapital {
        absolute,
        percentage,
    })
}

/// Term length in months, approximated as `days / 30`.
pub fn term_in_months(term_in_days: u32) -> Decimal {
    Decimal::from(term_in_days) / Decimal::from(DAYS_PER_MONTH)
}

/// Mean factor rate over deals that carry one; `None` when no deal does.
pub fn average_factor_rate(deals: &[Deal]) -> DeskResult<Option<Decimal>> {
    let rates: Vec<Decimal> = deals.iter().filter_map(|deal| deal.factor_rate).collect();
    if rates.is_empty() {
        return Ok(None);
    }

    let total = rates.iter().try_fold(Decimal::ZERO, |total, rate| {
        total
            .checked_add(*rate)
            .ok_or(DeskError::InvalidAmount(*rate))
    })?;
    Ok(Some(total / Decimal::from(rates.len() as u64)))
}

/// Records an offer on the deal. All four term fields are written together;
/// the payback amount is always derived.
pub fn record_terms(
    deal: &Deal,
    approved_amount: Decimal,
    factor_rate: Decimal,
    term_in_days: u32,
    now: DateTime<Utc>,
) -> DeskResult<Deal> {
    if term_in_days == 0 {
        return Err(DeskError::InvalidAmount(Decimal::ZERO));
    }
    let payback = payback_amount(approved_amount, factor_rate)?;

    debug!(deal_id = %deal.id, %approved_amount, %factor_rate, term_in_days, "recording terms");

    let mut updated = deal.clone();
    updated.approved_amount = Some(approved_amount);
    updated.factor_rate = Some(factor_rate);
    updated.payback_amount = Some(payback);
    updated.term_in_days = Some(term_in_days);
    updated.updated_at = now;
    updated.last_activity_at = now;
    Ok(updated)
}

/// Fails with `InvalidAmount` when a sum overflows.
pub fn portfolio_totals(deals: &[Deal]) -> DeskResult<PortfolioTotals> {
    deals
        .iter()
        .try_fold(PortfolioTotals::default(), |totals, deal| -> DeskResult<_> {
            let approved = deal.approved_amount.unwrap_or(Decimal::ZERO);
            Ok(PortfolioTotals {
                deals: totals.deals + 1,
                requested: totals
                    .requested
                    .checked_add(deal.requested_amount)
                    .ok_or(DeskError::InvalidAmount(deal.requested_amount))?,
                approved: totals
                    .approved
                    .checked_add(approved)
                    .ok_or(DeskError::InvalidAmount(approved))?,
            })
        })
}
