use anyhow::Result;
use chrono::{DateTime, Utc};
use mcadesk_core::{Deal, DealStage, Document, StageCatalog, Task};
use mcadesk_finance::{average_factor_rate, portfolio_totals};
use mcadesk_pipeline::{
    CompletenessEngine, DealPipeline, days_overdue, days_since_activity, needs_attention,
    overdue_tasks,
};
use mcadesk_platform::{AttentionItem, DashboardPack, DeskConfig, HotLeadItem, OverdueTaskItem};

pub fn build_pack(
    catalog: &StageCatalog,
    config: &DeskConfig,
    deals: &[Deal],
    documents: &[Document],
    tasks: &[Task],
    now: DateTime<Utc>,
) -> Result<DashboardPack> {
    let totals = portfolio_totals(deals)?;
    let completeness = CompletenessEngine::new(catalog);

    let hot: Vec<&Deal> = deals
        .iter()
        .filter(|deal| deal.stage == DealStage::HotLeads)
        .collect();
    let hot_leads = hot
        .iter()
        .take(config.hot_lead_limit)
        .map(|deal| HotLeadItem {
            deal_id: deal.id.clone(),
            merchant_id: deal.merchant_id.clone(),
            requested_amount: deal.requested_amount,
            approved_amount: deal.approved_amount,
        })
        .collect();

    let mut attention = Vec::new();
    for deal in needs_attention(deals, now, config.stale_after_days) {
        attention.push(AttentionItem {
            deal_id: deal.id.clone(),
            merchant_id: deal.merchant_id.clone(),
            stage: deal.stage,
            days_since_activity: days_since_activity(deal, now),
            missing_documents: completeness.missing_for_deal(deal, documents)?,
        });
    }
    attention.sort_by_key(|item| std::cmp::Reverse(item.days_since_activity));
    attention.truncate(config.attention_limit);

    let overdue = overdue_tasks(tasks, now)
        .into_iter()
        .take(config.attention_limit)
        .map(|task| OverdueTaskItem {
            task_id: task.id.clone(),
            merchant_id: task.merchant_id.clone(),
            deal_id: task.deal_id.clone(),
            title: task.title.clone(),
            due_date: task.due_date,
            days_overdue: days_overdue(task, now),
            priority: task.priority,
        })
        .collect();

    Ok(DashboardPack {
        generated_at: now,
        deals_total: totals.deals,
        total_pipeline_value: totals.requested,
        approved_value: totals.approved,
        hot_leads_total: hot.len(),
        new_leads_total: deals
            .iter()
            .filter(|deal| deal.stage == DealStage::Leads)
            .count(),
        average_factor_rate: average_factor_rate(deals)?,
        funnel: DealPipeline::new(catalog).funnel(deals)?,
        hot_leads,
        needs_attention: attention,
        overdue_tasks: overdue,
    })
}
