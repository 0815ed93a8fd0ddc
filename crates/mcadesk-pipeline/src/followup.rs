//! Follow-up work and contact history around deals and merchants.

use chrono::{DateTime, Utc};
use mcadesk_core::{Communication, Note, RecordId, Task};

/// Open tasks past their due date, most overdue first. Ties keep input order.
pub fn overdue_tasks(tasks: &[Task], now: DateTime<Utc>) -> Vec<&Task> {
    let mut overdue: Vec<&Task> = tasks.iter().filter(|task| task.is_overdue(now)).collect();
    overdue.sort_by_key(|task| task.due_date);
    overdue
}

/// Whole days since the due date, rounded down.
pub fn days_overdue(task: &Task, now: DateTime<Utc>) -> i64 {
    (now - task.due_date).num_days()
}

pub fn tasks_for_deal<'t>(deal_id: &RecordId, tasks: &'t [Task]) -> Vec<&'t Task> {
    tasks
        .iter()
        .filter(|task| task.deal_id.as_ref() == Some(deal_id))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineEntry<'a> {
    Note(&'a Note),
    Communication(&'a Communication),
}

impl TimelineEntry<'_> {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Note(note) => note.created_at,
            Self::Communication(communication) => communication.timestamp,
        }
    }
}

/// Notes and communications attached to one deal, newest first.
pub fn deal_timeline<'a>(
    deal_id: &RecordId,
    notes: &'a [Note],
    communications: &'a [Communication],
) -> Vec<TimelineEntry<'a>> {
    merge(
        notes
            .iter()
            .filter(|note| note.deal_id.as_ref() == Some(deal_id)),
        communications
            .iter()
            .filter(|communication| communication.deal_id.as_ref() == Some(deal_id)),
    )
}

/// Everything logged against a merchant, deal-level entries included,
/// newest first.
pub fn merchant_timeline<'a>(
    merchant_id: &RecordId,
    notes: &'a [Note],
    communications: &'a [Communication],
) -> Vec<TimelineEntry<'a>> {
    merge(
        notes.iter().filter(|note| &note.merchant_id == merchant_id),
        communications
            .iter()
            .filter(|communication| &communication.merchant_id == merchant_id),
    )
}

fn merge<'a>(
    notes: impl Iterator<Item = &'a Note>,
    communications: impl Iterator<Item = &'a Communication>,
) -> Vec<TimelineEntry<'a>> {
    let mut entries: Vec<TimelineEntry<'a>> = notes
        .map(TimelineEntry::Note)
        .chain(communications.map(TimelineEntry::Communication))
        .collect();
    entries.sort_by_key(|entry| std::cmp::Reverse(entry.at()));
    entries
}
