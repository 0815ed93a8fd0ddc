use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::RecordId;
use crate::models::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommunicationKind {
    Email,
    Call,
    Meeting,
    #[serde(rename = "SMS")]
    Sms,
}

/// A logged touchpoint with a merchant, optionally tied to one deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub id: RecordId,
    pub merchant_id: RecordId,
    #[serde(default)]
    pub deal_id: Option<RecordId>,
    #[serde(rename = "type")]
    pub kind: CommunicationKind,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub merchant_id: RecordId,
    #[serde(default)]
    pub deal_id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_task_priority")]
    pub priority: Priority,
}

impl Task {
    pub fn new(
        merchant_id: RecordId,
        deal_id: Option<RecordId>,
        title: impl Into<String>,
        due_date: DateTime<Utc>,
        priority: Priority,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            merchant_id,
            deal_id,
            title: title.into(),
            description: None,
            due_date,
            completed: false,
            priority,
        }
    }

    /// Open and past its due date. A task due exactly now is not overdue yet.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date < now
    }
}

fn default_task_priority() -> Priority {
    Priority::Medium
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: RecordId,
    pub merchant_id: RecordId,
    #[serde(default)]
    pub deal_id: Option<RecordId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl Note {
    pub fn new(
        merchant_id: RecordId,
        deal_id: Option<RecordId>,
        content: impl Into<String>,
        created_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            merchant_id,
            deal_id,
            content: content.into(),
            created_at: now,
            created_by: created_by.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 30, 0).unwrap()
    }

    #[test]
    fn only_open_tasks_past_due_are_overdue() {
        let mut task = Task::new(
            RecordId::from("m-1"),
            None,
            "Call back about statements",
            now() - Duration::days(1),
            Priority::High,
        );
        assert!(task.is_overdue(now()));

        task.completed = true;
        assert!(!task.is_overdue(now()));

        task.completed = false;
        task.due_date = now();
        assert!(!task.is_overdue(now()));
    }

    #[test]
    fn session_records_load_with_optional_fields_absent() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "t-3",
            "merchantId": "m-2",
            "dealId": "d-9",
            "title": "Follow up on deal #d-9",
            "dueDate": "2024-06-01T09:00:00.000Z",
            "completed": false
        }))
        .unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.is_overdue(now()));

        let call: Communication = serde_json::from_value(serde_json::json!({
            "id": "c-1",
            "merchantId": "m-2",
            "type": "SMS",
            "subject": "SMS with Rosa's Bakery",
            "body": "Sent the application link.",
            "timestamp": "2024-05-30T15:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(call.kind, CommunicationKind::Sms);
        assert!(call.deal_id.is_none());
        assert!(call.outcome.is_none());
    }
}
