//! Serialized form of the task collection.
//!
//! Tasks are stored as a JSON array of camelCase records with RFC 3339
//! timestamps. Reading is lenient: individual fields are coerced where a
//! sensible default exists and records that cannot be recovered are skipped,
//! so one bad entry does not cost the whole list.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use taskmate_core::{Priority, Status, Task, TaskId};
use tracing::warn;

/// The shape written to storage for each task.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TaskRecord<'a> {
    id: &'a TaskId,
    title: &'a str,
    description: &'a str,
    due_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    priority: Priority,
    completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Task> for TaskRecord<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: &task.id,
            title: &task.title,
            description: &task.description,
            due_date: task.due_date,
            created_at: task.created_at,
            priority: task.priority,
            completed: task.is_completed(),
            completed_at: task.completed_at(),
        }
    }
}

/// The shape read back from storage, with every field optional.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct StoredRecord {
    id: Option<serde_json::Value>,
    title: Option<String>,
    description: Option<String>,
    due_date: Option<String>,
    created_at: Option<String>,
    priority: Option<String>,
    completed: Option<bool>,
    completed_at: Option<String>,
}

impl StoredRecord {
    fn into_task(self) -> Result<Task, &'static str> {
        let id = match self.id {
            Some(serde_json::Value::String(id)) if !id.is_empty() => TaskId::from(id),
            Some(serde_json::Value::Number(id)) => TaskId::from(id.to_string()),
            _ => return Err("missing id"),
        };
        let due_date = self
            .due_date
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or("unreadable dueDate")?;
        let created_at = self
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or("unreadable createdAt")?;
        let priority = self
            .priority
            .and_then(|p| p.parse().ok())
            .unwrap_or_default();
        let status = if self.completed.unwrap_or(false) {
            let at = self
                .completed_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(created_at);
            Status::Completed { at }
        } else {
            Status::Active
        };

        Ok(Task {
            id,
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            due_date,
            created_at,
            priority,
            status,
        })
    }
}

/// Parses the timestamp formats found in stored data.
///
/// Accepts RFC 3339 with any offset, and falls back to naive date-times and
/// plain dates, both read as UTC regardless of the local time zone.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serializes the whole collection, preserving order.
pub fn encode(tasks: &[Task]) -> Result<String, serde_json::Error> {
    let records: Vec<TaskRecord<'_>> = tasks.iter().map(TaskRecord::from).collect();
    serde_json::to_string(&records)
}

/// Parses a stored collection.
///
/// Fails only when the payload is not a JSON array. Entries that are not
/// objects, lack an id or carry unreadable dates are skipped, as are repeated
/// ids after their first occurrence.
pub fn decode(payload: &str) -> Result<Vec<Task>, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(payload)?;
    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let task = match serde_json::from_value::<StoredRecord>(entry) {
            Ok(record) => record.into_task(),
            Err(_) => Err("not a task record"),
        };
        match task {
            Ok(task) if seen.insert(task.id.clone()) => tasks.push(task),
            Ok(task) => warn!("Skipping stored task {}: duplicate id", task.id),
            Err(reason) => warn!("Skipping stored task at index {}: {}", index, reason),
        }
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn sample_tasks() -> Vec<Task> {
        let active = Task::new(
            TaskId::from("1700000000000"),
            "Q4 Financial Planning",
            "Review budget requests",
            at(2023, 11, 15, 9),
            at(2023, 10, 20, 0),
            Priority::High,
        );
        let mut done = Task::new(
            TaskId::from("1700000000001"),
            "Pay electricity bill",
            "",
            at(2023, 11, 1, 12),
            at(2023, 10, 30, 8),
            Priority::Medium,
        );
        let completed_at = Utc::now().with_nanosecond(123_456_789).unwrap();
        done.toggle_completion(completed_at);
        vec![active, done]
    }

    #[test]
    fn encode_then_decode_preserves_every_field() {
        // Arrange
        let tasks = sample_tasks();

        // Act
        let payload = encode(&tasks).unwrap();
        let decoded = decode(&payload).unwrap();

        // Assert
        assert_eq!(decoded, tasks);
    }

    #[test]
    fn encode_uses_camel_case_and_omits_missing_completion() {
        let payload = encode(&sample_tasks()[..1]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        let record = &json[0];

        assert_eq!(record["id"], "1700000000000");
        assert_eq!(record["dueDate"], "2023-11-15T09:00:00Z");
        assert_eq!(record["createdAt"], "2023-10-20T00:00:00Z");
        assert_eq!(record["priority"], "high");
        assert_eq!(record["completed"], false);
        assert!(record.get("completedAt").is_none());
    }

    #[test]
    fn encode_writes_completion_time_for_completed_tasks() {
        let tasks = sample_tasks();

        let json: serde_json::Value = serde_json::from_str(&encode(&tasks).unwrap()).unwrap();

        assert_eq!(json[1]["completed"], true);
        assert!(json[1]["completedAt"].is_string());
    }

    #[test]
    fn decode_reads_millisecond_iso_timestamps() {
        // Arrange
        let payload = r#"[{
            "id": "1",
            "title": "Website Redesign Mockups",
            "description": "Incorporate feedback",
            "dueDate": "2023-11-22T16:00:00.000Z",
            "createdAt": "2023-10-30T00:00:00.000Z",
            "priority": "medium",
            "completed": true,
            "completedAt": "2023-11-20T10:15:30.250Z"
        }]"#;

        // Act
        let tasks = decode(payload).unwrap();

        // Assert
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].due_date, at(2023, 11, 22, 16));
        assert_eq!(
            tasks[0].completed_at(),
            Some(Utc.with_ymd_and_hms(2023, 11, 20, 10, 15, 30).unwrap() + chrono::Duration::milliseconds(250))
        );
    }

    #[test]
    fn decode_drops_completion_time_on_active_record() {
        let payload = r#"[{"id":"1","title":"t","description":"","dueDate":"2024-01-01T00:00:00Z",
            "createdAt":"2024-01-01T00:00:00Z","priority":"low","completed":false,
            "completedAt":"2024-01-02T00:00:00Z"}]"#;

        let tasks = decode(payload).unwrap();

        assert!(!tasks[0].is_completed());
        assert_eq!(tasks[0].completed_at(), None);
    }

    #[test]
    fn decode_gives_completed_record_without_time_its_creation_time() {
        let payload = r#"[{"id":"3","title":"Call the dentist","description":"",
            "dueDate":"2024-01-05T00:00:00Z","createdAt":"2024-01-01T00:00:00Z",
            "priority":"low","completed":true,"completedAt":"not a date"}]"#;

        let tasks = decode(payload).unwrap();

        assert_eq!(tasks[0].completed_at(), Some(at(2024, 1, 1, 0)));
    }

    #[test]
    fn decode_fills_defaults_for_missing_fields() {
        let payload = r#"[{"id":42,"title":"Bare","dueDate":"2024-02-01","createdAt":"2024-01-31T08:30"}]"#;

        let tasks = decode(payload).unwrap();

        assert_eq!(tasks[0].id, TaskId::from("42"));
        assert_eq!(tasks[0].description, "");
        assert_eq!(tasks[0].priority, Priority::Medium);
        assert!(!tasks[0].is_completed());
        assert_eq!(tasks[0].due_date, at(2024, 2, 1, 0));
        assert_eq!(
            tasks[0].created_at,
            Utc.with_ymd_and_hms(2024, 1, 31, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn decode_skips_unrecoverable_records() {
        let payload = r#"[
            {"id":"ok","title":"Kept","dueDate":"2024-01-01T00:00:00Z","createdAt":"2024-01-01T00:00:00Z"},
            {"title":"No id","dueDate":"2024-01-01T00:00:00Z","createdAt":"2024-01-01T00:00:00Z"},
            {"id":"bad-date","title":"x","dueDate":"someday","createdAt":"2024-01-01T00:00:00Z"},
            {"id":"wrong-type","title":17,"dueDate":"2024-01-01T00:00:00Z","createdAt":"2024-01-01T00:00:00Z"},
            "not an object"
        ]"#;

        let tasks = decode(payload).unwrap();

        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn decode_keeps_first_of_duplicate_ids() {
        let payload = r#"[
            {"id":"1","title":"First","dueDate":"2024-01-01T00:00:00Z","createdAt":"2024-01-01T00:00:00Z"},
            {"id":"1","title":"Second","dueDate":"2024-01-01T00:00:00Z","createdAt":"2024-01-01T00:00:00Z"}
        ]"#;

        let tasks = decode(payload).unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "First");
    }

    #[test]
    fn decode_rejects_payload_that_is_not_an_array() {
        assert!(decode("{").is_err());
        assert!(decode(r#"{"tasks":[]}"#).is_err());
    }

    #[test]
    fn parse_timestamp_normalizes_offsets_to_utc() {
        assert_eq!(
            parse_timestamp("2024-01-01T10:00:00+02:00"),
            Some(at(2024, 1, 1, 8))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn parse_timestamp_reads_zone_less_values_as_utc() {
        assert_eq!(parse_timestamp("2023-11-15T09:00:00"), Some(at(2023, 11, 15, 9)));
        assert_eq!(parse_timestamp("2023-11-15T09:00"), Some(at(2023, 11, 15, 9)));
        assert_eq!(parse_timestamp("2023-11-15"), Some(at(2023, 11, 15, 0)));
    }
}
