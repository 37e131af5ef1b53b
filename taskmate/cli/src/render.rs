use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use taskmate_core::Task;

/// Parses a due date typed by the user, interpreting zone-less input as local time.
///
/// A bare date means the end of that day.
pub fn parse_due(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default()))
        })
        .ok_or_else(|| format!("'{raw}' is not a date, use YYYY-MM-DD or YYYY-MM-DD HH:MM"))?;

    match Local.from_local_datetime(&naive) {
        LocalResult::Single(local) | LocalResult::Ambiguous(local, _) => Ok(local.with_timezone(&Utc)),
        LocalResult::None => Err(format!("'{raw}' does not exist in the local time zone")),
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %-d, %H:%M").to_string()
}

/// One line of the task list.
pub fn task_line(task: &Task) -> String {
    let mark = if task.is_completed() { "[x]" } else { "[ ]" };
    format!(
        "{} {:<14} {:<6}  due {:<14}  {}",
        mark,
        task.id,
        task.priority,
        format_timestamp(task.due_date),
        task.title
    )
}

/// Full details of a single task.
pub fn task_details(task: &Task) -> String {
    let mut lines = vec![
        format!("{} ({})", task.title, task.id),
        format!("Priority:  {}", task.priority),
        format!("Due:       {}", format_timestamp(task.due_date)),
        format!("Created:   {}", format_timestamp(task.created_at)),
    ];
    match task.completed_at() {
        Some(at) => lines.push(format!("Completed: {}", format_timestamp(at))),
        None => lines.push("Status:    active".to_string()),
    }
    if !task.description.is_empty() {
        lines.push(String::new());
        lines.push(task.description.clone());
    }
    lines.join("\n")
}
