//! Task and subtask records.
//!
//! `Task` is the authoritative stored record. `TaskDraft` and `TaskPatch`
//! are the gateway's input shapes: a draft carries everything a new task
//! needs before the store assigns id and timestamps, and a patch carries
//! only the fields an update actually touches.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::Priority;

/// A single unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    /// Local wall-clock due date. Malformed stored values degrade to `None`.
    #[serde(default, with = "due_format")]
    pub due: Option<NaiveDateTime>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owning project id, if any.
    pub project: Option<u64>,
    #[serde(default)]
    pub subtasks: Vec<SubTask>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl Task {
    /// Bump the modification timestamp.
    ///
    /// Strictly increases even when two mutations land within the same
    /// millisecond, which also serialises last-writer-wins per record.
    pub fn touch(&mut self) {
        self.updated_at_ms = Utc::now().timestamp_millis().max(self.updated_at_ms + 1);
    }

    /// Next free subtask id within this task.
    pub fn next_subtask_id(&self) -> u64 {
        self.subtasks.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }
}

/// A checklist item owned by exactly one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTask {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Fields supplied when creating a task. Id and timestamps are assigned
/// by the store.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due: Option<NaiveDateTime>,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub project: Option<u64>,
    pub subtasks: Vec<String>,
}

/// Partial update. `None` leaves a field alone; the nested option
/// distinguishes setting a value from clearing it.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due: Option<Option<NaiveDateTime>>,
    pub priority: Option<Priority>,
    pub project: Option<Option<u64>>,
    pub completed: Option<bool>,
    pub add_tags: Vec<String>,
    pub rm_tags: Vec<String>,
}

/// Trim, drop empties and suppress duplicates while preserving the order
/// tags were entered in. Tags stay case-sensitive.
pub fn clean_tags<I, S>(inputs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for raw in inputs {
        for part in raw.as_ref().split(',') {
            let tag = part.trim();
            if !tag.is_empty() && !out.iter().any(|t| t == tag) {
                out.push(tag.to_string());
            }
        }
    }
    out
}

/// Serde helpers for the due field: stored as a readable string, read back
/// leniently so one unparseable date never poisons the whole store.
mod due_format {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const CANONICAL: &str = "%Y-%m-%d %H:%M";

    pub fn serialize<S: Serializer>(
        due: &Option<NaiveDateTime>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        match due {
            Some(dt) => ser.serialize_some(&dt.format(CANONICAL).to_string()),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(de)?;
        Ok(raw.as_deref().and_then(parse_stored))
    }

    /// Accept the canonical format plus a few shapes older revisions wrote.
    pub fn parse_stored(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        for fmt in [CANONICAL, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_json(due: &str) -> String {
        format!(
            r#"{{"id":1,"title":"t","description":null,"due":{due},"project":null,
                 "created_at_ms":0,"updated_at_ms":0}}"#
        )
    }

    #[test]
    fn malformed_due_date_reads_as_undated() {
        let t: Task = serde_json::from_str(&task_json("\"next thursday-ish\"")).unwrap();
        assert!(t.due.is_none());
        assert!(!t.completed);
        assert_eq!(t.priority, Priority::Medium);
    }

    #[test]
    fn date_only_due_reads_as_midnight() {
        let t: Task = serde_json::from_str(&task_json("\"2026-03-05\"")).unwrap();
        let due = t.due.unwrap();
        assert_eq!(due.format("%Y-%m-%d %H:%M").to_string(), "2026-03-05 00:00");
    }

    #[test]
    fn due_round_trips_through_json() {
        let json = task_json("\"2026-03-05 14:30\"");
        let t: Task = serde_json::from_str(&json).unwrap();
        let back = serde_json::to_string(&t).unwrap();
        let t2: Task = serde_json::from_str(&back).unwrap();
        assert_eq!(t.due, t2.due);
    }

    #[test]
    fn touch_strictly_increases() {
        let mut t: Task = serde_json::from_str(&task_json("null")).unwrap();
        let first = t.updated_at_ms;
        t.touch();
        let second = t.updated_at_ms;
        t.touch();
        assert!(first < second && second < t.updated_at_ms);
    }

    #[test]
    fn clean_tags_preserves_entry_order_and_dedups() {
        let tags = clean_tags(["errand, home", " errand ", "", "Home"]);
        assert_eq!(tags, vec!["errand", "home", "Home"]);
    }
}
