//! Task data structure and the draft used to create or edit one.
//!
//! This module defines the `Task` record as it is persisted, and `TaskDraft`,
//! the user-editable subset of fields a form collects before saving.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::local_date;
use crate::error::ValidationError;
use crate::fields::{self, Priority, RecurrencePattern};

/// A single to-do item.
///
/// Field order here is the field order in the stored JSON, so loading and
/// re-saving a collection reproduces the same bytes. Decoding is lenient: see
/// `StoredTask`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredTask")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    #[serde(serialize_with = "iso8601::serialize_option")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(serialize_with = "iso8601::serialize_option")]
    pub reminder: Option<DateTime<Utc>>,
    pub is_recurring: bool,
    pub recurrence_pattern: RecurrencePattern,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    /// Mirrors `tags[0]`; recomputed every time the task is saved.
    pub category: Option<String>,
    #[serde(serialize_with = "iso8601::serialize")]
    pub created_at: DateTime<Utc>,
    /// `None` only for records stored without an update time.
    #[serde(serialize_with = "iso8601::serialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Wire shape accepted on load. Missing or `null` values take their defaults,
/// unknown enum tokens fall back, and unreadable timestamps count as absent.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    id: String,
    #[serde(default, deserialize_with = "fields::null_as_default")]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "fields::lenient")]
    priority: Priority,
    #[serde(default, deserialize_with = "fields::null_as_default")]
    completed: bool,
    #[serde(default, deserialize_with = "iso8601::deserialize_lenient")]
    due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "iso8601::deserialize_lenient")]
    reminder: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "fields::null_as_default")]
    is_recurring: bool,
    #[serde(default, deserialize_with = "fields::lenient")]
    recurrence_pattern: RecurrencePattern,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default, deserialize_with = "fields::null_as_default")]
    tags: Vec<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, deserialize_with = "iso8601::deserialize_lenient")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "iso8601::deserialize_lenient")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoredTask> for Task {
    fn from(raw: StoredTask) -> Self {
        // Creation time falls back to the update time, then to the epoch.
        let created_at = raw.created_at.or(raw.updated_at).unwrap_or_default();
        Self {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            priority: raw.priority,
            completed: raw.completed,
            due_date: raw.due_date,
            reminder: raw.reminder,
            is_recurring: raw.is_recurring,
            recurrence_pattern: raw.recurrence_pattern,
            notes: raw.notes,
            tags: raw.tags,
            category: raw.category,
            created_at,
            updated_at: raw.updated_at,
        }
    }
}

impl Task {
    /// Local calendar day the task is due, if it has a due date.
    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due_date.as_ref().map(local_date)
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_day() == Some(day)
    }

    /// Open and due on a day strictly before `today`. Due today is not overdue.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_day().is_some_and(|due| due < today)
    }

    pub(crate) fn sync_category(&mut self) {
        self.category = self.tags.first().cloned();
    }
}

/// Editable task fields, as collected by an add/edit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    /// `None` keeps the current completion state on update (false on create).
    pub completed: Option<bool>,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder: Option<DateTime<Utc>>,
    pub is_recurring: bool,
    pub recurrence_pattern: RecurrencePattern,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Prefill a draft from an existing task, as the edit form does.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            completed: None,
            due_date: task.due_date,
            reminder: task.reminder,
            is_recurring: task.is_recurring,
            recurrence_pattern: task.recurrence_pattern,
            notes: task.notes.clone(),
            tags: task.tags.clone(),
        }
    }

    /// Append a tag. Blank tags and tags already present are ignored.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Reject drafts that cannot be saved.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::new("title", "must not be empty"));
        }
        Ok(())
    }

    /// Copy the draft's fields onto `task`, normalising title and tags.
    pub(crate) fn apply_to(self, task: &mut Task) {
        let mut tags = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t: &String| t == tag) {
                tags.push(tag.to_string());
            }
        }

        task.title = self.title.trim().to_string();
        task.description = self.description;
        task.priority = self.priority;
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        task.due_date = self.due_date;
        task.reminder = self.reminder;
        task.is_recurring = self.is_recurring;
        task.recurrence_pattern = self.recurrence_pattern;
        task.notes = self.notes;
        task.tags = tags;
        task.sync_category();
    }
}

/// ISO-8601 UTC timestamps with millisecond precision (`2024-03-01T09:30:00.000Z`).
pub(crate) mod iso8601 {
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn serialize_option<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serialize(ts, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// `null`, a missing field or an unreadable string all decode as `None`.
    pub fn deserialize_lenient<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    /// Parse the ISO-8601 forms a JavaScript `Date` accepts: with an offset,
    /// date-time without an offset (local time), or a bare date (UTC midnight).
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok());
        if let Some(naive) = naive {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
        let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?))
    }
}
