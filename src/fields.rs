//! Enumerations and field types for tasks and list filters.
//!
//! This module defines the closed value sets a task carries (priority, recurrence)
//! and the status/priority filters applied by the list view.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::UnknownValueError;
use crate::task::Task;

/// Task importance. Cycles none → low → medium → high → none.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    /// Every priority in cycle order.
    pub const CYCLE: [Priority; 4] = [Priority::None, Priority::Low, Priority::Medium, Priority::High];

    /// The next priority in the cycle, wrapping from high back to none.
    pub fn next(self) -> Self {
        let at = Self::CYCLE.iter().position(|p| *p == self).unwrap_or(0);
        Self::CYCLE[(at + 1) % Self::CYCLE.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::None => "none",
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Priority::None),
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(UnknownValueError {
                field: "priority",
                token: s.to_string(),
            }),
        }
    }
}

/// How often a recurring task repeats. Stored only; no instances are generated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl RecurrencePattern {
    pub fn as_str(self) -> &'static str {
        match self {
            RecurrencePattern::Daily => "daily",
            RecurrencePattern::Weekly => "weekly",
            RecurrencePattern::Monthly => "monthly",
        }
    }
}

impl FromStr for RecurrencePattern {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(RecurrencePattern::Daily),
            "weekly" => Ok(RecurrencePattern::Weekly),
            "monthly" => Ok(RecurrencePattern::Monthly),
            _ => Err(UnknownValueError {
                field: "recurrence pattern",
                token: s.to_string(),
            }),
        }
    }
}

/// Completion filter for the task list.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" => Ok(StatusFilter::Completed),
            _ => Err(UnknownValueError {
                field: "status filter",
                token: s.to_string(),
            }),
        }
    }
}

/// Priority filter for the task list. Tasks without a priority only show under `All`.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Low,
    Medium,
    High,
}

impl PriorityFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Low => task.priority == Priority::Low,
            PriorityFilter::Medium => task.priority == Priority::Medium,
            PriorityFilter::High => task.priority == Priority::High,
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = UnknownValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(PriorityFilter::All),
            "low" => Ok(PriorityFilter::Low),
            "medium" => Ok(PriorityFilter::Medium),
            "high" => Ok(PriorityFilter::High),
            _ => Err(UnknownValueError {
                field: "priority filter",
                token: s.to_string(),
            }),
        }
    }
}

/// Deserialize an optional string field, falling back to the default on
/// `null` or on tokens the enum does not know.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
}

/// Deserialize a field that may be stored as `null`, treating it as the default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_cycle_wraps_to_none() {
        assert_eq!(Priority::None.next(), Priority::Low);
        assert_eq!(Priority::Low.next(), Priority::Medium);
        assert_eq!(Priority::Medium.next(), Priority::High);
        assert_eq!(Priority::High.next(), Priority::None);

        let mut seen = vec![Priority::None];
        for _ in 0..Priority::CYCLE.len() {
            let last = seen[seen.len() - 1];
            seen.push(last.next());
        }
        assert_eq!(&seen[..4], Priority::CYCLE);
        assert_eq!(seen[4], Priority::None);
    }

    #[test]
    fn filter_tokens_are_a_closed_set() {
        assert_eq!("Active".parse::<StatusFilter>(), Ok(StatusFilter::Active));
        assert_eq!(" completed ".parse::<StatusFilter>(), Ok(StatusFilter::Completed));
        assert_eq!("HIGH".parse::<PriorityFilter>(), Ok(PriorityFilter::High));

        let err = "done".parse::<StatusFilter>().unwrap_err();
        assert_eq!(err.field, "status filter");
        assert_eq!(err.token, "done");
        assert!("none".parse::<PriorityFilter>().is_err());
        assert!("urgent".parse::<PriorityFilter>().is_err());
    }

    #[test]
    fn priority_serializes_lowercase() {
        let json = serde_json::to_string(&Priority::Medium)
            .unwrap_or_else(|e| panic!("serialize priority: {e}"));
        assert_eq!(json, "\"medium\"");
    }
}
