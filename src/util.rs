//! Input parsing and lookup helpers for the CLI.
//!
//! Dates typed on the command line are interpreted in local time, the same
//! zone the calendar and overdue checks use.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use kuromi_tasks::calendar::{days_in_month, first_of_month};
use kuromi_tasks::task::Task;

/// Parse a due date or reminder with an optional trailing `HH:MM`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday" .. "sunday" (this week's occurrence, today included) and "next monday"
/// - "end of month" / "eom"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD"
///
/// Without a time the instant is local midnight of that day.
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<DateTime<Utc>> {
    let s = s.trim().to_lowercase();
    let (day_part, time) = match s.rsplit_once(' ') {
        Some((head, tail)) => match NaiveTime::parse_from_str(tail, "%H:%M") {
            Ok(time) => (head.trim(), Some(time)),
            Err(_) => (s.as_str(), None),
        },
        None => (s.as_str(), None),
    };
    let day = parse_day(day_part, today)?;
    let naive = match time {
        Some(time) => day.and_time(time),
        None => day.and_hms_opt(0, 0, 0)?,
    };
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Parse a calendar day relative to `today`.
pub fn parse_day(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of month" | "eom" => {
            let first = first_of_month(today);
            return Some(first + Duration::days(i64::from(days_in_month(first)) - 1));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some(days) = rest.strip_suffix('d').and_then(|n| n.trim().parse::<i64>().ok()) {
            return today.checked_add_signed(Duration::days(days));
        }
        if let Some(weeks) = rest.strip_suffix('w').and_then(|n| n.trim().parse::<i64>().ok()) {
            return today.checked_add_signed(Duration::weeks(weeks));
        }
        return None;
    }

    let (name, skip_week) = match s.strip_prefix("next ") {
        Some(rest) => (rest.trim(), true),
        None => (s.as_str(), false),
    };
    if let Some(target) = weekday_index(name) {
        let current = today.weekday().num_days_from_monday();
        let mut ahead = (target + 7 - current) % 7;
        if skip_week {
            ahead += 7;
        }
        return Some(today + Duration::days(i64::from(ahead)));
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn weekday_index(name: &str) -> Option<u32> {
    let index = match name {
        "monday" | "mon" => 0,
        "tuesday" | "tue" => 1,
        "wednesday" | "wed" => 2,
        "thursday" | "thu" => 3,
        "friday" | "fri" => 4,
        "saturday" | "sat" => 5,
        "sunday" | "sun" => 6,
        _ => return None,
    };
    Some(index)
}

/// Parse `YYYY-MM` into the first day of that month.
pub fn parse_month(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").ok()
}

/// Split comma-separated tag arguments. Blank pieces are dropped; case is kept.
pub fn split_tags(inputs: &[String]) -> Vec<String> {
    inputs
        .iter()
        .flat_map(|raw| raw.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve a task identifier (either id or title) to a task id.
///
/// Titles match case-insensitively. Ambiguous titles are an error listing
/// the candidates so the caller can pick an id instead.
pub fn resolve_task_identifier(identifier: &str, tasks: &[Task]) -> Result<String> {
    let identifier = identifier.trim();
    if let Some(task) = tasks.iter().find(|t| t.id == identifier) {
        return Ok(task.id.clone());
    }

    let wanted = identifier.to_lowercase();
    let matches: Vec<&Task> = tasks.iter().filter(|t| t.title.to_lowercase() == wanted).collect();

    match matches.as_slice() {
        [] => Err(anyhow!("no task found with id or title '{identifier}'")),
        [task] => Ok(task.id.clone()),
        many => {
            let mut msg = format!("multiple tasks are titled '{identifier}':\n");
            for task in many {
                let state = if task.completed { "done" } else { "open" };
                msg.push_str(&format!("  {}: {} ({state})\n", task.id, task.title));
            }
            msg.push_str("use the id instead");
            bail!(msg)
        }
    }
}

/// Format a due day relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = (d - today).num_days();
            match delta {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {n}d"),
                n => format!("{}d late", -n),
            }
        }
    }
}

/// Format an instant in local time for detail views.
pub fn format_local(instant: &DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
