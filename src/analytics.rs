//! Completion analytics and dashboard counters.
//!
//! Everything is recomputed from the full collection on each call; there is
//! no incremental state.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::clock::local_date;
use crate::fields::Priority;
use crate::task::Task;

/// Task counts per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityHistogram {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub none: usize,
}

impl PriorityHistogram {
    fn record(&mut self, priority: Priority) {
        match priority {
            Priority::High => self.high += 1,
            Priority::Medium => self.medium += 1,
            Priority::Low => self.low += 1,
            Priority::None => self.none += 1,
        }
    }

    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
            Priority::None => self.none,
        }
    }

    /// Buckets in display order, highest priority first.
    pub fn entries(&self) -> [(Priority, usize); 4] {
        [Priority::High, Priority::Medium, Priority::Low, Priority::None].map(|p| (p, self.get(p)))
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.none
    }
}

/// Completed / in progress / overdue. Every task lands in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistogram {
    pub completed: usize,
    pub in_progress: usize,
    pub overdue: usize,
}

impl StatusHistogram {
    pub fn total(&self) -> usize {
        self.completed + self.in_progress + self.overdue
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    /// Whole percent, 0..=100.
    pub completion_rate: u32,
    pub priority: PriorityHistogram,
    pub status: StatusHistogram,
    /// Completed tasks by weekday of their last update, Sunday first.
    /// Tasks with no recorded update are left out.
    ///
    /// This is an all-time count per weekday, not the current week.
    pub weekly_completion: [usize; 7],
}

/// Aggregate `tasks` in one pass. `today` decides what counts as overdue.
pub fn aggregate(tasks: &[Task], today: NaiveDate) -> Analytics {
    let mut out = Analytics::default();
    for task in tasks {
        out.priority.record(task.priority);
        if task.completed {
            out.status.completed += 1;
            if let Some(updated) = &task.updated_at {
                let weekday = local_date(updated).weekday().num_days_from_sunday();
                out.weekly_completion[weekday as usize] += 1;
            }
        } else if task.is_overdue(today) {
            out.status.overdue += 1;
        } else {
            out.status.in_progress += 1;
        }
    }
    out.completion_rate = completion_rate(out.status.completed, tasks.len());
    out
}

/// Header counters shown above the task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    /// Due today, completed or not.
    pub due_today: usize,
    pub overdue: usize,
}

pub fn dashboard(tasks: &[Task], today: NaiveDate) -> DashboardStats {
    tasks.iter().fold(
        DashboardStats {
            total: tasks.len(),
            ..DashboardStats::default()
        },
        |mut stats, task| {
            stats.completed += usize::from(task.completed);
            stats.due_today += usize::from(task.is_due_on(today));
            stats.overdue += usize::from(task.is_overdue(today));
            stats
        },
    )
}

/// `round(completed / total * 100)`, rounding halves up. Zero for an empty list.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed * 200 + total) / (total * 2)) as u32
}

/// Share of `max` as a whole percent, capped at 100. Zero when `max` is zero.
pub fn percentage(value: usize, max: usize) -> u32 {
    if max == 0 {
        return 0;
    }
    completion_rate(value, max).min(100)
}
