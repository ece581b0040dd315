//! Calendar month projection.
//!
//! A month is laid out as whole Sunday-first weeks: trailing days of the
//! previous month, every day of the month, then leading days of the next month
//! until the last row is full. Each cell records whether any task is due that day.

use std::collections::HashSet;

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::task::Task;

/// Single-letter weekday headers, Sunday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

/// One day in the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_current_month: bool,
    /// Only ever set on cells of the displayed month.
    pub is_today: bool,
    pub has_task: bool,
}

/// Build the grid for the month containing `reference`.
pub fn build_month_grid(tasks: &[Task], reference: NaiveDate, today: NaiveDate) -> Vec<DayCell> {
    let first = first_of_month(reference);
    let lead = first.weekday().num_days_from_sunday();
    let len = lead + days_in_month(first);
    let cells = len.div_ceil(7) * 7;

    let due_days: HashSet<NaiveDate> = tasks.iter().filter_map(Task::due_day).collect();
    let start = first - Duration::days(i64::from(lead));

    start
        .iter_days()
        .take(cells as usize)
        .map(|date| {
            let is_current_month = date.year() == first.year() && date.month() == first.month();
            DayCell {
                date,
                is_current_month,
                is_today: is_current_month && date == today,
                has_task: due_days.contains(&date),
            }
        })
        .collect()
}

/// Tasks due on `day`, in collection order. Tasks without a due date never match.
pub fn tasks_on_day(tasks: &[Task], day: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_due_on(day)).collect()
}

/// Split a grid into its week rows.
pub fn weeks(grid: &[DayCell]) -> impl Iterator<Item = &[DayCell]> {
    grid.chunks(7)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .map_or(31, |next| (next - first).num_days() as u32)
}

/// Move `date` by `months`, across year boundaries. The day of month is
/// clamped to the target month's length (Jan 31 + 1 → Feb 28/29).
/// `None` only when the result leaves chrono's supported range.
pub fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let step = Months::new(months.unsigned_abs());
    if months >= 0 {
        date.checked_add_months(step)
    } else {
        date.checked_sub_months(step)
    }
}

/// "March 2024".
pub fn month_title(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Priority, RecurrencePattern};
    use chrono::{TimeZone, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Due at midday UTC, so the local calendar day is the same in any
    /// zone within ±11 hours.
    fn due(id: &str, y: i32, m: u32, day: u32) -> Task {
        let ts = Utc.with_ymd_and_hms(y, m, day, 12, 0, 0).unwrap();
        Task {
            id: id.into(),
            title: format!("task {id}"),
            description: None,
            priority: Priority::None,
            completed: false,
            due_date: Some(ts),
            reminder: None,
            is_recurring: false,
            recurrence_pattern: RecurrencePattern::Daily,
            notes: None,
            tags: Vec::new(),
            category: None,
            created_at: ts,
            updated_at: Some(ts),
        }
    }

    #[test]
    fn march_2024_layout() {
        // 1 March 2024 is a Friday.
        let grid = build_month_grid(&[], d(2024, 3, 15), d(2024, 3, 10));
        assert_eq!(grid.len(), 42);
        assert_eq!(grid[0].date, d(2024, 2, 25));
        assert!(!grid[0].is_current_month);
        assert_eq!(grid[5].date, d(2024, 3, 1));
        assert!(grid[5].is_current_month);
        assert_eq!(grid[35].date, d(2024, 3, 31));
        assert_eq!(grid[41].date, d(2024, 4, 6));

        let today: Vec<_> = grid.iter().filter(|c| c.is_today).map(|c| c.date).collect();
        assert_eq!(today, [d(2024, 3, 10)]);
    }

    #[test]
    fn no_padding_when_month_fills_whole_weeks() {
        // February 2015 starts on a Sunday and has 28 days.
        let grid = build_month_grid(&[], d(2015, 2, 1), d(2015, 2, 1));
        assert_eq!(grid.len(), 28);
        assert!(grid.iter().all(|c| c.is_current_month));
    }

    #[test]
    fn grid_invariants_hold_across_years() {
        let mut month = d(2023, 1, 31);
        for _ in 0..30 {
            let grid = build_month_grid(&[], month, month);
            assert_eq!(grid.len() % 7, 0);
            assert_eq!(grid[0].date.weekday().num_days_from_sunday(), 0);
            for pair in grid.windows(2) {
                assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
            }
            let in_month: Vec<_> = grid.iter().filter(|c| c.is_current_month).collect();
            assert_eq!(in_month.len() as u32, days_in_month(month));
            assert!(in_month.iter().all(|c| c.date.month() == month.month() && c.date.year() == month.year()));
            assert_eq!(weeks(&grid).count(), grid.len() / 7);
            month = shift_month(month, 1).unwrap();
        }
    }

    #[test]
    fn has_task_ignores_time_of_day_and_spans_adjacent_months() {
        let tasks = vec![due("a", 2024, 3, 5), due("b", 2024, 2, 26), due("c", 2024, 4, 2)];
        let grid = build_month_grid(&tasks, d(2024, 3, 1), d(2024, 3, 1));
        let marked: Vec<_> = grid.iter().filter(|c| c.has_task).map(|c| c.date).collect();
        assert_eq!(marked, [d(2024, 2, 26), d(2024, 3, 5), d(2024, 4, 2)]);
    }

    #[test]
    fn tasks_on_day_matches_exact_day() {
        let mut undated = due("x", 2024, 3, 5);
        undated.due_date = None;
        let tasks = vec![due("a", 2024, 3, 5), due("b", 2024, 3, 6), undated, due("c", 2023, 3, 5)];
        let hits: Vec<_> = tasks_on_day(&tasks, d(2024, 3, 5)).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(hits, ["a"]);
    }

    #[test]
    fn month_navigation_rolls_over_years() {
        assert_eq!(shift_month(d(2023, 12, 15), 1), Some(d(2024, 1, 15)));
        assert_eq!(shift_month(d(2024, 1, 15), -1), Some(d(2023, 12, 15)));
        assert_eq!(shift_month(d(2024, 1, 31), 1), Some(d(2024, 2, 29)));
        assert_eq!(shift_month(d(2024, 5, 1), -17), Some(d(2022, 12, 1)));
        assert_eq!(month_title(d(2024, 3, 9)), "March 2024");
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(d(2024, 2, 10)), 29);
        assert_eq!(days_in_month(d(2023, 2, 10)), 28);
        assert_eq!(days_in_month(d(1900, 2, 1)), 28);
        assert_eq!(days_in_month(d(2000, 2, 1)), 29);
        assert_eq!(days_in_month(d(2024, 11, 30)), 30);
        assert_eq!(days_in_month(d(2023, 12, 31)), 31);
        assert_eq!(first_of_month(d(2024, 11, 30)), d(2024, 11, 1));
    }
}
