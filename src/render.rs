//! Plain-text rendering of tasks, month grids and statistics.

use chrono::{Datelike, NaiveDate};

use kuromi_tasks::analytics::{percentage, Analytics, DashboardStats};
use kuromi_tasks::calendar::{month_title, weeks, DayCell, WEEKDAY_LABELS};
use kuromi_tasks::fields::Priority;
use kuromi_tasks::task::Task;

use crate::util::{format_due_relative, format_local, truncate};

const BAR_WIDTH: usize = 20;

/// Print tasks as a table in the order given.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!("{:<14} {:<4} {:<7} {:<10} {}", "ID", "Done", "Pri", "Due", "Title [tags]");
    for t in tasks {
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.tags.join(","))
        };
        let overdue = if t.is_overdue(today) { " !" } else { "" };
        println!(
            "{:<14} {:<4} {:<7} {:<10} {}{}{}",
            t.id,
            if t.completed { "x" } else { "" },
            priority_label(t.priority),
            format_due_relative(t.due_day(), today),
            truncate(&t.title, 48),
            tags,
            overdue,
        );
    }
}

/// Print every field of a single task.
pub fn print_task(task: &Task, today: NaiveDate) {
    let or_dash = |value: Option<&str>| value.unwrap_or("-").to_string();
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", if task.completed { "completed" } else { "active" });
    println!("Priority:     {}", task.priority);
    println!(
        "Due:          {}",
        match &task.due_date {
            Some(due) => format!("{} ({})", format_local(due), format_due_relative(task.due_day(), today)),
            None => "-".into(),
        }
    );
    println!("Reminder:     {}", task.reminder.as_ref().map_or_else(|| "-".into(), format_local));
    println!(
        "Repeats:      {}",
        if task.is_recurring { task.recurrence_pattern.as_str() } else { "-" }
    );
    println!("Tags:         {}", if task.tags.is_empty() { "-".into() } else { task.tags.join(",") });
    println!("Category:     {}", or_dash(task.category.as_deref()));
    println!("Created:      {}", format_local(&task.created_at));
    println!("Updated:      {}", task.updated_at.as_ref().map_or_else(|| "-".into(), format_local));
    println!("Description:\n{}", or_dash(task.description.as_deref()));
    println!("Notes:\n{}", or_dash(task.notes.as_deref()));
}

/// Print a month grid. Days with tasks are marked `*`, today is bracketed and
/// days outside the month are dimmed to `·`.
pub fn print_month(grid: &[DayCell], reference: NaiveDate) {
    println!("{:^35}", month_title(reference));
    let header: Vec<String> = WEEKDAY_LABELS.iter().map(|l| format!("{l:^5}")).collect();
    println!("{}", header.concat());
    for week in weeks(grid) {
        let row: Vec<String> = week.iter().map(format_cell).collect();
        println!("{}", row.concat());
    }
}

fn format_cell(cell: &DayCell) -> String {
    if !cell.is_current_month {
        let mark = if cell.has_task { "·*" } else { "·" };
        return format!("{mark:^5}");
    }
    let day = cell.date.day();
    let mark = if cell.has_task { "*" } else { "" };
    let label = if cell.is_today {
        format!("[{day}]{mark}")
    } else {
        format!("{day}{mark}")
    };
    format!("{label:^5}")
}

/// Print the dashboard counters and the analytics breakdown.
pub fn print_stats(stats: &DashboardStats, analytics: &Analytics) {
    println!(
        "Total: {}   Completed: {}   Due today: {}   Overdue: {}",
        stats.total, stats.completed, stats.due_today, stats.overdue
    );
    println!();
    println!("Completion rate: {}%", analytics.completion_rate);
    println!("{}", bar(analytics.completion_rate));

    println!("\nBy priority");
    let total = analytics.priority.total();
    for (priority, count) in analytics.priority.entries() {
        println!("  {:<7} {:>4}  {}", priority.as_str(), count, bar(percentage(count, total)));
    }

    println!("\nBy status");
    let status = &analytics.status;
    let total = status.total();
    for (label, count) in [
        ("done", status.completed),
        ("active", status.in_progress),
        ("overdue", status.overdue),
    ] {
        println!("  {:<7} {:>4}  {}", label, count, bar(percentage(count, total)));
    }

    println!("\nCompleted by weekday");
    let busiest = analytics.weekly_completion.iter().copied().max().unwrap_or(0);
    for (label, count) in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        .iter()
        .zip(analytics.weekly_completion)
    {
        println!("  {:<7} {:>4}  {}", label, count, bar(percentage(count, busiest)));
    }
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::None => "-",
        other => other.as_str(),
    }
}

/// Horizontal progress bar for a whole percentage.
pub fn bar(percent: u32) -> String {
    let filled = (percent.min(100) as usize * BAR_WIDTH + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn bars_fill_proportionally() {
        assert_eq!(bar(0), "░".repeat(BAR_WIDTH));
        assert_eq!(bar(100), "█".repeat(BAR_WIDTH));
        assert_eq!(bar(250), "█".repeat(BAR_WIDTH));
        assert_eq!(bar(50).chars().filter(|c| *c == '█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn cells_mark_today_and_tasks() {
        let cell = DayCell {
            date: d(2024, 3, 7),
            is_current_month: true,
            is_today: true,
            has_task: true,
        };
        assert_eq!(format_cell(&cell).trim(), "[7]*");

        let outside = DayCell {
            is_current_month: false,
            is_today: false,
            ..cell
        };
        assert_eq!(format_cell(&outside).trim(), "·*");
    }
}
