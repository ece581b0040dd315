//! Command implementations for the CLI interface.
//!
//! Each handler resolves its arguments against the repository, performs one
//! operation and prints the result. Persistence happens behind the repository;
//! `main` flushes it before exiting.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use clap_complete::{generate, Shell};

use kuromi_tasks::analytics::{aggregate, dashboard};
use kuromi_tasks::calendar::{build_month_grid, shift_month, tasks_on_day};
use kuromi_tasks::clock::{Clock, SystemClock};
use kuromi_tasks::fields::{Priority, PriorityFilter, RecurrencePattern, StatusFilter};
use kuromi_tasks::filter::TaskFilter;
use kuromi_tasks::repository::TaskRepository;
use kuromi_tasks::task::TaskDraft;

use crate::render::{print_month, print_stats, print_table, print_task};
use crate::util::{parse_day, parse_due_input, parse_month, resolve_task_identifier, split_tags};

pub type Repo = TaskRepository<SystemClock>;

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },

    /// Edit fields on a task.
    Edit {
        /// Task ID or title to edit.
        id: String,
        /// New title.
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
        /// Remove tags. May be repeated and comma-separated.
        #[arg(long = "rm-tag")]
        rm_tags: Vec<String>,
        /// Clear the description.
        #[arg(long)]
        clear_desc: bool,
        /// Clear the due date.
        #[arg(long)]
        clear_due: bool,
        /// Clear the reminder.
        #[arg(long)]
        clear_remind: bool,
        /// Stop repeating.
        #[arg(long, conflicts_with = "repeat")]
        no_repeat: bool,
    },

    /// List tasks with optional search and filters.
    List {
        /// Case-insensitive search over title and description.
        query: Option<String>,
        /// Filter by completion.
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        /// Filter by priority.
        #[arg(long, value_enum, default_value_t = PriorityFilter::All)]
        priority: PriorityFilter,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show a single task by ID or title.
    Show {
        id: String,
    },

    /// Toggle a task between completed and active.
    Done {
        id: String,
    },

    /// Advance a task's priority: none → low → medium → high → none.
    Priority {
        id: String,
    },

    /// Delete a task.
    Delete {
        id: String,
    },

    /// Move a task to a 1-based position in the list.
    Move {
        id: String,
        position: usize,
    },

    /// Put the whole list in the given order. Every task must be named once.
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show a month calendar with due dates marked.
    Calendar {
        /// Month to show as YYYY-MM. Defaults to the current month.
        #[arg(long)]
        month: Option<String>,
        /// Months forward from the chosen month.
        #[arg(long, default_value_t = 0)]
        next: u32,
        /// Months back from the chosen month.
        #[arg(long, default_value_t = 0)]
        prev: u32,
    },

    /// List tasks due on one day.
    Day {
        /// Day as YYYY-MM-DD, "today", "tomorrow", "in 3d", a weekday, ...
        date: String,
    },

    /// Show completion statistics.
    Stats {
        /// Print machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Whether the command changes the task list.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Commands::Add { .. }
                | Commands::Edit { .. }
                | Commands::Done { .. }
                | Commands::Priority { .. }
                | Commands::Delete { .. }
                | Commands::Move { .. }
                | Commands::Reorder { .. }
        )
    }
}

/// Task fields shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct TaskFields {
    /// Longer description.
    #[arg(long)]
    pub desc: Option<String>,
    /// Priority: none | low | medium | high.
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
    /// Due date: YYYY-MM-DD, "today", "tomorrow", "in Nd", "next fri", with optional HH:MM.
    #[arg(long)]
    pub due: Option<String>,
    /// Reminder, in the same format as --due.
    #[arg(long)]
    pub remind: Option<String>,
    /// Comma-separated tags. May be repeated. The first tag is the category.
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Free-form notes.
    #[arg(long)]
    pub notes: Option<String>,
    /// Mark the task as repeating: daily | weekly | monthly.
    #[arg(long, value_enum)]
    pub repeat: Option<RecurrencePattern>,
}

impl TaskFields {
    /// Overlay the given fields on `draft`. Absent flags leave the draft alone.
    fn apply(self, draft: &mut TaskDraft, repo: &Repo) -> Result<()> {
        let today = repo.clock().today();
        if let Some(desc) = self.desc {
            draft.description = non_blank(desc);
        }
        if let Some(priority) = self.priority {
            draft.priority = priority;
        }
        if let Some(due) = self.due {
            draft.due_date = Some(
                parse_due_input(&due, today).ok_or_else(|| anyhow!("unrecognised due date '{due}'"))?,
            );
        }
        if let Some(remind) = self.remind {
            draft.reminder = Some(
                parse_due_input(&remind, today)
                    .ok_or_else(|| anyhow!("unrecognised reminder time '{remind}'"))?,
            );
        }
        for tag in split_tags(&self.tags) {
            draft.add_tag(&tag);
        }
        if let Some(notes) = self.notes {
            draft.notes = non_blank(notes);
        }
        if let Some(pattern) = self.repeat {
            draft.is_recurring = true;
            draft.recurrence_pattern = pattern;
        }
        Ok(())
    }
}

fn non_blank(text: String) -> Option<String> {
    (!text.trim().is_empty()).then_some(text)
}

pub fn cmd_add(repo: &mut Repo, title: String, fields: TaskFields) -> Result<()> {
    let mut draft = TaskDraft::new(title);
    fields.apply(&mut draft, repo)?;
    let tasks = repo.create(draft)?;
    if let Some(task) = tasks.last() {
        println!("Added task {}", task.id);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_edit(
    repo: &mut Repo,
    id: String,
    title: Option<String>,
    fields: TaskFields,
    rm_tags: Vec<String>,
    clear_desc: bool,
    clear_due: bool,
    clear_remind: bool,
    no_repeat: bool,
) -> Result<()> {
    let id = resolve_task_identifier(&id, repo.tasks())?;
    let task = repo.get(&id).ok_or_else(|| anyhow!("task {id} not found"))?;
    let mut draft = TaskDraft::from_task(task);

    if let Some(title) = title {
        draft.title = title;
    }
    if clear_desc {
        draft.description = None;
    }
    if clear_due {
        draft.due_date = None;
    }
    if clear_remind {
        draft.reminder = None;
    }
    if no_repeat {
        draft.is_recurring = false;
    }
    for tag in split_tags(&rm_tags) {
        draft.remove_tag(&tag);
    }
    fields.apply(&mut draft, repo)?;

    repo.update(&id, draft)?;
    println!("Updated task {id}");
    Ok(())
}

pub fn cmd_list(
    repo: &Repo,
    query: Option<String>,
    status: StatusFilter,
    priority: PriorityFilter,
    limit: Option<usize>,
) -> Result<()> {
    let filter = TaskFilter::new()
        .with_text(query.as_deref().unwrap_or(""))
        .with_status(status)
        .with_priority(priority);
    let mut rows = filter.apply(repo.tasks());
    if rows.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    if let Some(n) = limit {
        rows.truncate(n);
    }
    print_table(&rows, repo.clock().today());
    Ok(())
}

pub fn cmd_show(repo: &Repo, id: String) -> Result<()> {
    let id = resolve_task_identifier(&id, repo.tasks())?;
    let task = repo.get(&id).ok_or_else(|| anyhow!("task {id} not found"))?;
    print_task(task, repo.clock().today());
    Ok(())
}

pub fn cmd_done(repo: &mut Repo, id: String) -> Result<()> {
    let id = resolve_task_identifier(&id, repo.tasks())?;
    let tasks = repo.toggle_complete(&id)?;
    let completed = tasks.iter().any(|t| t.id == id && t.completed);
    if completed {
        println!("Completed task {id}");
    } else {
        println!("Reopened task {id}");
    }
    Ok(())
}

pub fn cmd_priority(repo: &mut Repo, id: String) -> Result<()> {
    let id = resolve_task_identifier(&id, repo.tasks())?;
    let tasks = repo.cycle_priority(&id)?;
    if let Some(task) = tasks.iter().find(|t| t.id == id) {
        println!("Task {id} priority: {}", task.priority);
    }
    Ok(())
}

pub fn cmd_delete(repo: &mut Repo, id: String) -> Result<()> {
    let id = resolve_task_identifier(&id, repo.tasks())?;
    repo.delete(&id);
    println!("Deleted task {id}");
    Ok(())
}

pub fn cmd_move(repo: &mut Repo, id: String, position: usize) -> Result<()> {
    let id = resolve_task_identifier(&id, repo.tasks())?;
    let tasks = repo.move_task(&id, position.saturating_sub(1))?;
    let at = tasks.iter().position(|t| t.id == id).map_or(0, |i| i + 1);
    println!("Moved task {id} to position {at}");
    Ok(())
}

pub fn cmd_reorder(repo: &mut Repo, ids: Vec<String>) -> Result<()> {
    let resolved = ids
        .iter()
        .map(|id| resolve_task_identifier(id, repo.tasks()))
        .collect::<Result<Vec<_>>>()?;
    repo.reorder(&resolved)?;
    println!("Reordered {} tasks", resolved.len());
    Ok(())
}

pub fn cmd_calendar(repo: &Repo, month: Option<String>, next: u32, prev: u32) -> Result<()> {
    let today = repo.clock().today();
    let base = match month {
        Some(m) => parse_month(&m).ok_or_else(|| anyhow!("expected --month as YYYY-MM, got '{m}'"))?,
        None => today,
    };
    let offset = i64::from(next) - i64::from(prev);
    let offset = i32::try_from(offset).context("month offset out of range")?;
    let reference = shift_month(base, offset).ok_or_else(|| anyhow!("month out of range"))?;

    let grid = build_month_grid(repo.tasks(), reference, today);
    print_month(&grid, reference);
    Ok(())
}

pub fn cmd_day(repo: &Repo, date: String) -> Result<()> {
    let today = repo.clock().today();
    let day = parse_day(&date, today).ok_or_else(|| anyhow!("unrecognised date '{date}'"))?;
    let rows = tasks_on_day(repo.tasks(), day);
    if rows.is_empty() {
        println!("No tasks due {day}.");
        return Ok(());
    }
    println!("Due {}", day.format("%A %-d %B %Y"));
    print_table(&rows, today);
    Ok(())
}

pub fn cmd_stats(repo: &Repo, json: bool) -> Result<()> {
    let today = repo.clock().today();
    let stats = dashboard(repo.tasks(), today);
    let analytics = aggregate(repo.tasks(), today);
    if json {
        let report = serde_json::json!({
            "dashboard": stats,
            "analytics": analytics,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_stats(&stats, &analytics);
    }
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Run a repository-backed command.
pub fn dispatch(repo: &mut Repo, command: Commands) -> Result<()> {
    match command {
        Commands::Add { title, fields } => cmd_add(repo, title, fields),
        Commands::Edit {
            id, title, fields, rm_tags, clear_desc, clear_due, clear_remind, no_repeat,
        } => cmd_edit(repo, id, title, fields, rm_tags, clear_desc, clear_due, clear_remind, no_repeat),
        Commands::List { query, status, priority, limit } => cmd_list(repo, query, status, priority, limit),
        Commands::Show { id } => cmd_show(repo, id),
        Commands::Done { id } => cmd_done(repo, id),
        Commands::Priority { id } => cmd_priority(repo, id),
        Commands::Delete { id } => cmd_delete(repo, id),
        Commands::Move { id, position } => cmd_move(repo, id, position),
        Commands::Reorder { ids } => cmd_reorder(repo, ids),
        Commands::Calendar { month, next, prev } => cmd_calendar(repo, month, next, prev),
        Commands::Day { date } => cmd_day(repo, date),
        Commands::Stats { json } => cmd_stats(repo, json),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    #[test]
    fn parse_add_with_fields() {
        let cli = Cli::parse_from([
            "kt", "add", "Pay rent", "--priority", "high", "--due", "tomorrow 09:00", "--tag", "home,bills",
            "--repeat", "monthly",
        ]);
        let Commands::Add { title, fields } = cli.command else {
            panic!("expected add");
        };
        assert_eq!(title, "Pay rent");
        assert_eq!(fields.priority, Some(Priority::High));
        assert_eq!(fields.due.as_deref(), Some("tomorrow 09:00"));
        assert_eq!(fields.tags, ["home,bills"]);
        assert_eq!(fields.repeat, Some(RecurrencePattern::Monthly));
    }

    #[test]
    fn parse_list_filters() {
        let cli = Cli::parse_from(["kt", "--db", "/tmp/t.json", "list", "milk", "--status", "active", "--priority", "low"]);
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/t.json")));
        let Commands::List { query, status, priority, limit } = cli.command else {
            panic!("expected list");
        };
        assert_eq!(query.as_deref(), Some("milk"));
        assert_eq!(status, StatusFilter::Active);
        assert_eq!(priority, PriorityFilter::Low);
        assert_eq!(limit, None);
    }

    #[test]
    fn priority_filter_rejects_none() {
        assert!(Cli::try_parse_from(["kt", "list", "--priority", "none"]).is_err());
        assert!(Cli::try_parse_from(["kt", "list", "--status", "done"]).is_err());
    }

    #[test]
    fn edit_repeat_flags_conflict() {
        assert!(Cli::try_parse_from(["kt", "edit", "1", "--repeat", "daily", "--no-repeat"]).is_err());
    }

    #[test]
    fn only_editing_commands_mutate() {
        let parse = |args: &[&str]| Cli::parse_from(args.iter().copied()).command;
        assert!(parse(&["kt", "add", "x"]).mutates());
        assert!(parse(&["kt", "reorder", "1", "2"]).mutates());
        assert!(!parse(&["kt", "list"]).mutates());
        assert!(!parse(&["kt", "stats", "--json"]).mutates());
    }

    #[test]
    fn blank_text_clears_optional_fields() {
        assert_eq!(non_blank("  ".into()), None);
        assert_eq!(non_blank("milk".into()), Some("milk".to_string()));
    }
}
