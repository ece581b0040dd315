//! Search and filter for the task list.

use crate::fields::{PriorityFilter, StatusFilter};
use crate::task::Task;

/// Search text plus status and priority filters. All three must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    needle: Option<String>,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

impl TaskFilter {
    /// A filter that matches every task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive search over title and description. Blank text matches everything.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.needle = (!text.trim().is_empty()).then(|| text.to_lowercase());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: PriorityFilter) -> Self {
        self.priority = priority;
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.needle.as_deref()
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.matches_text(task) && self.status.matches(task) && self.priority.matches(task)
    }

    /// Matching tasks in collection order.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }

    fn matches_text(&self, task: &Task) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };
        task.title.to_lowercase().contains(needle.as_str())
            || task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle.as_str()))
    }
}

/// One-shot form of [`TaskFilter::apply`].
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    query: &str,
    status: StatusFilter,
    priority: PriorityFilter,
) -> Vec<&'a Task> {
    TaskFilter::new()
        .with_text(query)
        .with_status(status)
        .with_priority(priority)
        .apply(tasks)
}
