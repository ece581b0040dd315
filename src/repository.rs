//! Task repository: the single writable copy of the collection.
//!
//! Every mutation updates the in-memory collection first and then queues a
//! snapshot on the write-behind persister. Views are derived from
//! [`TaskRepository::tasks`] by the pure functions in `filter`, `calendar` and
//! `analytics`.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{RepositoryError, StoreError};
use crate::persist::WriteBehind;
use crate::store::TaskStore;
use crate::task::{Task, TaskDraft};

pub type RepoResult<'a> = Result<&'a [Task], RepositoryError>;

/// Owns the ordered task collection and writes it through to a store.
pub struct TaskRepository<C: Clock = SystemClock> {
    tasks: Vec<Task>,
    writer: WriteBehind,
    clock: C,
    /// Set when the stored collection could not be read; nothing is written back.
    writes_suspended: bool,
}

impl<C: Clock> TaskRepository<C> {
    /// Load the collection from `store` and start the writer.
    ///
    /// A store that cannot be read is logged and treated as empty, and the
    /// repository never writes over it: changes stay in memory only.
    pub fn open<S: TaskStore>(store: S, clock: C) -> Result<Self, StoreError> {
        let (tasks, writes_suspended) = match store.load() {
            Ok(Some(tasks)) => (tasks, false),
            Ok(None) => (Vec::new(), false),
            Err(err) => {
                warn!(error = %err, "failed to load tasks; starting empty and leaving the store untouched");
                (Vec::new(), true)
            }
        };
        debug!(count = tasks.len(), "loaded tasks");
        Ok(Self {
            tasks,
            writer: WriteBehind::spawn(store)?,
            clock,
            writes_suspended,
        })
    }

    /// True when the store was unreadable at open and changes are not persisted.
    pub fn writes_suspended(&self) -> bool {
        self.writes_suspended
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Validate `draft`, assign identity and timestamps, and append it.
    pub fn create(&mut self, draft: TaskDraft) -> RepoResult<'_> {
        draft.validate()?;
        let now = self.clock.stamp();
        let id = self.next_id();
        let mut task = Task {
            id,
            title: String::new(),
            description: None,
            priority: Default::default(),
            completed: false,
            due_date: None,
            reminder: None,
            is_recurring: false,
            recurrence_pattern: Default::default(),
            notes: None,
            tags: Vec::new(),
            category: None,
            created_at: now,
            updated_at: Some(now),
        };
        draft.apply_to(&mut task);
        debug!(id = %task.id, "created task");
        self.tasks.push(task);
        Ok(self.commit())
    }

    /// Replace the editable fields of task `id`. Identity and `created_at` are kept.
    pub fn update(&mut self, id: &str, draft: TaskDraft) -> RepoResult<'_> {
        draft.validate()?;
        let now = self.clock.stamp();
        let task = self.find_mut(id)?;
        draft.apply_to(task);
        task.updated_at = Some(now.max(task.created_at));
        debug!(id, "updated task");
        Ok(self.commit())
    }

    /// Remove task `id`. Unknown ids are ignored.
    pub fn delete(&mut self, id: &str) -> &[Task] {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            debug!(id, "delete of unknown task ignored");
            return &self.tasks;
        }
        self.commit()
    }

    pub fn toggle_complete(&mut self, id: &str) -> RepoResult<'_> {
        let task = self.find_mut(id)?;
        task.completed = !task.completed;
        Ok(self.commit())
    }

    /// Advance the priority of task `id` one step around the cycle.
    pub fn cycle_priority(&mut self, id: &str) -> RepoResult<'_> {
        let task = self.find_mut(id)?;
        task.priority = task.priority.next();
        Ok(self.commit())
    }

    /// Put the collection in the order given by `ids`, which must be a
    /// permutation of the current ids.
    pub fn reorder<I, S>(&mut self, ids: I) -> RepoResult<'_>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index: HashMap<&str, usize> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(pos, t)| (t.id.as_str(), pos))
            .collect();

        let mut order = Vec::with_capacity(self.tasks.len());
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for id in ids {
            let id = id.as_ref();
            let Some(&pos) = index.get(id) else {
                return Err(invalid_reorder(format!("unknown id {id}")));
            };
            if !seen.insert(pos) {
                return Err(invalid_reorder(format!("duplicate id {id}")));
            }
            order.push(pos);
        }
        if order.len() != self.tasks.len() {
            return Err(invalid_reorder(format!(
                "expected {} ids, got {}",
                self.tasks.len(),
                order.len()
            )));
        }

        let mut slots: Vec<Option<Task>> = std::mem::take(&mut self.tasks).into_iter().map(Some).collect();
        self.tasks = order.into_iter().filter_map(|pos| slots[pos].take()).collect();
        Ok(self.commit())
    }

    /// Move task `id` to `position` (clamped to the end), as a drag-and-drop does.
    pub fn move_task(&mut self, id: &str, position: usize) -> RepoResult<'_> {
        let from = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        let mut ids: Vec<String> = self.tasks.iter().map(|t| t.id.clone()).collect();
        let moved = ids.remove(from);
        ids.insert(position.min(ids.len()), moved);
        self.reorder(ids)
    }

    /// Wait for queued writes to reach the store.
    pub fn flush(&self) {
        self.writer.flush();
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Task, RepositoryError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    /// Millisecond creation instant, bumped until unused.
    fn next_id(&self) -> String {
        let taken: HashSet<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        let mut candidate = self.clock.now().timestamp_millis();
        while taken.contains(candidate.to_string().as_str()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn commit(&self) -> &[Task] {
        if self.writes_suspended {
            warn!("store was unreadable at open; change kept in memory only");
        } else {
            self.writer.submit(self.tasks.clone());
        }
        &self.tasks
    }
}

fn invalid_reorder(reason: String) -> RepositoryError {
    RepositoryError::InvalidReorder { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::ValidationError;
    use crate::fields::Priority;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};

    fn ok<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
        result.unwrap_or_else(|err| panic!("{context}: {err}"))
    }

    fn setup() -> (TaskRepository<FixedClock>, MemoryStore, FixedClock) {
        let store = MemoryStore::new();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let repo = ok(TaskRepository::open(store.clone(), clock.clone()), "open repo");
        (repo, store, clock)
    }

    fn ids(tasks: &[Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    fn add(repo: &mut TaskRepository<FixedClock>, title: &str) -> String {
        let tasks = ok(repo.create(TaskDraft::new(title)), "create");
        tasks.last().map(|t| t.id.clone()).unwrap_or_default()
    }

    fn persisted(repo: &TaskRepository<FixedClock>, store: &MemoryStore) -> Vec<Task> {
        repo.flush();
        ok(store.load(), "load").unwrap_or_default()
    }

    #[test]
    fn create_assigns_identity_and_persists() {
        let (mut repo, store, clock) = setup();
        let first = add(&mut repo, "  Buy milk ");
        let second = add(&mut repo, "Call mum");

        assert_eq!(first, clock.now().timestamp_millis().to_string());
        assert_ne!(first, second);

        let task = repo.get(&first).unwrap_or_else(|| panic!("task exists"));
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.updated_at, Some(task.created_at));
        assert_eq!(persisted(&repo, &store), repo.tasks());
    }

    #[test]
    fn create_rejects_blank_title() {
        let (mut repo, _store, _clock) = setup();
        let err = repo.create(TaskDraft::new("   ")).unwrap_err();
        assert_eq!(
            err,
            RepositoryError::Validation(ValidationError::new("title", "must not be empty"))
        );
        assert!(repo.tasks().is_empty());
    }

    #[test]
    fn update_preserves_created_at_and_completion() {
        let (mut repo, store, clock) = setup();
        let id = add(&mut repo, "Draft report");
        ok(repo.toggle_complete(&id), "toggle");
        clock.advance(Duration::minutes(5));

        let mut draft = TaskDraft::from_task(repo.get(&id).unwrap_or_else(|| panic!("task exists")));
        draft.title = "Final report".into();
        draft.priority = Priority::High;
        ok(repo.update(&id, draft), "update");

        let task = repo.get(&id).unwrap_or_else(|| panic!("task exists"));
        assert_eq!(task.title, "Final report");
        assert!(task.completed);
        assert_eq!(task.updated_at, Some(task.created_at + Duration::minutes(5)));
        assert_eq!(persisted(&repo, &store)[0].title, "Final report");
    }

    #[test]
    fn update_of_unknown_task_is_not_found() {
        let (mut repo, _store, _clock) = setup();
        let err = repo.update("missing", TaskDraft::new("x")).unwrap_err();
        assert_eq!(err, RepositoryError::NotFound("missing".into()));
    }

    #[test]
    fn delete_missing_id_is_a_no_op() {
        let (mut repo, _store, _clock) = setup();
        let id = add(&mut repo, "Keep me");
        assert_eq!(repo.delete("nope").len(), 1);
        assert!(repo.delete(&id).is_empty());
    }

    #[test]
    fn toggle_and_cycle_priority() {
        let (mut repo, _store, _clock) = setup();
        let id = add(&mut repo, "Stretch");
        assert!(ok(repo.toggle_complete(&id), "toggle")[0].completed);
        assert!(!ok(repo.toggle_complete(&id), "toggle")[0].completed);

        let seen: Vec<Priority> = (0..4)
            .map(|_| ok(repo.cycle_priority(&id), "cycle")[0].priority)
            .collect();
        assert_eq!(seen, [Priority::Low, Priority::Medium, Priority::High, Priority::None]);
    }

    #[test]
    fn reorder_requires_a_permutation() {
        let (mut repo, store, clock) = setup();
        let a = add(&mut repo, "a");
        clock.advance(Duration::seconds(1));
        let b = add(&mut repo, "b");
        clock.advance(Duration::seconds(1));
        let c = add(&mut repo, "c");

        let reordered = ids(ok(repo.reorder([&c, &a, &b]), "reorder"));
        assert_eq!(reordered, [c.clone(), a.clone(), b.clone()]);
        assert_eq!(ids(&persisted(&repo, &store)), reordered);

        let attempts = [
            vec![a.clone(), b.clone()],
            vec![a.clone(), a.clone(), b.clone()],
            vec![a.clone(), b.clone(), "zzz".to_string()],
        ];
        for bad in attempts {
            let err = repo.reorder(&bad).unwrap_err();
            assert!(matches!(err, RepositoryError::InvalidReorder { .. }), "{bad:?}");
        }
        assert_eq!(ids(repo.tasks()), reordered);
    }

    #[test]
    fn move_task_clamps_position() {
        let (mut repo, _store, clock) = setup();
        let a = add(&mut repo, "a");
        clock.advance(Duration::seconds(1));
        let b = add(&mut repo, "b");
        clock.advance(Duration::seconds(1));
        let c = add(&mut repo, "c");

        assert_eq!(ids(ok(repo.move_task(&a, 99), "move")), [b.clone(), c.clone(), a.clone()]);
        assert_eq!(ids(ok(repo.move_task(&a, 0), "move")), [a.clone(), b, c]);
    }

    #[test]
    fn reopen_restores_collection() {
        let (mut repo, store, clock) = setup();
        add(&mut repo, "persist me");
        repo.flush();
        let before = repo.tasks().to_vec();
        drop(repo);

        let reopened = ok(TaskRepository::open(store, clock), "reopen");
        assert_eq!(reopened.tasks(), before.as_slice());
    }

    #[test]
    fn unreadable_store_starts_empty_and_is_never_overwritten() {
        let store = MemoryStore::new();
        ok(store.put_raw(b"[{".to_vec()), "seed");
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let mut repo = ok(TaskRepository::open(store.clone(), clock), "open");
        assert!(repo.tasks().is_empty());
        assert!(repo.writes_suspended());

        add(&mut repo, "new");
        repo.flush();
        assert_eq!(ok(store.raw(), "raw"), Some(b"[{".to_vec()));
    }

    #[test]
    fn imperfect_records_survive_open_and_the_next_save() {
        let store = MemoryStore::new();
        let seed = br#"[
            {"id": "1", "title": "old", "completed": true, "createdAt": "2024-02-01T08:00:00.000Z"},
            {"id": "2", "title": "sparse", "completed": null, "tags": null,
             "createdAt": "2024-02-02T08:00:00", "updatedAt": "2024-02-02T08:00:00.000Z"}
        ]"#;
        ok(store.put_raw(seed.to_vec()), "seed");
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let mut repo = ok(TaskRepository::open(store.clone(), clock), "open");
        assert_eq!(ids(repo.tasks()), ["1", "2"]);
        assert!(!repo.writes_suspended());
        assert_eq!(repo.tasks()[0].updated_at, None);

        let created = add(&mut repo, "new");
        assert_eq!(ids(&persisted(&repo, &store)), ["1".to_string(), "2".to_string(), created]);
    }

    #[test]
    fn update_never_stamps_before_creation() {
        let (mut repo, _store, clock) = setup();
        let id = add(&mut repo, "Time travel");
        let created = repo.get(&id).map(|t| t.created_at).unwrap_or_default();
        clock.set(created - Duration::hours(1));

        ok(repo.update(&id, TaskDraft::new("Time travel, edited")), "update");
        assert_eq!(repo.get(&id).and_then(|t| t.updated_at), Some(created));
    }
}
