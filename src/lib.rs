//! # Kuromi Tasks
//!
//! A personal task list with priorities, due dates, tags and reminders, kept
//! in a single local JSON file.
//!
//! ## Key Features
//!
//! - **Task Repository**: one owned, ordered collection with create, update,
//!   delete, toggle, priority cycling and reordering
//! - **Write-behind Storage**: every mutation is persisted on a background
//!   writer without blocking the caller
//! - **Search & Filters**: free-text search over title and description plus
//!   status and priority filters
//! - **Calendar Projection**: Sunday-first month grids with due-date markers
//! - **Analytics**: completion rate, priority and status breakdowns, and
//!   completions by weekday
//!
//! ## Quick Start
//!
//! ```no_run
//! use kuromi_tasks::clock::SystemClock;
//! use kuromi_tasks::repository::TaskRepository;
//! use kuromi_tasks::store::FileStore;
//! use kuromi_tasks::task::TaskDraft;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut repo = TaskRepository::open(FileStore::new("tasks.json"), SystemClock)?;
//! repo.create(TaskDraft::new("Water the plants"))?;
//! repo.flush();
//! # Ok(())
//! # }
//! ```
//!
//! Views are plain functions over [`repository::TaskRepository::tasks`]:
//! see [`filter`], [`calendar`] and [`analytics`].

pub mod analytics;
pub mod calendar;
pub mod clock;
pub mod error;
pub mod fields;
pub mod filter;
pub mod persist;
pub mod repository;
pub mod store;
pub mod task;
