//! Write-behind persistence.
//!
//! Mutations hand a snapshot of the collection to a single writer thread and
//! return immediately. The writer coalesces whatever is queued and saves only
//! the newest snapshot. Failures are logged and dropped; the next successful
//! save supersedes them.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use crate::error::StoreError;
use crate::store::TaskStore;
use crate::task::Task;

enum Message {
    Save(Vec<Task>),
    Flush(Sender<()>),
}

/// Handle to the background writer. Dropping it drains the queue and joins the thread.
pub struct WriteBehind {
    sender: Option<Sender<Message>>,
    worker: Option<JoinHandle<()>>,
}

impl WriteBehind {
    /// Start the writer thread for `store`.
    pub fn spawn<S: TaskStore>(store: S) -> Result<Self, StoreError> {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("task-store-writer".into())
            .spawn(move || run(store, receiver))
            .map_err(StoreError::Writer)?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Queue a snapshot for saving. Never blocks on I/O.
    pub fn submit(&self, snapshot: Vec<Task>) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(Message::Save(snapshot)).is_err() {
            warn!("store writer is gone; snapshot not persisted");
        }
    }

    /// Block until every snapshot submitted so far has been written (or failed).
    pub fn flush(&self) {
        let Some(sender) = &self.sender else {
            return;
        };
        let (ack, done) = mpsc::channel();
        if sender.send(Message::Flush(ack)).is_err() {
            warn!("store writer is gone; nothing to flush");
            return;
        }
        let _ = done.recv();
    }
}

impl Drop for WriteBehind {
    fn drop(&mut self) {
        // Closing the channel lets the writer finish its queue and exit.
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("store writer panicked");
            }
        }
    }
}

fn run<S: TaskStore>(store: S, receiver: Receiver<Message>) {
    debug!("store writer started");
    while let Ok(first) = receiver.recv() {
        let mut latest = None;
        let mut acks = Vec::new();
        for message in std::iter::once(first).chain(receiver.try_iter()) {
            match message {
                Message::Save(snapshot) => latest = Some(snapshot),
                Message::Flush(ack) => acks.push(ack),
            }
        }
        if let Some(tasks) = latest {
            if let Err(err) = store.save(&tasks) {
                error!(error = %err, "failed to save tasks");
            }
        }
        for ack in acks {
            let _ = ack.send(());
        }
    }
    debug!("store writer stopped");
}
