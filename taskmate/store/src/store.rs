//! The authoritative in-memory task collection.
//!
//! A [`TaskStore`] is created once at startup, initialized from storage, and
//! then handed by reference to whatever renders the list. Mutations take effect
//! in memory immediately; each one schedules a background write of the full
//! collection. Writes are fire-and-forget: a failed write is logged and the
//! next mutation writes the whole list again.

use crate::persistence::TaskPersistence;
use crate::storage::KeyValueStorage;
use chrono::Utc;
use std::sync::Arc;
use taskmate_core::{Task, TaskId, TaskQuery};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn};
use tracing_futures::Instrument;

pub struct TaskStore<S: KeyValueStorage + 'static> {
    tasks: Vec<Task>,
    is_loading: bool,
    persistence: TaskPersistence<S>,
    pending_writes: JoinSet<()>,
    /// Sequence number of the newest snapshot handed to storage.
    last_written: Arc<Mutex<u64>>,
    next_write: u64,
}

impl<S: KeyValueStorage + 'static> TaskStore<S> {
    /// Creates an empty store that still has to be initialized.
    pub fn new(persistence: TaskPersistence<S>) -> Self {
        Self {
            tasks: Vec::new(),
            is_loading: true,
            persistence,
            pending_writes: JoinSet::new(),
            last_written: Arc::new(Mutex::new(0)),
            next_write: 0,
        }
    }

    /// Creates a store and loads the persisted tasks into it.
    pub async fn open(persistence: TaskPersistence<S>) -> Self {
        let mut store = Self::new(persistence);
        store.initialize().await;
        store
    }

    /// Tasks in their stored order, most recently added first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// True until [`TaskStore::initialize`] has finished.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Runs `query` over the current tasks.
    pub fn query(&self, query: &TaskQuery) -> Vec<&Task> {
        query.apply(&self.tasks)
    }

    /// Loads the persisted tasks.
    ///
    /// Failures leave the store empty and are only logged. Loading happens at
    /// most once; later calls do nothing until [`TaskStore::reset`].
    #[tracing::instrument(skip(self))]
    pub async fn initialize(&mut self) {
        if !self.is_loading {
            warn!("Task store already initialized");
            return;
        }
        match self.persistence.load().await {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => error!("Failed to load tasks, starting empty: {}", e),
        }
        self.is_loading = false;
        info!("Task store ready with {} tasks", self.tasks.len());
    }

    /// Adds `task` at the front of the list.
    ///
    /// The caller is responsible for giving it an id not already in use.
    #[tracing::instrument(skip(self, task), fields(id = %task.id))]
    pub fn add_task(&mut self, task: Task) {
        self.tasks.insert(0, task);
        self.persist();
    }

    /// Replaces the task sharing `task.id`, keeping its position.
    #[tracing::instrument(skip(self, task), fields(id = %task.id))]
    pub fn update_task(&mut self, task: Task) {
        let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) else {
            debug!("No task to update");
            return;
        };
        *existing = task;
        self.persist();
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_task(&mut self, id: &TaskId) {
        let before = self.tasks.len();
        self.tasks.retain(|task| &task.id != id);
        if self.tasks.len() == before {
            debug!("No task to delete");
            return;
        }
        self.persist();
    }

    /// Marks an active task completed now, or reopens a completed one.
    #[tracing::instrument(skip(self))]
    pub fn toggle_task_completion(&mut self, id: &TaskId) {
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            debug!("No task to toggle");
            return;
        };
        task.toggle_completion(Utc::now());
        self.persist();
    }

    /// Waits for every write scheduled so far to finish.
    pub async fn settle(&mut self) {
        while let Some(result) = self.pending_writes.join_next().await {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    error!("Task write panicked: {}", e);
                }
            }
        }
    }

    /// Cancels pending writes and returns to the state right after [`TaskStore::new`].
    pub fn reset(&mut self) {
        self.pending_writes.abort_all();
        self.tasks.clear();
        self.is_loading = true;
    }

    /// Schedules a write of the current collection.
    ///
    /// Must be called from within a Tokio runtime. Nothing is written before
    /// the store has been initialized, so an unloaded store never clobbers the
    /// stored list.
    fn persist(&mut self) {
        while self.pending_writes.try_join_next().is_some() {}

        if self.is_loading {
            debug!("Store not initialized yet, skipping write");
            return;
        }
        self.next_write += 1;
        let span = info_span!(
            "persist",
            key = self.persistence.key(),
            count = self.tasks.len(),
            seq = self.next_write
        );
        self.pending_writes.spawn(
            write_snapshot(
                self.persistence.clone(),
                Arc::clone(&self.last_written),
                self.next_write,
                self.tasks.clone(),
            )
            .instrument(span),
        );
    }
}

/// Saves `tasks` as snapshot number `seq`.
///
/// Spawned writes can run in any order; a snapshot older than the last one
/// written is dropped so storage never goes back in time.
async fn write_snapshot<S: KeyValueStorage>(
    persistence: TaskPersistence<S>,
    last_written: Arc<Mutex<u64>>,
    seq: u64,
    tasks: Vec<Task>,
) {
    let mut last = last_written.lock().await;
    if *last > seq {
        debug!("Newer snapshot already saved, skipping");
        return;
    }
    *last = seq;
    match persistence.save(&tasks).await {
        Ok(()) => debug!("Saved tasks"),
        Err(e) => error!("Failed to save tasks: {}", e),
    }
}

impl<S: KeyValueStorage + 'static> Drop for TaskStore<S> {
    fn drop(&mut self) {
        while self.pending_writes.try_join_next().is_some() {}
        if !self.pending_writes.is_empty() {
            warn!(
                "Task store dropped with {} writes in flight",
                self.pending_writes.len()
            );
        }
    }
}
