use std::future::Future;
use tokio::task::JoinHandle;

/// Tracks the client's listener tasks so a reset can tear them all down.
pub struct TaskManager {
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Spawns `future` on the current runtime and tracks it under `name`.
    pub fn spawn<F>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::debug!("Spawning {} task", name);
        self.tasks.retain(|(_, handle)| !handle.is_finished());
        self.tasks.push((name, tokio::spawn(future)));
    }

    /// Abort all tasks without waiting
    pub fn abort_all(&mut self) {
        for (name, handle) in self.tasks.drain(..) {
            if !handle.is_finished() {
                tracing::debug!("Aborting {} task", name);
                handle.abort();
            }
        }
    }

    /// Number of tracked tasks still running.
    pub fn running(&self) -> usize {
        self.tasks
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .count()
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.abort_all();
    }
}
