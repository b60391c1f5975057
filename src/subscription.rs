// Raffle DApp - Scoped background listeners
use std::future::Future;
use tokio::task::JoinHandle;

/// A spawned listener that lives exactly as long as this guard.
///
/// Dropping the guard aborts the task, releasing whatever channel it was
/// reading from.
#[must_use = "dropping a Subscription stops the listener immediately"]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Spawn `task` on the current tokio runtime
    pub fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(task),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
