//! Ownership of a session's background tasks.
//!
//! Every task a session spawns for push delivery is registered in a
//! [`SubscriptionSet`]. Releasing the set aborts the tasks and waits for
//! them to finish, so no forwarder outlives its session; dropping the set
//! without an explicit release still aborts everything.

use std::future::Future;

use tokio::task::JoinHandle;

/// Abort-on-drop collection of background task handles.
#[derive(Debug, Default)]
pub(crate) struct SubscriptionSet {
    tasks: Vec<JoinHandle<()>>,
}

impl SubscriptionSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Spawns a task owned by this set.
    pub(crate) fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push(tokio::spawn(task));
    }

    /// Aborts every task and waits until each has fully stopped.
    ///
    /// Idempotent. After this returns, no task in the set will run again
    /// and their subscription streams have been dropped.
    pub(crate) async fn release(&mut self) {
        let tasks = std::mem::take(&mut self.tasks);
        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            // Aborted tasks resolve with a cancellation error; both
            // outcomes mean the task is gone.
            let _ = task.await;
        }
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
