//! Background timer tasks
//!
//! Every timer the session runs is a tokio task wrapped in a `TimerHandle`.
//! Tasks only hold a `Weak<Session>` and stop on their own once the session
//! is gone.

pub mod countdown;
pub mod presence_sensor;
pub mod prompt;

use std::future::Future;

use tokio::task::JoinHandle;

pub use countdown::{countdown_task, preview_task};
pub use presence_sensor::presence_sensor_task;
pub use prompt::pre_expiry_prompt_task;

/// Owned handle to a running timer task; dropping it aborts the task
#[derive(Debug)]
pub struct TimerHandle(Option<JoinHandle<()>>);

impl TimerHandle {
    pub fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self(Some(tokio::spawn(task)))
    }

    /// Release the handle without aborting the task.
    ///
    /// Used by a task that is clearing its own slot and still has work to do.
    pub fn detach(mut self) {
        self.0.take();
    }

    pub fn is_finished(&self) -> bool {
        self.0.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }
}
