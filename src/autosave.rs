use std::{future::Future, time::Duration};
use tokio::{sync::Mutex, task::JoinHandle, time::sleep};

/// Debounced write scheduler: each call to [`Autosave::schedule`] restarts
/// the delay, so a burst of edits produces a single write.
#[derive(Debug)]
pub struct Autosave {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Spawning happens under the `pending` lock, so the writer registered
    /// last is always the one from the last call.
    pub async fn schedule<F>(&self, write: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            write.await;
        }));
    }

    /// Drops any pending write. Used when the caller writes immediately.
    pub async fn cancel(&self) {
        if let Some(previous) = self.pending.lock().await.take() {
            previous.abort();
        }
    }
}
