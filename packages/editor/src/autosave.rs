//! Debounced autosave.
//!
//! Each call to [`AutosaveScheduler::schedule`] re-arms one timer. A timer
//! that is still sleeping is aborted when re-armed or cancelled; once it
//! wakes it claims its slot and runs its task to completion.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct Armed {
    generation: u64,
    timer: Option<(u64, JoinHandle<()>)>,
}

#[derive(Debug)]
pub struct AutosaveScheduler {
    delay: Duration,
    armed: Arc<Mutex<Armed>>,
}

fn lock(armed: &Mutex<Armed>) -> MutexGuard<'_, Armed> {
    armed.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AutosaveScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            armed: Arc::new(Mutex::new(Armed::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer to run `task` after the debounce delay.
    ///
    /// Returns false when called outside a tokio runtime.
    pub fn schedule<F, Fut>(&self, task: F) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("autosave skipped: no async runtime");
            return false;
        };

        let mut armed = lock(&self.armed);
        armed.generation += 1;
        let generation = armed.generation;
        if let Some((_, previous)) = armed.timer.take() {
            previous.abort();
        }

        let slot = Arc::clone(&self.armed);
        let delay = self.delay;
        let timer = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut armed = lock(&slot);
                let current = armed.timer.as_ref().map(|(id, _)| *id);
                if current != Some(generation) {
                    return;
                }
                armed.timer = None;
            }
            task().await;
        });
        armed.timer = Some((generation, timer));
        tracing::trace!("autosave armed ({:?})", delay);
        true
    }

    /// Disarm a sleeping timer; a task already running is left alone
    pub fn cancel(&self) -> bool {
        match lock(&self.armed).timer.take() {
            Some((_, timer)) => {
                timer.abort();
                tracing::trace!("autosave cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.armed).timer.is_some()
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn bump(count: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
        let count = Arc::clone(count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_arming_fires() {
        let scheduler = AutosaveScheduler::new(Duration::from_millis(800));
        let count = counter();

        for _ in 0..5 {
            scheduler.schedule(bump(&count));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(scheduler.is_pending());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_disarms() {
        let scheduler = AutosaveScheduler::new(Duration::from_millis(800));
        let count = counter();

        scheduler.schedule(bump(&count));
        assert!(scheduler.cancel());
        assert!(!scheduler.cancel());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_schedule_outside_runtime() {
        let scheduler = AutosaveScheduler::new(Duration::from_millis(10));
        assert!(!scheduler.schedule(|| async {}));
    }
}
