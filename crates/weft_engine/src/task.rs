//! Background work: off-thread fetches with callback delivery and
//! cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag that suppresses callback delivery once set.
///
/// Cancellation never interrupts work already in flight; it only
/// guarantees the callback will not run afterwards.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether [`CancellationToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Where completion callbacks run.
///
/// Hosts with a main-thread or event-loop discipline implement this to
/// marshal delivery; [`InlineExecutor`] runs callbacks right on the
/// worker thread.
pub trait CallbackExecutor: Send + Sync {
    /// Runs a delivery job.
    fn execute(&self, job: Box<dyn FnOnce() + Send>);
}

/// Runs callbacks immediately on the calling (worker) thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl CallbackExecutor for InlineExecutor {
    fn execute(&self, job: Box<dyn FnOnce() + Send>) {
        job();
    }
}

/// Runs each callback on its own freshly spawned thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadExecutor;

impl CallbackExecutor for ThreadExecutor {
    fn execute(&self, job: Box<dyn FnOnce() + Send>) {
        std::thread::spawn(job);
    }
}

/// Runs `work` on a background thread, then delivers its result to
/// `callback` through the executor, unless the token was cancelled in
/// the meantime.
///
/// Errors are delivered the same way as successes; the caller's
/// callback takes the whole `Result`. The returned handle joins the
/// worker, not the callback.
pub fn spawn<T, W, C>(
    work: W,
    executor: Arc<dyn CallbackExecutor>,
    token: CancellationToken,
    callback: C,
) -> std::thread::JoinHandle<()>
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
    C: FnOnce(T) + Send + 'static,
{
    std::thread::spawn(move || {
        let result = work();
        if token.is_cancelled() {
            tracing::debug!("dropping result of cancelled task");
            return;
        }
        executor.execute(Box::new(move || callback(result)));
    })
}
