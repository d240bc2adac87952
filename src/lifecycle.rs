use std::cell::Cell;
use std::future::Future;
use std::sync::mpsc;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio_util::sync::CancellationToken;

thread_local! {
    static DISPATCH_THREAD: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread belongs to a hook's dispatch executor.
///
/// Events emitted here come from transport internals (HTTP client, DNS) and
/// must not be fed back into the hook.
pub fn on_dispatch_thread() -> bool {
    DISPATCH_THREAD.with(|flag| flag.get())
}

/// Why an operation on the executor produced no result.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    /// The lifecycle was shut down first.
    #[error("operation cancelled by shutdown")]
    Cancelled,

    /// The future panicked while the lifecycle was still active.
    #[error("operation panicked on the dispatch executor")]
    Panicked,
}

/// Cancellation scope and executor shared by every transport call of a hook.
///
/// Created active; [`Lifecycle::shutdown`] moves it to cancelled for good.
/// In-flight calls are aborted rather than drained.
pub struct Lifecycle {
    token: CancellationToken,
    handle: Handle,
    runtime: Option<Runtime>,
}

impl Lifecycle {
    /// Start a lifecycle with a dedicated multi-thread executor of
    /// `worker_threads` threads (at least one).
    pub fn new(worker_threads: usize) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("elastic-hook-dispatch")
            .on_thread_start(|| DISPATCH_THREAD.with(|flag| flag.set(true)))
            .enable_all()
            .build()?;

        Ok(Self {
            token: CancellationToken::new(),
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        })
    }

    /// Cancel the scope. Calling it again is a no-op.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `fut` on the executor and block the calling thread until it
    /// finishes or the scope is cancelled, whichever comes first.
    ///
    /// Works from any thread, including threads that are themselves driving
    /// another tokio runtime.
    pub fn block_on<F, T>(&self, fut: F) -> Result<T, Interrupted>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if self.token.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }

        let token = self.token.clone();
        let task = self.handle.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                out = fut => Some(out),
            }
        });

        // The join handle is awaited on the executor so the caller only needs
        // a plain channel, whatever thread it is on.
        let (tx, rx) = mpsc::sync_channel(1);
        self.handle.spawn(async move {
            let outcome = match task.await {
                Ok(Some(out)) => Ok(out),
                Ok(None) => Err(Interrupted::Cancelled),
                Err(e) if e.is_panic() => Err(Interrupted::Panicked),
                Err(_) => Err(Interrupted::Cancelled),
            };
            let _ = tx.send(outcome);
        });

        // Both tasks are only dropped unfinished when the executor shuts
        // down, and `Drop` cancels the token before that.
        rx.recv().unwrap_or(Err(Interrupted::Cancelled))
    }

    /// Run `fut` on the executor without waiting for it. The future is
    /// dropped as soon as the scope is cancelled.
    pub fn spawn<F>(&self, fut: F) -> Result<(), Interrupted>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.token.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }

        let token = self.token.clone();
        self.handle.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = fut => {}
            }
        });
        Ok(())
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.token.cancel();
        // `shutdown_background` does not block, so dropping the hook inside an
        // async context is fine.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
