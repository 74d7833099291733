use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tracing::{debug, error, trace, warn};

use crate::config::Config;
use crate::state::{Cell, State};
use crate::{panic, Error};

/// The eventual result of an executor running on its own thread.
///
/// Cloning a `Promise` is cheap and every clone observes the same
/// settlement.
///
/// # Examples
///
/// ```
/// use promise_chain::{Error, Promise};
/// use std::thread;
///
/// let promise = Promise::new(|resolve, reject| {
///     thread::spawn(move || match "42".parse::<u32>() {
///         Ok(n) => resolve.resolve(n),
///         Err(e) => reject.reject(Error::new(e)),
///     });
/// });
/// assert_eq!(promise.await_promise(), Ok(42));
/// ```
pub struct Promise<T> {
    pub(crate) cell: Arc<Cell<T>>,
    pub(crate) config: Arc<Config>,
}

/// Fulfills the promise it was handed out for.
pub struct Resolver<T> {
    handle: Arc<Handle<T>>,
}

/// Rejects the promise it was handed out for.
pub struct Rejecter<T> {
    handle: Arc<Handle<T>>,
}

// Shared by every resolver and rejecter of one promise. Dropping the last
// one while the promise is still pending leaves nobody able to settle it.
struct Handle<T> {
    cell: Arc<Cell<T>>,
}

impl<T> Drop for Handle<T> {
    fn drop(&mut self) {
        if self.cell.settle(Err(Error::Abandoned)) {
            debug!("promise abandoned by its executor");
        }
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            config: self.config.clone(),
        }
    }
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self { handle: self.handle.clone() }
    }
}

impl<T> Clone for Rejecter<T> {
    fn clone(&self) -> Self {
        Self { handle: self.handle.clone() }
    }
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// Runs `executor` on a new thread and returns without waiting for it.
    ///
    /// The executor should call one of its two callbacks once. Later calls
    /// are ignored. A panic in the executor rejects the promise, and so
    /// does dropping both callbacks without calling either.
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(Resolver<T>, Rejecter<T>) + Send + 'static,
    {
        Self::with_config(Config::default(), executor)
    }

    /// Like [`new`](Self::new), spawning the executor thread as `config` says.
    pub fn with_config<F>(config: Config, executor: F) -> Self
    where
        F: FnOnce(Resolver<T>, Rejecter<T>) + Send + 'static,
    {
        Self::spawn(Arc::new(config), executor)
    }

    /// A promise fulfilled with `value`.
    pub fn resolve(value: T) -> Self {
        Self::new(move |resolve, _| resolve.resolve(value))
    }

    /// A promise that settles like `inner` does.
    pub fn resolve_promise(inner: Promise<T>) -> Self {
        Self::new(move |resolve, _| resolve.resolve_promise(inner))
    }

    /// A promise rejected with `err`.
    pub fn reject(err: Error) -> Self {
        Self::new(move |_, reject| reject.reject(err))
    }

    pub(crate) fn spawn<F>(config: Arc<Config>, executor: F) -> Self
    where
        F: FnOnce(Resolver<T>, Rejecter<T>) + Send + 'static,
    {
        let cell = Arc::new(Cell::new());
        let handle = Arc::new(Handle { cell: cell.clone() });
        let resolver = Resolver { handle: handle.clone() };
        let rejecter = Rejecter { handle: handle.clone() };

        // The task keeps its own reference so that unwinding through the
        // executor cannot abandon the promise before the panic is recorded.
        let guard = handle.clone();
        let task = move || {
            trace!("executor started");
            let run = AssertUnwindSafe(move || executor(resolver, rejecter));
            if let Err(payload) = catch_unwind(run) {
                let err = panic::recover(payload);
                warn!(error = %err, "recovered panic in promise executor");
                guard.cell.settle(Err(err));
            }
        };

        if let Err(e) = config.builder().spawn(task) {
            error!("failed to spawn executor thread: {e}");
            cell.settle(Err(Error::Spawn(e.to_string())));
        }
        drop(handle);

        Promise { cell, config }
    }

    /// Blocks the calling thread until the promise settles.
    ///
    /// Any number of threads may wait on the same promise; each gets its
    /// own copy of the result.
    pub fn await_promise(&self) -> Result<T, Error> {
        self.cell.wait()
    }

    /// The settlement, if there is one yet.
    pub fn try_result(&self) -> Option<Result<T, Error>> {
        self.cell.try_result()
    }
}

impl<T> Promise<T> {
    pub fn state(&self) -> State {
        self.cell.state()
    }

    pub fn is_settled(&self) -> bool {
        self.state() != State::Pending
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").field("state", &self.state()).finish()
    }
}

impl<T: Clone> Future for Promise<T> {
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.cell.poll(cx.waker())
    }
}

impl<T: Clone + Send + 'static> Resolver<T> {
    /// Fulfills the promise with `value` unless it was already settled.
    pub fn resolve(&self, value: T) {
        if !self.handle.cell.settle(Ok(value)) {
            debug!("ignoring resolve of a settled promise");
        }
    }

    /// Settles the promise the way `inner` settles.
    ///
    /// The promise is locked in right away, so later resolve and reject
    /// calls are ignored, but it stays pending until `inner` settles. This
    /// blocks the calling thread until then, forever if `inner` never
    /// settles.
    pub fn resolve_promise(&self, inner: Promise<T>) {
        let cell = &self.handle.cell;
        if !cell.claim() {
            debug!("ignoring resolve of a settled promise");
            return;
        }
        if Arc::ptr_eq(cell, &inner.cell) {
            cell.complete(Err(Error::Cycle));
            return;
        }
        cell.complete(inner.await_promise());
    }
}

impl<T> Rejecter<T> {
    /// Rejects the promise with `err` unless it was already settled.
    pub fn reject(&self, err: Error) {
        if !self.handle.cell.settle(Err(err)) {
            debug!("ignoring reject of a settled promise");
        }
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").field("state", &self.handle.cell.state()).finish()
    }
}

impl<T> fmt::Debug for Rejecter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejecter").field("state", &self.handle.cell.state()).finish()
    }
}
