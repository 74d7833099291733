use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::task::{Poll, Waker};

use tracing::trace;

use crate::Error;

/// Where a promise is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Pending,
    Fulfilled,
    Rejected,
}

const PENDING: u8 = 0;
// Claimed by a settler that has not published its result yet.
const LOCKED: u8 = 1;
const FULFILLED: u8 = 2;
const REJECTED: u8 = 3;

/// The settle-once core shared by a promise and its resolvers.
///
/// The first settler moves `status` out of `PENDING`; everyone else backs
/// off. The result is then published into `slot`, and every blocked or
/// async waiter is woken. The result is never taken out, so all waiters
/// see it.
#[derive(Debug)]
pub(crate) struct Cell<T> {
    status: AtomicU8,
    slot: Mutex<Slot<T>>,
    settled: Condvar,
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<Result<T, Error>>,
    wakers: Vec<Waker>,
}

impl<T> Cell<T> {
    pub fn new() -> Self {
        Self {
            status: AtomicU8::new(PENDING),
            slot: Mutex::new(Slot {
                value: None,
                wakers: vec![],
            }),
            settled: Condvar::new(),
        }
    }

    pub fn state(&self) -> State {
        match self.status.load(Ordering::Acquire) {
            FULFILLED => State::Fulfilled,
            REJECTED => State::Rejected,
            _ => State::Pending,
        }
    }

    /// Reserves the one settlement for the caller. Returns `false` if the
    /// cell was already claimed.
    pub fn claim(&self) -> bool {
        self.status
            .compare_exchange(PENDING, LOCKED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Publishes the result of a successful [`claim`](Self::claim).
    pub fn complete(&self, result: Result<T, Error>) {
        let status = match result {
            Ok(_) => FULFILLED,
            Err(_) => REJECTED,
        };
        trace!(fulfilled = result.is_ok(), "promise settled");

        let wakers = {
            let mut slot = self.slot();
            slot.value = Some(result);
            self.status.store(status, Ordering::Release);
            std::mem::take(&mut slot.wakers)
        };

        self.settled.notify_all();
        for waker in wakers {
            waker.wake()
        }
    }

    /// Claims and completes in one step. Returns `false`, dropping
    /// `result`, if the cell was already claimed.
    pub fn settle(&self, result: Result<T, Error>) -> bool {
        if !self.claim() {
            return false;
        }
        self.complete(result);
        true
    }

    // The slot is written once under the lock and never left half-updated,
    // so a poisoned lock still holds consistent data.
    fn slot(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Cell<T> {
    /// Blocks until settled.
    pub fn wait(&self) -> Result<T, Error> {
        let mut slot = self.slot();
        loop {
            if let Some(value) = &slot.value {
                return value.clone();
            }
            slot = self
                .settled
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn poll(&self, waker: &Waker) -> Poll<Result<T, Error>> {
        let mut slot = self.slot();
        match slot.value {
            Some(ref value) => Poll::Ready(value.clone()),
            None => {
                if !slot.wakers.iter().any(|w| w.will_wake(waker)) {
                    slot.wakers.push(waker.clone());
                }
                Poll::Pending
            }
        }
    }

    pub fn try_result(&self) -> Option<Result<T, Error>> {
        self.slot().value.clone()
    }
}
