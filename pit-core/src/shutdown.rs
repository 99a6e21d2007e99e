//! Two-phase cooperative shutdown.
//!
//! Phase one raises the write-once termination flag; phase two
//! broadcasts every stock's condition variable while holding its lock.
//! Broadcasting under the lock closes the window where a broker has
//! checked the flag but not yet entered its wait: such a broker still
//! holds the mutex, so the coordinator cannot broadcast until the wait
//! has released it. Brokers never poll the flag; they observe it
//! synchronously after each wakeup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::market::Stock;

/// Process-wide termination signal, written once by the coordinator and
/// read by every broker after a wakeup.
#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Single writer: the shutdown coordinator (or an operator interrupt
    /// requesting an early finish).
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Signal termination and wake every blocked broker.
pub fn signal_all(flag: &ShutdownFlag, stocks: &[Arc<Stock>]) {
    flag.set();
    for stock in stocks {
        let guard = stock.lock();
        stock.notify_all();
        drop(guard);
    }
    tracing::debug!(stocks = stocks.len(), "termination broadcast sent");
}
