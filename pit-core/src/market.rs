//! Shared tradable state.
//!
//! Each [`Stock`] pairs a mutex-guarded [`Book`] with its own condition
//! variable. Independent stocks never share a lock, so the driver can
//! reprice one stock while brokers bound to another keep trading. All
//! price and quantity mutation goes through the guard returned by
//! [`Stock::lock`]; serialization through that lock, not the clamps, is
//! what keeps the invariants.

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::config::StockSpec;

/// Price and quantity of one stock. Only reachable through the stock's
/// mutex, so every read-check-mutate sequence on it is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Book {
    pub price: i64,
    pub quantity: u32,
}

impl Book {
    /// Add `delta` to the price unless the result would fall below
    /// `floor`. Returns whether the price moved.
    pub fn apply_price_change(&mut self, delta: i64, floor: i64) -> bool {
        let next = self.price.saturating_add(delta);
        if next < floor {
            return false;
        }
        let moved = delta != 0;
        self.price = next;
        moved
    }

    /// Remove up to `size` units, clamped to the remaining quantity.
    /// Returns the amount actually filled.
    pub fn buy(&mut self, size: u32) -> u32 {
        let filled = size.min(self.quantity);
        self.quantity -= filled;
        filled
    }

    /// Return `size` units to the market. Quantity has no upper bound in
    /// this model.
    pub fn sell(&mut self, size: u32) -> u32 {
        self.quantity = self.quantity.saturating_add(size);
        size
    }
}

/// A lockable unit of shared market state plus its condition variable.
pub struct Stock {
    name: String,
    floor: i64,
    book: Mutex<Book>,
    wake: Condvar,
}

impl Stock {
    pub fn new(spec: &StockSpec) -> Self {
        Self {
            name: spec.name.clone(),
            floor: spec.floor,
            book: Mutex::new(Book {
                price: spec.price,
                quantity: spec.quantity,
            }),
            wake: Condvar::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn floor(&self) -> i64 {
        self.floor
    }

    pub fn lock(&self) -> MutexGuard<'_, Book> {
        self.book.lock()
    }

    /// Block until the next broadcast. The guard must belong to this
    /// stock's mutex; the lock is released while blocked and re-acquired
    /// atomically on wake.
    pub fn wait(&self, book: &mut MutexGuard<'_, Book>) {
        self.wake.wait(book);
    }

    /// Wake every broker currently blocked on this stock. Callers hold
    /// the lock across the broadcast; see the shutdown coordinator.
    pub fn notify_all(&self) {
        self.wake.notify_all();
    }

    /// Briefly locks to read the current price and quantity.
    pub fn snapshot(&self) -> Book {
        *self.book.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeltaParams;
    use proptest::prelude::*;

    fn spec(price: i64, quantity: u32, floor: i64) -> StockSpec {
        StockSpec {
            name: "A".to_string(),
            price,
            quantity,
            floor,
            move_one_in: 1,
            delta: DeltaParams {
                span: 10,
                offset: 3.6,
                scale: 2.3,
            },
        }
    }

    #[test]
    fn price_change_respects_the_floor() {
        let mut book = Book {
            price: 105,
            quantity: 50,
        };

        assert!(book.apply_price_change(-5, 100));
        assert_eq!(book.price, 100);

        // would land below the floor: rejected, price untouched
        assert!(!book.apply_price_change(-1, 100));
        assert_eq!(book.price, 100);

        assert!(book.apply_price_change(20, 100));
        assert_eq!(book.price, 120);
    }

    #[test]
    fn zero_delta_is_reported_as_no_move() {
        let mut book = Book {
            price: 100,
            quantity: 50,
        };
        assert!(!book.apply_price_change(0, 100));
        assert_eq!(book.price, 100);
    }

    #[test]
    fn buy_clamps_to_remaining_quantity() {
        let mut book = Book {
            price: 100,
            quantity: 3,
        };
        assert_eq!(book.buy(5), 3);
        assert_eq!(book.quantity, 0);
        assert_eq!(book.buy(5), 0);
        assert_eq!(book.quantity, 0);
    }

    #[test]
    fn sell_has_no_upper_bound() {
        let mut book = Book {
            price: 100,
            quantity: 0,
        };
        assert_eq!(book.sell(5), 5);
        assert_eq!(book.sell(5), 5);
        assert_eq!(book.quantity, 10);
    }

    #[test]
    fn snapshot_reads_current_state() {
        let stock = Stock::new(&spec(200, 150, 100));
        assert_eq!(stock.name(), "A");
        assert_eq!(stock.floor(), 100);

        {
            let mut book = stock.lock();
            book.apply_price_change(-10, stock.floor());
            book.buy(5);
        }

        let book = stock.snapshot();
        assert_eq!(book.price, 190);
        assert_eq!(book.quantity, 145);
    }

    proptest! {
        /// Arbitrary interleavings of repricing and trading never drive
        /// the price below the floor, and the book stays internally
        /// consistent.
        #[test]
        fn random_ops_never_break_invariants(
            ops in proptest::collection::vec((0u8..3, -100i64..100, 0u32..20), 0..200)
        ) {
            let floor = 100;
            let mut book = Book { price: 150, quantity: 50 };
            for (op, delta, size) in ops {
                match op {
                    0 => { book.apply_price_change(delta, floor); }
                    1 => { book.buy(size); }
                    _ => { book.sell(size); }
                }
                prop_assert!(book.price >= floor);
            }
        }
    }
}
