//! Broker worker threads.
//!
//! A broker is bound to exactly one stock at creation time and reacts to
//! that stock's broadcasts with a fixed buy-low/sell-high rule. The
//! whole wake cycle runs under the stock's mutex, so no two brokers'
//! decisions ever interleave on the same book.

use std::sync::Arc;

use crate::events::{EventSink, SimEvent, TradeAction, TradeEvent};
use crate::market::Stock;
use crate::shutdown::ShutdownFlag;

/// Immutable description of one broker, built before its thread starts.
#[derive(Clone)]
pub struct BrokerSpec {
    pub id: usize,
    pub stock: Arc<Stock>,
    pub buy_price: i64,
    pub buy_size: u32,
    pub sell_price: i64,
    pub sell_size: u32,
}

impl BrokerSpec {
    /// Thresholds derive from the stock's initial price and the broker's
    /// 1-based rank within the group watching that stock; higher ranks
    /// trade on a wider spread.
    pub fn from_rank(
        id: usize,
        stock: Arc<Stock>,
        initial_price: i64,
        rank: usize,
        spread_step: i64,
        buy_size: u32,
        sell_size: u32,
    ) -> Self {
        let spread = spread_step * (1 + rank as i64);
        Self {
            id,
            stock,
            buy_price: initial_price - spread,
            buy_size,
            sell_price: initial_price + spread,
            sell_size,
        }
    }
}

/// Reactive loop of one broker thread.
///
/// The book lock is held across the whole loop; the condvar wait
/// releases it while blocked and re-acquires it on wake. Termination is
/// checked before every wait (including the first) and again at the top
/// of each wake cycle. It never pre-empts an in-progress decision: a
/// flag raised mid-decision is observed on the next wakeup.
pub fn run(spec: BrokerSpec, shutdown: ShutdownFlag, sink: EventSink) {
    tracing::debug!(broker = spec.id, stock = spec.stock.name(), "broker watching");

    let mut book = spec.stock.lock();
    while !shutdown.is_set() {
        spec.stock.wait(&mut book);
        if shutdown.is_set() {
            break;
        }

        if book.price < spec.buy_price && book.quantity > 0 {
            let filled = book.buy(spec.buy_size);
            sink.emit(SimEvent::Trade(TradeEvent {
                broker: spec.id,
                stock: spec.stock.name().to_string(),
                action: TradeAction::Buy,
                size: filled,
            }));
        } else if book.price > spec.sell_price {
            let size = book.sell(spec.sell_size);
            sink.emit(SimEvent::Trade(TradeEvent {
                broker: spec.id,
                stock: spec.stock.name().to_string(),
                action: TradeAction::Sell,
                size,
            }));
        }
    }
    drop(book);

    tracing::debug!(broker = spec.id, "broker terminated");
}
