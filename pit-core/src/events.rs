//! Events the core produces for an external reporting layer.
//!
//! The core performs no I/O. Runs that want observation attach an
//! [`EventSink`] backed by a crossbeam channel and drain the receiver on
//! their own thread; throughput runs use [`EventSink::disabled`] and pay
//! nothing beyond an `Option` check.

use crossbeam::channel::{self, Receiver, Sender};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

/// One executed broker decision.
#[derive(Debug, Clone, Serialize)]
pub struct TradeEvent {
    pub broker: usize,
    pub stock: String,
    pub action: TradeAction,
    /// Units actually moved, after clamping.
    pub size: u32,
}

/// Per-tick state of one stock, as seen right after the driver processed it.
#[derive(Debug, Clone, Serialize)]
pub struct TickRecord {
    pub tick: u64,
    pub stock: String,
    pub price: i64,
    pub quantity: u32,
    /// Whether the price actually changed this tick.
    pub moved: bool,
}

/// One successful ticket-agent transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TicketSale {
    pub agent: usize,
    /// Units sold in this transaction, after clamping.
    pub sold: u32,
    /// Running total after this transaction.
    pub total: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimEvent {
    Tick(TickRecord),
    Trade(TradeEvent),
    TicketSale(TicketSale),
}

/// Cloneable handle the simulation threads emit through.
#[derive(Clone)]
pub struct EventSink(Option<Sender<SimEvent>>);

impl EventSink {
    /// A sink paired with the receiver the caller drains.
    pub fn channel() -> (Self, Receiver<SimEvent>) {
        let (tx, rx) = channel::unbounded();
        (Self(Some(tx)), rx)
    }

    /// A sink that drops everything, for benchmark-mode runs.
    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Best-effort send: a dropped receiver silently ends reporting.
    pub fn emit(&self, event: SimEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sink_delivers_in_order() {
        let (sink, rx) = EventSink::channel();
        assert!(sink.is_enabled());

        for tick in 0..3 {
            sink.emit(SimEvent::Tick(TickRecord {
                tick,
                stock: "A".to_string(),
                price: 100,
                quantity: 50,
                moved: false,
            }));
        }
        drop(sink);

        let ticks: Vec<u64> = rx
            .iter()
            .map(|ev| match ev {
                SimEvent::Tick(t) => t.tick,
                other => panic!("unexpected event: {other:?}"),
            })
            .collect();
        assert_eq!(ticks, vec![0, 1, 2]);
    }

    #[test]
    fn disabled_sink_is_a_no_op() {
        let sink = EventSink::disabled();
        assert!(!sink.is_enabled());
        sink.emit(SimEvent::Trade(TradeEvent {
            broker: 0,
            stock: "A".to_string(),
            action: TradeAction::Buy,
            size: 5,
        }));
    }

    #[test]
    fn emit_survives_a_dropped_receiver() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit(SimEvent::Trade(TradeEvent {
            broker: 1,
            stock: "B".to_string(),
            action: TradeAction::Sell,
            size: 5,
        }));
    }
}
