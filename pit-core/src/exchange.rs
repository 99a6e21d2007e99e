//! The driver thread.
//!
//! A single driver advances the configured number of ticks. Each tick it
//! visits every stock independently: a per-stock 1-in-N draw decides
//! whether the price moves, and a successful draw reprices the stock
//! under its own lock and broadcasts to the brokers watching it. The
//! lock is held only for that single mutation plus broadcast, so ticks
//! on one stock never block brokers bound to another.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{DeltaParams, ExchangeConfig};
use crate::events::{EventSink, SimEvent, TickRecord};
use crate::market::Stock;
use crate::shutdown::ShutdownFlag;

/// Draw a 1-in-`n` chance. Zero odds never fire.
fn one_in(rng: &mut SmallRng, n: u32) -> bool {
    n > 0 && rng.gen_range(0..n) == 0
}

/// Bounded signed price delta: `trunc(10 * (draw - offset) / scale)`
/// with `draw` uniform in `0..span`.
fn price_delta(rng: &mut SmallRng, params: &DeltaParams) -> i64 {
    let draw = rng.gen_range(0..params.span) as f64;
    (10.0 * (draw - params.offset) / params.scale) as i64
}

struct DrivenStock {
    stock: Arc<Stock>,
    move_one_in: u32,
    delta: DeltaParams,
}

/// The tick loop, consumed by a single thread per run.
pub struct Driver {
    ticks: u64,
    delay: Option<Duration>,
    rng: SmallRng,
    stocks: Vec<DrivenStock>,
}

impl Driver {
    /// Pair each stock with its movement parameters. `stocks` must be in
    /// the same order as `cfg.stocks`.
    pub fn new(cfg: &ExchangeConfig, stocks: &[Arc<Stock>]) -> Self {
        let rng = match cfg.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            ticks: cfg.ticks,
            delay: cfg.tick_delay_ms.map(Duration::from_millis),
            rng,
            stocks: stocks
                .iter()
                .zip(&cfg.stocks)
                .map(|(stock, spec)| DrivenStock {
                    stock: Arc::clone(stock),
                    move_one_in: spec.move_one_in,
                    delta: spec.delta,
                })
                .collect(),
        }
    }

    /// Advance the configured number of ticks, or fewer if the shutdown
    /// flag is raised early. Returns the ticks actually run.
    pub fn run(mut self, shutdown: &ShutdownFlag, sink: &EventSink) -> u64 {
        tracing::info!(ticks = self.ticks, stocks = self.stocks.len(), "driver starting");

        let mut tick = 0;
        while tick < self.ticks && !shutdown.is_set() {
            for driven in &self.stocks {
                let moved = if one_in(&mut self.rng, driven.move_one_in) {
                    let floor = driven.stock.floor();
                    let mut book = driven.stock.lock();
                    let moved = if book.price > floor {
                        let delta = price_delta(&mut self.rng, &driven.delta);
                        book.apply_price_change(delta, floor)
                    } else {
                        false
                    };
                    // even a floor-clamped no-op wakes the waiters so
                    // they re-check their predicate
                    driven.stock.notify_all();
                    drop(book);
                    moved
                } else {
                    false
                };

                if sink.is_enabled() {
                    let book = driven.stock.snapshot();
                    sink.emit(SimEvent::Tick(TickRecord {
                        tick,
                        stock: driven.stock.name().to_string(),
                        price: book.price,
                        quantity: book.quantity,
                        moved,
                    }));
                }
            }

            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            tick += 1;
        }

        tracing::info!(ticks = tick, "driver finished");
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StockSpec;

    fn seeded() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn zero_odds_never_fire() {
        let mut rng = seeded();
        for _ in 0..1_000 {
            assert!(!one_in(&mut rng, 0));
        }
    }

    #[test]
    fn certain_odds_always_fire() {
        let mut rng = seeded();
        for _ in 0..1_000 {
            assert!(one_in(&mut rng, 1));
        }
    }

    #[test]
    fn delta_is_bounded_by_its_parameters() {
        let mut rng = seeded();
        let params = DeltaParams {
            span: 10,
            offset: 3.6,
            scale: 2.3,
        };
        // draw in 0..10 gives deltas in trunc(10*(-3.6)/2.3) ..= trunc(10*5.4/2.3)
        for _ in 0..10_000 {
            let delta = price_delta(&mut rng, &params);
            assert!((-15..=23).contains(&delta), "delta {delta} out of range");
        }
    }

    #[test]
    fn fixed_offset_forces_the_sign() {
        let mut rng = seeded();
        let down = DeltaParams {
            span: 1,
            offset: 1.0,
            scale: 1.0,
        };
        for _ in 0..100 {
            assert_eq!(price_delta(&mut rng, &down), -10);
        }
    }

    #[test]
    fn early_shutdown_stops_the_tick_loop() {
        let cfg = ExchangeConfig {
            stocks: vec![StockSpec {
                name: "A".to_string(),
                price: 100,
                quantity: 50,
                floor: 100,
                move_one_in: 1,
                delta: DeltaParams {
                    span: 10,
                    offset: 3.6,
                    scale: 2.3,
                },
            }],
            ticks: 10_000,
            ..ExchangeConfig::default()
        };
        let stocks = vec![Arc::new(Stock::new(&cfg.stocks[0]))];
        let driver = Driver::new(&cfg, &stocks);

        let shutdown = ShutdownFlag::new();
        shutdown.set();
        let ticks = driver.run(&shutdown, &EventSink::disabled());
        assert_eq!(ticks, 0);
    }
}
