//! Orchestration of a full market run.
//!
//! The orchestrator builds the broker descriptor arena before any thread
//! starts, spawns one thread per broker and one for the driver, waits
//! for the driver to finish its ticks, runs the two-phase shutdown, and
//! joins whatever was actually created. Thread-lifecycle failures are
//! collected into the report as warnings; a broker that failed to spawn
//! simply never participates.

use std::sync::Arc;
use std::thread;

use serde::Serialize;

use crate::broker::{self, BrokerSpec};
use crate::config::ExchangeConfig;
use crate::error::SimError;
use crate::events::EventSink;
use crate::exchange::Driver;
use crate::market::Stock;
use crate::shutdown::{self, ShutdownFlag};

/// Final state of one stock.
#[derive(Debug, Clone, Serialize)]
pub struct StockSummary {
    pub name: String,
    pub price: i64,
    pub quantity: u32,
}

/// Everything a run produces for the caller to render.
#[derive(Debug)]
pub struct SimReport {
    /// Ticks the driver actually advanced.
    pub ticks: u64,
    pub stocks: Vec<StockSummary>,
    /// Non-fatal thread-lifecycle failures collected along the way.
    pub warnings: Vec<SimError>,
}

pub struct Simulation {
    cfg: ExchangeConfig,
    shutdown: ShutdownFlag,
}

impl Simulation {
    pub fn new(cfg: ExchangeConfig) -> Result<Self, SimError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            shutdown: ShutdownFlag::new(),
        })
    }

    /// Handle for requesting an early finish (operator interrupt). The
    /// driver observes it between ticks; brokers observe it on their
    /// next wakeup.
    pub fn shutdown_flag(&self) -> ShutdownFlag {
        self.shutdown.clone()
    }

    /// Run the simulation to completion. Always joins every thread it
    /// managed to create before returning.
    pub fn run(self, sink: EventSink) -> SimReport {
        let stocks: Vec<Arc<Stock>> = self
            .cfg
            .stocks
            .iter()
            .map(|spec| Arc::new(Stock::new(spec)))
            .collect();

        // descriptor arena, fully built before any thread starts
        let specs: Vec<BrokerSpec> = (0..self.cfg.brokers)
            .map(|i| {
                let group = i % stocks.len();
                let rank = i / stocks.len() + 1;
                BrokerSpec::from_rank(
                    i,
                    Arc::clone(&stocks[group]),
                    self.cfg.stocks[group].price,
                    rank,
                    self.cfg.spread_step,
                    self.cfg.buy_size,
                    self.cfg.sell_size,
                )
            })
            .collect();

        tracing::info!(
            brokers = specs.len(),
            stocks = stocks.len(),
            ticks = self.cfg.ticks,
            "starting simulation"
        );

        let mut warnings = Vec::new();
        let mut brokers = Vec::with_capacity(specs.len());
        for spec in specs {
            let id = spec.id;
            let shutdown = self.shutdown.clone();
            let sink = sink.clone();
            match thread::Builder::new()
                .name(format!("broker-{id}"))
                .spawn(move || broker::run(spec, shutdown, sink))
            {
                Ok(handle) => brokers.push((id, handle)),
                Err(source) => {
                    tracing::warn!(broker = id, error = %source, "broker failed to spawn; slot will not participate");
                    warnings.push(SimError::ResourceExhausted {
                        role: "broker",
                        id,
                        source,
                    });
                }
            }
        }

        let driver = Driver::new(&self.cfg, &stocks);
        let ticks = {
            let shutdown = self.shutdown.clone();
            let sink = sink.clone();
            match thread::Builder::new()
                .name("driver".to_string())
                .spawn(move || driver.run(&shutdown, &sink))
            {
                Ok(handle) => match handle.join() {
                    Ok(ticks) => ticks,
                    Err(_) => {
                        tracing::warn!("driver panicked");
                        warnings.push(SimError::JoinFailed {
                            role: "driver",
                            id: 0,
                        });
                        0
                    }
                },
                Err(source) => {
                    tracing::warn!(error = %source, "driver failed to spawn");
                    warnings.push(SimError::ResourceExhausted {
                        role: "driver",
                        id: 0,
                        source,
                    });
                    0
                }
            }
        };

        // two-phase shutdown, then join whatever was actually created
        shutdown::signal_all(&self.shutdown, &stocks);
        for (id, handle) in brokers {
            if handle.join().is_err() {
                tracing::warn!(broker = id, "broker panicked before join");
                warnings.push(SimError::JoinFailed { role: "broker", id });
            }
        }

        let summary = stocks
            .iter()
            .map(|stock| {
                let book = stock.snapshot();
                StockSummary {
                    name: stock.name().to_string(),
                    price: book.price,
                    quantity: book.quantity,
                }
            })
            .collect();

        tracing::info!(ticks, warnings = warnings.len(), "simulation complete");
        SimReport {
            ticks,
            stocks: summary,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let cfg = ExchangeConfig {
            stocks: vec![],
            ..ExchangeConfig::default()
        };
        assert!(matches!(
            Simulation::new(cfg),
            Err(SimError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn a_run_with_no_brokers_still_completes() {
        let cfg = ExchangeConfig {
            brokers: 0,
            ticks: 100,
            seed: Some(1),
            ..ExchangeConfig::default()
        };
        let sim = Simulation::new(cfg).unwrap();
        let report = sim.run(EventSink::disabled());
        assert_eq!(report.ticks, 100);
        assert!(report.warnings.is_empty());
        assert_eq!(report.stocks.len(), 5);
    }
}
