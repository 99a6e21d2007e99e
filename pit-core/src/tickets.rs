//! Ticket-allotment oversell scenario.
//!
//! A simpler instance of the mutex-guarded-counter pattern: agents race
//! to sell from a fixed allotment under a single lock. Each agent's
//! read-check-sell runs entirely inside the critical section, so the
//! clamp against the remainder is a local defense while serialization
//! through the lock is what actually prevents overselling.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::events::{EventSink, SimEvent, TicketSale};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketConfig {
    /// Number of concurrent selling agents.
    pub agents: usize,

    /// Seats physically available.
    pub seats: u32,

    /// Percentage of seats deliberately sold beyond capacity.
    pub oversell_pct: f32,
}

impl TicketConfig {
    /// Seats offered for sale: capacity plus the oversell margin.
    pub fn allotted(&self) -> u32 {
        self.seats + (self.seats as f32 * self.oversell_pct / 100.0).round() as u32
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.agents == 0 {
            return Err(SimError::ConfigInvalid(
                "at least one agent is required".to_string(),
            ));
        }
        if self.seats == 0 {
            return Err(SimError::ConfigInvalid(
                "seat count must be positive".to_string(),
            ));
        }
        if self.oversell_pct < 0.0 {
            return Err(SimError::ConfigInvalid(
                "oversell percentage must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct TicketReport {
    pub sold: u32,
    pub allotted: u32,
    pub warnings: Vec<SimError>,
}

/// Run the oversell scenario to completion: every agent loops until the
/// allotment is exhausted, then all agents are joined.
pub fn run(cfg: &TicketConfig, sink: EventSink) -> Result<TicketReport, SimError> {
    cfg.validate()?;
    let allotted = cfg.allotted();
    let sold = Arc::new(Mutex::new(0u32));

    tracing::info!(agents = cfg.agents, allotted, "starting ticket sale");

    let mut warnings = Vec::new();
    let mut agents = Vec::with_capacity(cfg.agents);
    for id in 0..cfg.agents {
        let sold = Arc::clone(&sold);
        let sink = sink.clone();
        match thread::Builder::new()
            .name(format!("agent-{id}"))
            .spawn(move || agent(id, allotted, &sold, &sink))
        {
            Ok(handle) => agents.push((id, handle)),
            Err(source) => {
                tracing::warn!(agent = id, error = %source, "agent failed to spawn");
                warnings.push(SimError::ResourceExhausted {
                    role: "agent",
                    id,
                    source,
                });
            }
        }
    }

    for (id, handle) in agents {
        if handle.join().is_err() {
            tracing::warn!(agent = id, "agent panicked before join");
            warnings.push(SimError::JoinFailed { role: "agent", id });
        }
    }

    let sold = *sold.lock();
    tracing::info!(sold, allotted, "ticket sale complete");
    Ok(TicketReport {
        sold,
        allotted,
        warnings,
    })
}

/// One ticket agent: attempt 1-4 unit sales until nothing remains.
fn agent(id: usize, allotted: u32, sold: &Mutex<u32>, sink: &EventSink) {
    // even-ranked agents close more of their attempts
    let threshold = if id % 2 == 0 { 9 } else { 6 };
    let mut rng = rand::thread_rng();

    loop {
        let mut total = sold.lock();
        let remaining = allotted - *total;
        if remaining == 0 {
            break;
        }

        if rng.gen_range(0..20) < threshold {
            let request: u32 = rng.gen_range(1..=4);
            let filled = request.min(remaining);
            *total += filled;
            sink.emit(SimEvent::TicketSale(TicketSale {
                agent: id,
                sold: filled,
                total: *total,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allotment_includes_the_oversell_margin() {
        let cfg = TicketConfig {
            agents: 4,
            seats: 100,
            oversell_pct: 10.0,
        };
        assert_eq!(cfg.allotted(), 110);

        let flat = TicketConfig {
            agents: 4,
            seats: 100,
            oversell_pct: 0.0,
        };
        assert_eq!(flat.allotted(), 100);

        let rounded = TicketConfig {
            agents: 4,
            seats: 10,
            oversell_pct: 15.0,
        };
        assert_eq!(rounded.allotted(), 12);
    }

    #[test]
    fn degenerate_configs_are_rejected() {
        let no_agents = TicketConfig {
            agents: 0,
            seats: 100,
            oversell_pct: 0.0,
        };
        assert!(no_agents.validate().is_err());

        let no_seats = TicketConfig {
            agents: 4,
            seats: 0,
            oversell_pct: 0.0,
        };
        assert!(no_seats.validate().is_err());

        let negative = TicketConfig {
            agents: 4,
            seats: 100,
            oversell_pct: -1.0,
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn single_agent_sells_out_exactly() {
        let cfg = TicketConfig {
            agents: 1,
            seats: 20,
            oversell_pct: 0.0,
        };
        let report = run(&cfg, EventSink::disabled()).unwrap();
        assert_eq!(report.sold, 20);
        assert_eq!(report.allotted, 20);
        assert!(report.warnings.is_empty());
    }
}
