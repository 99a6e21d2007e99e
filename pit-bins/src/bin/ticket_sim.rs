//! Ticket-allotment oversell CLI.
//!
//! Races a pool of selling agents against a fixed (optionally oversold)
//! allotment under a single lock and prints the sold-vs-allotted
//! summary.

use std::thread;

use anyhow::{Context, Result};
use clap::Parser;

use pit_bins::common::{init_logging, print_ticket_report};
use pit_core::tickets::{self, TicketConfig};
use pit_core::{EventSink, SimEvent};

#[derive(Parser, Debug)]
#[command(version, about = "Oversold ticket-allotment simulation")]
struct Args {
    /// Number of ticket agents
    #[arg(default_value_t = 1_000)]
    agents: usize,

    /// Seats physically available
    #[arg(default_value_t = 10_000)]
    seats: u32,

    /// Percentage of seats sold beyond capacity
    #[arg(default_value_t = 0.0)]
    oversell: f32,

    /// Log every sale as it happens
    #[arg(long)]
    verbose_sales: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, false)?;

    let cfg = TicketConfig {
        agents: args.agents,
        seats: args.seats,
        oversell_pct: args.oversell,
    };

    let (sink, reporter) = if args.verbose_sales {
        let (sink, rx) = EventSink::channel();
        let reporter = thread::Builder::new()
            .name("reporter".to_string())
            .spawn(move || {
                for event in rx {
                    if let SimEvent::TicketSale(sale) = event {
                        tracing::info!(
                            agent = sale.agent,
                            sold = sale.sold,
                            total = sale.total,
                            "sale"
                        );
                    }
                }
            })
            .context("spawning reporter thread")?;
        (sink, Some(reporter))
    } else {
        (EventSink::disabled(), None)
    };

    let report = tickets::run(&cfg, sink)?;

    if let Some(handle) = reporter {
        let _ = handle.join();
    }

    print_ticket_report(&report, args.seats, args.oversell);
    Ok(())
}
