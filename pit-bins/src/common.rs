//! Shared setup for the simulation binaries.
//!
//! Logging initialization and final-report rendering live here; the core
//! itself performs no I/O.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pit_core::sim::SimReport;
use pit_core::tickets::TicketReport;

/// Initialize the tracing subscriber.
pub fn init_logging(level: &str, json_logs: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }

    Ok(())
}

/// Log the final market state and any collected warnings.
pub fn print_exchange_report(report: &SimReport) {
    tracing::info!("=== Final Market State ===");
    for stock in &report.stocks {
        tracing::info!(
            stock = %stock.name,
            price = stock.price,
            quantity = stock.quantity,
            "closing state"
        );
    }
    tracing::info!(
        ticks = report.ticks,
        warnings = report.warnings.len(),
        "run complete"
    );
    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
}

/// Log the sold-vs-allotted summary.
pub fn print_ticket_report(report: &TicketReport, seats: u32, oversell_pct: f32) {
    tracing::info!(
        "Summary: {} tickets sold out of {} ({} + {:.1}%)",
        report.sold,
        report.allotted,
        seats,
        oversell_pct
    );
    for warning in &report.warnings {
        tracing::warn!("{warning}");
    }
}
