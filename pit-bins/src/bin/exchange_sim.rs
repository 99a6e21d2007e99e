//! Market simulation CLI.
//!
//! Loads a JSON market description (or the built-in five-stock default),
//! runs the driver/broker simulation, and renders the event stream and
//! final summary through tracing. Ctrl-C requests an early finish via
//! the shutdown flag; the run still joins every broker before exiting.

use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;

use pit_bins::common::{init_logging, print_exchange_report};
use pit_core::{EventSink, ExchangeConfig, SimEvent, Simulation};

#[derive(Parser, Debug)]
#[command(version, about = "Concurrent market simulation")]
struct Args {
    /// JSON configuration file; defaults to the built-in market
    #[arg(short = 'f', long)]
    config: Option<PathBuf>,

    /// Override the configured tick count
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the configured broker count
    #[arg(long)]
    brokers: Option<usize>,

    /// Seed the driver RNG for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Throughput mode: no event reporting, no inter-tick delay
    #[arg(long)]
    bench: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.json_logs)?;

    let mut cfg = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<ExchangeConfig>(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ExchangeConfig::default(),
    };
    if let Some(ticks) = args.ticks {
        cfg.ticks = ticks;
    }
    if let Some(brokers) = args.brokers {
        cfg.brokers = brokers;
    }
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }
    if args.bench {
        cfg.tick_delay_ms = None;
    }

    let sim = Simulation::new(cfg)?;

    let shutdown = sim.shutdown_flag();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::warn!("interrupt received, finishing early");
        shutdown.set();
    }) {
        tracing::warn!("failed to install interrupt handler: {e}");
    }

    let (sink, reporter) = if args.bench {
        (EventSink::disabled(), None)
    } else {
        let (sink, rx) = EventSink::channel();
        let reporter = thread::Builder::new()
            .name("reporter".to_string())
            .spawn(move || {
                for event in rx {
                    render_event(&event);
                }
            })
            .context("spawning reporter thread")?;
        (sink, Some(reporter))
    };

    let report = sim.run(sink);

    // the receiver drains once every sender inside the run is gone
    if let Some(handle) = reporter {
        let _ = handle.join();
    }

    print_exchange_report(&report);
    Ok(())
}

fn render_event(event: &SimEvent) {
    match event {
        SimEvent::Tick(tick) => tracing::debug!(
            tick = tick.tick,
            stock = %tick.stock,
            price = tick.price,
            quantity = tick.quantity,
            moved = tick.moved,
            "tick"
        ),
        SimEvent::Trade(trade) => tracing::info!(
            broker = trade.broker,
            stock = %trade.stock,
            action = ?trade.action,
            size = trade.size,
            "trade"
        ),
        SimEvent::TicketSale(_) => {}
    }
}
