//! Simulation configuration.
//!
//! All knobs are plain serde structs so a run can be described in a JSON
//! file or built in code. Validation happens once, before any thread
//! starts; after that the configuration is immutable.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Parameters of the bounded pseudo-random price delta.
///
/// A delta is computed as `trunc(10 * (draw - offset) / scale)` where
/// `draw` is uniform in `0..span`. Offset shifts the distribution below
/// zero; scale bounds the magnitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeltaParams {
    pub span: u32,
    pub offset: f64,
    pub scale: f64,
}

/// One stock traded on the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSpec {
    pub name: String,

    /// Initial price in integer units.
    pub price: i64,

    /// Initial available quantity.
    pub quantity: u32,

    /// Minimum price this stock may ever reach.
    pub floor: i64,

    /// 1-in-N odds that the price moves on a given tick.
    /// Zero disables movement entirely.
    pub move_one_in: u32,

    pub delta: DeltaParams,
}

/// Full description of a market simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Number of ticks the driver advances.
    pub ticks: u64,

    /// Inter-tick delay; omit for throughput runs.
    #[serde(default)]
    pub tick_delay_ms: Option<u64>,

    /// Total broker count, partitioned round-robin across stocks.
    pub brokers: usize,

    /// Per-rank threshold widening step. A broker of rank `r` within its
    /// stock's group buys below `price - spread_step * (1 + r)` and sells
    /// above `price + spread_step * (1 + r)`.
    #[serde(default = "default_spread_step")]
    pub spread_step: i64,

    #[serde(default = "default_trade_size")]
    pub buy_size: u32,

    #[serde(default = "default_trade_size")]
    pub sell_size: u32,

    /// Seed for the driver RNG; omit to seed from entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    pub stocks: Vec<StockSpec>,
}

fn default_spread_step() -> i64 {
    1
}

fn default_trade_size() -> u32 {
    5
}

impl Default for ExchangeConfig {
    /// The built-in five-stock market: 100 brokers reacting to 10 000
    /// ticks, no inter-tick delay.
    fn default() -> Self {
        let stock = |name: &str, price, quantity, move_one_in, span, offset, scale| StockSpec {
            name: name.to_string(),
            price,
            quantity,
            floor: 100,
            move_one_in,
            delta: DeltaParams { span, offset, scale },
        };

        Self {
            ticks: 10_000,
            tick_delay_ms: None,
            brokers: 100,
            spread_step: 1,
            buy_size: 5,
            sell_size: 5,
            seed: None,
            stocks: vec![
                stock("A", 100, 50, 3, 10, 3.6, 2.3),
                stock("B", 200, 150, 7, 12, 5.0, 2.3),
                stock("C", 150, 50, 6, 7, 1.0, 2.1),
                stock("D", 240, 100, 2, 8, 5.0, 1.8),
                stock("E", 300, 200, 4, 8, 2.0, 1.4),
            ],
        }
    }
}

impl ExchangeConfig {
    /// Check the configuration before any thread is created.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.stocks.is_empty() {
            return Err(SimError::ConfigInvalid(
                "at least one stock is required".to_string(),
            ));
        }
        if self.ticks == 0 {
            return Err(SimError::ConfigInvalid(
                "tick count must be positive".to_string(),
            ));
        }
        for spec in &self.stocks {
            if spec.price < spec.floor {
                return Err(SimError::ConfigInvalid(format!(
                    "stock {}: initial price {} is below the floor {}",
                    spec.name, spec.price, spec.floor
                )));
            }
            if spec.delta.span == 0 {
                return Err(SimError::ConfigInvalid(format!(
                    "stock {}: delta span must be positive",
                    spec.name
                )));
            }
            if spec.delta.scale == 0.0 {
                return Err(SimError::ConfigInvalid(format!(
                    "stock {}: delta scale must be non-zero",
                    spec.name
                )));
            }
        }
        Ok(())
    }
}
