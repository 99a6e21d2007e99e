//! Pit Core - Concurrent Market-Simulation Core
//!
//! A controlled concurrency exercise over a toy market: one driver
//! thread periodically reprices a set of independently-lockable stocks,
//! and a pool of broker threads blocked on per-stock condition variables
//! reacts to each broadcast with a fixed buy-low/sell-high rule, under a
//! cooperative two-phase shutdown.
//!
//! ## Architecture
//! - **One lock per stock**: each stock guards its own price/quantity
//!   with a mutex and carries its own condition variable, so repricing
//!   one stock never contends with brokers on another.
//! - **Broadcast wakeups**: the driver wakes all brokers watching a
//!   stock at once; their decisions are serialized by the stock's lock
//!   in an unspecified order.
//! - **Two-phase shutdown**: a write-once termination flag followed by a
//!   final broadcast per stock, sent under the lock so no broker can
//!   miss it and block forever.
//! - **No I/O in the core**: per-tick records and trade events flow out
//!   through an optional crossbeam channel for the caller to render.
//!
//! ## Core Modules
//! - `market`: lockable price/quantity state plus its condition variable
//! - `exchange`: the driver tick loop
//! - `broker`: the reactive worker loop
//! - `shutdown`: termination flag and final broadcast
//! - `sim`: orchestration and the final report
//! - `tickets`: the oversell-style shared-counter scenario
//! - `config`, `events`, `error`: configuration, reporting, taxonomy

pub mod broker;
pub mod config;
pub mod error;
pub mod events;
pub mod exchange;
pub mod market;
pub mod shutdown;
pub mod sim;
pub mod tickets;

pub use config::{DeltaParams, ExchangeConfig, StockSpec};
pub use error::SimError;
pub use events::{EventSink, SimEvent, TickRecord, TicketSale, TradeAction, TradeEvent};
pub use market::{Book, Stock};
pub use shutdown::ShutdownFlag;
pub use sim::{SimReport, Simulation, StockSummary};
pub use tickets::{TicketConfig, TicketReport};
