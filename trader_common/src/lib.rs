//!
//! Common types and utilities shared by the broker and the trading client.
//!
//! This crate aggregates:
//! - `error` — unified error type `TraderError` used across the workspace.
//! - `result` — handy `Result<T, TraderError>` alias.
//! - `stock` — stock identity (ticker + listing exchange).
//! - `quote` — market data quote payload.
//! - `trade` — trade request/response payloads.
//! - `amqp` — broker model (exchanges, queues, bindings, messages) and the
//!   traits the client and broker meet at.
//! - `topic` — routing key validation and topic pattern matching.
//! - `topology` — fixed exchange/queue names and client defaults.
#![warn(missing_docs)]
pub mod amqp;
pub mod error;
pub mod quote;
pub mod result;
pub mod stock;
pub mod topic;
pub mod topology;
pub mod trade;

pub use error::TraderError;
pub use result::Result;
pub use quote::Quote;
pub use trade::{TradeRequest, TradeResponse};
