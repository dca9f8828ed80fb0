//! In-process message broker for the stock trader.
//!
//! This crate stands in for the AMQP broker and the trading back office:
//!
//! - `broker` — `Broker`, an in-memory topic/direct/fanout broker implementing
//!   `BrokerAdmin` and `MessagePublisher`.
//! - `listener` — `ListenerContainer`, which consumes queues on a delivery thread
//!   and hands each message to a `MessageHandler`.
//! - `generator` — `MarketDataGenerator`, a background random-walk quote feed.
//! - `trade_desk` — `TradeDesk`, which answers trade requests.
#![warn(missing_docs)]
pub mod broker;
pub mod generator;
pub mod listener;
pub mod trade_desk;

pub use broker::Broker;
pub use generator::{MarketDataGenerator, PriceBook};
pub use listener::ListenerContainer;
pub use trade_desk::TradeDesk;
