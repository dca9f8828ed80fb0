//! Command-line arguments for the stock trader client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use trader_common::topology::{DEFAULT_ACCOUNT, DEFAULT_QUANTITY, DEFAULT_ROUTING_KEY};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Routing pattern to subscribe with once the form is started.
    #[clap(long, default_value = DEFAULT_ROUTING_KEY)]
    pub routing_key: String,

    /// Account trade requests are booked against.
    #[clap(long, default_value = DEFAULT_ACCOUNT)]
    pub account: String,

    /// Shares per trade request.
    #[clap(long, default_value_t = DEFAULT_QUANTITY)]
    pub quantity: u32,

    /// Interval between market data ticks, in milliseconds.
    #[clap(long, default_value_t = 1000)]
    pub tick_ms: u64,
}
