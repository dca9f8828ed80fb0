//! Stock trader client: subscribes to streaming quotes on a topic exchange and
//! submits trade requests, driven from the console.
//!
//! The binary runs an in-process broker together with its market data feed and
//! trade desk, then wires the client the same way it would be wired against a
//! remote broker:
//!
//! - `BindingManager` keeps the market data queue bound to one routing pattern;
//! - a `ListenerContainer` consumes the market data and trade response queues on
//!   a delivery thread and hands messages to a `MessageDispatcher`;
//! - the dispatcher posts UI tasks, and the main thread runs the UI loop that owns
//!   the `StockForm`;
//! - a reader thread turns stdin lines into form actions.
//!
//! Usage example (CLI):
//! ```bash
//! trader_client --routing-key 'app.stock.quotes.#' --account ACCT-9 --tick-ms 500
//! ```
#![warn(missing_docs)]
mod args;

use std::io::{self, BufReader};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{error, info};
use trader_broker::{Broker, ListenerContainer, MarketDataGenerator, PriceBook, TradeDesk};
use trader_client::binding::BindingManager;
use trader_client::console::{self, ConsoleCommand};
use trader_client::controller::StockController;
use trader_client::form::{LogDialogs, StockForm};
use trader_client::sink::MessageDispatcher;
use trader_client::ui::UiContext;
use trader_common::amqp::{BrokerAdmin, Exchange, Lifecycle, Queue};
use trader_common::stock::Stock;
use trader_common::topology::{MARKET_DATA_EXCHANGE, MARKET_DATA_QUEUE, TRADE_RESPONSE_QUEUE};
use trader_common::{Result, TraderError};

use crate::args::Args;

fn main() {
    init_logger();
    info!("Running....");
    if let Err(e) = run(Args::parse()) {
        error!("Stock trader client is broken: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let broker = Broker::new();
    let book = PriceBook::new();
    let mut generator = MarketDataGenerator::start(
        broker.clone(),
        Stock::default_listing(),
        Duration::from_millis(args.tick_ms),
        book.clone(),
    )?;
    let mut desk = TradeDesk::start(broker.clone(), book)?;

    broker.declare_queue(&Queue::new(TRADE_RESPONSE_QUEUE))?;
    let admin: Arc<dyn BrokerAdmin> = Arc::new(broker.clone());
    let bindings = BindingManager::new(
        admin,
        Exchange::topic(MARKET_DATA_EXCHANGE, false, false),
        Queue::new(MARKET_DATA_QUEUE),
    );
    // the market data queue must exist before the container can consume it
    for fault in bindings.declare_topology() {
        error!("Topology declaration failed: {}", fault);
    }

    let ui = UiContext::<StockForm>::new();
    let dispatcher = Arc::new(MessageDispatcher::new(ui.handle()));
    let mut listener = ListenerContainer::new(
        broker.clone(),
        &[MARKET_DATA_QUEUE, TRADE_RESPONSE_QUEUE],
        dispatcher,
    );
    listener.start()?;

    let controller = StockController::new(Arc::new(broker.clone()));
    let mut form = StockForm::new(bindings, controller, Box::new(listener), Box::new(LogDialogs));
    form.load();
    form.set_account(&args.account);
    form.set_quantity(args.quantity);
    form.apply(&args.routing_key);

    {
        let ui = ui.handle();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            let _ = console::post(&ui, ConsoleCommand::Quit);
        })
        .map_err(|e| TraderError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }
    console::spawn_reader(BufReader::new(io::stdin()), ui.handle());
    info!("Client is running. Type `start` to enable trading, `quit` to exit.");

    let result = ui.run(&mut form);
    form.close();
    desk.stop();
    generator.stop();
    result
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
