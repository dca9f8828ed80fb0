//! Market data generator and shared price book.
//!
//! The `MarketDataGenerator` runs a background thread that synthesizes `Quote`
//! values for a fixed list of stocks and publishes them on the market data topic
//! exchange, one message per stock per tick, under
//! `app.stock.quotes.<exchange>.<ticker>`.
//!
//! Design notes:
//! - Uses a small random walk around the last price to simulate movement.
//! - Last prices live in a `PriceBook` shared with the trade desk so fills use the
//!   prices the client has been seeing.
//! - Publishing is best-effort: a failed publish is logged and the tick moves on.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender, unbounded};
use log::{debug, info, warn};
use rand::Rng;
use trader_common::amqp::{BrokerAdmin, Exchange, Message, MessagePublisher};
use trader_common::stock::Stock;
use trader_common::topology::MARKET_DATA_EXCHANGE;
use trader_common::{Quote, Result};

use crate::broker::Broker;

/// Last known price per ticker, shared between threads.
#[derive(Clone, Default)]
pub struct PriceBook {
    prices: Arc<Mutex<HashMap<String, f64>>>,
}

impl PriceBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last price for `ticker`, if it has been quoted.
    pub fn price(&self, ticker: &str) -> Result<Option<f64>> {
        Ok(self.prices.lock()?.get(ticker).copied())
    }

    /// Record `price` as the last price for `ticker`.
    pub fn update(&self, ticker: &str, price: f64) -> Result<()> {
        self.prices.lock()?.insert(ticker.to_string(), price);
        Ok(())
    }
}

/// Calculate the next synthetic price using a small random walk around `current_price`.
///
/// The change is sampled uniformly from `[-1%, +1%]`, rounded to cents and clamped to
/// a minimum positive value.
pub fn next_price(current_price: f64) -> f64 {
    let mut rng = rand::rng();
    let change: f64 = rng.random_range(-0.01..0.01);
    let new_price = (current_price * (1.0 + change) * 100.0).round() / 100.0;
    new_price.max(0.01)
}

/// Handle to the running generator thread.
pub struct MarketDataGenerator {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl MarketDataGenerator {
    /// Declare the market data exchange and start publishing quotes for `stocks`
    /// every `interval`.
    pub fn start(
        broker: Broker,
        stocks: Vec<Stock>,
        interval: Duration,
        book: PriceBook,
    ) -> Result<Self> {
        broker.declare_exchange(&Exchange::topic(MARKET_DATA_EXCHANGE, false, false))?;

        let mut rng = rand::rng();
        for stock in &stocks {
            let seed: f64 = rng.random_range(20.0..200.0);
            book.update(&stock.ticker, (seed * 100.0).round() / 100.0)?;
        }

        let (stop_tx, stop_rx) = unbounded::<()>();
        let handle = thread::spawn(move || {
            info!(
                "Market data generator started for {} stocks (Thread ID: {:?})",
                stocks.len(),
                thread::current().id()
            );
            loop {
                for stock in &stocks {
                    if let Err(e) = publish_tick(&broker, &book, stock) {
                        warn!("Failed to publish quote for {}: {}", stock.ticker, e);
                    }
                }
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    _ => break,
                }
            }
            info!("Market data generator stopped");
        });

        Ok(Self {
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Stop publishing and wait for the thread to exit.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.stop_tx.send(());
            let _ = handle.join();
        }
    }
}

impl Drop for MarketDataGenerator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn publish_tick(broker: &Broker, book: &PriceBook, stock: &Stock) -> Result<()> {
    let current = book.price(&stock.ticker)?.unwrap_or(100.0);
    let quote = Quote::new(stock.clone(), next_price(current));
    book.update(&stock.ticker, quote.price)?;

    let message = Message::encode(MARKET_DATA_EXCHANGE, &quote.routing_key(), &quote)?;
    let routed = broker.publish(message)?;
    debug!("{} routed to {} queue(s)", quote.render(), routed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trader_common::amqp::{Binding, Queue};
    use trader_common::stock::StockExchange;
    use trader_common::topology::MARKET_DATA_QUEUE;

    #[test]
    fn next_price_stays_within_one_percent() {
        for _ in 0..1000 {
            let price = next_price(100.0);
            assert!((99.0..=101.0).contains(&price), "price out of range: {}", price);
        }
        assert!(next_price(0.0) >= 0.01);
    }

    #[test]
    fn publishes_quotes_to_bound_queue() {
        let broker = Broker::new();
        let book = PriceBook::new();
        let mut generator = MarketDataGenerator::start(
            broker.clone(),
            vec![
                Stock::new("MSFT", StockExchange::Nasdaq),
                Stock::new("IBM", StockExchange::Nyse),
            ],
            Duration::from_millis(10),
            book.clone(),
        )
        .unwrap();

        broker.declare_queue(&Queue::new(MARKET_DATA_QUEUE)).unwrap();
        broker
            .declare_binding(&Binding::new(
                MARKET_DATA_QUEUE,
                MARKET_DATA_EXCHANGE,
                "app.stock.quotes.nyse.*",
            ))
            .unwrap();

        let rx = broker.consumer(MARKET_DATA_QUEUE).unwrap();
        let message = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        generator.stop();

        let quote: Quote = message.decode().unwrap();
        assert_eq!(quote.stock.ticker, "IBM");
        assert!(quote.price >= 0.01);
        assert!(book.price("MSFT").unwrap().is_some());
    }
}
