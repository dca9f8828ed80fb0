//! Quote data model.
//!
//! A `Quote` is the market data payload published on the topic exchange: the stock
//! (ticker and exchange of origin), its last price, and a millisecond UTC timestamp.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::amqp::Payload;
use crate::stock::Stock;
use crate::topology::QUOTE_KEY_PREFIX;

/// Market quote for a single stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Quoted stock.
    pub stock: Stock,
    /// Last traded price.
    pub price: f64,
    /// UTC timestamp in milliseconds since Unix epoch.
    pub timestamp: u64,
}

impl Quote {
    /// Creates a quote stamped with the current time.
    pub fn new(stock: Stock, price: f64) -> Self {
        Quote {
            stock,
            price,
            timestamp: Utc::now().timestamp_millis() as u64,
        }
    }

    /// Routing key the quote is published under, e.g. `app.stock.quotes.nasdaq.MSFT`.
    pub fn routing_key(&self) -> String {
        format!(
            "{}.{}.{}",
            QUOTE_KEY_PREFIX, self.stock.exchange, self.stock.ticker
        )
    }

    /// Display line for the market data feed: `<exchange>.<ticker> <price>`.
    pub fn render(&self) -> String {
        format!("{}.{} {}", self.stock.exchange, self.stock.ticker, self.price)
    }
}

impl Payload for Quote {
    const TYPE_ID: &'static str = "Quote";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::StockExchange;

    #[test]
    fn renders_exchange_ticker_and_price() {
        let quote = Quote::new(Stock::new("MSFT", StockExchange::Nasdaq), 101.25);
        assert_eq!(quote.render(), "nasdaq.MSFT 101.25");
    }

    #[test]
    fn routing_key_follows_quote_prefix() {
        let quote = Quote::new(Stock::new("IBM", StockExchange::Nyse), 120.0);
        assert_eq!(quote.routing_key(), "app.stock.quotes.nyse.IBM");
    }
}
