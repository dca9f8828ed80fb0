//! Stock identity shared between the market data publisher and the client.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Listing venue of a stock. Rendered lowercase, as it appears in routing keys.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, EnumString, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StockExchange {
    Nasdaq,
    Nyse,
}

/// A ticker symbol together with the exchange it trades on.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct Stock {
    /// Ticker symbol, e.g. `MSFT`.
    pub ticker: String,
    /// Exchange of origin.
    pub exchange: StockExchange,
}

impl Stock {
    /// Creates a new stock listed on `exchange`.
    pub fn new(ticker: &str, exchange: StockExchange) -> Self {
        Stock {
            ticker: String::from(ticker),
            exchange,
        }
    }

    /// Stocks published by the demo market data feed.
    pub fn default_listing() -> Vec<Stock> {
        let nasdaq = ["MSFT", "AAPL", "ORCL", "CSCO", "INTC"];
        let nyse = ["IBM", "GE", "JPM", "KO", "DIS"];
        nasdaq
            .iter()
            .map(|t| Stock::new(t, StockExchange::Nasdaq))
            .chain(nyse.iter().map(|t| Stock::new(t, StockExchange::Nyse)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_renders_lowercase_and_parses_any_case() {
        assert_eq!(StockExchange::Nasdaq.to_string(), "nasdaq");
        assert_eq!("NYSE".parse::<StockExchange>().unwrap(), StockExchange::Nyse);
    }

    #[test]
    fn default_listing_covers_both_exchanges() {
        let listing = Stock::default_listing();
        assert!(listing.iter().any(|s| s.exchange == StockExchange::Nasdaq));
        assert!(listing.iter().any(|s| s.exchange == StockExchange::Nyse));
    }
}
