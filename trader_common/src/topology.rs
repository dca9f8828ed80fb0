//! Fixed broker topology and client defaults shared by both sides.

/// Topic exchange carrying market data quotes.
pub const MARKET_DATA_EXCHANGE: &str = "app.stock.marketdata";
/// Queue the client binds to the market data exchange.
pub const MARKET_DATA_QUEUE: &str = "app.stock.marketdata";
/// Prefix of every quote routing key: `<prefix>.<exchange>.<ticker>`.
pub const QUOTE_KEY_PREFIX: &str = "app.stock.quotes";
/// Routing pattern the client subscribes with on startup.
pub const DEFAULT_ROUTING_KEY: &str = "app.stock.quotes.nasdaq.*";
/// Queue the trade desk consumes trade requests from.
pub const TRADE_REQUEST_QUEUE: &str = "app.stock.request";
/// Queue trade responses are returned on.
pub const TRADE_RESPONSE_QUEUE: &str = "app.stock.joe";
/// The nameless exchange that routes directly to the queue named by the routing key.
pub const DEFAULT_EXCHANGE: &str = "";
/// Account prefilled in the trade form.
pub const DEFAULT_ACCOUNT: &str = "ACCT-123";
/// Quantity prefilled in the trade form.
pub const DEFAULT_QUANTITY: u32 = 1;
/// Text shown in the ticker field while a trade request is in flight.
pub const REQUEST_PENDING: &str = "Request Pending...";
