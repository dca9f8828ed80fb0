//! Trade request/response payloads exchanged with the trade desk.

use serde::{Deserialize, Serialize};

use crate::amqp::Payload;

/// Order submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    /// Client-assigned id echoed back in the response.
    pub request_id: u64,
    /// Ticker symbol to trade.
    pub ticker: String,
    /// Number of shares.
    pub quantity: u32,
    /// Account the trade is booked against.
    pub account: String,
    /// `true` to buy, `false` to sell.
    pub buy_request: bool,
    /// Limit price; `0.0` means fill at market.
    pub price: f64,
    /// Queue the response should be delivered to.
    pub reply_to: String,
}

impl Payload for TradeRequest {
    const TYPE_ID: &'static str = "TradeRequest";
}

/// Confirmation or rejection of a trade request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TradeResponse {
    /// Id of the originating request.
    pub request_id: u64,
    /// Ticker symbol traded.
    pub ticker: String,
    /// Number of shares.
    pub quantity: u32,
    /// Account the trade was booked against.
    pub account: String,
    /// `true` for a purchase, `false` for a sale.
    pub buy_request: bool,
    /// Total cost of the fill.
    pub price: f64,
    /// Set when the trade was rejected.
    pub error: bool,
    /// Reason for the rejection; empty on success.
    pub error_message: String,
    /// Desk confirmation number; empty on error.
    pub confirmation_number: String,
}

impl TradeResponse {
    /// Past-tense verb for the side of the trade.
    pub fn side_label(&self) -> &'static str {
        if self.buy_request { "Purchased" } else { "Sold" }
    }
}

impl Payload for TradeResponse {
    const TYPE_ID: &'static str = "TradeResponse";
}
