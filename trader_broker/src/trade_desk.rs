//! Trade desk: fills trade requests against the price book.
//!
//! The desk consumes `app.stock.request`, prices every `TradeRequest` from the
//! shared `PriceBook` and replies with a `TradeResponse` on the default exchange,
//! addressed to the request's reply-to queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{info, warn};
use trader_common::amqp::{BrokerAdmin, Lifecycle, Message, MessageHandler, MessagePublisher, Queue};
use trader_common::topology::{DEFAULT_EXCHANGE, TRADE_REQUEST_QUEUE};
use trader_common::{Result, TradeRequest, TradeResponse};

use crate::broker::Broker;
use crate::generator::PriceBook;
use crate::listener::ListenerContainer;

/// Prices requests and publishes the responses.
pub struct Executor {
    broker: Broker,
    book: PriceBook,
    confirmations: AtomicU64,
}

impl Executor {
    /// Executor filling against `book` and replying through `broker`.
    pub fn new(broker: Broker, book: PriceBook) -> Self {
        Self {
            broker,
            book,
            confirmations: AtomicU64::new(1),
        }
    }

    /// Price `request` and build the response. Rejections are reported in the
    /// response, never as `Err`.
    pub fn execute(&self, request: &TradeRequest) -> Result<TradeResponse> {
        let mut response = TradeResponse {
            request_id: request.request_id,
            ticker: request.ticker.clone(),
            quantity: request.quantity,
            account: request.account.clone(),
            buy_request: request.buy_request,
            ..TradeResponse::default()
        };

        if request.quantity == 0 {
            response.error = true;
            response.error_message = String::from("Quantity must be greater than zero");
            return Ok(response);
        }
        let Some(unit_price) = self.book.price(&request.ticker)? else {
            response.error = true;
            response.error_message = format!("Unknown ticker {}", request.ticker);
            return Ok(response);
        };

        response.price = (unit_price * f64::from(request.quantity) * 100.0).round() / 100.0;
        response.confirmation_number = format!(
            "TR-{:06}",
            self.confirmations.fetch_add(1, Ordering::SeqCst)
        );
        Ok(response)
    }
}

impl MessageHandler for Executor {
    fn on_message(&self, message: &Message) -> Result<()> {
        let request: TradeRequest = message.decode()?;
        let reply_to = message
            .properties
            .reply_to
            .clone()
            .unwrap_or_else(|| request.reply_to.clone());
        info!(
            "Trade request {}: {} {} x{} for {}",
            request.request_id,
            if request.buy_request { "BUY" } else { "SELL" },
            request.ticker,
            request.quantity,
            request.account
        );

        let response = self.execute(&request)?;
        if response.error {
            warn!("Rejected request {}: {}", request.request_id, response.error_message);
        }
        let routed = self
            .broker
            .publish(Message::encode(DEFAULT_EXCHANGE, &reply_to, &response)?)?;
        if routed == 0 {
            warn!("No queue named {} for response {}", reply_to, request.request_id);
        }
        Ok(())
    }
}

/// Running trade desk.
pub struct TradeDesk {
    container: ListenerContainer,
}

impl TradeDesk {
    /// Declare the request queue and start consuming it.
    pub fn start(broker: Broker, book: PriceBook) -> Result<Self> {
        broker.declare_queue(&Queue::new(TRADE_REQUEST_QUEUE))?;
        let executor = Arc::new(Executor::new(broker.clone(), book));
        let mut container = ListenerContainer::new(broker, &[TRADE_REQUEST_QUEUE], executor);
        container.start()?;
        Ok(Self { container })
    }

    /// Stop consuming requests.
    pub fn stop(&mut self) {
        self.container.stop();
    }
}
