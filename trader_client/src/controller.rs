//! Publishing trade requests to the trade desk.
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::info;
use trader_common::amqp::{Message, MessagePublisher};
use trader_common::topology::{DEFAULT_EXCHANGE, TRADE_REQUEST_QUEUE, TRADE_RESPONSE_QUEUE};
use trader_common::{Result, TradeRequest};

/// Builds trade requests and sends them to the request queue.
pub struct StockController {
    publisher: Arc<dyn MessagePublisher>,
    next_id: AtomicU64,
}

impl StockController {
    /// Controller publishing through `publisher`.
    pub fn new(publisher: Arc<dyn MessagePublisher>) -> Self {
        Self {
            publisher,
            next_id: AtomicU64::new(1),
        }
    }

    /// Send a market order. Returns the request as published.
    pub fn send_trade_request(
        &self,
        ticker: &str,
        quantity: u32,
        account: &str,
        buy_request: bool,
    ) -> Result<TradeRequest> {
        let request = TradeRequest {
            request_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            ticker: ticker.trim().to_uppercase(),
            quantity,
            account: account.to_string(),
            buy_request,
            price: 0.0,
            reply_to: String::from(TRADE_RESPONSE_QUEUE),
        };
        let message = Message::encode(DEFAULT_EXCHANGE, TRADE_REQUEST_QUEUE, &request)?
            .with_reply_to(TRADE_RESPONSE_QUEUE);

        info!(
            "Sending trade request {}: {} {} x{} for {}",
            request.request_id,
            if buy_request { "BUY" } else { "SELL" },
            request.ticker,
            request.quantity,
            request.account
        );
        self.publisher.publish(message)?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture(Mutex<Vec<Message>>);

    impl MessagePublisher for Capture {
        fn publish(&self, message: Message) -> Result<usize> {
            self.0.lock()?.push(message);
            Ok(1)
        }
    }

    #[test]
    fn publishes_to_request_queue_with_reply_to() {
        let capture = Arc::new(Capture::default());
        let controller = StockController::new(capture.clone());

        let first = controller.send_trade_request(" msft ", 5, "ACCT-123", true).unwrap();
        let second = controller.send_trade_request("IBM", 1, "ACCT-123", false).unwrap();
        assert_eq!(first.ticker, "MSFT");
        assert!(second.request_id > first.request_id);

        let sent = capture.0.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].exchange, DEFAULT_EXCHANGE);
        assert_eq!(sent[0].routing_key, TRADE_REQUEST_QUEUE);
        assert_eq!(sent[0].properties.reply_to.as_deref(), Some(TRADE_RESPONSE_QUEUE));
        assert_eq!(sent[0].decode::<TradeRequest>().unwrap(), first);
    }
}
