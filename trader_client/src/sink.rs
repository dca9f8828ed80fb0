//! Delivery-thread callbacks.
//!
//! Broker deliveries arrive on the listener container's thread. Nothing here
//! touches UI state directly: each callback posts a task through `UiHandle`, and
//! the task mutates the view on the UI thread.

use log::debug;
use trader_common::amqp::{Message, MessageHandler, Payload};
use trader_common::{Quote, Result, TradeResponse, TraderError};

use crate::display::DisplayBuffer;
use crate::ui::UiHandle;

/// UI state that shows market data.
pub trait MarketDataView {
    /// Show one inbound quote.
    fn update_market_data(&mut self, quote: &Quote);
}

/// UI state that reports trade outcomes.
pub trait TradeView {
    /// Report one trade response.
    fn update_trade(&mut self, trade: &TradeResponse);
}

impl MarketDataView for DisplayBuffer {
    fn update_market_data(&mut self, quote: &Quote) {
        self.push(quote.render());
    }
}

/// Forwards quotes onto the UI thread.
pub struct QuoteSink<S> {
    ui: UiHandle<S>,
}

impl<S: MarketDataView + 'static> QuoteSink<S> {
    /// Sink posting to `ui`.
    pub fn new(ui: UiHandle<S>) -> Self {
        Self { ui }
    }

    /// Called per delivered quote. Never blocks on the UI thread.
    pub fn on_quote(&self, quote: Quote) -> Result<()> {
        self.ui.invoke(move |view: &mut S| view.update_market_data(&quote))
    }
}

/// Forwards trade responses onto the UI thread.
pub struct TradeResponseHandler<S> {
    ui: UiHandle<S>,
}

impl<S: TradeView + 'static> TradeResponseHandler<S> {
    /// Handler posting to `ui`.
    pub fn new(ui: UiHandle<S>) -> Self {
        Self { ui }
    }

    /// Called per delivered trade response.
    pub fn on_trade_response(&self, trade: TradeResponse) -> Result<()> {
        self.ui.invoke(move |view: &mut S| view.update_trade(&trade))
    }
}

/// Decodes deliveries by type id and routes them to the matching callback.
pub struct MessageDispatcher<S> {
    quotes: QuoteSink<S>,
    trades: TradeResponseHandler<S>,
}

impl<S: MarketDataView + TradeView + 'static> MessageDispatcher<S> {
    /// Dispatcher posting to `ui`.
    pub fn new(ui: UiHandle<S>) -> Self {
        Self {
            quotes: QuoteSink::new(ui.clone()),
            trades: TradeResponseHandler::new(ui),
        }
    }
}

impl<S: MarketDataView + TradeView + 'static> MessageHandler for MessageDispatcher<S> {
    fn on_message(&self, message: &Message) -> Result<()> {
        let type_id = message.properties.type_id.as_str();
        if type_id == Quote::TYPE_ID {
            self.quotes.on_quote(message.decode()?)
        } else if type_id == TradeResponse::TYPE_ID {
            debug!("Trade response received on {}", message.routing_key);
            self.trades.on_trade_response(message.decode()?)
        } else {
            Err(TraderError::UnexpectedMessageType {
                expected: format!("{} or {}", Quote::TYPE_ID, TradeResponse::TYPE_ID),
                actual: type_id.to_string(),
            })
        }
    }
}
