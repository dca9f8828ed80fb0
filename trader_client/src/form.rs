//! Headless stock trading form.
//!
//! `StockForm` holds everything the trading window shows: the routing key,
//! account and quantity fields, the pending-request ticker field, and the market
//! data feed. It also owns the binding manager, the trade controller, and the
//! listener container. It lives on the UI thread; delivery threads reach it
//! only through `UiHandle` tasks.

use log::{error, info, warn};
use trader_common::amqp::Lifecycle;
use trader_common::topology::{
    DEFAULT_ACCOUNT, DEFAULT_QUANTITY, DEFAULT_ROUTING_KEY, REQUEST_PENDING,
};
use trader_common::{Quote, TradeResponse};

use crate::binding::{BindingManager, RebindOutcome, SubscriptionState};
use crate::controller::StockController;
use crate::display::DisplayBuffer;
use crate::sink::{MarketDataView, TradeView};

/// Severity of a modal dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    /// Informational message.
    Info,
    /// Error message.
    Error,
}

/// A modal message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    /// Severity.
    pub kind: DialogKind,
    /// Window title.
    pub title: String,
    /// Message body.
    pub text: String,
}

impl Dialog {
    /// Confirmation or error dialog for a trade response.
    pub fn for_trade(trade: &TradeResponse) -> Self {
        if trade.error {
            Dialog {
                kind: DialogKind::Error,
                title: String::from("Error"),
                text: format!(
                    "Error processing {} shares of {}:\n{}",
                    trade.quantity, trade.ticker, trade.error_message
                ),
            }
        } else {
            Dialog {
                kind: DialogKind::Info,
                title: String::from("Trade Completed"),
                text: format!(
                    "Confirmed. {} {} shares of {}\nfor a total cost of {} ",
                    trade.side_label(),
                    trade.quantity,
                    trade.ticker,
                    trade.price
                ),
            }
        }
    }
}

/// Presents modal dialogs.
pub trait Dialogs {
    /// Show `dialog` to the user.
    fn show(&mut self, dialog: Dialog);
}

/// Presents dialogs through the log.
pub struct LogDialogs;

impl Dialogs for LogDialogs {
    fn show(&mut self, dialog: Dialog) {
        let text = dialog.text.replace('\n', " ");
        match dialog.kind {
            DialogKind::Info => info!("[{}] {}", dialog.title, text.trim_end()),
            DialogKind::Error => error!("[{}] {}", dialog.title, text.trim_end()),
        }
    }
}

/// Trading form state and actions.
pub struct StockForm {
    bindings: BindingManager,
    controller: StockController,
    listener: Box<dyn Lifecycle>,
    dialogs: Box<dyn Dialogs>,
    market_data: DisplayBuffer,
    routing_key: String,
    account: String,
    quantity: u32,
    trade_ticker: String,
    trading_enabled: bool,
}

impl StockForm {
    /// Form wired to its collaborators; call `load` before use.
    pub fn new(
        bindings: BindingManager,
        controller: StockController,
        listener: Box<dyn Lifecycle>,
        dialogs: Box<dyn Dialogs>,
    ) -> Self {
        Self {
            bindings,
            controller,
            listener,
            dialogs,
            market_data: DisplayBuffer::new(),
            routing_key: String::new(),
            account: String::new(),
            quantity: 0,
            trade_ticker: String::new(),
            trading_enabled: false,
        }
    }

    /// Fill in defaults, declare the market data topology and subscribe with the
    /// default routing key. Trading stays disabled until `start`.
    pub fn load(&mut self) -> RebindOutcome {
        self.account = String::from(DEFAULT_ACCOUNT);
        self.quantity = DEFAULT_QUANTITY;
        self.routing_key = String::from(DEFAULT_ROUTING_KEY);
        self.trading_enabled = false;

        let mut faults = self.bindings.declare_topology();
        let mut outcome = self.rebind(DEFAULT_ROUTING_KEY);
        faults.append(&mut outcome.faults);
        outcome.faults = faults;
        outcome
    }

    /// Apply button: rebind to `routing_key` and clear the feed.
    pub fn apply(&mut self, routing_key: &str) -> RebindOutcome {
        self.routing_key = routing_key.to_string();
        let outcome = self.rebind(routing_key);
        self.market_data.clear();
        outcome
    }

    /// Stop button: drop the subscription.
    pub fn stop(&mut self) -> RebindOutcome {
        self.rebind("")
    }

    /// Start button: make sure the listener runs, enable trading and resubscribe
    /// with the routing key field.
    pub fn start(&mut self) -> RebindOutcome {
        if !self.listener.is_running() {
            if let Err(e) = self.listener.start() {
                error!("Failed to start message listener: {}", e);
            }
        }
        self.trading_enabled = true;
        let routing_key = self.routing_key.clone();
        self.rebind(&routing_key)
    }

    /// Clear button.
    pub fn clear(&mut self) {
        self.market_data.clear();
    }

    /// Send Trade Request button. Ignored while trading is disabled.
    pub fn send_trade_request(&mut self, ticker: &str, buy_request: bool) {
        if !self.trading_enabled {
            warn!("Trading is disabled; press start first");
            return;
        }
        match self
            .controller
            .send_trade_request(ticker, self.quantity, &self.account, buy_request)
        {
            Ok(_) => {
                self.trade_ticker = String::from(REQUEST_PENDING);
                info!("Sent trade request.");
            }
            Err(e) => error!("Failed to send trade request for {}: {}", ticker, e),
        }
    }

    /// Form closing: unsubscribe and stop consuming.
    pub fn close(&mut self) {
        self.rebind("");
        self.listener.stop();
    }

    /// Account field.
    pub fn set_account(&mut self, account: &str) {
        self.account = account.to_string();
    }

    /// Quantity field.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Market data feed, newest first.
    pub fn market_data(&self) -> &DisplayBuffer {
        &self.market_data
    }

    /// Routing key field.
    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    /// Account field.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Quantity field.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Ticker field of the trade panel.
    pub fn trade_ticker(&self) -> &str {
        &self.trade_ticker
    }

    /// Whether the trade panel is enabled.
    pub fn trading_enabled(&self) -> bool {
        self.trading_enabled
    }

    /// Whether the listener container is consuming.
    pub fn listening(&self) -> bool {
        self.listener.is_running()
    }

    /// Current subscription.
    pub fn subscription(&self) -> SubscriptionState {
        self.bindings.state()
    }

    fn rebind(&mut self, routing_key: &str) -> RebindOutcome {
        let outcome = self.bindings.rebind(routing_key);
        if let SubscriptionState::Bound(key) = &outcome.state {
            self.routing_key = key.clone();
        }
        outcome
    }
}

impl MarketDataView for StockForm {
    fn update_market_data(&mut self, quote: &Quote) {
        self.market_data.update_market_data(quote);
    }
}

impl TradeView for StockForm {
    fn update_trade(&mut self, trade: &TradeResponse) {
        self.trade_ticker.clear();
        self.dialogs.show(Dialog::for_trade(trade));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_dialog_names_quantity_ticker_and_reason() {
        let trade = TradeResponse {
            error: true,
            quantity: 10,
            ticker: String::from("IBM"),
            error_message: String::from("rejected"),
            ..TradeResponse::default()
        };
        let dialog = Dialog::for_trade(&trade);
        assert_eq!(dialog.kind, DialogKind::Error);
        assert_eq!(dialog.title, "Error");
        assert!(dialog.text.contains("10 shares of IBM"));
        assert!(dialog.text.contains("rejected"));
    }

    #[test]
    fn confirmation_dialog_names_side_and_price() {
        let trade = TradeResponse {
            buy_request: true,
            quantity: 5,
            ticker: String::from("MSFT"),
            price: 101.25,
            ..TradeResponse::default()
        };
        let dialog = Dialog::for_trade(&trade);
        assert_eq!(dialog.kind, DialogKind::Info);
        assert_eq!(dialog.title, "Trade Completed");
        assert!(dialog.text.contains("Purchased 5 shares of MSFT"));
        assert!(dialog.text.contains("101.25"));
    }

    #[test]
    fn sale_confirmation_says_sold() {
        let trade = TradeResponse {
            quantity: 3,
            ticker: String::from("GE"),
            price: 30.0,
            ..TradeResponse::default()
        };
        assert!(Dialog::for_trade(&trade).text.contains("Sold 3 shares of GE"));
    }
}
