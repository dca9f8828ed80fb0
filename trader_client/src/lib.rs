//! Stock trader client core.
//!
//! - `binding` — `BindingManager`, which keeps the market data queue bound to one
//!   routing pattern at a time.
//! - `display` — `DisplayBuffer`, the bounded newest-first quote feed.
//! - `ui` — `UiContext`/`UiHandle`, the single-consumer task queue that owns UI state.
//! - `sink` — delivery-thread callbacks (`QuoteSink`, `TradeResponseHandler`,
//!   `MessageDispatcher`) that marshal onto the UI context.
//! - `controller` — `StockController`, which publishes trade requests.
//! - `form` — `StockForm`, the headless trading form and its actions.
//! - `console` — line commands that drive the form.
#![warn(missing_docs)]
pub mod binding;
pub mod console;
pub mod controller;
pub mod display;
pub mod form;
pub mod sink;
pub mod ui;

pub use binding::{BindingManager, RebindOutcome, SubscriptionState};
pub use display::DisplayBuffer;
pub use form::StockForm;
pub use ui::{UiContext, UiHandle};
