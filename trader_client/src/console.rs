//! Line-oriented front end standing in for the trading window's controls.
//!
//! Each input line is parsed into a `ConsoleCommand` on the reader thread and
//! posted to the UI thread, where it runs against the `StockForm`.
//!
//! ```text
//! apply app.stock.quotes.nyse.*   rebind and clear the feed
//! stop | start | clear            buttons
//! buy MSFT | sell IBM             trade request with the form's quantity/account
//! account ACCT-9 | quantity 10    edit fields
//! show                            print the feed
//! quit                            unsubscribe and exit
//! ```

use std::io::BufRead;
use std::str::FromStr;
use std::thread::{self, JoinHandle};

use log::{info, warn};
use strum_macros::EnumString;
use trader_common::{Result, TraderError};

use crate::form::StockForm;
use crate::ui::UiHandle;

#[derive(EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
enum Verb {
    Apply,
    Stop,
    Start,
    Clear,
    Buy,
    Sell,
    Account,
    Quantity,
    Show,
    Quit,
}

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Rebind to the routing key; an absent key unsubscribes.
    Apply(String),
    /// Unsubscribe.
    Stop,
    /// Start the listener and enable trading.
    Start,
    /// Clear the feed.
    Clear,
    /// Trade request for a ticker; `true` buys.
    Trade {
        /// Ticker symbol.
        ticker: String,
        /// Buy or sell.
        buy: bool,
    },
    /// Set the account field.
    Account(String),
    /// Set the quantity field.
    Quantity(u32),
    /// Print the feed.
    Show,
    /// Close the form and exit.
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = TraderError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| TraderError::Format(String::from("empty command")))?;
        let verb = Verb::from_str(verb)
            .map_err(|_| TraderError::Format(format!("unknown command: {}", verb)))?;
        let argument = words.next().map(str::to_string);
        let required = |name: &str| {
            argument
                .clone()
                .ok_or_else(|| TraderError::Format(format!("missing {}", name)))
        };

        Ok(match verb {
            Verb::Apply => ConsoleCommand::Apply(argument.clone().unwrap_or_default()),
            Verb::Stop => ConsoleCommand::Stop,
            Verb::Start => ConsoleCommand::Start,
            Verb::Clear => ConsoleCommand::Clear,
            Verb::Buy => ConsoleCommand::Trade {
                ticker: required("ticker")?,
                buy: true,
            },
            Verb::Sell => ConsoleCommand::Trade {
                ticker: required("ticker")?,
                buy: false,
            },
            Verb::Account => ConsoleCommand::Account(required("account")?),
            Verb::Quantity => {
                let quantity = required("quantity")?;
                ConsoleCommand::Quantity(quantity.parse().map_err(|e| {
                    TraderError::Format(format!("invalid quantity {}: {}", quantity, e))
                })?)
            }
            Verb::Show => ConsoleCommand::Show,
            Verb::Quit => ConsoleCommand::Quit,
        })
    }
}

impl ConsoleCommand {
    /// Run the command against the form.
    pub fn execute(self, form: &mut StockForm) {
        match self {
            ConsoleCommand::Apply(key) => {
                form.apply(&key);
            }
            ConsoleCommand::Stop => {
                form.stop();
            }
            ConsoleCommand::Start => {
                form.start();
            }
            ConsoleCommand::Clear => form.clear(),
            ConsoleCommand::Trade { ticker, buy } => form.send_trade_request(&ticker, buy),
            ConsoleCommand::Account(account) => form.set_account(&account),
            ConsoleCommand::Quantity(quantity) => form.set_quantity(quantity),
            ConsoleCommand::Show => {
                info!(
                    "Subscription: {:?} | account {} | quantity {} | listening {}",
                    form.subscription(),
                    form.account(),
                    form.quantity(),
                    form.listening()
                );
                for line in form.market_data().iter() {
                    println!("{}", line);
                }
            }
            ConsoleCommand::Quit => form.close(),
        }
    }
}

/// Post `command` to the UI thread; `Quit` also ends the UI loop.
pub fn post(ui: &UiHandle<StockForm>, command: ConsoleCommand) -> Result<()> {
    let quit = command == ConsoleCommand::Quit;
    ui.invoke(move |form: &mut StockForm| command.execute(form))?;
    if quit {
        ui.exit()?;
    }
    Ok(())
}

/// Spawn a thread reading commands from `input` until `quit` or end of input.
pub fn spawn_reader<R>(input: R, ui: UiHandle<StockForm>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read command: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<ConsoleCommand>() {
                Ok(command) => command,
                Err(e) => {
                    warn!("{}", e);
                    continue;
                }
            };
            let quit = command == ConsoleCommand::Quit;
            if post(&ui, command).is_err() || quit {
                return;
            }
        }
        info!("Input closed. Shutting down client...");
        let _ = post(&ui, ConsoleCommand::Quit);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            "apply app.stock.quotes.nyse.*".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Apply(String::from("app.stock.quotes.nyse.*"))
        );
        assert_eq!(
            "APPLY".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Apply(String::new())
        );
        assert_eq!(
            "sell ibm".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Trade {
                ticker: String::from("ibm"),
                buy: false
            }
        );
        assert_eq!(
            "quantity 10".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Quantity(10)
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!("".parse::<ConsoleCommand>().is_err());
        assert!("launch".parse::<ConsoleCommand>().is_err());
        assert!("buy".parse::<ConsoleCommand>().is_err());
        assert!("quantity many".parse::<ConsoleCommand>().is_err());
    }
}
