//! Broker model and the interfaces the client and the broker meet at.
//!
//! The model mirrors AMQP 0-9-1: messages are published to an *exchange* with a
//! *routing key*; the exchange forwards them to every *queue* whose *binding*
//! matches. Bodies are JSON, tagged with a type id so consumers can tell payloads
//! apart.
//!
//! Traits:
//! - [`BrokerAdmin`] — declare/remove topology.
//! - [`MessagePublisher`] — publish a message.
//! - [`MessageHandler`] — callback invoked per delivered message.
//! - [`Lifecycle`] — start/stop control of a delivery container.

use serde::Serialize;
use serde::de::DeserializeOwned;
use strum_macros::{Display, EnumString};

use crate::error::TraderError;
use crate::result::Result;

/// Routing behaviour of an exchange.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Display, EnumString, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum ExchangeKind {
    Topic,
    Direct,
    Fanout,
}

/// Exchange declaration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Exchange {
    /// Exchange name.
    pub name: String,
    /// Routing behaviour.
    pub kind: ExchangeKind,
    /// Survives a broker restart.
    pub durable: bool,
    /// Deleted once the last binding is removed.
    pub auto_delete: bool,
}

impl Exchange {
    /// Topic exchange declaration.
    pub fn topic(name: &str, durable: bool, auto_delete: bool) -> Self {
        Exchange {
            name: String::from(name),
            kind: ExchangeKind::Topic,
            durable,
            auto_delete,
        }
    }
}

/// Queue declaration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Queue {
    /// Queue name.
    pub name: String,
    /// Survives a broker restart.
    pub durable: bool,
    /// Restricted to the declaring connection.
    pub exclusive: bool,
    /// Deleted once the last consumer goes away.
    pub auto_delete: bool,
}

impl Queue {
    /// Durable, shared, non-auto-delete queue.
    pub fn new(name: &str) -> Self {
        Queue {
            name: String::from(name),
            durable: true,
            exclusive: false,
            auto_delete: false,
        }
    }
}

/// Routing rule linking a queue to an exchange under a key pattern.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Binding {
    /// Destination queue.
    pub queue: String,
    /// Source exchange.
    pub exchange: String,
    /// Routing key or pattern.
    pub routing_key: String,
}

impl Binding {
    /// Binds `queue` to `exchange` with `routing_key`.
    pub fn new(queue: &str, exchange: &str, routing_key: &str) -> Self {
        Binding {
            queue: String::from(queue),
            exchange: String::from(exchange),
            routing_key: String::from(routing_key),
        }
    }
}

/// Message metadata.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct MessageProperties {
    /// Name of the payload type carried in the body.
    pub type_id: String,
    /// Queue a reply should be sent to.
    pub reply_to: Option<String>,
}

/// A message as published and delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Exchange the message was published to.
    pub exchange: String,
    /// Routing key the message was published with.
    pub routing_key: String,
    /// Metadata.
    pub properties: MessageProperties,
    /// JSON body.
    pub body: Vec<u8>,
}

/// A type that travels as a JSON message body.
pub trait Payload: Serialize + DeserializeOwned {
    /// Type id written to [`MessageProperties::type_id`].
    const TYPE_ID: &'static str;
}

impl Message {
    /// Encode `payload` into a message addressed to `exchange` with `routing_key`.
    pub fn encode<P: Payload>(exchange: &str, routing_key: &str, payload: &P) -> Result<Self> {
        Ok(Message {
            exchange: String::from(exchange),
            routing_key: String::from(routing_key),
            properties: MessageProperties {
                type_id: String::from(P::TYPE_ID),
                reply_to: None,
            },
            body: serde_json::to_vec(payload)?,
        })
    }

    /// Sets the reply-to queue.
    pub fn with_reply_to(mut self, queue: &str) -> Self {
        self.properties.reply_to = Some(String::from(queue));
        self
    }

    /// Decode the body as `P`, checking the type id first.
    pub fn decode<P: Payload>(&self) -> Result<P> {
        if self.properties.type_id != P::TYPE_ID {
            return Err(TraderError::UnexpectedMessageType {
                expected: String::from(P::TYPE_ID),
                actual: self.properties.type_id.clone(),
            });
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Administrative interface of the broker.
pub trait BrokerAdmin: Send + Sync {
    /// Create the exchange if it does not exist.
    fn declare_exchange(&self, exchange: &Exchange) -> Result<()>;
    /// Create the queue if it does not exist.
    fn declare_queue(&self, queue: &Queue) -> Result<()>;
    /// Install a binding.
    fn declare_binding(&self, binding: &Binding) -> Result<()>;
    /// Remove a binding.
    fn remove_binding(&self, binding: &Binding) -> Result<()>;
}

/// Publishing side of the broker.
pub trait MessagePublisher: Send + Sync {
    /// Route `message` through its exchange. Returns the number of queues it landed on.
    fn publish(&self, message: Message) -> Result<usize>;
}

/// Callback invoked for every message delivered to a consumed queue.
pub trait MessageHandler: Send + Sync {
    /// Handle one delivery. Errors are logged by the container, never retried.
    fn on_message(&self, message: &Message) -> Result<()>;
}

/// Start/stop control of a message listener container.
pub trait Lifecycle: Send {
    /// Begin consuming. Starting a running container is a no-op.
    fn start(&mut self) -> Result<()>;
    /// Stop consuming and wait for the delivery thread to finish.
    fn stop(&mut self);
    /// Whether the container is currently consuming.
    fn is_running(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::Quote;
    use crate::stock::{Stock, StockExchange};
    use crate::trade::TradeResponse;

    #[test]
    fn decode_checks_type_id() {
        let quote = Quote::new(Stock::new("ORCL", StockExchange::Nasdaq), 12.5);
        let message = Message::encode("x", &quote.routing_key(), &quote).unwrap();
        assert_eq!(message.properties.type_id, "Quote");
        assert_eq!(message.decode::<Quote>().unwrap(), quote);

        match message.decode::<TradeResponse>() {
            Err(TraderError::UnexpectedMessageType { expected, actual }) => {
                assert_eq!(expected, "TradeResponse");
                assert_eq!(actual, "Quote");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn reply_to_is_carried_in_properties() {
        let message = Message::encode("", "q", &TradeResponse::default())
            .unwrap()
            .with_reply_to("app.stock.joe");
        assert_eq!(message.properties.reply_to.as_deref(), Some("app.stock.joe"));
    }
}
