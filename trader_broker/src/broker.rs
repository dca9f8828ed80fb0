//! In-memory AMQP-style broker.
//!
//! Every declared queue is an unbounded `crossbeam_channel`; publishing routes a
//! message through its exchange and pushes a copy onto each matching queue.
//! Consumers obtain a `Receiver` clone for the queue and compete for messages.
//!
//! Design notes:
//! - State lives behind one `Arc<Mutex<..>>`; `Broker` is cheap to clone and every
//!   clone sees the same exchanges, queues and bindings.
//! - A message lands on a queue at most once, no matter how many of the queue's
//!   bindings match.
//! - `set_online(false)` makes every call fail with `BrokerUnavailable`, which is
//!   how an unreachable broker is simulated.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, info};
use trader_common::amqp::{
    Binding, BrokerAdmin, Exchange, ExchangeKind, Message, MessagePublisher, Queue,
};
use trader_common::topology::DEFAULT_EXCHANGE;
use trader_common::{Result, TraderError, topic};

struct QueueSlot {
    queue: Queue,
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

#[derive(Default)]
struct BrokerState {
    exchanges: HashMap<String, Exchange>,
    queues: HashMap<String, QueueSlot>,
    bindings: Vec<Binding>,
}

/// Shared handle to an in-memory broker.
#[derive(Clone)]
pub struct Broker {
    state: Arc<Mutex<BrokerState>>,
    online: Arc<AtomicBool>,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl Broker {
    /// Create an empty, reachable broker.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BrokerState::default())),
            online: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Toggle reachability. While offline every operation fails.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        info!("Broker is now {}", if online { "online" } else { "offline" });
    }

    fn ensure_online(&self) -> Result<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TraderError::BrokerUnavailable(String::from(
                "connection refused",
            )))
        }
    }

    /// Receiver side of `queue` for a consumer.
    pub fn consumer(&self, queue: &str) -> Result<Receiver<Message>> {
        self.ensure_online()?;
        let state = self.state.lock()?;
        state
            .queues
            .get(queue)
            .map(|slot| slot.rx.clone())
            .ok_or_else(|| TraderError::QueueNotFound(queue.to_string()))
    }

    /// Bindings currently installed for `queue`.
    pub fn bindings_for(&self, queue: &str) -> Result<Vec<Binding>> {
        let state = self.state.lock()?;
        Ok(state
            .bindings
            .iter()
            .filter(|b| b.queue == queue)
            .cloned()
            .collect())
    }

    /// Number of messages waiting on `queue`.
    pub fn queue_depth(&self, queue: &str) -> Result<usize> {
        let state = self.state.lock()?;
        state
            .queues
            .get(queue)
            .map(|slot| slot.rx.len())
            .ok_or_else(|| TraderError::QueueNotFound(queue.to_string()))
    }

    /// Remove every waiting message from `queue`. Returns how many were dropped.
    pub fn purge(&self, queue: &str) -> Result<usize> {
        let rx = self.consumer(queue)?;
        Ok(rx.try_iter().count())
    }
}

impl BrokerAdmin for Broker {
    fn declare_exchange(&self, exchange: &Exchange) -> Result<()> {
        self.ensure_online()?;
        if exchange.name == DEFAULT_EXCHANGE {
            return Err(TraderError::PreconditionFailed(String::from(
                "the default exchange cannot be redeclared",
            )));
        }
        let mut state = self.state.lock()?;
        match state.exchanges.get(&exchange.name) {
            Some(existing) if existing != exchange => Err(TraderError::PreconditionFailed(
                format!("exchange {} already declared as {:?}", exchange.name, existing),
            )),
            Some(_) => Ok(()),
            None => {
                info!("Declared {} exchange {}", exchange.kind, exchange.name);
                state.exchanges.insert(exchange.name.clone(), exchange.clone());
                Ok(())
            }
        }
    }

    fn declare_queue(&self, queue: &Queue) -> Result<()> {
        self.ensure_online()?;
        let mut state = self.state.lock()?;
        match state.queues.get(&queue.name) {
            Some(slot) if slot.queue != *queue => Err(TraderError::PreconditionFailed(format!(
                "queue {} already declared as {:?}",
                queue.name, slot.queue
            ))),
            Some(_) => Ok(()),
            None => {
                let (tx, rx) = unbounded();
                info!("Declared queue {}", queue.name);
                state.queues.insert(
                    queue.name.clone(),
                    QueueSlot {
                        queue: queue.clone(),
                        tx,
                        rx,
                    },
                );
                Ok(())
            }
        }
    }

    fn declare_binding(&self, binding: &Binding) -> Result<()> {
        self.ensure_online()?;
        topic::validate(&binding.routing_key)?;
        let mut state = self.state.lock()?;
        if binding.exchange == DEFAULT_EXCHANGE || !state.exchanges.contains_key(&binding.exchange)
        {
            return Err(TraderError::ExchangeNotFound(binding.exchange.clone()));
        }
        if !state.queues.contains_key(&binding.queue) {
            return Err(TraderError::QueueNotFound(binding.queue.clone()));
        }
        if !state.bindings.contains(binding) {
            info!(
                "Bound queue {} to {} with {}",
                binding.queue, binding.exchange, binding.routing_key
            );
            state.bindings.push(binding.clone());
        }
        Ok(())
    }

    fn remove_binding(&self, binding: &Binding) -> Result<()> {
        self.ensure_online()?;
        let mut state = self.state.lock()?;
        let before = state.bindings.len();
        state.bindings.retain(|b| b != binding);
        if state.bindings.len() < before {
            info!(
                "Unbound queue {} from {} with {}",
                binding.queue, binding.exchange, binding.routing_key
            );
        }
        Ok(())
    }
}

impl MessagePublisher for Broker {
    fn publish(&self, message: Message) -> Result<usize> {
        self.ensure_online()?;
        let state = self.state.lock()?;

        let targets: Vec<&QueueSlot> = if message.exchange == DEFAULT_EXCHANGE {
            state.queues.get(&message.routing_key).into_iter().collect()
        } else {
            let exchange = state
                .exchanges
                .get(&message.exchange)
                .ok_or_else(|| TraderError::ExchangeNotFound(message.exchange.clone()))?;
            let mut names: Vec<&str> = state
                .bindings
                .iter()
                .filter(|b| b.exchange == exchange.name)
                .filter(|b| match exchange.kind {
                    ExchangeKind::Topic => topic::matches(&b.routing_key, &message.routing_key),
                    ExchangeKind::Direct => b.routing_key == message.routing_key,
                    ExchangeKind::Fanout => true,
                })
                .map(|b| b.queue.as_str())
                .collect();
            names.sort_unstable();
            names.dedup();
            names
                .into_iter()
                .filter_map(|name| state.queues.get(name))
                .collect()
        };

        for slot in &targets {
            slot.tx.send(message.clone())?;
        }
        debug!(
            "Routed {} via {:?} to {} queue(s)",
            message.routing_key,
            message.exchange,
            targets.len()
        );
        Ok(targets.len())
    }
}
