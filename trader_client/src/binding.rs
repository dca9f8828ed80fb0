//! Dynamic topic binding for the market data queue.
//!
//! The `BindingManager` tracks the single routing pattern the market data queue
//! is bound with. `rebind` tears the old binding down before installing the new
//! one, so the queue never receives a message twice through stale bindings the
//! client knows about.
//!
//! Failure policy: admin errors are logged at error level and swallowed. The
//! outcome of every rebind carries the errors it absorbed so callers can inspect
//! them, but nothing is ever propagated as `Err`.
//!
//! The two broker calls are not atomic. If the broker drops between remove and
//! declare, the queue is left unbound and nothing compensates.

use std::sync::Arc;

use log::{error, info};
use trader_common::TraderError;
use trader_common::amqp::{Binding, BrokerAdmin, Exchange, Queue};

/// Client-side view of the market data subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionState {
    /// No binding is tracked.
    Unbound,
    /// Queue is bound with the contained routing pattern.
    Bound(String),
}

/// Result of a rebind: the resulting state and the admin errors swallowed on the way.
#[derive(Debug)]
pub struct RebindOutcome {
    /// Subscription state after the rebind.
    pub state: SubscriptionState,
    /// Errors logged and absorbed during the rebind.
    pub faults: Vec<TraderError>,
}

impl RebindOutcome {
    /// Whether every admin call succeeded.
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Owns the binding between the market data exchange and queue.
pub struct BindingManager {
    admin: Arc<dyn BrokerAdmin>,
    exchange: Exchange,
    queue: Queue,
    current: Option<String>,
}

impl BindingManager {
    /// Manager for `queue` on `exchange`, initially unbound.
    pub fn new(admin: Arc<dyn BrokerAdmin>, exchange: Exchange, queue: Queue) -> Self {
        Self {
            admin,
            exchange,
            queue,
            current: None,
        }
    }

    /// Declare the exchange and queue. Errors are logged and returned, not propagated.
    pub fn declare_topology(&self) -> Vec<TraderError> {
        let mut faults = Vec::new();
        if let Err(e) = self.admin.declare_exchange(&self.exchange) {
            error!("Failed to declare exchange {}: {}", self.exchange.name, e);
            faults.push(e);
        }
        if let Err(e) = self.admin.declare_queue(&self.queue) {
            error!("Failed to declare queue {}: {}", self.queue.name, e);
            faults.push(e);
        }
        faults
    }

    /// Replace the current binding with `routing_key`; an empty key unsubscribes.
    pub fn rebind(&mut self, routing_key: &str) -> RebindOutcome {
        let mut faults = Vec::new();

        if let Some(old) = self.current.take() {
            let binding = self.binding(&old);
            match self.admin.remove_binding(&binding) {
                Ok(()) => info!("Removed binding {}", old),
                Err(e) => {
                    error!("Failed to remove binding {}: {}", old, e);
                    faults.push(e);
                }
            }
        }

        if !routing_key.is_empty() {
            let binding = self.binding(routing_key);
            match self.admin.declare_binding(&binding) {
                Ok(()) => {
                    info!("Bound {} to {} with {}", self.queue.name, self.exchange.name, routing_key);
                    self.current = Some(routing_key.to_string());
                }
                Err(e) => {
                    error!("Failed to declare binding {}: {}", routing_key, e);
                    faults.push(e);
                }
            }
        }

        RebindOutcome {
            state: self.state(),
            faults,
        }
    }

    /// Routing pattern currently bound, if any.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Current subscription state.
    pub fn state(&self) -> SubscriptionState {
        match &self.current {
            Some(key) => SubscriptionState::Bound(key.clone()),
            None => SubscriptionState::Unbound,
        }
    }

    fn binding(&self, routing_key: &str) -> Binding {
        Binding::new(&self.queue.name, &self.exchange.name, routing_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Declare(String),
        Remove(String),
    }

    #[derive(Default)]
    struct RecordingAdmin {
        calls: Mutex<Vec<Call>>,
        active: Mutex<Vec<String>>,
        offline: AtomicBool,
    }

    impl RecordingAdmin {
        fn check(&self) -> trader_common::Result<()> {
            if self.offline.load(Ordering::SeqCst) {
                Err(TraderError::BrokerUnavailable(String::from("down")))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn active(&self) -> Vec<String> {
            self.active.lock().unwrap().clone()
        }
    }

    impl BrokerAdmin for RecordingAdmin {
        fn declare_exchange(&self, _exchange: &Exchange) -> trader_common::Result<()> {
            self.check()
        }

        fn declare_queue(&self, _queue: &Queue) -> trader_common::Result<()> {
            self.check()
        }

        fn declare_binding(&self, binding: &Binding) -> trader_common::Result<()> {
            self.check()?;
            self.calls.lock()?.push(Call::Declare(binding.routing_key.clone()));
            self.active.lock()?.push(binding.routing_key.clone());
            Ok(())
        }

        fn remove_binding(&self, binding: &Binding) -> trader_common::Result<()> {
            self.check()?;
            self.calls.lock()?.push(Call::Remove(binding.routing_key.clone()));
            self.active.lock()?.retain(|k| *k != binding.routing_key);
            Ok(())
        }
    }

    fn manager() -> (Arc<RecordingAdmin>, BindingManager) {
        let admin = Arc::new(RecordingAdmin::default());
        let manager = BindingManager::new(
            admin.clone(),
            Exchange::topic("md", false, false),
            Queue::new("md"),
        );
        (admin, manager)
    }

    #[test]
    fn remove_precedes_declare_on_rebind() {
        let (admin, mut manager) = manager();
        manager.rebind("A.B");
        manager.rebind("C.D");

        assert_eq!(
            admin.calls(),
            vec![
                Call::Declare(String::from("A.B")),
                Call::Remove(String::from("A.B")),
                Call::Declare(String::from("C.D")),
            ]
        );
        assert_eq!(admin.active(), vec![String::from("C.D")]);
        assert_eq!(manager.state(), SubscriptionState::Bound(String::from("C.D")));
    }

    #[test]
    fn empty_key_unbinds() {
        let (admin, mut manager) = manager();
        manager.rebind("K");
        let outcome = manager.rebind("");

        assert!(outcome.is_clean());
        assert_eq!(outcome.state, SubscriptionState::Unbound);
        assert!(admin.active().is_empty());
        assert_eq!(manager.current(), None);
    }

    #[test]
    fn at_most_one_binding_is_active() {
        let (admin, mut manager) = manager();
        for key in ["a.*", "b.#", "", "c.d", "c.d", "", "", "e"] {
            manager.rebind(key);
            assert!(admin.active().len() <= 1);
        }
        assert_eq!(admin.active(), vec![String::from("e")]);
    }

    #[test]
    fn unbinding_when_unbound_makes_no_calls() {
        let (admin, mut manager) = manager();
        let outcome = manager.rebind("");
        assert!(outcome.is_clean());
        assert!(admin.calls().is_empty());
    }

    #[test]
    fn broker_failures_are_swallowed_and_reported() {
        let (admin, mut manager) = manager();
        manager.rebind("A.B");
        admin.offline.store(true, Ordering::SeqCst);

        let outcome = manager.rebind("C.D");
        assert_eq!(outcome.faults.len(), 2);
        assert!(matches!(outcome.faults[0], TraderError::BrokerUnavailable(_)));
        assert_eq!(outcome.state, SubscriptionState::Unbound);

        assert_eq!(manager.declare_topology().len(), 2);

        admin.offline.store(false, Ordering::SeqCst);
        let outcome = manager.rebind("C.D");
        assert!(outcome.is_clean());
        assert_eq!(outcome.state, SubscriptionState::Bound(String::from("C.D")));
    }
}
