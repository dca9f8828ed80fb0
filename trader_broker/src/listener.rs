//! Message listener container.
//!
//! A `ListenerContainer` consumes one or more queues on a dedicated delivery
//! thread and invokes a `MessageHandler` for every message. The thread multiplexes
//! the queues and a stop signal with `crossbeam_channel::Select`.
//!
//! Handler errors are logged and the container keeps consuming; a failing message
//! is not redelivered.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Select, Sender, unbounded};
use log::{error, info, warn};
use trader_common::Result;
use trader_common::amqp::{Lifecycle, Message, MessageHandler};

use crate::broker::Broker;

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Consumes queues on a background thread and dispatches to a handler.
pub struct ListenerContainer {
    broker: Broker,
    queues: Vec<String>,
    handler: Arc<dyn MessageHandler>,
    worker: Option<Worker>,
}

impl ListenerContainer {
    /// Create a stopped container for `queues`.
    pub fn new(broker: Broker, queues: &[&str], handler: Arc<dyn MessageHandler>) -> Self {
        Self {
            broker,
            queues: queues.iter().map(|q| q.to_string()).collect(),
            handler,
            worker: None,
        }
    }

    /// Queues this container consumes.
    pub fn queues(&self) -> &[String] {
        &self.queues
    }
}

/// Delivery loop: waits on every queue plus the stop channel and hands each
/// message to `handler` until stopped or a queue disconnects.
fn delivery_loop(
    queues: Vec<(String, Receiver<Message>)>,
    stop_rx: Receiver<()>,
    handler: Arc<dyn MessageHandler>,
) {
    let mut select = Select::new();
    let stop_index = select.recv(&stop_rx);
    for (_, rx) in &queues {
        select.recv(rx);
    }

    loop {
        let operation = select.select();
        let index = operation.index();
        if index == stop_index {
            let _ = operation.recv(&stop_rx);
            break;
        }
        let (queue, rx) = &queues[index - 1];
        match operation.recv(rx) {
            Ok(message) => {
                if let Err(e) = handler.on_message(&message) {
                    error!("Listener on {} failed to handle message: {}", queue, e);
                }
            }
            Err(e) => {
                warn!("Queue {} disconnected: {}", queue, e);
                break;
            }
        }
    }
}

impl Lifecycle for ListenerContainer {
    fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }
        let receivers = self
            .queues
            .iter()
            .map(|q| -> Result<(String, Receiver<Message>)> {
                Ok((q.clone(), self.broker.consumer(q)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let (stop_tx, stop_rx) = unbounded::<()>();
        let handler = Arc::clone(&self.handler);
        let handle = thread::spawn(move || delivery_loop(receivers, stop_rx, handler));
        info!("Listener container started on {:?}", self.queues);

        self.worker = Some(Worker { stop_tx, handle });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            if worker.handle.join().is_err() {
                error!("Listener thread for {:?} panicked", self.queues);
            }
            info!("Listener container stopped on {:?}", self.queues);
        }
    }

    fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }
}

impl Drop for ListenerContainer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use trader_common::TraderError;
    use trader_common::amqp::{BrokerAdmin, MessagePublisher, Queue};

    struct Forward(Sender<Message>);

    impl MessageHandler for Forward {
        fn on_message(&self, message: &Message) -> Result<()> {
            self.0.send(message.clone())?;
            Ok(())
        }
    }

    struct Failing;

    impl MessageHandler for Failing {
        fn on_message(&self, _message: &Message) -> Result<()> {
            Err(TraderError::Format(String::from("boom")))
        }
    }

    fn response(queue: &str) -> Message {
        Message::encode("", queue, &trader_common::TradeResponse::default()).unwrap()
    }

    #[test]
    fn delivers_from_every_consumed_queue() {
        let broker = Broker::new();
        broker.declare_queue(&Queue::new("a")).unwrap();
        broker.declare_queue(&Queue::new("b")).unwrap();
        let (tx, rx) = unbounded();
        let mut container = ListenerContainer::new(broker.clone(), &["a", "b"], Arc::new(Forward(tx)));

        assert!(!container.is_running());
        container.start().unwrap();
        assert!(container.is_running());

        broker.publish(response("a")).unwrap();
        broker.publish(response("b")).unwrap();
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let mut keys = vec![first.routing_key, second.routing_key];
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);

        container.stop();
        assert!(!container.is_running());
    }

    #[test]
    fn handler_errors_do_not_stop_the_container() {
        let broker = Broker::new();
        broker.declare_queue(&Queue::new("a")).unwrap();
        let mut container = ListenerContainer::new(broker.clone(), &["a"], Arc::new(Failing));
        container.start().unwrap();

        broker.publish(response("a")).unwrap();
        broker.publish(response("a")).unwrap();
        for _ in 0..100 {
            if broker.queue_depth("a").unwrap() == 0 {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(broker.queue_depth("a").unwrap(), 0);
        assert!(container.is_running());
    }

    #[test]
    fn start_fails_for_unknown_queue() {
        let broker = Broker::new();
        let mut container = ListenerContainer::new(broker, &["missing"], Arc::new(Failing));
        assert!(matches!(container.start(), Err(TraderError::QueueNotFound(_))));
        assert!(!container.is_running());
    }
}
