//! Single-threaded UI execution context.
//!
//! UI state is owned by one thread. Other threads (broker delivery, console
//! input, signal handlers) never touch it directly: they post closures through a
//! cloneable `UiHandle`, and the owning thread runs them in FIFO order from
//! `UiContext::run` or `UiContext::drain`.
//!
//! The task queue is unbounded. A producer that outpaces the UI thread grows it
//! without limit.
//!
//! A panicking task is treated as an uncaught application exception: it is
//! logged and `run` returns `TraderError::UiPanic`, which the binary turns into
//! process exit.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use log::{debug, error};
use trader_common::{Result, TraderError};

/// Unit of work executed on the UI thread.
pub type UiTask<S> = Box<dyn FnOnce(&mut S) + Send>;

enum UiMessage<S> {
    Task(UiTask<S>),
    Exit,
}

/// Cloneable, thread-safe handle for posting work onto the UI thread.
pub struct UiHandle<S> {
    tx: Sender<UiMessage<S>>,
}

impl<S> Clone for UiHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> UiHandle<S> {
    /// Queue `task` to run on the UI thread.
    pub fn invoke<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.tx
            .send(UiMessage::Task(Box::new(task)))
            .map_err(|_| TraderError::UiClosed)
    }

    /// Ask the UI loop to stop after the tasks already queued.
    pub fn exit(&self) -> Result<()> {
        self.tx.send(UiMessage::Exit).map_err(|_| TraderError::UiClosed)
    }
}

/// The consuming end of the UI task queue.
pub struct UiContext<S> {
    tx: Sender<UiMessage<S>>,
    rx: Receiver<UiMessage<S>>,
}

impl<S> Default for UiContext<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> UiContext<S> {
    /// Create an empty task queue.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A new handle for producers.
    pub fn handle(&self) -> UiHandle<S> {
        UiHandle {
            tx: self.tx.clone(),
        }
    }

    /// Number of tasks waiting.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Run tasks against `state` until `exit` is requested.
    pub fn run(&self, state: &mut S) -> Result<()> {
        loop {
            match self.rx.recv()? {
                UiMessage::Task(task) => execute(task, state)?,
                UiMessage::Exit => {
                    debug!("UI loop exit requested");
                    return Ok(());
                }
            }
        }
    }

    /// Run every task already queued without blocking. Returns how many ran.
    /// An exit request stops the drain early.
    pub fn drain(&self, state: &mut S) -> Result<usize> {
        let mut ran = 0;
        loop {
            match self.rx.try_recv() {
                Ok(UiMessage::Task(task)) => {
                    execute(task, state)?;
                    ran += 1;
                }
                Ok(UiMessage::Exit) | Err(TryRecvError::Empty) => return Ok(ran),
                Err(TryRecvError::Disconnected) => return Err(TraderError::UiClosed),
            }
        }
    }
}

fn execute<S>(task: UiTask<S>, state: &mut S) -> Result<()> {
    panic::catch_unwind(AssertUnwindSafe(|| task(state))).map_err(|payload| {
        let reason = panic_message(payload.as_ref());
        error!("Uncaught application exception: {}", reason);
        TraderError::UiPanic(reason)
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn tasks_from_other_threads_run_in_order() {
        let ui = UiContext::<Vec<u32>>::new();
        let handle = ui.handle();
        let producer = thread::spawn(move || {
            for i in 0..10 {
                handle.invoke(move |log: &mut Vec<u32>| log.push(i)).unwrap();
            }
            handle.exit().unwrap();
        });

        let mut state = Vec::new();
        ui.run(&mut state).unwrap();
        producer.join().unwrap();
        assert_eq!(state, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn drain_runs_only_queued_tasks() {
        let ui = UiContext::<u32>::new();
        let handle = ui.handle();
        handle.invoke(|n: &mut u32| *n += 1).unwrap();
        handle.invoke(|n: &mut u32| *n += 2).unwrap();

        let mut state = 0;
        assert_eq!(ui.drain(&mut state).unwrap(), 2);
        assert_eq!(state, 3);
        assert_eq!(ui.drain(&mut state).unwrap(), 0);
    }

    #[test]
    fn panicking_task_surfaces_as_ui_panic() {
        let ui = UiContext::<u32>::new();
        let handle = ui.handle();
        handle.invoke(|_: &mut u32| panic!("form exploded")).unwrap();
        handle.invoke(|n: &mut u32| *n = 99).unwrap();

        let mut state = 0;
        match ui.run(&mut state) {
            Err(TraderError::UiPanic(reason)) => assert_eq!(reason, "form exploded"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(state, 0);
    }

    #[test]
    fn invoke_fails_once_the_context_is_gone() {
        let ui = UiContext::<u32>::new();
        let handle = ui.handle();
        drop(ui);
        assert!(matches!(handle.invoke(|_: &mut u32| {}), Err(TraderError::UiClosed)));
    }
}
