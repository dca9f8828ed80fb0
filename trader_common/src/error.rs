//! Error types shared between the broker and the client.
//!
//! The `TraderError` enum unifies I/O, serialization, channel and broker
//! failures so every crate in the workspace can propagate a single error type.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by broker and client.
#[derive(Error, Debug)]
pub enum TraderError {
    /// I/O error originating from the standard library (stdin, sockets).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON message bodies.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Channel send failed (receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Channel receive failed (sender closed); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// A poisoned mutex was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),

    /// The broker cannot be reached.
    #[error("Broker unavailable: {0}")]
    BrokerUnavailable(String),

    /// Referenced exchange has not been declared.
    #[error("Exchange not found: {0}")]
    ExchangeNotFound(String),

    /// Referenced queue has not been declared.
    #[error("Queue not found: {0}")]
    QueueNotFound(String),

    /// Redeclaration with properties that differ from the existing entity.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Routing key or binding pattern is malformed.
    #[error("Invalid routing key: {0:?}")]
    InvalidRoutingKey(String),

    /// Message body carries a different payload type than the one requested.
    #[error("Unexpected message type: expected {expected}, got {actual}")]
    UnexpectedMessageType {
        /// Type id the caller asked for.
        expected: String,
        /// Type id found in the message properties.
        actual: String,
    },

    /// The UI loop is gone; tasks can no longer be posted.
    #[error("UI context closed")]
    UiClosed,

    /// A UI task panicked; the application must terminate.
    #[error("Uncaught UI exception: {0}")]
    UiPanic(String),
}

impl<T> From<PoisonError<T>> for TraderError {
    fn from(err: PoisonError<T>) -> Self {
        TraderError::MutexLock(err.to_string())
    }
}

impl<T> From<crossbeam_channel::SendError<T>> for TraderError {
    fn from(err: crossbeam_channel::SendError<T>) -> Self {
        TraderError::ChannelSend(err.to_string())
    }
}

impl From<crossbeam_channel::RecvError> for TraderError {
    fn from(err: crossbeam_channel::RecvError) -> Self {
        TraderError::ChannelRecv(err.to_string())
    }
}
