//! Outbound side of the session provider

use std::fmt;

use serde_json::Value;

use crate::error::SessionError;

/// A command for the session provider to put on the wire
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Plain message payload
    Message(String),
    /// Named event (enhanced sessions)
    Event { name: String, data: Value },
    /// Acknowledgement of a client event carrying an ack id
    Ack { id: u64 },
    /// Close the connection from the server side
    Close,
}

/// Sink the session provider exposes for one connection
///
/// `deliver` must not block: implementations enqueue the frame and return,
/// so commands keep the order in which the driver issued them.
pub trait Transport: Send + Sync {
    fn deliver(&self, frame: Outbound) -> Result<(), SessionError>;
}

/// Acknowledgement callback attached to an inbound named event
///
/// Consumed by [`complete`](Self::complete), so it can fire at most once.
pub struct Acknowledgement {
    callback: Box<dyn FnOnce() + Send>,
}

impl Acknowledgement {
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Invoke the callback with no arguments
    pub fn complete(self) {
        (self.callback)();
    }
}

impl fmt::Debug for Acknowledgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acknowledgement").finish_non_exhaustive()
    }
}
