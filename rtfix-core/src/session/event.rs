//! Inbound events delivered to a lifecycle driver

use serde_json::Value;

use super::timer::TimerHandle;
use super::transport::Acknowledgement;

/// Something that happened to a session
///
/// Events for one session are handled one at a time, in arrival order.
#[derive(Debug)]
pub enum SessionEvent {
    /// The provider accepted the connection
    Connected,
    /// A plain message arrived (basic sessions)
    Message(String),
    /// A named event arrived (enhanced sessions)
    NamedEvent {
        name: String,
        data: Value,
        ack: Option<Acknowledgement>,
    },
    /// A timer the driver scheduled has expired
    TimerFired(TimerHandle),
    /// The provider reports the connection closed, whoever initiated it
    Closed,
}
