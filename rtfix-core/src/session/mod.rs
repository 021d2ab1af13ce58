//! Session abstraction
//!
//! A [`Session`] is the fixture's view of one realtime connection. The
//! session provider (the server crate) feeds it [`SessionEvent`]s and drains
//! the [`Outbound`] frames it hands to its [`Transport`].

pub mod event;
pub mod state;
pub mod timer;
pub mod transport;

// Re-export key types for convenience
pub use event::SessionEvent;
pub use state::{LogEntry, Mark, Session, SessionId, SessionStatus};
pub use timer::{ScheduledAction, TimerHandle, Timers};
pub use transport::{Acknowledgement, Outbound, Transport};
