//! Session struct and its open/closing/closed flag
//!
//! Every command goes through a guard: once the session is no longer open,
//! send/emit/close return [`SessionError::StaleAction`] without touching the
//! transport.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use super::transport::{Outbound, Transport};
use crate::error::SessionError;

/// Opaque connection id issued by the session provider
pub type SessionId = String;

/// Connection status as seen by the fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Accepting commands
    Open,
    /// The fixture issued a close and is waiting for the provider to confirm
    Closing,
    /// The provider reported the connection gone
    Closed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

/// Lifecycle events recorded in the session log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Connected,
    Sent,
    Emitted,
    CloseIssued,
    Closed,
}

/// One timestamped entry of the session log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntry {
    pub mark: Mark,
    pub at: Instant,
}

/// One realtime connection
pub struct Session {
    id: SessionId,
    endpoint: String,
    status: SessionStatus,
    transport: Arc<dyn Transport>,
    log: Vec<LogEntry>,
}

impl Session {
    /// Create an open session; `now` is recorded as the connect time
    pub fn new(
        id: impl Into<SessionId>,
        endpoint: impl Into<String>,
        transport: Arc<dyn Transport>,
        now: Instant,
    ) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            status: SessionStatus::Open,
            transport,
            log: vec![LogEntry {
                mark: Mark::Connected,
                at: now,
            }],
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path of the endpoint this session belongs to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Ordered lifecycle log
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Time since the connect entry
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.log
            .first()
            .map(|entry| now.saturating_duration_since(entry.at))
            .unwrap_or_default()
    }

    /// Shared handle to the transport, used for echo group membership
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Send a plain message
    pub fn send(&mut self, payload: &str, now: Instant) -> Result<(), SessionError> {
        self.ensure_open("send")?;
        self.transport
            .deliver(Outbound::Message(payload.to_string()))?;
        self.record(Mark::Sent, now);
        Ok(())
    }

    /// Emit a named event
    pub fn emit(&mut self, name: &str, data: Value, now: Instant) -> Result<(), SessionError> {
        self.ensure_open("emit")?;
        self.transport.deliver(Outbound::Event {
            name: name.to_string(),
            data,
        })?;
        self.record(Mark::Emitted, now);
        Ok(())
    }

    /// Ask the provider to close the connection
    pub fn close(&mut self, now: Instant) -> Result<(), SessionError> {
        self.ensure_open("close")?;
        self.status = SessionStatus::Closing;
        self.transport.deliver(Outbound::Close)?;
        self.record(Mark::CloseIssued, now);
        Ok(())
    }

    /// Record the provider's close notification
    ///
    /// Returns `false` if the session was already closed.
    pub fn mark_closed(&mut self, now: Instant) -> bool {
        if self.status == SessionStatus::Closed {
            return false;
        }
        self.status = SessionStatus::Closed;
        self.record(Mark::Closed, now);
        true
    }

    fn ensure_open(&self, action: &'static str) -> Result<(), SessionError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(SessionError::StaleAction {
                session_id: self.id.clone(),
                action,
                status: self.status.as_str(),
            })
        }
    }

    fn record(&mut self, mark: Mark, at: Instant) {
        self.log.push(LogEntry { mark, at });
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("status", &self.status)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}
