//! rtfix-core: lifecycle state machines for the rtfix messaging fixture
//!
//! This crate holds everything the fixture decides, and none of the I/O:
//!
//! - **Configuration** - [`FixtureConfig`] describes the endpoint table
//! - **Endpoint registry** - [`EndpointRegistry`] maps mount paths to scenarios
//! - **Sessions** - [`Session`] guards every command against a closed connection
//! - **Lifecycle driver** - [`LifecycleDriver`] runs one scenario on one session
//! - **Echo groups** - [`EchoGroup`] fans acknowledged events out to an endpoint
//!
//! # Architecture
//!
//! ```text
//! session provider ──SessionEvent──▶ LifecycleDriver ──Outbound──▶ Transport
//!        │                             │         │
//!        └── route(path) ──▶ EndpointRegistry     └── join/leave/broadcast ──▶ EchoGroup
//! ```

pub mod config;
pub mod driver;
pub mod echo;
pub mod endpoint;
pub mod error;
pub mod scenario;
pub mod session;

// Re-export key types for convenience
pub use config::{EndpointConfig, FixtureConfig, ScenarioConfig, SessionVariant};
pub use driver::{LifecycleDriver, LifecycleState};
pub use echo::{BroadcastReport, EchoGroup, EchoGroups};
pub use endpoint::{Endpoint, EndpointRegistry, Phase, normalize_path};
pub use error::{ConfigError, FixtureError, RegistryError, SessionError};
pub use scenario::{Scenario, ScenarioKind};
pub use session::{
    Acknowledgement, LogEntry, Mark, Outbound, Session, SessionEvent, SessionId, SessionStatus,
    TimerHandle, Transport,
};
