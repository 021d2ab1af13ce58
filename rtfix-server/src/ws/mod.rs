//! WebSocket side of the fixture: one session per upgraded connection

mod connection;
mod protocol;

pub use connection::ws_handler;
pub use protocol::{ClientFrame, Inbound, ServerFrame, decode_text, encode};
