//! WebSocket wire format for both session variants
//!
//! Basic sessions carry one message payload per text frame. Enhanced
//! sessions carry JSON objects:
//!
//! ```text
//! client → server   {"event": "msg", "data": <json>, "ack": 7}
//! server → client   {"event": "msg", "data": <json>}
//! server → client   {"ack": 7, "data": []}
//! ```

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, close_code};
use rtfix_core::config::MESSAGE_EVENT;
use rtfix_core::{Outbound, SessionVariant};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frame sent by an enhanced client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientFrame {
    /// Event name
    pub event: String,
    /// Event payload
    #[serde(default)]
    pub data: Value,
    /// Acknowledgement id the client is waiting on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
}

/// Frame sent to an enhanced client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ServerFrame {
    /// Named event
    Event { event: String, data: Value },
    /// Completion of a client acknowledgement request
    Ack { ack: u64, data: Vec<Value> },
}

/// Decoded inbound text frame
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message(String),
    Event {
        name: String,
        data: Value,
        ack: Option<u64>,
    },
}

/// Decode a text frame according to the session variant
pub fn decode_text(variant: SessionVariant, text: &str) -> Result<Inbound, serde_json::Error> {
    match variant {
        SessionVariant::Basic => Ok(Inbound::Message(text.to_string())),
        SessionVariant::Enhanced => {
            let frame: ClientFrame = serde_json::from_str(text)?;
            Ok(Inbound::Event {
                name: frame.event,
                data: frame.data,
                ack: frame.ack,
            })
        }
    }
}

/// Encode an outbound command as a WebSocket message
///
/// Returns `None` for frames the variant has no representation for
/// (acknowledgements on basic sessions).
pub fn encode(variant: SessionVariant, frame: Outbound) -> Option<Message> {
    let text = match (variant, frame) {
        (_, Outbound::Close) => {
            return Some(Message::Close(Some(CloseFrame {
                code: close_code::NORMAL,
                reason: Utf8Bytes::from_static(""),
            })));
        }
        (SessionVariant::Basic, Outbound::Message(payload)) => payload,
        (SessionVariant::Basic, Outbound::Event { data, .. }) => match data {
            Value::String(s) => s,
            other => other.to_string(),
        },
        (SessionVariant::Basic, Outbound::Ack { .. }) => return None,
        (SessionVariant::Enhanced, Outbound::Message(payload)) => to_json(&ServerFrame::Event {
            event: MESSAGE_EVENT.to_string(),
            data: Value::String(payload),
        })?,
        (SessionVariant::Enhanced, Outbound::Event { name, data }) => {
            to_json(&ServerFrame::Event { event: name, data })?
        }
        (SessionVariant::Enhanced, Outbound::Ack { id }) => to_json(&ServerFrame::Ack {
            ack: id,
            data: Vec::new(),
        })?,
    };
    Some(Message::Text(text.into()))
}

fn to_json(frame: &ServerFrame) -> Option<String> {
    serde_json::to_string(frame).ok()
}
