//! WebSocket test client for fixture testing
//!
//! Provides both low-level WsConnection and high-level EchoClient.
//!
//! Note: Some methods may appear unused because they're only used in specific
//! test files and clippy checks each test independently.

use std::net::SocketAddr;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What the server sent next
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Closed,
}

/// Low-level WebSocket connection
pub struct WsConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl WsConnection {
    /// Connect to a fixture endpoint
    pub async fn connect(addr: SocketAddr, path: &str) -> Self {
        Self::try_connect(addr, path)
            .await
            .expect("Failed to connect")
    }

    /// Connect, returning the handshake error instead of panicking
    pub async fn try_connect(addr: SocketAddr, path: &str) -> Result<Self, tungstenite::Error> {
        let url = format!("ws://{}{}", addr, path);
        let (ws, _) = tokio_tungstenite::connect_async(&url).await?;
        let (sink, stream) = ws.split();
        Ok(Self { sink, stream })
    }

    /// Send raw text message
    pub async fn send_raw(&mut self, msg: &str) {
        self.sink
            .send(Message::Text(msg.to_string().into()))
            .await
            .unwrap();
    }

    /// Send JSON message
    #[allow(dead_code)]
    pub async fn send_json<T: Serialize>(&mut self, msg: &T) {
        let json = serde_json::to_string(msg).unwrap();
        self.send_raw(&json).await;
    }

    /// Start the closing handshake from the client side
    #[allow(dead_code)]
    pub async fn close(&mut self) {
        self.sink
            .send(Message::Close(None))
            .await
            .expect("Failed to send close frame");
    }

    /// Receive the next text or close frame
    ///
    /// Panics on transport errors, so an abnormal reset never passes for a
    /// clean close.
    pub async fn recv_frame(&mut self) -> Frame {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Frame::Text(text.to_string()),
                Some(Ok(Message::Close(_))) => return Frame::Closed,
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("WebSocket error: {}", e),
                None => panic!("WebSocket ended without a close frame"),
            }
        }
    }

    /// Next raw item from the socket, for handshake-level assertions
    #[allow(dead_code)]
    pub async fn next_message(&mut self) -> Option<Result<Message, tungstenite::Error>> {
        self.stream.next().await
    }

    /// Receive raw text message
    pub async fn recv_raw(&mut self) -> String {
        match self.recv_frame().await {
            Frame::Text(text) => text,
            Frame::Closed => panic!("WebSocket closed"),
        }
    }

    /// Receive and parse a JSON message
    #[allow(dead_code)]
    pub async fn recv_json(&mut self) -> Value {
        let text = self.recv_raw().await;
        serde_json::from_str(&text).expect("Failed to parse JSON")
    }

    /// Receive with timeout, returns None if timeout
    #[allow(dead_code)]
    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<Frame> {
        tokio::time::timeout(duration, self.recv_frame()).await.ok()
    }
}

/// High-level client for enhanced (event + ack) endpoints
#[allow(dead_code)]
pub struct EchoClient {
    pub conn: WsConnection,
}

#[allow(dead_code)]
impl EchoClient {
    pub async fn connect(addr: SocketAddr, path: &str) -> Self {
        Self {
            conn: WsConnection::connect(addr, path).await,
        }
    }

    /// Emit a named event, optionally asking for an acknowledgement
    pub async fn emit(&mut self, event: &str, data: Value, ack: Option<u64>) {
        let mut frame = json!({ "event": event, "data": data });
        if let Some(id) = ack {
            frame["ack"] = json!(id);
        }
        self.conn.send_json(&frame).await;
    }

    /// Receive next JSON frame
    pub async fn recv(&mut self) -> Value {
        self.conn.recv_json().await
    }

    /// Assert no message received within duration
    pub async fn expect_no_message(&mut self, duration: Duration) {
        let received = self.conn.recv_timeout(duration).await;
        assert!(
            received.is_none(),
            "Expected no message but received {:?}",
            received
        );
    }
}
