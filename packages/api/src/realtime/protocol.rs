//! Pusher Channels wire format (protocol 7).
//!
//! Every websocket message is a JSON text frame `{ event, channel?, data? }`.
//! Incoming `data` is usually a JSON document serialized into a string, so it
//! is decoded a second time by [`Frame::data_value`]. Outgoing frames carry
//! `data` as a plain object.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::PusherOptions;

pub const PROTOCOL_VERSION: u8 = 7;
pub const CLIENT_NAME: &str = "kanban-rs";

pub mod events {
    pub const CONNECTION_ESTABLISHED: &str = "pusher:connection_established";
    pub const ERROR: &str = "pusher:error";
    pub const PING: &str = "pusher:ping";
    pub const PONG: &str = "pusher:pong";
    pub const SUBSCRIBE: &str = "pusher:subscribe";
    pub const UNSUBSCRIBE: &str = "pusher:unsubscribe";
    pub const SUBSCRIPTION_SUCCEEDED: &str = "pusher_internal:subscription_succeeded";
    pub const SUBSCRIPTION_ERROR: &str = "pusher:subscription_error";
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Frame {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Payload with string-encoded JSON unwrapped. A string that is not JSON
    /// is returned as-is.
    pub fn data_value(&self) -> Value {
        match &self.data {
            Some(Value::String(raw)) => {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
            }
            Some(other) => other.clone(),
            None => Value::Null,
        }
    }

    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data_value())
    }

    pub fn subscribe(channel: &str, auth: Option<&str>) -> Self {
        let data = match auth {
            Some(auth) => json!({ "channel": channel, "auth": auth }),
            None => json!({ "channel": channel }),
        };
        Self::control(events::SUBSCRIBE, data)
    }

    pub fn unsubscribe(channel: &str) -> Self {
        Self::control(events::UNSUBSCRIBE, json!({ "channel": channel }))
    }

    pub fn ping() -> Self {
        Self::control(events::PING, json!({}))
    }

    pub fn pong() -> Self {
        Self::control(events::PONG, json!({}))
    }

    fn control(event: &str, data: Value) -> Self {
        Self {
            event: event.to_string(),
            channel: None,
            data: Some(data),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectionEstablished {
    pub socket_id: String,
    #[serde(default)]
    pub activity_timeout: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorData {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionErrorData {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Wait before reopening a socket that dropped or was closed with a 4100+ code.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// `pusher:error` codes 4000-4099 mean the connection must not be retried.
pub fn is_fatal_error(code: u16) -> bool {
    (4000..=4099).contains(&code)
}

/// How long to wait before reconnecting after a `pusher:error` with `code`.
/// 4200-4299 ask for an immediate reconnect; fatal codes get `None`.
pub fn reconnect_delay(code: u16) -> Option<Duration> {
    match code {
        c if is_fatal_error(c) => None,
        4200..=4299 => Some(Duration::ZERO),
        _ => Some(RECONNECT_DELAY),
    }
}

/// Channels with this prefix need a signature from the auth endpoint.
pub fn is_private(channel: &str) -> bool {
    channel.starts_with("private-")
}

pub fn socket_url(options: &PusherOptions) -> String {
    let (scheme, port) = if options.force_tls {
        ("wss", 443)
    } else {
        ("ws", 80)
    };
    let host = options
        .host
        .clone()
        .unwrap_or_else(|| format!("ws-{}.pusher.com", options.cluster));
    format!(
        "{scheme}://{host}:{port}/app/{key}?protocol={PROTOCOL_VERSION}&client={CLIENT_NAME}&version={version}&flash=false",
        key = options.key,
        version = env!("CARGO_PKG_VERSION"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_encoded_data() {
        let text = r#"{"event":"pusher:connection_established","data":"{\"socket_id\":\"123.456\",\"activity_timeout\":120}"}"#;
        let frame = Frame::parse(text).unwrap();
        let established: ConnectionEstablished = frame.data_as().unwrap();
        assert_eq!(established.socket_id, "123.456");
        assert_eq!(established.activity_timeout, Some(120));
    }

    #[test]
    fn test_plain_string_data_kept() {
        let frame = Frame {
            event: "greeting".into(),
            channel: Some("public".into()),
            data: Some(Value::String("hello".into())),
        };
        assert_eq!(frame.data_value(), Value::String("hello".into()));
    }

    #[test]
    fn test_subscribe_frame() {
        let text = Frame::subscribe("private-user-7", Some("key:sig"))
            .to_text()
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!({"event": "pusher:subscribe", "data": {"channel": "private-user-7", "auth": "key:sig"}})
        );
    }

    #[test]
    fn test_socket_url() {
        let mut options = PusherOptions::new("app-key", "us2", "http://localhost:5000/pusher/auth");
        let url = socket_url(&options);
        assert!(url.starts_with("wss://ws-us2.pusher.com:443/app/app-key?protocol=7&client=kanban-rs&version="));
        assert!(url.ends_with("&flash=false"));

        options.force_tls = false;
        options.host = Some("127.0.0.1".into());
        assert!(socket_url(&options).starts_with("ws://127.0.0.1:80/app/app-key?"));
    }

    #[test]
    fn test_error_classes() {
        assert!(is_fatal_error(4001));
        assert!(!is_fatal_error(4100));
        assert!(!is_fatal_error(4201));
        assert_eq!(reconnect_delay(4001), None);
        assert_eq!(reconnect_delay(4100), Some(RECONNECT_DELAY));
        assert_eq!(reconnect_delay(4201), Some(Duration::ZERO));
        assert!(is_private("private-user-1"));
        assert!(!is_private("presence-room"));
    }
}
