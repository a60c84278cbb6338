//! Connection and subscription state, independent of any socket.
//!
//! [`Connection`] consumes frames and commands and answers with a list of
//! [`Output`]s for the driver to carry out: frames to send, channels to
//! authorize, events to hand to listeners, a request to close the socket or
//! one to reopen it after a delay.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use super::protocol::{self, events, Frame};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Initialized,
    Connecting,
    Connected,
    Unavailable,
    Failed,
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Unavailable => "unavailable",
            Self::Failed => "failed",
            Self::Disconnected => "disconnected",
        }
    }

    /// No reconnection is attempted from these states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Disconnected)
    }

    /// A socket is being opened or is in use.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What listeners of a [`super::PusherClient`] receive.
#[derive(Clone, Debug, PartialEq)]
pub enum PushEvent {
    StateChange {
        previous: ConnectionState,
        current: ConnectionState,
    },
    SubscriptionSucceeded {
        channel: String,
    },
    SubscriptionError {
        channel: String,
        status: Option<u16>,
    },
    Message {
        channel: String,
        event: String,
        data: Value,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    Send(Frame),
    Authorize { channel: String, socket_id: String },
    Emit(PushEvent),
    Close,
    /// Open a new socket after the delay.
    Reconnect(Duration),
}

/// Reconnects tried after a drop before giving up; reset once connected.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChannelStatus {
    /// Waiting for the connection to be established.
    Pending,
    /// Waiting for the auth endpoint.
    Authorizing,
    /// `pusher:subscribe` sent.
    Requested,
    Subscribed,
}

#[derive(Debug)]
pub struct Connection {
    state: ConnectionState,
    socket_id: Option<String>,
    activity_timeout: Duration,
    channels: BTreeMap<String, ChannelStatus>,
    reconnect_attempts: u32,
}

impl Connection {
    pub fn new(activity_timeout: Duration) -> Self {
        Self {
            state: ConnectionState::Initialized,
            socket_id: None,
            activity_timeout,
            channels: BTreeMap::new(),
            reconnect_attempts: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn socket_id(&self) -> Option<&str> {
        self.socket_id.as_deref()
    }

    pub fn activity_timeout(&self) -> Duration {
        self.activity_timeout
    }

    pub fn is_subscribed(&self, channel: &str) -> bool {
        self.channels.get(channel) == Some(&ChannelStatus::Subscribed)
    }

    /// The socket is being opened.
    pub fn connecting(&mut self) -> Vec<Output> {
        let mut out = Vec::new();
        self.transition(ConnectionState::Connecting, &mut out);
        out
    }

    /// A replacement socket is being opened after [`Output::Reconnect`].
    pub fn reconnecting(&mut self) -> Vec<Output> {
        self.reconnect_attempts += 1;
        tracing::info!(attempt = self.reconnect_attempts, "[pusher] reconnecting");
        self.connecting()
    }

    pub fn handle_text(&mut self, text: &str) -> Vec<Output> {
        match Frame::parse(text) {
            Ok(frame) => self.handle_frame(frame),
            Err(e) => {
                tracing::warn!("[pusher] ignoring malformed frame: {e}");
                Vec::new()
            }
        }
    }

    pub fn handle_frame(&mut self, frame: Frame) -> Vec<Output> {
        let mut out = Vec::new();
        match frame.event.as_str() {
            events::CONNECTION_ESTABLISHED => self.on_established(&frame, &mut out),
            events::ERROR => self.on_error(&frame, &mut out),
            events::PING => out.push(Output::Send(Frame::pong())),
            events::PONG => {}
            events::SUBSCRIPTION_SUCCEEDED => {
                if let Some(channel) = frame.channel {
                    if let Some(status) = self.channels.get_mut(&channel) {
                        *status = ChannelStatus::Subscribed;
                        tracing::info!(%channel, "[pusher] subscription succeeded");
                        out.push(Output::Emit(PushEvent::SubscriptionSucceeded { channel }));
                    }
                }
            }
            events::SUBSCRIPTION_ERROR => {
                if let Some(channel) = frame.channel.clone() {
                    let status = frame
                        .data_as::<protocol::SubscriptionErrorData>()
                        .unwrap_or_default()
                        .status;
                    self.fail_channel(channel, status, &mut out);
                }
            }
            _ => {
                let data = frame.data_value();
                match frame.channel {
                    Some(channel) if self.channels.contains_key(&channel) => {
                        out.push(Output::Emit(PushEvent::Message {
                            channel,
                            event: frame.event,
                            data,
                        }));
                    }
                    _ => tracing::debug!(event = %frame.event, "[pusher] unhandled frame"),
                }
            }
        }
        out
    }

    /// Idempotent: a channel that is already known is reused.
    pub fn subscribe(&mut self, channel: &str) -> Vec<Output> {
        let mut out = Vec::new();
        if self.channels.contains_key(channel) {
            tracing::debug!(%channel, "[pusher] already subscribed, reusing channel");
            return out;
        }
        tracing::info!(%channel, "[pusher] subscribing");
        self.channels
            .insert(channel.to_string(), ChannelStatus::Pending);
        if self.state == ConnectionState::Connected {
            self.request(channel, &mut out);
        }
        out
    }

    /// The auth endpoint answered with a signature for `channel`.
    pub fn authorized(&mut self, channel: &str, auth: &str) -> Vec<Output> {
        let mut out = Vec::new();
        if let Some(status) = self.channels.get_mut(channel) {
            if *status == ChannelStatus::Authorizing {
                *status = ChannelStatus::Requested;
                out.push(Output::Send(Frame::subscribe(channel, Some(auth))));
            }
        }
        out
    }

    /// The auth endpoint refused or could not be reached.
    pub fn authorization_failed(&mut self, channel: &str, status: Option<u16>) -> Vec<Output> {
        let mut out = Vec::new();
        if self.channels.get(channel) == Some(&ChannelStatus::Authorizing) {
            self.fail_channel(channel.to_string(), status, &mut out);
        }
        out
    }

    pub fn unsubscribe(&mut self, channel: &str) -> Vec<Output> {
        let mut out = Vec::new();
        match self.channels.remove(channel) {
            Some(ChannelStatus::Requested | ChannelStatus::Subscribed)
                if self.state == ConnectionState::Connected =>
            {
                tracing::info!(%channel, "[pusher] unsubscribing");
                out.push(Output::Send(Frame::unsubscribe(channel)));
            }
            _ => {}
        }
        out
    }

    pub fn disconnect(&mut self) -> Vec<Output> {
        let mut out = Vec::new();
        self.channels.clear();
        self.socket_id = None;
        out.push(Output::Close);
        self.transition(ConnectionState::Disconnected, &mut out);
        out
    }

    /// Nothing was received for `activity_timeout`.
    pub fn handle_idle(&mut self) -> Vec<Output> {
        if self.state == ConnectionState::Connected {
            vec![Output::Send(Frame::ping())]
        } else {
            Vec::new()
        }
    }

    /// The socket closed or errored underneath us. Channels are kept and
    /// requested again on the next `connection_established`.
    pub fn transport_closed(&mut self, reason: Option<&str>) -> Vec<Output> {
        let mut out = Vec::new();
        if !self.state.is_open() {
            return out;
        }
        match reason {
            Some(reason) => tracing::error!("[pusher] connection error: {reason}"),
            None => tracing::warn!("[pusher] connection closed by server"),
        }
        self.become_unavailable(protocol::RECONNECT_DELAY, &mut out);
        out
    }

    fn on_established(&mut self, frame: &Frame, out: &mut Vec<Output>) {
        let established: protocol::ConnectionEstablished = match frame.data_as() {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("[pusher] bad connection_established payload: {e}");
                return;
            }
        };
        if let Some(secs) = established.activity_timeout.filter(|s| *s > 0) {
            self.activity_timeout = self.activity_timeout.min(Duration::from_secs(secs));
        }
        self.socket_id = Some(established.socket_id);
        self.reconnect_attempts = 0;
        self.transition(ConnectionState::Connected, out);

        let pending: Vec<String> = self
            .channels
            .iter()
            .filter(|(_, status)| **status == ChannelStatus::Pending)
            .map(|(name, _)| name.clone())
            .collect();
        for channel in pending {
            self.request(&channel, out);
        }
    }

    fn on_error(&mut self, frame: &Frame, out: &mut Vec<Output>) {
        let error: protocol::ErrorData = frame.data_as().unwrap_or_default();
        let message = error.message.unwrap_or_default();
        let Some(code) = error.code else {
            tracing::warn!("[pusher] error: {message}");
            return;
        };
        tracing::error!(code, "[pusher] connection error: {message}");
        out.push(Output::Close);
        match protocol::reconnect_delay(code) {
            Some(delay) => self.become_unavailable(delay, out),
            None => {
                self.socket_id = None;
                self.transition(ConnectionState::Failed, out);
            }
        }
    }

    fn become_unavailable(&mut self, delay: Duration, out: &mut Vec<Output>) {
        self.socket_id = None;
        for status in self.channels.values_mut() {
            *status = ChannelStatus::Pending;
        }
        self.transition(ConnectionState::Unavailable, out);
        if self.reconnect_attempts < MAX_RECONNECT_ATTEMPTS {
            out.push(Output::Reconnect(delay));
        } else {
            tracing::warn!(
                attempts = self.reconnect_attempts,
                "[pusher] giving up, connection stays unavailable"
            );
        }
    }

    fn request(&mut self, channel: &str, out: &mut Vec<Output>) {
        let Some(socket_id) = self.socket_id.clone() else {
            return;
        };
        let status = if protocol::is_private(channel) {
            out.push(Output::Authorize {
                channel: channel.to_string(),
                socket_id,
            });
            ChannelStatus::Authorizing
        } else {
            out.push(Output::Send(Frame::subscribe(channel, None)));
            ChannelStatus::Requested
        };
        self.channels.insert(channel.to_string(), status);
    }

    fn fail_channel(&mut self, channel: String, status: Option<u16>, out: &mut Vec<Output>) {
        self.channels.remove(&channel);
        tracing::error!(%channel, status, "[pusher] subscription error");
        if matches!(status, Some(401 | 403)) {
            tracing::error!("[pusher] authentication failed, check the auth endpoint and token");
        }
        out.push(Output::Emit(PushEvent::SubscriptionError { channel, status }));
    }

    fn transition(&mut self, next: ConnectionState, out: &mut Vec<Output>) {
        if self.state == next {
            return;
        }
        let previous = std::mem::replace(&mut self.state, next);
        tracing::info!("[pusher] state changed from {previous} to {next}");
        out.push(Output::Emit(PushEvent::StateChange {
            previous,
            current: next,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn established(socket_id: &str) -> String {
        json!({
            "event": "pusher:connection_established",
            "data": json!({"socket_id": socket_id, "activity_timeout": 30}).to_string(),
        })
        .to_string()
    }

    fn connected() -> Connection {
        let mut conn = Connection::new(Duration::from_secs(120));
        conn.connecting();
        conn.handle_text(&established("1.2"));
        conn
    }

    #[test]
    fn test_connect_reports_transitions() {
        let mut conn = Connection::new(Duration::from_secs(120));
        let out = conn.connecting();
        assert_eq!(
            out,
            vec![Output::Emit(PushEvent::StateChange {
                previous: ConnectionState::Initialized,
                current: ConnectionState::Connecting,
            })]
        );

        let out = conn.handle_text(&established("1.2"));
        assert_eq!(conn.state(), ConnectionState::Connected);
        assert_eq!(conn.socket_id(), Some("1.2"));
        // Server timeout is shorter, so it wins
        assert_eq!(conn.activity_timeout(), Duration::from_secs(30));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_subscribe_before_connect_is_queued() {
        let mut conn = Connection::new(Duration::from_secs(120));
        conn.connecting();
        assert!(conn.subscribe("private-user-9").is_empty());

        let out = conn.handle_text(&established("5.6"));
        assert!(out.contains(&Output::Authorize {
            channel: "private-user-9".into(),
            socket_id: "5.6".into(),
        }));

        let out = conn.authorized("private-user-9", "key:sig");
        assert_eq!(
            out,
            vec![Output::Send(Frame::subscribe("private-user-9", Some("key:sig")))]
        );

        let out = conn.handle_frame(Frame {
            event: events::SUBSCRIPTION_SUCCEEDED.into(),
            channel: Some("private-user-9".into()),
            data: Some(json!("{}")),
        });
        assert!(conn.is_subscribed("private-user-9"));
        assert_eq!(
            out,
            vec![Output::Emit(PushEvent::SubscriptionSucceeded {
                channel: "private-user-9".into()
            })]
        );
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let mut conn = connected();
        assert_eq!(
            conn.subscribe("public-news"),
            vec![Output::Send(Frame::subscribe("public-news", None))]
        );
        assert!(conn.subscribe("public-news").is_empty());
    }

    #[test]
    fn test_channel_event_decoded() {
        let mut conn = connected();
        conn.subscribe("private-user-1");
        conn.authorized("private-user-1", "k:s");

        let text = json!({
            "event": "notification",
            "channel": "private-user-1",
            "data": json!({"id": "n1", "title": "Hi"}).to_string(),
        })
        .to_string();
        let out = conn.handle_text(&text);
        assert_eq!(
            out,
            vec![Output::Emit(PushEvent::Message {
                channel: "private-user-1".into(),
                event: "notification".into(),
                data: json!({"id": "n1", "title": "Hi"}),
            })]
        );

        // Unknown channel is dropped
        let other = json!({"event": "notification", "channel": "private-user-2", "data": "{}"});
        assert!(conn.handle_text(&other.to_string()).is_empty());
    }

    #[test]
    fn test_ping_pong_and_idle() {
        let mut conn = connected();
        let out = conn.handle_text(r#"{"event":"pusher:ping","data":"{}"}"#);
        assert_eq!(out, vec![Output::Send(Frame::pong())]);
        assert_eq!(conn.handle_idle(), vec![Output::Send(Frame::ping())]);
    }

    #[test]
    fn test_error_codes() {
        let mut conn = connected();
        let out = conn.handle_text(r#"{"event":"pusher:error","data":{"code":4001,"message":"App disabled"}}"#);
        assert_eq!(conn.state(), ConnectionState::Failed);
        assert!(out.contains(&Output::Close));

        assert!(!out.iter().any(|o| matches!(o, Output::Reconnect(_))));
        assert!(conn.state().is_terminal());

        let mut conn = connected();
        let out = conn.handle_text(r#"{"event":"pusher:error","data":{"code":4201,"message":"Pong reply not received"}}"#);
        assert_eq!(conn.state(), ConnectionState::Unavailable);
        assert_eq!(out.last(), Some(&Output::Reconnect(Duration::ZERO)));

        let mut conn = connected();
        let out = conn.handle_text(r#"{"event":"pusher:error","data":{"code":4100,"message":"Over capacity"}}"#);
        assert!(out.contains(&Output::Close));
        assert_eq!(out.last(), Some(&Output::Reconnect(protocol::RECONNECT_DELAY)));
        assert!(!conn.state().is_terminal());

        let mut conn = connected();
        assert!(conn
            .handle_text(r#"{"event":"pusher:error","data":{"message":"client event rejected"}}"#)
            .is_empty());
        assert_eq!(conn.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_subscription_error_and_auth_failure() {
        let mut conn = connected();
        conn.subscribe("private-user-3");
        let out = conn.authorization_failed("private-user-3", Some(403));
        assert_eq!(
            out,
            vec![Output::Emit(PushEvent::SubscriptionError {
                channel: "private-user-3".into(),
                status: Some(403),
            })]
        );
        // Channel can be requested again afterwards
        assert!(!conn.subscribe("private-user-3").is_empty());

        conn.authorized("private-user-3", "k:s");
        let out = conn.handle_text(
            r#"{"event":"pusher:subscription_error","channel":"private-user-3","data":"{\"type\":\"AuthError\",\"status\":401}"}"#,
        );
        assert_eq!(
            out,
            vec![Output::Emit(PushEvent::SubscriptionError {
                channel: "private-user-3".into(),
                status: Some(401),
            })]
        );
        assert!(!conn.is_subscribed("private-user-3"));
    }

    #[test]
    fn test_unsubscribe_and_disconnect() {
        let mut conn = connected();
        conn.subscribe("public-a");
        assert_eq!(
            conn.unsubscribe("public-a"),
            vec![Output::Send(Frame::unsubscribe("public-a"))]
        );
        assert!(conn.unsubscribe("public-a").is_empty());

        let out = conn.disconnect();
        assert_eq!(out[0], Output::Close);
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        // Closing after an explicit disconnect is not reported
        assert!(conn.transport_closed(None).is_empty());
    }

    #[test]
    fn test_transport_loss() {
        let mut conn = connected();
        let out = conn.transport_closed(Some("reset by peer"));
        assert_eq!(conn.state(), ConnectionState::Unavailable);
        assert_eq!(
            out,
            vec![
                Output::Emit(PushEvent::StateChange {
                    previous: ConnectionState::Connected,
                    current: ConnectionState::Unavailable,
                }),
                Output::Reconnect(protocol::RECONNECT_DELAY),
            ]
        );
        // Already down, a second close report changes nothing
        assert!(conn.transport_closed(None).is_empty());
    }

    #[test]
    fn test_reconnect_requests_channels_again() {
        let mut conn = connected();
        conn.subscribe("private-user-4");
        conn.authorized("private-user-4", "k:s");
        conn.transport_closed(None);
        assert!(!conn.is_subscribed("private-user-4"));

        let out = conn.reconnecting();
        assert_eq!(
            out,
            vec![Output::Emit(PushEvent::StateChange {
                previous: ConnectionState::Unavailable,
                current: ConnectionState::Connecting,
            })]
        );
        let out = conn.handle_text(&established("9.9"));
        assert!(out.contains(&Output::Authorize {
            channel: "private-user-4".into(),
            socket_id: "9.9".into(),
        }));

        // Connected again, so the next drop gets its own attempt
        let out = conn.transport_closed(None);
        assert!(out.contains(&Output::Reconnect(protocol::RECONNECT_DELAY)));
    }

    #[test]
    fn test_reconnect_gives_up_after_failed_attempt() {
        let mut conn = connected();
        conn.transport_closed(None);
        conn.reconnecting();
        let out = conn.transport_closed(Some("connection refused"));
        assert_eq!(conn.state(), ConnectionState::Unavailable);
        assert_eq!(
            out,
            vec![Output::Emit(PushEvent::StateChange {
                previous: ConnectionState::Connecting,
                current: ConnectionState::Unavailable,
            })]
        );
    }
}
