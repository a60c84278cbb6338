//! # Real-time push client
//!
//! A small Pusher Channels (protocol 7) client used for the per-user
//! notification channel.
//!
//! ## Layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`protocol`] | Frame format, event names, socket URL |
//! | [`connection`] | Connection/subscription state machine, no I/O |
//! | `transport` | Websocket + timer for native (tokio-tungstenite) and web (gloo-net) |
//!
//! [`connect`] returns a cloneable [`PusherClient`] handle and the driver
//! future. The caller spawns the driver on its own executor; the handle talks
//! to it over an unbounded channel. Dropping every handle disconnects.
//!
//! ```ignore
//! let (client, driver) = api::realtime::connect(options, HttpAuthorizer::new(api, endpoint));
//! spawn(driver);
//! let mut events = client.events();
//! client.subscribe(&api::realtime::user_channel(42));
//! ```
//!
//! When the socket drops, or the server sends a `pusher:error` in the
//! 4100-4299 range, the driver opens one replacement socket (right away for
//! 4200-4299, after [`protocol::RECONNECT_DELAY`] otherwise) and subscribes
//! the same channels again. A `failed` connection (codes 4000-4099), an
//! explicit disconnect, or a reconnect that does not get established ends the
//! driver and a new client must be built.

pub mod connection;
pub mod protocol;
mod transport;

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::{FutureExt, Sink, SinkExt, Stream, StreamExt};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use store::{ClientConfig, Notification};

pub use connection::{Connection, ConnectionState, Output, PushEvent};
pub use protocol::Frame;

use crate::{ApiClient, ApiError};

/// Event name the backend uses for new notifications.
pub const NOTIFICATION_EVENT: &str = "notification";

/// Private channel carrying one user's notifications.
pub fn user_channel(user_id: i64) -> String {
    format!("private-user-{user_id}")
}

#[derive(Clone, Debug, PartialEq)]
pub struct PusherOptions {
    pub key: String,
    pub cluster: String,
    /// Overrides `ws-{cluster}.pusher.com`.
    pub host: Option<String>,
    pub force_tls: bool,
    pub auth_endpoint: String,
    pub activity_timeout: Duration,
}

impl PusherOptions {
    pub fn new(
        key: impl Into<String>,
        cluster: impl Into<String>,
        auth_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            cluster: cluster.into(),
            host: None,
            force_tls: true,
            auth_endpoint: auth_endpoint.into(),
            activity_timeout: Duration::from_secs(120),
        }
    }

    /// `None` (with a warning) when the key or cluster is missing.
    pub fn from_config(config: &ClientConfig) -> Option<Self> {
        let realtime = &config.realtime;
        if !realtime.is_configured() {
            tracing::warn!(
                "[pusher] key or cluster missing (KANBAN_PUSHER_KEY / KANBAN_PUSHER_CLUSTER), real-time disabled"
            );
            return None;
        }
        Some(Self {
            key: realtime.key.clone(),
            cluster: realtime.cluster.clone(),
            host: realtime.host.clone(),
            force_tls: realtime.force_tls,
            auth_endpoint: config.auth_endpoint(),
            activity_timeout: Duration::from_secs(realtime.activity_timeout_secs.max(1)),
        })
    }
}

/// Signs private channel subscriptions.
pub trait ChannelAuthorizer {
    fn authorize(
        &self,
        socket_id: &str,
        channel: &str,
    ) -> impl Future<Output = Result<String, ApiError>>;
}

/// Authorizes against the backend's auth endpoint with the user's bearer token.
#[derive(Clone, Debug)]
pub struct HttpAuthorizer {
    client: ApiClient,
    endpoint: String,
}

impl HttpAuthorizer {
    pub fn new(client: ApiClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl ChannelAuthorizer for HttpAuthorizer {
    async fn authorize(&self, socket_id: &str, channel: &str) -> Result<String, ApiError> {
        self.client
            .authorize_channel(&self.endpoint, socket_id, channel)
            .await
    }
}

#[derive(Deserialize)]
struct AuthResponse {
    auth: String,
}

impl ApiClient {
    /// `POST {endpoint}` form `socket_id`, `channel_name`; answers the
    /// `key:signature` string for `pusher:subscribe`.
    pub async fn authorize_channel(
        &self,
        endpoint: &str,
        socket_id: &str,
        channel: &str,
    ) -> Result<String, ApiError> {
        let header = match self.token() {
            Some(token) => format!("Bearer {token}"),
            None => {
                tracing::warn!("[pusher] no access token found, private channel auth will be rejected");
                String::new()
            }
        };
        let request = self
            .http()
            .post(endpoint)
            .header(AUTHORIZATION, header)
            .form(&[("socket_id", socket_id), ("channel_name", channel)]);
        let response: AuthResponse = self.send_json(request).await?;
        Ok(response.auth)
    }
}

impl PushEvent {
    /// The notification carried by a `notification` event on `channel`.
    pub fn notification_on(&self, channel: &str) -> Option<Notification> {
        match self {
            PushEvent::Message {
                channel: c,
                event,
                data,
            } if c == channel && event == NOTIFICATION_EVENT => {
                match serde_json::from_value(data.clone()) {
                    Ok(notification) => Some(notification),
                    Err(e) => {
                        tracing::warn!(%channel, "[pusher] undecodable notification: {e}");
                        None
                    }
                }
            }
            _ => None,
        }
    }
}

enum Command {
    Listen(UnboundedSender<PushEvent>),
    Subscribe(String),
    Unsubscribe(String),
    Disconnect,
}

/// Handle to a running connection. Cheap to clone.
#[derive(Clone, Debug)]
pub struct PusherClient {
    commands: UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Listen(_) => f.write_str("Listen"),
            Command::Subscribe(c) => write!(f, "Subscribe({c})"),
            Command::Unsubscribe(c) => write!(f, "Unsubscribe({c})"),
            Command::Disconnect => f.write_str("Disconnect"),
        }
    }
}

impl PusherClient {
    fn channel() -> (Self, UnboundedReceiver<Command>) {
        let (commands, receiver) = mpsc::unbounded();
        (Self { commands }, receiver)
    }

    /// Stream of every event from now on, including state changes.
    pub fn events(&self) -> UnboundedReceiver<PushEvent> {
        let (sender, receiver) = mpsc::unbounded();
        self.send(Command::Listen(sender));
        receiver
    }

    pub fn subscribe(&self, channel: &str) {
        self.send(Command::Subscribe(channel.to_string()));
    }

    pub fn unsubscribe(&self, channel: &str) {
        self.send(Command::Unsubscribe(channel.to_string()));
    }

    pub fn disconnect(&self) {
        self.send(Command::Disconnect);
    }

    /// The driver has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: Command) {
        if let Err(e) = self.commands.unbounded_send(command) {
            tracing::debug!("[pusher] connection already closed, dropping {:?}", e.into_inner());
        }
    }
}

/// Build a client and the future that drives its socket.
pub fn connect<A>(options: PusherOptions, authorizer: A) -> (PusherClient, impl Future<Output = ()>)
where
    A: ChannelAuthorizer + 'static,
{
    let (client, commands) = PusherClient::channel();
    let url = protocol::socket_url(&options);
    let session = Session::new(options.activity_timeout, authorizer);
    let open = move || {
        let url = url.clone();
        async move {
            tracing::debug!(%url, "[pusher] opening socket");
            transport::connect(&url).await
        }
    };
    (client, run(session, commands, open))
}

async fn run<A, C, F, T, R>(mut session: Session<A>, mut commands: UnboundedReceiver<Command>, mut open: C)
where
    A: ChannelAuthorizer,
    C: FnMut() -> F,
    F: Future<Output = Result<(T, R), ApiError>>,
    T: Sink<String, Error = ApiError> + Unpin,
    R: Stream<Item = Result<String, ApiError>> + Unpin,
{
    session.start(&mut commands);
    loop {
        match open().await {
            Ok((sink, stream)) => session.drive(&mut commands, sink, stream).await,
            Err(e) => {
                session.absorb(&mut commands);
                let out = session.connection.transport_closed(Some(&e.to_string()));
                session.pending.extend(out);
                session.emit_pending();
            }
        }
        let Some(delay) = session.reconnect.take() else {
            break;
        };
        session.wait(&mut commands, delay).await;
        if session.connection.state().is_terminal() {
            break;
        }
        let out = session.connection.reconnecting();
        session.pending.extend(out);
    }
    tracing::debug!("[pusher] driver stopped");
}

struct Session<A> {
    connection: Connection,
    authorizer: A,
    listeners: Vec<UnboundedSender<PushEvent>>,
    pending: VecDeque<Output>,
    reconnect: Option<Duration>,
}

impl<A: ChannelAuthorizer> Session<A> {
    fn new(activity_timeout: Duration, authorizer: A) -> Self {
        Self {
            connection: Connection::new(activity_timeout),
            authorizer,
            listeners: Vec::new(),
            pending: VecDeque::new(),
            reconnect: None,
        }
    }

    fn start(&mut self, commands: &mut UnboundedReceiver<Command>) {
        self.absorb(commands);
        let out = self.connection.connecting();
        self.pending.extend(out);
    }

    /// Take commands that were queued before the driver got to run.
    fn absorb(&mut self, commands: &mut UnboundedReceiver<Command>) {
        while let Ok(command) = commands.try_recv() {
            self.on_command(Some(command));
        }
    }

    /// Sit out a reconnect delay while still serving commands, so a
    /// disconnect does not have to wait for the timer.
    async fn wait(&mut self, commands: &mut UnboundedReceiver<Command>, delay: Duration) {
        let timer = transport::sleep(delay).fuse();
        futures::pin_mut!(timer);
        loop {
            futures::select! {
                command = commands.next() => {
                    self.on_command(command);
                    self.emit_pending();
                    if self.connection.state().is_terminal() {
                        return;
                    }
                }
                () = timer => return,
            }
        }
    }

    async fn drive<T, R>(&mut self, commands: &mut UnboundedReceiver<Command>, mut sink: T, stream: R)
    where
        T: Sink<String, Error = ApiError> + Unpin,
        R: Stream<Item = Result<String, ApiError>> + Unpin,
    {
        let mut stream = stream.fuse();
        loop {
            self.flush(&mut sink).await;
            if !self.connection.state().is_open() {
                break;
            }
            let timeout = self.connection.activity_timeout();
            futures::select! {
                command = commands.next() => self.on_command(command),
                message = stream.next() => {
                    let out = match message {
                        Some(Ok(text)) => self.connection.handle_text(&text),
                        Some(Err(e)) => self.connection.transport_closed(Some(&e.to_string())),
                        None => self.connection.transport_closed(None),
                    };
                    self.pending.extend(out);
                }
                () = transport::sleep(timeout).fuse() => {
                    let out = self.connection.handle_idle();
                    self.pending.extend(out);
                }
            }
        }
        if let Err(e) = sink.close().await {
            tracing::debug!("[pusher] close: {e}");
        }
    }

    fn on_command(&mut self, command: Option<Command>) {
        let out = match command {
            Some(Command::Listen(listener)) => {
                self.listeners.push(listener);
                Vec::new()
            }
            Some(Command::Subscribe(channel)) => self.connection.subscribe(&channel),
            Some(Command::Unsubscribe(channel)) => self.connection.unsubscribe(&channel),
            Some(Command::Disconnect) | None => self.connection.disconnect(),
        };
        self.pending.extend(out);
    }

    async fn flush<T>(&mut self, sink: &mut T)
    where
        T: Sink<String, Error = ApiError> + Unpin,
    {
        while let Some(output) = self.pending.pop_front() {
            match output {
                Output::Send(frame) => {
                    let text = match frame.to_text() {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!("[pusher] could not encode {}: {e}", frame.event);
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(text).await {
                        let out = self.connection.transport_closed(Some(&e.to_string()));
                        self.pending.extend(out);
                    }
                }
                Output::Authorize { channel, socket_id } => {
                    let out = match self.authorizer.authorize(&socket_id, &channel).await {
                        Ok(auth) => self.connection.authorized(&channel, &auth),
                        Err(e) => {
                            tracing::error!(%channel, "[pusher] channel authorization failed: {e}");
                            self.connection.authorization_failed(&channel, e.status())
                        }
                    };
                    self.pending.extend(out);
                }
                Output::Emit(event) => self.emit(event),
                Output::Close => {
                    if let Err(e) = sink.close().await {
                        tracing::debug!("[pusher] close: {e}");
                    }
                }
                Output::Reconnect(delay) => self.reconnect = Some(delay),
            }
        }
    }

    /// Deliver queued events when there is no socket to write to.
    fn emit_pending(&mut self) {
        while let Some(output) = self.pending.pop_front() {
            match output {
                Output::Emit(event) => self.emit(event),
                Output::Reconnect(delay) => self.reconnect = Some(delay),
                _ => {}
            }
        }
    }

    fn emit(&mut self, event: PushEvent) {
        self.listeners
            .retain(|listener| listener.unbounded_send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StaticAuth;

    impl ChannelAuthorizer for StaticAuth {
        async fn authorize(&self, socket_id: &str, channel: &str) -> Result<String, ApiError> {
            assert_eq!(channel, "private-user-1");
            Ok(format!("key:{socket_id}"))
        }
    }

    /// An in-memory socket: frames pushed on the returned sender reach the
    /// driver, frames the driver writes come out of the receiver.
    fn fake_socket() -> (
        UnboundedSender<String>,
        UnboundedReceiver<String>,
        impl Sink<String, Error = ApiError> + Unpin,
        impl Stream<Item = Result<String, ApiError>> + Unpin,
    ) {
        let (to_client, from_server) = mpsc::unbounded::<String>();
        let (to_server, sent) = mpsc::unbounded::<String>();
        let sink = to_server.sink_map_err(|e| ApiError::Realtime(e.to_string()));
        let stream = from_server.map(Ok::<_, ApiError>);
        (to_client, sent, sink, stream)
    }

    fn established(socket_id: &str) -> String {
        json!({
            "event": "pusher:connection_established",
            "data": json!({"socket_id": socket_id, "activity_timeout": 120}).to_string(),
        })
        .to_string()
    }

    #[test]
    fn test_user_channel_and_options() {
        assert_eq!(user_channel(12), "private-user-12");

        let config = ClientConfig::new("http://api.test");
        assert!(PusherOptions::from_config(&config).is_none());

        let config = config.with_realtime("app-key", "eu");
        let options = PusherOptions::from_config(&config).unwrap();
        assert_eq!(options.auth_endpoint, "http://api.test/pusher/auth");
        assert_eq!(options.activity_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_notification_on_channel() {
        let event = PushEvent::Message {
            channel: "private-user-1".into(),
            event: NOTIFICATION_EVENT.into(),
            data: json!({"id": "n9", "type": "CARD_ASSIGNED", "title": "Assigned", "message": "You own #4"}),
        };
        let notification = event.notification_on("private-user-1").unwrap();
        assert_eq!(notification.id, "n9");
        assert!(event.notification_on("private-user-2").is_none());
    }

    #[tokio::test]
    async fn test_driver_subscribes_and_delivers() {
        let (to_client, from_server) = mpsc::unbounded::<String>();
        let (to_server, mut sent) = mpsc::unbounded::<String>();
        let (client, mut commands) = PusherClient::channel();
        let mut events = client.events();
        client.subscribe("private-user-1");

        let sink = to_server.sink_map_err(|e| ApiError::Realtime(e.to_string()));
        let stream = from_server.map(Ok::<_, ApiError>);
        let driver = async move {
            let mut session = Session::new(Duration::from_secs(60), StaticAuth);
            session.start(&mut commands);
            session.drive(&mut commands, sink, stream).await;
        };

        let script = async {
            let established = json!({
                "event": "pusher:connection_established",
                "data": json!({"socket_id": "77.1", "activity_timeout": 120}).to_string(),
            });
            to_client.unbounded_send(established.to_string()).unwrap();

            let subscribe: serde_json::Value =
                serde_json::from_str(&sent.next().await.unwrap()).unwrap();
            assert_eq!(subscribe["event"], "pusher:subscribe");
            assert_eq!(subscribe["data"]["auth"], "key:77.1");

            let succeeded = json!({
                "event": "pusher_internal:subscription_succeeded",
                "channel": "private-user-1",
                "data": "{}",
            });
            to_client.unbounded_send(succeeded.to_string()).unwrap();
            let push = json!({
                "event": "notification",
                "channel": "private-user-1",
                "data": json!({"id": "n1", "title": "Added"}).to_string(),
            });
            to_client.unbounded_send(push.to_string()).unwrap();

            let mut seen = Vec::new();
            while let Some(event) = events.next().await {
                let done = matches!(event, PushEvent::Message { .. });
                seen.push(event);
                if done {
                    break;
                }
            }
            client.disconnect();
            seen
        };

        let ((), seen) = futures::join!(driver, script);
        assert_eq!(
            seen[0],
            PushEvent::StateChange {
                previous: ConnectionState::Initialized,
                current: ConnectionState::Connecting,
            }
        );
        assert_eq!(
            seen[1],
            PushEvent::StateChange {
                previous: ConnectionState::Connecting,
                current: ConnectionState::Connected,
            }
        );
        assert_eq!(
            seen[2],
            PushEvent::SubscriptionSucceeded {
                channel: "private-user-1".into()
            }
        );
        let notification = seen[3].notification_on("private-user-1").unwrap();
        assert_eq!(notification.title, "Added");
    }

    #[tokio::test]
    async fn test_driver_reopens_dropped_socket() {
        let (to_client1, mut sent1, sink1, stream1) = fake_socket();
        let (to_client2, mut sent2, sink2, stream2) = fake_socket();
        let mut sockets = VecDeque::from([Ok((sink1, stream1)), Ok((sink2, stream2))]);
        let open = move || {
            futures::future::ready(
                sockets
                    .pop_front()
                    .unwrap_or_else(|| Err(ApiError::Realtime("no socket left".into()))),
            )
        };

        let (client, commands) = PusherClient::channel();
        let events = client.events();
        client.subscribe("private-user-1");
        let driver = run(Session::new(Duration::from_secs(60), StaticAuth), commands, open);

        let script = async {
            to_client1.unbounded_send(established("77.1")).unwrap();
            let subscribe: serde_json::Value =
                serde_json::from_str(&sent1.next().await.unwrap()).unwrap();
            assert_eq!(subscribe["data"]["auth"], "key:77.1");

            // Server goes away; the replacement socket answers right after the delay
            drop(to_client1);
            to_client2.unbounded_send(established("78.2")).unwrap();
            let subscribe: serde_json::Value =
                serde_json::from_str(&sent2.next().await.unwrap()).unwrap();
            assert_eq!(subscribe["event"], "pusher:subscribe");
            assert_eq!(subscribe["data"]["channel"], "private-user-1");
            assert_eq!(subscribe["data"]["auth"], "key:78.2");
            client.disconnect();
        };

        futures::join!(driver, script);
        let states: Vec<ConnectionState> = events
            .filter_map(|event| async move {
                match event {
                    PushEvent::StateChange { current, .. } => Some(current),
                    _ => None,
                }
            })
            .collect()
            .await;
        assert_eq!(
            states,
            vec![
                ConnectionState::Connecting,
                ConnectionState::Connected,
                ConnectionState::Unavailable,
                ConnectionState::Connecting,
                ConnectionState::Connected,
                ConnectionState::Disconnected,
            ]
        );
    }
}
