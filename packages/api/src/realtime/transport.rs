//! Websocket and timer plumbing for each platform.
//!
//! Both targets expose the socket as a text-frame `Sink` plus a text-frame
//! `Stream`; binary and control frames are dropped before the driver sees
//! them.

use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use futures::{future, Sink, SinkExt, Stream, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    use crate::ApiError;

    pub async fn connect(
        url: &str,
    ) -> Result<
        (
            impl Sink<String, Error = ApiError> + Unpin,
            impl Stream<Item = Result<String, ApiError>> + Unpin,
        ),
        ApiError,
    > {
        let (socket, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| ApiError::Realtime(e.to_string()))?;
        let (sink, stream) = socket.split();
        let sink = sink
            .sink_map_err(|e| ApiError::Realtime(e.to_string()))
            .with(|text: String| future::ready(Ok::<_, ApiError>(Message::Text(text))));
        let stream = stream.filter_map(|message| {
            future::ready(match message {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(_) => None,
                Err(e) => Some(Err(ApiError::Realtime(e.to_string()))),
            })
        });
        Ok((sink, Box::pin(stream)))
    }

    pub async fn sleep(duration: std::time::Duration) {
        tokio::time::sleep(duration).await
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use futures::{future, Sink, SinkExt, Stream, StreamExt};
    use gloo_net::websocket::{futures::WebSocket, Message};

    use crate::ApiError;

    pub async fn connect(
        url: &str,
    ) -> Result<
        (
            impl Sink<String, Error = ApiError> + Unpin,
            impl Stream<Item = Result<String, ApiError>> + Unpin,
        ),
        ApiError,
    > {
        let socket = WebSocket::open(url).map_err(|e| ApiError::Realtime(e.to_string()))?;
        let (sink, stream) = socket.split();
        let sink = sink
            .sink_map_err(|e| ApiError::Realtime(e.to_string()))
            .with(|text: String| future::ready(Ok::<_, ApiError>(Message::Text(text))));
        let stream = stream.filter_map(|message| {
            future::ready(match message {
                Ok(Message::Text(text)) => Some(Ok(text)),
                Ok(Message::Bytes(_)) => None,
                Err(e) => Some(Err(ApiError::Realtime(e.to_string()))),
            })
        });
        Ok((sink, Box::pin(stream)))
    }

    pub async fn sleep(duration: std::time::Duration) {
        gloo_timers::future::sleep(duration).await
    }
}

#[cfg(not(target_arch = "wasm32"))]
use native as platform;
#[cfg(target_arch = "wasm32")]
use web as platform;

pub use platform::connect;

pub async fn sleep(duration: Duration) {
    platform::sleep(duration).await
}
