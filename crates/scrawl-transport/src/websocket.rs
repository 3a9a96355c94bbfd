//! `tokio-tungstenite` adapter.

use futures_util::{SinkExt, StreamExt, future};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use crate::TransportError;
use crate::connection::{Connection, Frame};

impl Connection {
    /// Wraps a stream that already finished the WebSocket handshake.
    pub fn new<S>(ws: WebSocketStream<S>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (sink, source) = ws.split();
        let sink = sink
            .sink_map_err(|e| TransportError::SendFailed(e.to_string()))
            .with(|frame: Frame| future::ready(Ok::<_, TransportError>(to_message(frame))));
        let source = source.filter_map(|next| {
            future::ready(match next {
                Ok(msg) => from_message(msg).map(Ok),
                Err(e) => Some(Err(TransportError::ReadFailed(e.to_string()))),
            })
        });
        Self::from_parts(sink, source)
    }
}

fn to_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::text(text),
        Frame::Binary(data) => Message::binary(data),
        Frame::Ping => Message::Ping(Default::default()),
        Frame::Pong => Message::Pong(Default::default()),
        Frame::Close(close) => Message::Close(close.map(|(code, reason)| CloseFrame {
            code: CloseCode::from(code),
            reason: reason.into(),
        })),
    }
}

/// Raw `Message::Frame`s never come out of a read; they map to nothing.
fn from_message(msg: Message) -> Option<Frame> {
    match msg {
        Message::Text(text) => Some(Frame::Text(text.as_str().to_owned())),
        Message::Binary(data) => Some(Frame::Binary(data.to_vec())),
        Message::Ping(_) => Some(Frame::Ping),
        Message::Pong(_) => Some(Frame::Pong),
        Message::Close(close) => Some(Frame::Close(
            close.map(|c| (u16::from(c.code), c.reason.as_str().to_owned())),
        )),
        Message::Frame(_) => None,
    }
}
