//! `axum` adapter, for sockets upgraded by an axum `WebSocketUpgrade`.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::{SinkExt, StreamExt, future};

use crate::TransportError;
use crate::connection::{Connection, Frame};

impl Connection {
    /// Wraps a socket handed over by `WebSocketUpgrade::on_upgrade`.
    pub fn from_axum(socket: WebSocket) -> Self {
        let (sink, source) = socket.split();
        let sink = sink
            .sink_map_err(|e| TransportError::SendFailed(e.to_string()))
            .with(|frame: Frame| future::ready(Ok::<_, TransportError>(to_message(frame))));
        let source = source.map(|next| {
            next.map(from_message)
                .map_err(|e| TransportError::ReadFailed(e.to_string()))
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
            code,
            reason: reason.into(),
        })),
    }
}

fn from_message(msg: Message) -> Frame {
    match msg {
        Message::Text(text) => Frame::Text(text.as_str().to_owned()),
        Message::Binary(data) => Frame::Binary(data.to_vec()),
        Message::Ping(_) => Frame::Ping,
        Message::Pong(_) => Frame::Pong,
        Message::Close(close) => Frame::Close(close.map(|c| (c.code, c.reason.as_str().to_owned()))),
    }
}
