//! Codec trait and the JSON implementation used on the wire.
//!
//! Every frame is a UTF-8 text frame holding one JSON object, so
//! [`Codec::encode`] produces a `String` rather than raw bytes.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts protocol values to text frames and back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a frame back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use scrawl_protocol::{Codec, Command, JsonCodec};
///
/// let codec = JsonCodec;
/// let cmd: Command = codec.decode(br#"{"type":"game/start"}"#).unwrap();
/// assert_eq!(cmd, Command::StartGame);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
