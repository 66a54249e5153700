//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The codec only converts between values and the bytes of a single
//! frame. Line framing (the trailing `\n`) belongs to the transport.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so one codec can be shared by every listener
/// task through an `Arc`.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into the bytes of one frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes one frame back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses compact single-line JSON (via `serde_json`).
///
/// `serde_json` escapes embedded newlines inside strings, so an encoded
/// frame never contains a raw `\n` and is safe to line-frame.
///
/// ```rust
/// use trivia_protocol::{Codec, JsonCodec, Message};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Message::Answer { answer: "42".into() }).unwrap();
/// assert_eq!(bytes, br#"{"message_type":"ANSWER","answer":"42"}"#);
///
/// let decoded: Message = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, Message::Answer { answer: "42".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
