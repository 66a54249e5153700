//! Inbound routing at the connection boundary.
//!
//! The server only ever reads from a player at two moments: the HI
//! handshake and a round's answer window. [`Dispatcher::route`] decodes
//! a frame and classifies it for the current [`Phase`]; everything that
//! is not acceptable there becomes a [`Routed::Violation`] that the
//! caller turns into a soft removal.

use crate::{Codec, Message, MessageKind, ProtocolError};

/// When a frame was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Handshake of a freshly accepted connection.
    Joining,
    /// A round's answer window.
    Answering,
}

/// The outcome of routing one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// A join request.
    Hi { username: String },
    /// The player is leaving.
    Bye,
    /// An answer for the current round.
    Answer { answer: String },
    /// Undecodable, or a message type not valid in this phase.
    Violation(String),
}

/// Frames outbound messages and routes inbound ones.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher<C: Codec> {
    codec: C,
}

impl<C: Codec> Dispatcher<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Encodes a message into the bytes of one frame.
    pub fn frame(&self, msg: &Message) -> Result<Vec<u8>, ProtocolError> {
        self.codec.encode(msg)
    }

    /// Decodes a frame without routing it. Used by clients.
    pub fn decode(&self, data: &[u8]) -> Result<Message, ProtocolError> {
        self.codec.decode(data)
    }

    /// Decodes `data` and decides what it means in `phase`.
    pub fn route(&self, data: &[u8], phase: Phase) -> Routed {
        let msg: Message = match self.codec.decode(data) {
            Ok(msg) => msg,
            Err(e) => return Routed::Violation(e.to_string()),
        };
        let kind = msg.kind();

        match (phase, msg) {
            (_, Message::Bye) => Routed::Bye,
            (Phase::Joining, Message::Hi { username }) => Routed::Hi { username },
            (Phase::Answering, Message::Answer { answer }) => Routed::Answer { answer },
            (phase, _) if kind.is_client_bound() => {
                tracing::debug!(%kind, ?phase, "client sent a server-only message");
                Routed::Violation(format!("{kind} is sent by the server only"))
            }
            (phase, _) => Routed::Violation(format!("{kind} is not valid while {phase:?}")),
        }
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::JsonCodec;

    fn dispatcher() -> Dispatcher<JsonCodec> {
        Dispatcher::new(JsonCodec)
    }

    #[test]
    fn test_route_hi_while_joining() {
        let routed = dispatcher().route(br#"{"message_type":"HI","username":"bob"}"#, Phase::Joining);
        assert_eq!(routed, Routed::Hi { username: "bob".into() });
    }

    #[test]
    fn test_route_hi_while_answering_is_violation() {
        let routed =
            dispatcher().route(br#"{"message_type":"HI","username":"bob"}"#, Phase::Answering);
        assert!(matches!(routed, Routed::Violation(_)));
    }

    #[test]
    fn test_route_answer_while_answering() {
        let routed =
            dispatcher().route(br#"{"message_type":"ANSWER","answer":"7"}"#, Phase::Answering);
        assert_eq!(routed, Routed::Answer { answer: "7".into() });
    }

    #[test]
    fn test_route_answer_while_joining_is_violation() {
        let routed =
            dispatcher().route(br#"{"message_type":"ANSWER","answer":"7"}"#, Phase::Joining);
        assert!(matches!(routed, Routed::Violation(_)));
    }

    #[test]
    fn test_route_bye_in_any_phase() {
        let d = dispatcher();
        assert_eq!(d.route(br#"{"message_type":"BYE"}"#, Phase::Joining), Routed::Bye);
        assert_eq!(d.route(br#"{"message_type":"BYE"}"#, Phase::Answering), Routed::Bye);
    }

    #[test]
    fn test_route_server_message_from_client_is_violation() {
        let routed = dispatcher().route(
            br#"{"message_type":"RESULT","correct":true,"feedback":"x"}"#,
            Phase::Answering,
        );
        match routed {
            Routed::Violation(reason) => assert!(reason.contains("RESULT")),
            other => panic!("expected Violation, got {other:?}"),
        }
    }

    #[test]
    fn test_route_garbage_is_violation() {
        let routed = dispatcher().route(b"not json at all", Phase::Answering);
        assert!(matches!(routed, Routed::Violation(_)));
    }

    #[test]
    fn test_frame_then_decode() {
        let d = dispatcher();
        let msg = Message::Ready { info: "soon".into() };
        let bytes = d.frame(&msg).unwrap();
        assert_eq!(d.decode(&bytes).unwrap(), msg);
    }
}
