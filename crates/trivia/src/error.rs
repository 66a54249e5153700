//! Unified error type for the trivia server and client.

use trivia_protocol::ProtocolError;
use trivia_registry::RegistryError;
use trivia_round::RoundError;
use trivia_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// Everything here is fatal to the process. Problems with a single
/// player are handled where they occur and never surface as a
/// `TriviaError`.
#[derive(Debug, thiserror::Error)]
pub enum TriviaError {
    /// The configuration file is missing, malformed, or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The listening socket could not be created.
    #[error("Binding to port {port} was unsuccessful")]
    Bind {
        port: u16,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The session was aborted by the round engine.
    #[error(transparent)]
    Round(#[from] RoundError),

    /// Local terminal I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_error_keeps_diagnostic() {
        let err: TriviaError = ConfigError::NotProvided.into();
        assert!(matches!(err, TriviaError::Config(_)));
        assert_eq!(err.to_string(), "Configuration not provided");
    }

    #[test]
    fn test_bind_error_names_port() {
        let err = TriviaError::Bind {
            port: 4000,
            source: TransportError::ConnectionClosed("in use".into()),
        };
        assert_eq!(err.to_string(), "Binding to port 4000 was unsuccessful");
    }

    #[test]
    fn test_from_transport_error() {
        let err: TriviaError = TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, TriviaError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_round_error() {
        let err: TriviaError = RoundError::NoRounds.into();
        assert!(matches!(err, TriviaError::Round(_)));
    }

    #[test]
    fn test_from_registry_error() {
        let err: TriviaError = RegistryError::SessionFull(2).into();
        assert!(matches!(err, TriviaError::Registry(_)));
    }
}
