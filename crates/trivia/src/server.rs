//! `TriviaServer` and its join phase.
//!
//! This ties the layers together: transport → protocol → registry →
//! round engine. A server runs exactly one session and then returns.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use trivia_protocol::{Dispatcher, JsonCodec};
use trivia_questions::{BuiltinQuestions, QuestionProvider};
use trivia_registry::{PlayerRegistry, SharedRegistry};
use trivia_round::{RoundCoordinator, SessionSummary};
use trivia_transport::{
    Connection, TcpLineConnection, TcpLineTransport, Transport, TransportError,
};

use crate::handler::{HANDSHAKE_WINDOW, admit};
use crate::{ServerConfig, TriviaError};

/// A bound trivia server, ready to host one session.
///
/// # Example
///
/// ```rust,ignore
/// let server = TriviaServer::bind(config, BuiltinQuestions).await?;
/// println!("listening on {}", server.local_addr()?);
/// let summary = server.run().await?;
/// ```
pub struct TriviaServer<Q: QuestionProvider = BuiltinQuestions> {
    transport: TcpLineTransport,
    config: ServerConfig,
    provider: Arc<Q>,
    dispatcher: Arc<Dispatcher<JsonCodec>>,
    handshake_window: Duration,
}

impl<Q: QuestionProvider> TriviaServer<Q> {
    /// Validates `config` against `provider` and binds the listening
    /// socket on all interfaces at `config.port`.
    pub async fn bind(config: ServerConfig, provider: Q) -> Result<Self, TriviaError> {
        config.validate(&provider)?;

        let addr = format!("0.0.0.0:{}", config.port);
        let transport = TcpLineTransport::bind(&addr)
            .await
            .map_err(|source| TriviaError::Bind {
                port: config.port,
                source,
            })?;

        Ok(Self {
            transport,
            config,
            provider: Arc::new(provider),
            dispatcher: Arc::new(Dispatcher::new(JsonCodec)),
            handshake_window: HANDSHAKE_WINDOW,
        })
    }

    /// Overrides how long a new connection has to send HI.
    pub fn with_handshake_window(mut self, window: Duration) -> Self {
        self.handshake_window = window;
        self
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Waits for the configured number of players, then plays the
    /// session to the end.
    pub async fn run(mut self) -> Result<SessionSummary, TriviaError> {
        tracing::info!(
            addr = %self.local_addr()?,
            players = self.config.players,
            rounds = self.config.question_types.len(),
            "trivia server running"
        );

        let registry = PlayerRegistry::shared(self.config.players);
        self.join_phase(&registry).await?;

        let coordinator = RoundCoordinator::new(
            registry,
            self.dispatcher,
            self.provider,
            self.config.round_config(),
        );
        Ok(coordinator.run().await?)
    }

    /// Accepts connections until every player slot is taken.
    ///
    /// Each connection is handshaken in its own task, so one slow client
    /// never holds up the others. Handshakes still pending when the
    /// session fills up are aborted, which closes their connections.
    ///
    /// An accept error that is not tied to a single connection ends the
    /// join phase; everyone who already joined is disconnected.
    async fn join_phase(
        &mut self,
        registry: &SharedRegistry<TcpLineConnection>,
    ) -> Result<(), TriviaError> {
        let mut handshakes = JoinSet::new();

        while !registry.lock().await.is_full() {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        tracing::debug!(conn_id = %conn.id(), peer = %conn.peer_addr(), "connection accepted");
                        handshakes.spawn(admit(
                            conn,
                            Arc::clone(registry),
                            Arc::clone(&self.dispatcher),
                            self.handshake_window,
                        ));
                    }
                    Err(e) if is_transient(&e) => tracing::warn!(error = %e, "accept failed"),
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed; abandoning the join phase");
                        handshakes.shutdown().await;
                        let joined = registry.lock().await.connections();
                        for conn in joined {
                            let _ = conn.close().await;
                        }
                        return Err(e.into());
                    }
                },
                Some(_) = handshakes.join_next(), if !handshakes.is_empty() => {}
            }
        }

        if !handshakes.is_empty() {
            tracing::info!(pending = handshakes.len(), "session full; dropping pending handshakes");
        }
        handshakes.shutdown().await;
        let players = registry.lock().await.len();
        tracing::info!(players, "all players joined");
        Ok(())
    }
}

/// Accept errors caused by one misbehaving peer. Anything else (running
/// out of descriptors, a closed listener) will not go away by retrying.
fn is_transient(err: &TransportError) -> bool {
    match err {
        TransportError::AcceptFailed(e) => matches!(
            e.kind(),
            ErrorKind::ConnectionAborted
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionRefused
                | ErrorKind::Interrupted
                | ErrorKind::WouldBlock
                | ErrorKind::TimedOut
        ),
        _ => false,
    }
}
