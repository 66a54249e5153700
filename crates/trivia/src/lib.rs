//! # Trivia
//!
//! A multiplayer trivia game over TCP. Players connect, introduce
//! themselves with `HI`, and once the session is full the server plays a
//! fixed sequence of timed question rounds, scoring every answer and
//! broadcasting standings between rounds.
//!
//! Messages are single-line JSON objects tagged by `message_type`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trivia::prelude::*;
//!
//! # async fn example() -> Result<(), TriviaError> {
//! let config = ServerConfig::load(Some("server.json".as_ref()))?;
//! let server = TriviaServer::bind(config, BuiltinQuestions).await?;
//! let summary = server.run().await?;
//! println!("{}", summary.final_standings);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod handler;
mod server;

pub use client::{ClientExit, TriviaClient};
pub use config::{ClientConfig, ClientMode, ConfigError, ServerConfig};
pub use error::TriviaError;
pub use handler::HANDSHAKE_WINDOW;
pub use server::TriviaServer;

/// Installs the `tracing` subscriber used by the binaries.
///
/// Filters come from `RUST_LOG` (default `info`); output goes to stderr
/// so a client's game text on stdout stays clean.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

pub mod prelude {
    pub use crate::{
        ClientConfig, ClientExit, ClientMode, ConfigError, ServerConfig, TriviaClient,
        TriviaError, TriviaServer,
    };
    pub use trivia_protocol::{Message, PlayerId};
    pub use trivia_questions::{BuiltinQuestions, QuestionKind, QuestionProvider};
    pub use trivia_round::{Leaderboard, Outcome, RoundReport, SessionSummary, Templates};
}
