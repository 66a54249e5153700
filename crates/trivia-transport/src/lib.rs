//! Transport abstraction layer for Trivia.
//!
//! Provides the [`Transport`] and [`Connection`] traits that the round
//! engine is written against, and two implementations:
//!
//! - [`TcpLineTransport`] — newline-delimited frames over TCP, one
//!   message per line.
//! - [`memory_pair`] — an in-process connection and its peer, used by
//!   tests and by embedders that drive players without sockets.

mod error;
mod memory;
mod tcp;

pub use error::TransportError;
pub use memory::{MemoryConnection, MemoryPeer, memory_pair};
pub use tcp::{MAX_LINE_BYTES, TcpLineConnection, TcpLineTransport};

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique connection IDs across all transports.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

fn next_connection_id() -> ConnectionId {
    ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// A single connection that exchanges whole frames with its peer.
///
/// The returned futures are `Send` so that generic code can hand a
/// connection to `tokio::spawn`.
pub trait Connection: Send + Sync + 'static {
    /// Sends one frame to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed. The
    /// future is cancel safe: dropping it (for example when a deadline
    /// fires) loses no bytes that a later call would have returned.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Returns the next frame only if it can be had without waiting.
    ///
    /// `None` means nothing is available right now; otherwise the result
    /// is what [`recv`](Connection::recv) would have returned.
    fn try_recv(&self) -> Option<Result<Option<Vec<u8>>, TransportError>>;

    /// Closes the connection. Closing twice is not an error.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
