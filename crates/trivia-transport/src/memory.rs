//! In-process transport: a connection and the peer that drives it.
//!
//! Frames travel over unbounded channels, so sends never block. Closing
//! the connection drops its outbound sender, which the peer observes as
//! end-of-stream.

use tokio::sync::{Mutex, mpsc};

use crate::{Connection, ConnectionId, TransportError, next_connection_id};

/// Server side of an in-memory connection.
pub struct MemoryConnection {
    id: ConnectionId,
    inbound: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
}

/// Remote side of a [`MemoryConnection`].
///
/// Dropping the peer (or calling [`MemoryPeer::hang_up`]) makes the
/// connection's `recv` return `Ok(None)`.
pub struct MemoryPeer {
    to_server: Option<mpsc::UnboundedSender<Vec<u8>>>,
    from_server: mpsc::UnboundedReceiver<Vec<u8>>,
}

/// Creates a connected pair.
pub fn memory_pair() -> (MemoryConnection, MemoryPeer) {
    let (to_server, inbound) = mpsc::unbounded_channel();
    let (outbound, from_server) = mpsc::unbounded_channel();

    let conn = MemoryConnection {
        id: next_connection_id(),
        inbound: Mutex::new(inbound),
        outbound: Mutex::new(Some(outbound)),
    };
    let peer = MemoryPeer {
        to_server: Some(to_server),
        from_server,
    };
    (conn, peer)
}

impl Connection for MemoryConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let outbound = self.outbound.lock().await;
        let sender = outbound
            .as_ref()
            .ok_or_else(|| TransportError::ConnectionClosed("closed locally".into()))?;
        sender
            .send(data.to_vec())
            .map_err(|_| TransportError::ConnectionClosed("peer dropped".into()))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.inbound.lock().await.recv().await)
    }

    fn try_recv(&self) -> Option<Result<Option<Vec<u8>>, TransportError>> {
        let mut inbound = self.inbound.try_lock().ok()?;
        match inbound.try_recv() {
            Ok(frame) => Some(Ok(Some(frame))),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => Some(Ok(None)),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.outbound.lock().await.take();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

impl MemoryPeer {
    /// Sends a frame to the connection. Returns `false` once the
    /// connection side is gone or the peer has hung up.
    pub fn send(&self, data: impl Into<Vec<u8>>) -> bool {
        self.to_server
            .as_ref()
            .is_some_and(|tx| tx.send(data.into()).is_ok())
    }

    /// Waits for the next frame from the connection. `None` once the
    /// connection has been closed and every queued frame was read.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.from_server.recv().await
    }

    /// Returns a queued frame without waiting.
    pub fn try_recv(&mut self) -> Option<Vec<u8>> {
        self.from_server.try_recv().ok()
    }

    /// Drains every frame queued so far.
    pub fn drain(&mut self) -> Vec<Vec<u8>> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Closes the peer's sending side; the connection sees end-of-stream.
    pub fn hang_up(&mut self) {
        self.to_server.take();
    }
}
