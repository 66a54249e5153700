//! Newline-delimited TCP transport.
//!
//! Each frame is one line of UTF-8 text terminated by `\n`. The reader
//! and writer halves of the socket are locked independently, so sending
//! a frame never waits behind a pending read.

use std::net::SocketAddr;

use futures_util::FutureExt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError, next_connection_id};

/// Longest line accepted from a peer, terminator excluded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// A TCP [`Transport`] that produces line-framed connections.
pub struct TcpLineTransport {
    listener: TcpListener,
}

impl TcpLineTransport {
    /// Binds a listener to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| {
            TransportError::BindFailed {
                addr: addr.to_string(),
                source,
            }
        })?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpLineTransport {
    type Connection = TcpLineConnection;

    async fn accept(&mut self) -> Result<Self::Connection, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let conn = TcpLineConnection::from_stream(stream, addr);
        tracing::debug!(id = %conn.id, %addr, "accepted TCP connection");
        Ok(conn)
    }
}

/// Read half plus the bytes of a line that has not been completed yet.
///
/// `pending` lives here rather than on the stack of `recv` so that a
/// read interrupted by a timeout resumes where it stopped.
struct LineReader {
    inner: BufReader<OwnedReadHalf>,
    pending: Vec<u8>,
}

/// A single line-framed TCP connection.
pub struct TcpLineConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: Mutex<LineReader>,
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpLineConnection {
    /// Wraps an already-connected stream. Used by the client side.
    pub fn from_stream(stream: TcpStream, peer: SocketAddr) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            id: next_connection_id(),
            peer,
            reader: Mutex::new(LineReader {
                inner: BufReader::new(read_half),
                pending: Vec::new(),
            }),
            writer: Mutex::new(write_half),
        }
    }

    /// Connects to a server.
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await.map_err(|e| {
            TransportError::ConnectionClosed(format!("connect to {addr}: {e}"))
        })?;
        let peer = stream
            .peer_addr()
            .map_err(TransportError::ReceiveFailed)?;
        Ok(Self::from_stream(stream, peer))
    }

    /// The remote address of this connection.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Connection for TcpLineConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.extend_from_slice(data);
        frame.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&frame)
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut guard = self.reader.lock().await;
        let reader = &mut *guard;

        loop {
            let available = reader
                .inner
                .fill_buf()
                .await
                .map_err(TransportError::ReceiveFailed)?;
            let eof = available.is_empty();
            let newline = available.iter().position(|&b| b == b'\n');
            let used = newline.map_or(available.len(), |i| i + 1);
            reader.pending.extend_from_slice(&available[..used]);
            reader.inner.consume(used);

            // Checked per chunk so a peer that never sends `\n` cannot
            // grow the buffer past the cap.
            if reader.pending.len() > MAX_LINE_BYTES + 2 {
                reader.pending.clear();
                return Err(TransportError::LineTooLong {
                    limit: MAX_LINE_BYTES,
                });
            }

            if newline.is_none() && !eof {
                continue;
            }
            if eof && reader.pending.is_empty() {
                return Ok(None);
            }

            let mut line = std::mem::take(&mut reader.pending);
            while matches!(line.last(), Some(b'\n' | b'\r')) {
                line.pop();
            }

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Ok(Some(line));
        }
    }

    fn try_recv(&self) -> Option<Result<Option<Vec<u8>>, TransportError>> {
        // `recv` is cancel safe, so polling it once and dropping it keeps
        // any partial line for the next call.
        tokio::task::unconstrained(self.recv()).now_or_never()
    }

    async fn close(&self) -> Result<(), TransportError> {
        match self.writer.lock().await.shutdown().await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(TransportError::SendFailed(e)),
        }
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
