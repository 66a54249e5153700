//! Join-phase handshake for a freshly accepted connection.
//!
//! Each accepted connection gets its own Tokio task running [`admit`].
//! The flow is:
//!   1. Wait up to the handshake window for the first frame
//!   2. Require it to be HI
//!   3. Register the username → the player is in the session
//!
//! Any failure closes just this connection.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use trivia_protocol::{Codec, Dispatcher, Phase, PlayerId, Routed};
use trivia_registry::SharedRegistry;
use trivia_transport::Connection;

/// How long a new connection has to introduce itself.
pub const HANDSHAKE_WINDOW: Duration = Duration::from_secs(5);

/// Runs the HI handshake on `conn` and registers the player.
///
/// Returns the new player's id, or `None` if the connection was turned
/// away and closed.
pub(crate) async fn admit<C, K>(
    conn: C,
    registry: SharedRegistry<C>,
    dispatcher: Arc<Dispatcher<K>>,
    window: Duration,
) -> Option<PlayerId>
where
    C: Connection,
    K: Codec,
{
    let conn_id = conn.id();

    let frame = match timeout(window, conn.recv()).await {
        Ok(Ok(Some(frame))) => frame,
        Ok(Ok(None)) => {
            tracing::debug!(%conn_id, "connection closed before HI");
            return None;
        }
        Ok(Err(e)) => {
            tracing::debug!(%conn_id, error = %e, "recv error before HI");
            let _ = conn.close().await;
            return None;
        }
        Err(_) => {
            tracing::info!(%conn_id, "no HI within handshake window");
            let _ = conn.close().await;
            return None;
        }
    };

    let reason = match dispatcher.route(&frame, Phase::Joining) {
        Routed::Hi { username } => return join(conn, &registry, &username).await,
        Routed::Bye => "BYE before HI".to_string(),
        Routed::Answer { .. } => "ANSWER before HI".to_string(),
        Routed::Violation(reason) => reason,
    };
    tracing::debug!(%conn_id, %reason, "handshake rejected");
    let _ = conn.close().await;
    None
}

async fn join<C: Connection>(
    conn: C,
    registry: &SharedRegistry<C>,
    username: &str,
) -> Option<PlayerId> {
    let conn_id = conn.id();
    let conn = Arc::new(conn);
    let registered = registry
        .lock()
        .await
        .register(Arc::clone(&conn), username);

    match registered {
        Ok(player_id) => {
            tracing::info!(%conn_id, %player_id, %username, "player joined");
            Some(player_id)
        }
        Err(e) => {
            tracing::info!(%conn_id, %username, error = %e, "join rejected");
            let _ = conn.close().await;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_protocol::{JsonCodec, Message};
    use trivia_registry::PlayerRegistry;
    use trivia_transport::{MemoryConnection, MemoryPeer, memory_pair};

    fn hi(username: &str) -> Vec<u8> {
        serde_json::to_vec(&Message::Hi {
            username: username.into(),
        })
        .unwrap()
    }

    async fn run_admit(
        registry: &SharedRegistry<MemoryConnection>,
        setup: impl FnOnce(&mut MemoryPeer),
    ) -> (Option<PlayerId>, MemoryPeer) {
        let (conn, mut peer) = memory_pair();
        setup(&mut peer);
        let dispatcher = Arc::new(Dispatcher::new(JsonCodec));
        let id = admit(conn, Arc::clone(registry), dispatcher, HANDSHAKE_WINDOW).await;
        (id, peer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_admit_valid_hi_registers_player() {
        let registry = PlayerRegistry::shared(2);
        let (id, _peer) = run_admit(&registry, |p| {
            p.send(hi("alice"));
        })
        .await;

        assert_eq!(id, Some(PlayerId(0)));
        let reg = registry.lock().await;
        assert_eq!(reg.get(PlayerId(0)).unwrap().username, "alice");
    }

    #[tokio::test(start_paused = true)]
    async fn test_admit_invalid_username_closes_connection() {
        let registry = PlayerRegistry::shared(2);
        let (id, mut peer) = run_admit(&registry, |p| {
            p.send(hi("not valid!"));
        })
        .await;

        assert_eq!(id, None);
        assert!(registry.lock().await.is_empty());
        assert_eq!(peer.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admit_non_hi_first_message_is_rejected() {
        let registry = PlayerRegistry::shared(2);
        let (id, mut peer) = run_admit(&registry, |p| {
            p.send(serde_json::to_vec(&Message::Answer { answer: "1".into() }).unwrap());
        })
        .await;

        assert_eq!(id, None);
        assert_eq!(peer.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admit_malformed_json_is_rejected() {
        let registry = PlayerRegistry::shared(2);
        let (id, _peer) = run_admit(&registry, |p| {
            p.send(b"hello".to_vec());
        })
        .await;

        assert_eq!(id, None);
        assert!(registry.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_admit_silent_connection_times_out() {
        let registry = PlayerRegistry::shared(2);
        let start = tokio::time::Instant::now();
        let (id, mut peer) = run_admit(&registry, |_| {}).await;

        assert_eq!(id, None);
        assert!(start.elapsed() >= HANDSHAKE_WINDOW);
        assert_eq!(peer.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admit_when_full_is_rejected() {
        let registry = PlayerRegistry::shared(1);
        let (first, _alice) = run_admit(&registry, |p| {
            p.send(hi("alice"));
        })
        .await;
        let (second, mut bob) = run_admit(&registry, |p| {
            p.send(hi("bob"));
        })
        .await;

        assert_eq!(first, Some(PlayerId(0)));
        assert_eq!(second, None);
        assert_eq!(bob.recv().await, None);
    }
}
