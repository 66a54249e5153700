//! Drives a whole session once the players are in.
//!
//! ```text
//! READY ─ interval ─ QUESTION 1 ─ answers ─ LEADERBOARD ─ interval ─ …
//!                    QUESTION n ─ answers ─ FINISHED ─ close all
//! ```
//!
//! Rounds never overlap: the next QUESTION is only sent after the previous
//! round has closed and its standings were broadcast.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time::{sleep, timeout};
use trivia_protocol::{Codec, Dispatcher, Message, PlayerId};
use trivia_questions::QuestionProvider;
use trivia_registry::SharedRegistry;
use trivia_transport::Connection;

use crate::{
    AnswerCollector, Leaderboard, Round, RoundConfig, RoundError, RoundReport, SessionState,
};

/// How long a single broadcast send may take before the recipient is
/// treated as gone.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// What a completed session looked like.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub rounds: Vec<RoundReport>,
    /// Standings after the last round.
    pub leaderboard: Leaderboard,
    /// The text sent in FINISHED.
    pub final_standings: String,
}

/// Sequences the rounds of one session.
pub struct RoundCoordinator<C: Connection, K: Codec, Q: QuestionProvider> {
    registry: SharedRegistry<C>,
    dispatcher: Arc<Dispatcher<K>>,
    provider: Arc<Q>,
    config: Arc<RoundConfig>,
    collector: AnswerCollector<C, K>,
    state: SessionState,
}

impl<C: Connection, K: Codec, Q: QuestionProvider> RoundCoordinator<C, K, Q> {
    pub fn new(
        registry: SharedRegistry<C>,
        dispatcher: Arc<Dispatcher<K>>,
        provider: Arc<Q>,
        config: RoundConfig,
    ) -> Self {
        let collector = AnswerCollector::new(
            Arc::clone(&registry),
            Arc::clone(&dispatcher),
            Arc::new(config.templates.clone()),
            config.poll_interval,
            config.join_grace,
        );
        Self {
            registry,
            dispatcher,
            provider,
            config: Arc::new(config),
            collector,
            state: SessionState::AwaitingPlayers,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Plays every configured round, then closes all connections.
    ///
    /// Connections are closed even when the session is aborted by an
    /// error.
    pub async fn run(mut self) -> Result<SessionSummary, RoundError> {
        let result = self.play().await;
        if let Err(e) = &result {
            tracing::error!(state = %self.state, error = %e, "session aborted");
        }
        self.close_all().await;
        result
    }

    async fn play(&mut self) -> Result<SessionSummary, RoundError> {
        if self.config.question_types.is_empty() {
            return Err(RoundError::NoRounds);
        }
        let config = Arc::clone(&self.config);

        self.transition(SessionState::Ready)?;
        let info = config.templates.ready_info(config.interval);
        self.broadcast(&Message::Ready { info }).await?;
        sleep(config.interval).await;

        let total = config.rounds();
        let mut reports = Vec::with_capacity(total);

        for (index, question_type) in config.question_types.iter().enumerate() {
            let number = index as u32 + 1;
            self.transition(SessionState::RoundActive)?;

            let active = self.registry.lock().await.begin_round(number);
            let active = self.collector.discard_stale(active).await;
            let round = Round::prepare(number, question_type, &*self.provider, &config)?;
            tracing::info!(
                round = number,
                question_type = %question_type,
                players = active.len(),
                "round started"
            );
            self.broadcast(&round.question_message()).await?;

            // Anyone dropped by the broadcast no longer counts.
            let active = {
                let registry = self.registry.lock().await;
                let still_active: Vec<_> = active
                    .into_iter()
                    .filter(|p| registry.get(p.id).is_some_and(|entry| entry.is_active()))
                    .collect();
                still_active
            };
            let report = self.collector.collect(&round, active).await;
            reports.push(report);

            self.transition(SessionState::RoundScoring)?;
            let leaderboard = Leaderboard::from_standings(self.registry.lock().await.standings());

            if index + 1 == total {
                self.transition(SessionState::Finished)?;
                let final_standings = leaderboard.final_standings(&config.templates);
                self.broadcast(&Message::Finished {
                    final_standings: final_standings.clone(),
                })
                .await?;
                tracing::info!(winners = ?leaderboard.winners(), "session finished");
                return Ok(SessionSummary {
                    rounds: reports,
                    leaderboard,
                    final_standings,
                });
            }

            self.transition(SessionState::Leaderboard)?;
            let state = leaderboard.render(&config.templates);
            self.broadcast(&Message::Leaderboard { state }).await?;
            sleep(config.interval).await;
        }

        Err(RoundError::NoRounds)
    }

    /// Sends `msg` to every active player concurrently.
    ///
    /// A recipient whose send fails or stalls is soft-removed; the rest
    /// still receive the message.
    async fn broadcast(&self, msg: &Message) -> Result<(), RoundError> {
        let bytes = self.dispatcher.frame(msg)?;
        let recipients = self.registry.lock().await.snapshot_active();

        let sends = recipients.iter().map(|player| {
            let bytes = &bytes;
            async move {
                let failure = match timeout(SEND_TIMEOUT, player.connection.send(bytes)).await {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(e.to_string()),
                    Err(_) => Some("send timed out".to_string()),
                };
                (player.id, failure)
            }
        });
        let failed: Vec<(PlayerId, String)> = join_all(sends)
            .await
            .into_iter()
            .filter_map(|(id, failure)| failure.map(|reason| (id, reason)))
            .collect();

        if !failed.is_empty() {
            let mut registry = self.registry.lock().await;
            for (id, reason) in &failed {
                tracing::warn!(%id, kind = %msg.kind(), %reason, "broadcast send failed; removing player");
                let _ = registry.mark_disconnected(*id);
            }
        }

        tracing::debug!(
            kind = %msg.kind(),
            recipients = recipients.len(),
            failed = failed.len(),
            "broadcast"
        );
        Ok(())
    }

    async fn close_all(&mut self) {
        if let Err(e) = self.transition(SessionState::Closed) {
            tracing::debug!(error = %e, "session already closed");
            return;
        }
        let connections = self.registry.lock().await.connections();
        join_all(connections.iter().map(|c| c.close())).await;
        tracing::info!(connections = connections.len(), "session closed");
    }

    fn transition(&mut self, to: SessionState) -> Result<(), RoundError> {
        if !self.state.can_transition_to(to) {
            return Err(RoundError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!(from = %self.state, %to, "session state");
        self.state = to;
        Ok(())
    }
}
