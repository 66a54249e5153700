//! Concurrent answer collection for a single round.
//!
//! Every active player gets its own listener task for the round. A
//! listener reads at most one frame, bounded by the round deadline, and
//! turns it into exactly one [`Outcome`]. Meanwhile the collector polls
//! the registry and returns as soon as nobody is left to answer, or when
//! the deadline passes.
//!
//! Listeners never share mutable state except through the registry, and
//! the registry only accepts an answer for the round that is currently
//! open, so a slow listener from an old round cannot touch a later one.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until, timeout_at};
use trivia_protocol::{Codec, Dispatcher, Message, Phase, PlayerId, Routed};
use trivia_registry::{PlayerSnapshot, SharedRegistry};
use trivia_transport::Connection;

use crate::{Round, Templates};

/// What one player did in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// No scorable answer before the deadline. Players who left or broke
    /// the protocol mid-round also end up here.
    TimedOut,
}

/// Per-player outcomes of a finished round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    pub round: u32,
    /// One entry per player that was active when the round opened.
    pub outcomes: BTreeMap<PlayerId, Outcome>,
    /// Players soft-removed while the round was open.
    pub departed: BTreeSet<PlayerId>,
    /// `true` if every player settled before the deadline.
    pub completed_early: bool,
}

impl RoundReport {
    pub fn outcome(&self, id: PlayerId) -> Option<Outcome> {
        self.outcomes.get(&id).copied()
    }

    /// Number of players with the given outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.values().filter(|o| **o == outcome).count()
    }
}

/// Runs the answer window of each round.
pub struct AnswerCollector<C: Connection, K: Codec> {
    registry: SharedRegistry<C>,
    dispatcher: Arc<Dispatcher<K>>,
    templates: Arc<Templates>,
    poll_interval: Duration,
    join_grace: Duration,
}

impl<C: Connection, K: Codec> AnswerCollector<C, K> {
    pub fn new(
        registry: SharedRegistry<C>,
        dispatcher: Arc<Dispatcher<K>>,
        templates: Arc<Templates>,
        poll_interval: Duration,
        join_grace: Duration,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            templates,
            poll_interval,
            join_grace,
        }
    }

    /// Drops whatever `active` players sent before the round opened.
    ///
    /// ANSWER carries no round number, so anything already queued was
    /// meant for an earlier question. A queued BYE, hang-up or protocol
    /// violation still removes the player. Returns the players that are
    /// still active.
    pub async fn discard_stale(&self, active: Vec<PlayerSnapshot<C>>) -> Vec<PlayerSnapshot<C>> {
        let mut remaining = Vec::with_capacity(active.len());
        'players: for player in active {
            while let Some(received) = player.connection.try_recv() {
                let reason = match received {
                    Ok(Some(frame)) => match self.dispatcher.route(&frame, Phase::Answering) {
                        Routed::Answer { answer } => {
                            tracing::debug!(id = %player.id, %answer, "discarding stale answer");
                            continue;
                        }
                        Routed::Bye => "left between rounds".to_string(),
                        Routed::Hi { .. } => "HI received between rounds".to_string(),
                        Routed::Violation(reason) => reason,
                    },
                    Ok(None) => "connection closed between rounds".to_string(),
                    Err(e) => e.to_string(),
                };
                tracing::info!(id = %player.id, username = %player.username, %reason, "removing player");
                if let Err(e) = self.registry.lock().await.mark_disconnected(player.id) {
                    tracing::warn!(id = %player.id, error = %e, "failed to remove player");
                }
                let _ = player.connection.close().await;
                continue 'players;
            }
            remaining.push(player);
        }
        remaining
    }

    /// Collects answers for `round` from `active`, the players present
    /// when the round opened.
    ///
    /// Returns once every listener has settled or the round deadline has
    /// passed, plus at most `join_grace` spent waiting for listener tasks
    /// to finish. Stragglers are left to run out on their own; the round
    /// is closed in the registry before returning, so they can no longer
    /// score.
    pub async fn collect(&self, round: &Round, active: Vec<PlayerSnapshot<C>>) -> RoundReport {
        let ids: Vec<PlayerId> = active.iter().map(|p| p.id).collect();
        let shared = Arc::new(round.clone());

        let listeners: Vec<(PlayerId, JoinHandle<Settled>)> = active
            .into_iter()
            .map(|player| {
                let listener = Listener {
                    registry: Arc::clone(&self.registry),
                    dispatcher: Arc::clone(&self.dispatcher),
                    templates: Arc::clone(&self.templates),
                    round: Arc::clone(&shared),
                };
                (player.id, tokio::spawn(listener.run(player)))
            })
            .collect();

        let completed_early = self.wait_until_settled(&ids, round.deadline).await;

        let join_until = Instant::now() + self.join_grace;
        let mut report = RoundReport {
            round: round.number,
            completed_early,
            ..RoundReport::default()
        };
        for (id, handle) in listeners {
            let settled = match timeout_at(join_until, handle).await {
                Ok(Ok(settled)) => settled,
                Ok(Err(e)) => {
                    tracing::error!(%id, round = round.number, error = %e, "answer listener failed");
                    Settled::timed_out()
                }
                Err(_) => {
                    tracing::warn!(%id, round = round.number, "answer listener still running after round close");
                    Settled::timed_out()
                }
            };
            if settled.departed {
                report.departed.insert(id);
            }
            report.outcomes.insert(id, settled.outcome);
        }

        self.registry.lock().await.close_round();

        tracing::info!(
            round = round.number,
            correct = report.count(Outcome::Correct),
            incorrect = report.count(Outcome::Incorrect),
            timed_out = report.count(Outcome::TimedOut),
            early = completed_early,
            "round closed"
        );
        report
    }

    /// Polls until none of `ids` is still waiting to answer. Returns
    /// `true` if that happened before `deadline`.
    async fn wait_until_settled(&self, ids: &[PlayerId], deadline: Instant) -> bool {
        loop {
            let pending = self.registry.lock().await.unanswered_among(ids);
            let now = Instant::now();
            if pending == 0 {
                return now < deadline;
            }
            if now >= deadline {
                tracing::debug!(pending, "round deadline reached");
                return false;
            }
            sleep_until((now + self.poll_interval).min(deadline)).await;
        }
    }
}

/// The result of one listener task.
struct Settled {
    outcome: Outcome,
    departed: bool,
}

impl Settled {
    fn timed_out() -> Self {
        Self {
            outcome: Outcome::TimedOut,
            departed: false,
        }
    }

    fn departed() -> Self {
        Self {
            outcome: Outcome::TimedOut,
            departed: true,
        }
    }
}

/// Everything a listener task needs, owned so it can be spawned.
struct Listener<C: Connection, K: Codec> {
    registry: SharedRegistry<C>,
    dispatcher: Arc<Dispatcher<K>>,
    templates: Arc<Templates>,
    round: Arc<Round>,
}

impl<C: Connection, K: Codec> Listener<C, K> {
    async fn run(self, player: PlayerSnapshot<C>) -> Settled {
        let id = player.id;

        let frame = match timeout_at(self.round.deadline, player.connection.recv()).await {
            Err(_) => {
                tracing::trace!(%id, round = self.round.number, "no answer before deadline");
                return Settled::timed_out();
            }
            Ok(Ok(Some(frame))) => frame,
            Ok(Ok(None)) => {
                tracing::info!(%id, username = %player.username, "connection closed mid-round");
                self.remove(&player).await;
                return Settled::departed();
            }
            Ok(Err(e)) => {
                tracing::warn!(%id, username = %player.username, error = %e, "receive failed mid-round");
                self.remove(&player).await;
                return Settled::departed();
            }
        };

        match self.dispatcher.route(&frame, Phase::Answering) {
            Routed::Answer { answer } => self.judge(&player, &answer).await,
            Routed::Bye => {
                tracing::info!(%id, username = %player.username, "player left mid-round");
                self.remove(&player).await;
                Settled::departed()
            }
            Routed::Hi { .. } => {
                tracing::warn!(%id, "HI received mid-round");
                self.remove(&player).await;
                Settled::departed()
            }
            Routed::Violation(reason) => {
                tracing::warn!(%id, username = %player.username, %reason, "protocol violation");
                self.remove(&player).await;
                Settled::departed()
            }
        }
    }

    async fn judge(&self, player: &PlayerSnapshot<C>, answer: &str) -> Settled {
        let correct = self.round.is_correct(answer);
        let recorded = self
            .registry
            .lock()
            .await
            .record_answer(player.id, self.round.number, correct);

        let Some(score) = recorded else {
            // Round already closed, or the player was removed meanwhile.
            return Settled::timed_out();
        };
        tracing::debug!(id = %player.id, round = self.round.number, correct, score, "answer recorded");

        let feedback = self.templates.feedback(correct, answer, self.round.answer());
        let result = Message::Result { correct, feedback };
        match self.dispatcher.frame(&result) {
            Ok(bytes) => {
                if let Err(e) = player.connection.send(&bytes).await {
                    tracing::warn!(id = %player.id, error = %e, "failed to send RESULT");
                    self.remove(player).await;
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to encode RESULT"),
        }

        Settled {
            outcome: if correct {
                Outcome::Correct
            } else {
                Outcome::Incorrect
            },
            departed: false,
        }
    }

    async fn remove(&self, player: &PlayerSnapshot<C>) {
        if let Err(e) = self.registry.lock().await.mark_disconnected(player.id) {
            tracing::warn!(id = %player.id, error = %e, "failed to remove player");
        }
        let _ = player.connection.close().await;
    }
}
