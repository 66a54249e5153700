//! A terminal client for one trivia session.

use std::io::Write;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::timeout;
use trivia_protocol::{Dispatcher, JsonCodec, Message};
use trivia_questions::{BuiltinQuestions, QuestionProvider};
use trivia_transport::{Connection, TcpLineConnection};

use crate::{ClientConfig, ClientMode, TriviaError};

/// Why [`TriviaClient::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientExit {
    /// The session ended with FINISHED.
    Finished,
    /// The server closed the connection first.
    ServerClosed,
    /// The player's input ended, so the client said BYE.
    Left,
}

/// A connected player.
pub struct TriviaClient {
    connection: TcpLineConnection,
    dispatcher: Dispatcher<JsonCodec>,
    config: ClientConfig,
    solver: BuiltinQuestions,
}

impl TriviaClient {
    /// Connects to `addr` and sends HI.
    pub async fn connect(addr: &str, config: ClientConfig) -> Result<Self, TriviaError> {
        let connection = TcpLineConnection::connect(addr).await?;
        let client = Self {
            connection,
            dispatcher: Dispatcher::new(JsonCodec),
            config,
            solver: BuiltinQuestions,
        };
        client
            .send(&Message::Hi {
                username: client.config.username.clone(),
            })
            .await?;
        tracing::info!(%addr, username = %client.config.username, "connected");
        Ok(client)
    }

    /// Plays until the session ends.
    ///
    /// Server texts are written to `output`, one message per line. In
    /// [`ClientMode::You`] each answer is the next line of `input`, read
    /// within the question's time limit; a blank line or no line in time
    /// sends nothing.
    pub async fn run<R, W>(&self, input: R, output: &mut W) -> Result<ClientExit, TriviaError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        loop {
            let Some(frame) = self.connection.recv().await? else {
                tracing::info!("server closed the connection");
                return Ok(ClientExit::ServerClosed);
            };
            let msg = match self.dispatcher.decode(&frame) {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring undecodable message");
                    continue;
                }
            };

            match msg {
                Message::Ready { info } => writeln!(output, "{info}")?,
                Message::Question {
                    question_type,
                    trivia_question,
                    short_question,
                    time_limit,
                } => {
                    writeln!(output, "{trivia_question}")?;
                    output.flush()?;

                    let answer = match self.config.client_mode {
                        ClientMode::Auto => self.solve(&question_type, &short_question),
                        ClientMode::You => {
                            let limit = Duration::from_secs(time_limit);
                            match timeout(limit, lines.next_line()).await {
                                Ok(Ok(Some(line))) => Some(line.trim().to_string()),
                                Ok(Ok(None)) => {
                                    self.leave().await?;
                                    return Ok(ClientExit::Left);
                                }
                                Ok(Err(e)) => return Err(e.into()),
                                Err(_) => None,
                            }
                        }
                    };

                    if let Some(answer) = answer.filter(|a| !a.is_empty()) {
                        self.send(&Message::Answer { answer }).await?;
                    }
                }
                Message::Result { feedback, .. } => writeln!(output, "{feedback}")?,
                Message::Leaderboard { state } => writeln!(output, "{state}")?,
                Message::Finished { final_standings } => {
                    writeln!(output, "{final_standings}")?;
                    output.flush()?;
                    let _ = self.connection.close().await;
                    return Ok(ClientExit::Finished);
                }
                other => tracing::debug!(kind = %other.kind(), "unexpected message from server"),
            }
            output.flush()?;
        }
    }

    /// Sends BYE and closes the connection.
    pub async fn leave(&self) -> Result<(), TriviaError> {
        self.send(&Message::Bye).await?;
        self.connection.close().await?;
        tracing::info!("left the session");
        Ok(())
    }

    fn solve(&self, question_type: &str, short_question: &str) -> Option<String> {
        match self.solver.solve(question_type, short_question) {
            Ok(answer) => Some(answer),
            Err(e) => {
                tracing::warn!(error = %e, "could not solve question");
                None
            }
        }
    }

    async fn send(&self, msg: &Message) -> Result<(), TriviaError> {
        let bytes = self.dispatcher.frame(msg)?;
        self.connection.send(&bytes).await?;
        Ok(())
    }
}
