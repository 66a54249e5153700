use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use trivia::prelude::*;

/// Hosts one multiplayer trivia session.
#[derive(Parser, Debug)]
#[command(name = "trivia-server", version, about)]
struct Args {
    /// Path to the server configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    trivia::init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("trivia-server: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), TriviaError> {
    let config = ServerConfig::load(args.config.as_deref())?;
    let server = TriviaServer::bind(config, BuiltinQuestions).await?;
    let summary = server.run().await?;

    tracing::info!(
        rounds = summary.rounds.len(),
        winners = ?summary.leaderboard.winners(),
        "session complete"
    );
    Ok(())
}
