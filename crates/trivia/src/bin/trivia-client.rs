use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::BufReader;
use trivia::prelude::*;

/// Joins a trivia session and plays it from the terminal.
#[derive(Parser, Debug)]
#[command(name = "trivia-client", version, about)]
struct Args {
    /// Path to the client configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Server address as host:port
    #[arg(long, default_value = "127.0.0.1:7777")]
    connect: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    trivia::init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(exit) => {
            tracing::debug!(?exit, "client finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("trivia-client: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ClientExit, TriviaError> {
    let config = ClientConfig::load(args.config.as_deref())?;
    let client = TriviaClient::connect(&args.connect, config).await?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    tokio::select! {
        result = client.run(stdin, &mut stdout) => result,
        _ = tokio::signal::ctrl_c() => {
            client.leave().await?;
            Ok(ClientExit::Left)
        }
    }
}
