//! End-to-end tests: a real server on loopback TCP with real clients.

use std::time::Duration;

use trivia::prelude::*;
use trivia_transport::{Connection, TcpLineConnection};

// =========================================================================
// Helpers
// =========================================================================

fn config(players: usize, question_types: &[&str]) -> ServerConfig {
    let json = serde_json::json!({
        "port": 0,
        "players": players,
        "question_types": question_types,
        "question_formats": {
            "Mathematics": "Calculate: {}",
            "Roman Numerals": "Convert {} to decimal:",
            "Usable IP Addresses of a Subnet": "How many usable addresses in {}?",
            "Network and Broadcast Address of a Subnet": "Network and broadcast of {}?"
        },
        "question_seconds": 2,
        "question_interval_seconds": 0,
        "ready_info": "Game starts in {question_interval_seconds} seconds!",
        "question_word": "Q",
        "correct_answer": "Correct!",
        "incorrect_answer": "Wrong! Answer was {correct_answer}",
        "points_noun_singular": "point",
        "points_noun_plural": "points",
        "final_standings_heading": "===FINAL===",
        "one_winner": "Winner: {}",
        "multiple_winners": "Winners: {}"
    });
    ServerConfig::from_json(&json.to_string()).expect("valid config")
}

/// Binds a server and runs it in the background. Returns its address.
async fn start(
    config: ServerConfig,
) -> (String, tokio::task::JoinHandle<Result<SessionSummary, TriviaError>>) {
    let server = TriviaServer::bind(config, BuiltinQuestions)
        .await
        .expect("bind");
    let addr = format!("127.0.0.1:{}", server.local_addr().unwrap().port());
    (addr, tokio::spawn(server.run()))
}

fn client_config(username: &str, client_mode: ClientMode) -> ClientConfig {
    ClientConfig {
        username: username.into(),
        client_mode,
    }
}

/// Connects and plays a whole session without terminal input.
async fn play(addr: &str, username: &str, mode: ClientMode, input: &'static [u8]) -> (ClientExit, String) {
    let client = TriviaClient::connect(addr, client_config(username, mode))
        .await
        .expect("connect");
    let mut output = Vec::new();
    let exit = client.run(input, &mut output).await.expect("run");
    (exit, String::from_utf8(output).unwrap())
}

async fn raw_hi(addr: &str, username: &str) -> TcpLineConnection {
    let conn = TcpLineConnection::connect(addr).await.expect("connect");
    let hi = serde_json::to_vec(&Message::Hi {
        username: username.into(),
    })
    .unwrap();
    conn.send(&hi).await.unwrap();
    conn
}

const ALL_TYPES: [&str; 4] = [
    "Mathematics",
    "Roman Numerals",
    "Usable IP Addresses of a Subnet",
    "Network and Broadcast Address of a Subnet",
];

// =========================================================================
// Sessions
// =========================================================================

#[tokio::test]
async fn test_two_auto_clients_play_every_question_type() {
    let (addr, server) = start(config(2, &ALL_TYPES)).await;

    let alice = tokio::spawn({
        let addr = addr.clone();
        async move { play(&addr, "alice", ClientMode::Auto, b"").await }
    });
    let bob = tokio::spawn({
        let addr = addr.clone();
        async move { play(&addr, "bob", ClientMode::Auto, b"").await }
    });

    let (alice_exit, alice_out) = alice.await.unwrap();
    let (bob_exit, _) = bob.await.unwrap();
    let summary = server.await.unwrap().expect("session");

    assert_eq!(alice_exit, ClientExit::Finished);
    assert_eq!(bob_exit, ClientExit::Finished);

    assert_eq!(summary.rounds.len(), 4);
    for report in &summary.rounds {
        assert_eq!(report.count(Outcome::Correct), 2);
        assert!(report.completed_early);
    }
    assert_eq!(
        summary.final_standings,
        "===FINAL===\n1. alice: 4 points\n1. bob: 4 points\nWinners: alice, bob"
    );

    assert!(alice_out.starts_with("Game starts in 0 seconds!\nQ 1 (Mathematics):\nCalculate: "));
    assert_eq!(alice_out.matches("Correct!").count(), 4);
    assert!(alice_out.ends_with("Winners: alice, bob\n"));
}

#[tokio::test]
async fn test_typed_answers_are_judged() {
    let (addr, server) = start(config(1, &["Mathematics"])).await;

    let (exit, output) = play(&addr, "alice", ClientMode::You, b"not a number\n").await;
    let summary = server.await.unwrap().expect("session");

    assert_eq!(exit, ClientExit::Finished);
    assert!(output.contains("Wrong! Answer was "));
    assert!(output.contains("1. alice: 0 points"));
    assert_eq!(summary.rounds[0].count(Outcome::Incorrect), 1);
}

#[tokio::test]
async fn test_no_typed_answer_times_out() {
    let (addr, server) = start(config(1, &["Roman Numerals"])).await;

    let client = TriviaClient::connect(&addr, client_config("alice", ClientMode::You))
        .await
        .unwrap();
    // Input that never yields a line.
    let (_keep_open, input) = tokio::io::duplex(64);
    let mut output = Vec::new();
    let exit = client
        .run(tokio::io::BufReader::new(input), &mut output)
        .await
        .unwrap();
    let summary = server.await.unwrap().expect("session");

    assert_eq!(exit, ClientExit::Finished);
    assert_eq!(summary.rounds[0].count(Outcome::TimedOut), 1);
    assert!(!summary.rounds[0].completed_early);
}

#[tokio::test]
async fn test_client_leaving_when_input_ends() {
    let (addr, server) = start(config(2, &["Mathematics", "Mathematics"])).await;

    let quitter = tokio::spawn({
        let addr = addr.clone();
        async move { play(&addr, "quitter", ClientMode::You, b"").await }
    });
    let (stayer_exit, stayer_out) = play(&addr, "stayer", ClientMode::Auto, b"").await;

    assert_eq!(quitter.await.unwrap().0, ClientExit::Left);
    assert_eq!(stayer_exit, ClientExit::Finished);
    assert!(stayer_out.ends_with("===FINAL===\n1. stayer: 2 points\nWinner: stayer\n"));

    let summary = server.await.unwrap().expect("session");
    assert_eq!(summary.rounds[0].departed.len(), 1);
    assert_eq!(summary.rounds[1].outcomes.len(), 1);
}

// =========================================================================
// Join phase
// =========================================================================

#[tokio::test]
async fn test_invalid_username_is_turned_away() {
    let (addr, server) = start(config(1, &["Mathematics"])).await;

    let rejected = raw_hi(&addr, "bad name").await;
    assert_eq!(rejected.recv().await.unwrap(), None);

    let (exit, _) = play(&addr, "alice", ClientMode::Auto, b"").await;
    assert_eq!(exit, ClientExit::Finished);
    assert_eq!(server.await.unwrap().unwrap().leaderboard.entries().len(), 1);
}

#[tokio::test]
async fn test_message_other_than_hi_is_turned_away() {
    let (addr, server) = start(config(1, &["Mathematics"])).await;

    let conn = TcpLineConnection::connect(&addr).await.unwrap();
    conn.send(br#"{"message_type":"ANSWER","answer":"3"}"#).await.unwrap();
    assert_eq!(conn.recv().await.unwrap(), None);

    play(&addr, "alice", ClientMode::Auto, b"").await;
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_silent_connection_does_not_block_joins() {
    let (addr, server) = start(config(1, &["Mathematics"])).await;

    let silent = TcpLineConnection::connect(&addr).await.unwrap();
    let (exit, _) = play(&addr, "alice", ClientMode::Auto, b"").await;

    assert_eq!(exit, ClientExit::Finished);
    server.await.unwrap().unwrap();
    // The pending handshake was dropped once the session filled up.
    let closed = tokio::time::timeout(Duration::from_secs(1), silent.recv()).await;
    assert!(matches!(closed, Ok(Ok(None)) | Ok(Err(_))));
}

#[tokio::test]
async fn test_duplicate_usernames_are_allowed() {
    let (addr, server) = start(config(2, &["Mathematics"])).await;

    let first = tokio::spawn({
        let addr = addr.clone();
        async move { play(&addr, "sam", ClientMode::Auto, b"").await }
    });
    let (exit, _) = play(&addr, "sam", ClientMode::Auto, b"").await;

    assert_eq!(exit, ClientExit::Finished);
    assert_eq!(first.await.unwrap().0, ClientExit::Finished);
    let summary = server.await.unwrap().unwrap();
    assert!(summary.final_standings.ends_with("Winners: sam, sam"));
}

// =========================================================================
// Startup failures
// =========================================================================

#[tokio::test]
async fn test_bind_to_taken_port_fails() {
    let first = TriviaServer::bind(config(1, &["Mathematics"]), BuiltinQuestions)
        .await
        .unwrap();
    let mut taken = config(1, &["Mathematics"]);
    taken.port = first.local_addr().unwrap().port();

    let err = TriviaServer::bind(taken.clone(), BuiltinQuestions)
        .await
        .err()
        .expect("second bind fails");

    assert!(matches!(err, TriviaError::Bind { .. }));
    assert_eq!(
        err.to_string(),
        format!("Binding to port {} was unsuccessful", taken.port)
    );
}

#[tokio::test]
async fn test_bind_rejects_invalid_config() {
    let mut bad = config(1, &["Mathematics"]);
    bad.players = 0;

    let err = TriviaServer::bind(bad, BuiltinQuestions).await.err().unwrap();
    assert!(matches!(err, TriviaError::Config(ConfigError::InvalidValue { .. })));
}
