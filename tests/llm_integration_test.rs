//! Integration tests against live LLM providers.
//!
//! Run with `--features api`; each test needs the provider's API key.

use noughts::{Board, LlmClient, LlmConfig, LlmOracle, LlmProvider, Mark, MoveOracle, OracleRequest};
use tracing::instrument;

fn client(provider: LlmProvider, model: &str) -> LlmClient {
    dotenvy::dotenv().ok();
    let var = provider.api_key_var();
    let api_key = std::env::var(var).unwrap_or_else(|_| panic!("{var} not set"));
    LlmClient::new(LlmConfig::new(provider, api_key, model.to_string(), 256))
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_anthropic_connectivity() {
    let client = client(LlmProvider::Anthropic, "claude-3-5-haiku-20241022");

    let response = client
        .generate("You are a helpful assistant.", "Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_connectivity() {
    let client = client(LlmProvider::OpenAI, "gpt-4o-mini");

    let response = client
        .generate("You are a helpful assistant.", "Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_oracle_answers_with_move_object() {
    let oracle = LlmOracle::new(client(LlmProvider::OpenAI, "gpt-4o-mini"));

    let mut board = Board::new();
    board.place(noughts::Position::Center, Mark::X).unwrap();
    let request = OracleRequest::new(board, Mark::X, Mark::O);

    let answer = oracle.choose_move(&request).await.expect("Oracle failed");
    eprintln!("Move: {} ({})", answer.index, answer.explanation);
    assert!((0..9).contains(&answer.index), "Move should be on the board");
}
