//! Tests for oracle replies and the offline oracle.

use noughts::{
    Board, FirstOpenOracle, Mark, MoveOracle, OracleError, OracleRequest, Position, parse_reply,
};
use serde_json::json;

#[test]
fn test_reply_in_prose_and_fence() {
    let reply = "Sure! Here is my move:\n```json\n\
                 {\"move\": 2, \"explanation\": \"Block the top row.\"}\n```\nGood luck!";
    let mv = parse_reply(reply).unwrap();
    assert_eq!(mv.index, 2);
    assert_eq!(mv.explanation, "Block the top row.");
}

#[test]
fn test_non_integer_move_is_parse_error() {
    let err = parse_reply(r#"{"move": "center", "explanation": "x"}"#).unwrap_err();
    assert!(matches!(err, OracleError::Parse(_)));
}

#[test]
fn test_reply_without_object_is_parse_error() {
    let err = parse_reply("I would take the center square.").unwrap_err();
    assert!(matches!(err, OracleError::Parse(_)));
}

#[test]
fn test_request_wire_shape() {
    let mut board = Board::new();
    board.place(Position::TopLeft, Mark::X).unwrap();
    board.place(Position::Center, Mark::O).unwrap();

    let request = OracleRequest::new(board, Mark::X, Mark::O);
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(
        value,
        json!({
            "board": ["X", null, null, null, "O", null, null, null, null],
            "playerMark": "X",
            "aiMark": "O",
        })
    );
}

#[tokio::test]
async fn test_first_open_picks_lowest_empty_index() {
    let mut board = Board::new();
    for pos in [Position::TopLeft, Position::TopCenter, Position::MiddleLeft] {
        board.place(pos, Mark::X).unwrap();
    }
    let request = OracleRequest::new(board, Mark::X, Mark::O);

    let mv = FirstOpenOracle.choose_move(&request).await.unwrap();
    assert_eq!(mv.index, 2);
}

#[tokio::test]
async fn test_first_open_on_full_board() {
    let board = Board::from_marks([Some(Mark::X); 9]);
    let request = OracleRequest::new(board, Mark::X, Mark::O);

    let err = FirstOpenOracle.choose_move(&request).await.unwrap_err();
    assert!(matches!(err, OracleError::NoEmptySquare));
}
