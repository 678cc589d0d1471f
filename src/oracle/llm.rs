//! Oracle backed by a language model.

use super::{MoveOracle, OracleError, OracleMove, OracleRequest, prompt};
use crate::llm_client::LlmClient;
use tracing::{debug, instrument, warn};

/// Asks a language model for the opponent's move.
#[derive(Debug, Clone)]
pub struct LlmOracle {
    client: LlmClient,
}

impl LlmOracle {
    /// Creates an oracle around an LLM client.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl MoveOracle for LlmOracle {
    #[instrument(skip(self, request), fields(model = %self.client.config().model()))]
    async fn choose_move(&self, request: &OracleRequest) -> Result<OracleMove, OracleError> {
        let message = prompt::user_message(request);
        debug!(prompt_length = message.len(), "Prompting language model");

        let reply = self.client.generate(prompt::SYSTEM_PROMPT, &message).await?;
        parse_reply(&reply).inspect_err(|e| warn!(error = %e, reply = %reply, "Unusable reply"))
    }

    fn name(&self) -> &str {
        "llm"
    }
}

/// Extracts the move object from a model reply.
///
/// Models wrap JSON in prose or Markdown fences often enough that the
/// reply is cut down to the outermost `{ ... }` before parsing.
///
/// # Errors
///
/// Returns [`OracleError::Parse`] when no object is found or the object
/// lacks an integer `move`.
#[instrument(level = "debug", skip(reply))]
pub fn parse_reply(reply: &str) -> Result<OracleMove, OracleError> {
    let start = reply
        .find('{')
        .ok_or_else(|| OracleError::Parse("no JSON object in reply".to_string()))?;
    let end = reply
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| OracleError::Parse("unterminated JSON object".to_string()))?;

    serde_json::from_str(&reply[start..=end]).map_err(|e| OracleError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_object() {
        let mv = parse_reply(r#"{"move": 4, "explanation": "Center is strongest."}"#).unwrap();
        assert_eq!(mv, OracleMove::new(4, "Center is strongest.".to_string()));
    }

    #[test]
    fn test_parse_fenced_object() {
        let reply = "Sure!\n```json\n{\"move\": 2, \"explanation\": \"Block the row.\"}\n```";
        let mv = parse_reply(reply).unwrap();
        assert_eq!(mv.index, 2);
        assert_eq!(mv.explanation, "Block the row.");
    }

    #[test]
    fn test_parse_keeps_out_of_range_index() {
        let mv = parse_reply(r#"{"move": -1, "explanation": "?"}"#).unwrap();
        assert_eq!(mv.index, -1);
    }

    #[test]
    fn test_parse_missing_explanation_defaults_empty() {
        let mv = parse_reply(r#"{"move": 7}"#).unwrap();
        assert_eq!(mv.index, 7);
        assert!(mv.explanation.is_empty());
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(matches!(parse_reply("I'll take the center."), Err(OracleError::Parse(_))));
        assert!(matches!(parse_reply("} backwards {"), Err(OracleError::Parse(_))));
        assert!(matches!(parse_reply(r#"{"explanation": "no move"}"#), Err(OracleError::Parse(_))));
    }
}
