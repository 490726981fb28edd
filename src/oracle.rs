//! The analysis oracle: whatever turns source text into a flow graph.
//!
//! The layout engine only sees the oracle's output contract ([`Analysis`]).
//! Production wires in a model-backed implementation; tests and replays use
//! [`ReplayOracle`] or the rule-based [`crate::parser::RuleOracle`].

use crate::ir::Analysis;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("oracle returned an empty response")]
    Empty,
    #[error("failed to parse oracle response: {0}")]
    Payload(String),
    #[error("line {line}: unrecognized statement `{text}`")]
    Syntax { line: usize, text: String },
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

pub trait Oracle {
    fn analyze(&self, source: &str) -> Result<Analysis, OracleError>;
}

impl<F> Oracle for F
where
    F: Fn(&str) -> Result<Analysis, OracleError>,
{
    fn analyze(&self, source: &str) -> Result<Analysis, OracleError> {
        self(source)
    }
}

/// Answers every request with one recorded oracle response.
#[derive(Debug, Clone)]
pub struct ReplayOracle {
    payload: String,
}

impl ReplayOracle {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

impl Oracle for ReplayOracle {
    fn analyze(&self, _source: &str) -> Result<Analysis, OracleError> {
        parse_payload(&self.payload)
    }
}

/// Decodes an oracle response. Model output is often wrapped in a Markdown
/// fence or carries trailing commas, so fences are stripped and JSON5 is tried
/// when strict JSON fails.
pub fn parse_payload(raw: &str) -> Result<Analysis, OracleError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(OracleError::Empty);
    }
    match serde_json::from_str::<Analysis>(body) {
        Ok(analysis) => Ok(analysis),
        Err(json_err) => json5::from_str::<Analysis>(body).map_err(|json5_err| {
            tracing::debug!(%json_err, %json5_err, "oracle payload rejected");
            OracleError::Payload(json_err.to_string())
        }),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => return text,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
