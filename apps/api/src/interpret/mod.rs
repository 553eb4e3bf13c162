//! Response interpreter: turns free-text model output into a validated record.
//!
//! Pipeline:
//! 1. Candidate span = first `{` .. last `}` of the raw text.
//! 2. Strict JSON parse, falling back to JSON5 (trailing commas, comments,
//!    unquoted or single-quoted keys).
//! 3. Deserialize into the target contract and run its semantic checks.
//!
//! Pure and synchronous. No retries: every failure is terminal for the caller.

pub mod parse;
pub mod span;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use parse::{parse_candidate, ParseMode, ParseOutcome};
pub use span::candidate_span;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    #[error("no JSON object found in model output")]
    Extraction,

    #[error("could not parse JSON object: {0}")]
    Parse(String),

    #[error("model output does not match the expected schema: {0}")]
    Validation(String),
}

impl InterpretError {
    pub fn kind(&self) -> &'static str {
        match self {
            InterpretError::Extraction => "extraction_error",
            InterpretError::Parse(_) => "parse_error",
            InterpretError::Validation(_) => "validation_error",
        }
    }
}

/// A record shape that model output must satisfy.
///
/// Structural checks (field names, types, required fields) come from
/// `Deserialize`; `validate` adds the semantic ones.
pub trait OutputContract: DeserializeOwned {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A validated record plus the parser that recovered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpreted<T> {
    pub record: T,
    pub mode: ParseMode,
}

pub fn interpret<T: OutputContract>(raw: &str) -> Result<T, InterpretError> {
    interpret_detailed(raw).map(|i| i.record)
}

pub fn interpret_detailed<T: OutputContract>(raw: &str) -> Result<Interpreted<T>, InterpretError> {
    let span = candidate_span(raw).ok_or(InterpretError::Extraction)?;
    let (value, mode) = parse_candidate(span)
        .into_result()
        .map_err(InterpretError::Parse)?;
    let record = materialize::<T>(value)?;
    Ok(Interpreted { record, mode })
}

fn materialize<T: OutputContract>(value: Value) -> Result<T, InterpretError> {
    let record: T =
        serde_json::from_value(value).map_err(|e| InterpretError::Validation(e.to_string()))?;
    record.validate().map_err(InterpretError::Validation)?;
    Ok(record)
}
