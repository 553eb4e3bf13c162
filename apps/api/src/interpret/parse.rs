//! Two-stage parsing of a candidate span: strict JSON first, then JSON5.

use serde_json::{Number, Value};

/// Which grammar accepted the candidate span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Strict,
    Tolerant,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Strict => "strict",
            ParseMode::Tolerant => "tolerant",
        }
    }
}

/// Result of running a span through both parsers.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Accepted by `serde_json`.
    Strict(Value),
    /// Rejected by `serde_json`, accepted by `json5`.
    Tolerant(Value),
    /// Rejected by both; carries the tolerant parser's diagnostic.
    Rejected(String),
}

impl ParseOutcome {
    pub fn into_result(self) -> Result<(Value, ParseMode), String> {
        match self {
            ParseOutcome::Strict(v) => Ok((v, ParseMode::Strict)),
            ParseOutcome::Tolerant(v) => Ok((v, ParseMode::Tolerant)),
            ParseOutcome::Rejected(msg) => Err(msg),
        }
    }
}

pub fn parse_candidate(span: &str) -> ParseOutcome {
    if let Ok(value) = serde_json::from_str::<Value>(span) {
        return ParseOutcome::Strict(value);
    }

    match json5::from_str::<Value>(span) {
        Ok(value) => ParseOutcome::Tolerant(normalize_numbers(value)),
        Err(e) => ParseOutcome::Rejected(e.to_string()),
    }
}

/// json5 may surface `8` as `8.0`; fold integral floats back to integers so a
/// tolerant parse deserializes into integer fields like the strict one does.
fn normalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(integral(&n).unwrap_or(n)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_numbers(v)))
                .collect(),
        ),
        other => other,
    }
}

fn integral(n: &Number) -> Option<Number> {
    if n.is_i64() || n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    if f.fract() != 0.0 || f.abs() > 9_007_199_254_740_992.0 {
        return None;
    }
    Some(Number::from(f as i64))
}
