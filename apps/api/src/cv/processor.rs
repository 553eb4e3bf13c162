//! CV structuring and improvement pipelines on top of a `Seq2SeqModel`.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::cv::model::Seq2SeqModel;
use crate::cv::sections::{chunk_text, combine_results, split_cv_into_sections};
use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub section: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImprovedCv {
    /// Same shape as the input with every non-empty string rewritten.
    pub content: Value,
    pub suggestions: Vec<Suggestion>,
}

pub struct CvProcessor<'a> {
    model: &'a dyn Seq2SeqModel,
    chunk_chars: usize,
}

impl<'a> CvProcessor<'a> {
    pub fn new(model: &'a dyn Seq2SeqModel, chunk_chars: usize) -> Self {
        Self { model, chunk_chars }
    }

    /// Section split → chunk → model → recombine.
    pub async fn process_cv(&self, text: &str) -> Result<Map<String, Value>, AppError> {
        let mut results = Vec::new();

        for section in split_cv_into_sections(text) {
            let chunks = chunk_text(&section.body, self.chunk_chars);
            debug!(
                section = %section.name,
                chunks = chunks.len(),
                model = self.model.name(),
                "Structuring CV section"
            );
            for chunk in chunks {
                let input = format!("structure {}: {}", section.name, chunk);
                let output = self.model.generate(&input).await?;
                results.push((section.name.clone(), output));
            }
        }

        Ok(combine_results(results))
    }

    pub async fn improve_cv(&self, cv: &Map<String, Value>) -> Result<ImprovedCv, AppError> {
        let mut content = Value::Object(cv.clone());

        let mut leaves = Vec::new();
        collect_string_leaves(&content, String::new(), &mut leaves);
        for (pointer, text) in leaves {
            let improved = self.model.generate(&format!("improve: {text}")).await?;
            let improved = improved.trim();
            if improved.is_empty() {
                continue;
            }
            if let Some(slot) = content.pointer_mut(&pointer) {
                *slot = Value::String(improved.to_string());
            }
        }

        let mut suggestions = Vec::new();
        for (section, value) in cv {
            let text = flatten_text(value);
            if text.is_empty() {
                continue;
            }
            let suggestion = self
                .model
                .generate(&format!("suggest: {section}: {text}"))
                .await?;
            let suggestion = suggestion.trim();
            if !suggestion.is_empty() {
                suggestions.push(Suggestion {
                    section: section.clone(),
                    suggestion: suggestion.to_string(),
                });
            }
        }

        Ok(ImprovedCv {
            content,
            suggestions,
        })
    }
}

/// Collects `(json_pointer, text)` for every non-blank string in `value`.
fn collect_string_leaves(value: &Value, pointer: String, out: &mut Vec<(String, String)>) {
    match value {
        Value::String(s) if !s.trim().is_empty() => out.push((pointer, s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_string_leaves(item, format!("{pointer}/{i}"), out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                let escaped = key.replace('~', "~0").replace('/', "~1");
                collect_string_leaves(item, format!("{pointer}/{escaped}"), out);
            }
        }
        _ => {}
    }
}

/// All string content of a section, one piece per line.
fn flatten_text(value: &Value) -> String {
    let mut leaves = Vec::new();
    collect_string_leaves(value, String::new(), &mut leaves);
    leaves
        .into_iter()
        .map(|(_, text)| text.trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
