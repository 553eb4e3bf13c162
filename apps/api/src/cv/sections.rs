//! Splitting extracted CV text into named sections and model-sized chunks.

use serde_json::{Map, Value};

/// Name given to text that appears before the first recognised heading.
pub const HEADER_SECTION: &str = "header";

const MAX_HEADING_CHARS: usize = 48;

/// Canonical section name → heading spellings seen in real CVs.
const HEADINGS: &[(&str, &[&str])] = &[
    (
        "summary",
        &["summary", "professional summary", "profile", "about me", "objective", "career objective"],
    ),
    (
        "experience",
        &[
            "experience",
            "work experience",
            "professional experience",
            "employment history",
            "work history",
            "employment",
        ],
    ),
    ("education", &["education", "academic background", "qualifications"]),
    (
        "skills",
        &["skills", "technical skills", "core competencies", "competencies", "key skills"],
    ),
    ("projects", &["projects", "personal projects", "key projects"]),
    (
        "certifications",
        &[
            "certifications",
            "certificates",
            "licenses",
            "licenses & certifications",
            "licenses and certifications",
        ],
    ),
    ("languages", &["languages"]),
    ("awards", &["awards", "honors", "honours", "achievements"]),
    ("publications", &["publications"]),
    ("volunteering", &["volunteering", "volunteer experience"]),
    ("interests", &["interests", "hobbies"]),
    ("references", &["references"]),
    ("contact", &["contact", "contact information", "contact details"]),
];

#[derive(Debug, Clone, PartialEq)]
pub struct CvSection {
    pub name: String,
    pub body: String,
}

/// Returns the canonical section name if `line` is a heading on its own.
pub fn detect_heading(line: &str) -> Option<&'static str> {
    let cleaned = line
        .trim()
        .trim_matches(|c: char| matches!(c, '#' | '*' | '_' | '-' | '=' | '|'))
        .trim()
        .trim_end_matches(':')
        .trim();
    if cleaned.is_empty() || cleaned.chars().count() > MAX_HEADING_CHARS {
        return None;
    }
    let lower = cleaned.to_lowercase();
    HEADINGS
        .iter()
        .find(|(_, aliases)| aliases.contains(&lower.as_str()))
        .map(|(name, _)| *name)
}

/// Groups lines under the headings they follow. Repeated headings are merged;
/// empty sections are dropped.
pub fn split_cv_into_sections(text: &str) -> Vec<CvSection> {
    let mut sections: Vec<CvSection> = Vec::new();
    let mut current = HEADER_SECTION;
    let mut buffer: Vec<&str> = Vec::new();

    let mut flush = |name: &str, buffer: &mut Vec<&str>| {
        let body = buffer.join("\n").trim().to_string();
        buffer.clear();
        if body.is_empty() {
            return;
        }
        match sections.iter_mut().find(|s| s.name == name) {
            Some(existing) => {
                existing.body.push('\n');
                existing.body.push_str(&body);
            }
            None => sections.push(CvSection {
                name: name.to_string(),
                body,
            }),
        }
    };

    for line in text.lines() {
        match detect_heading(line) {
            Some(name) => {
                flush(current, &mut buffer);
                current = name;
            }
            None => buffer.push(line.trim_end()),
        }
    }
    flush(current, &mut buffer);

    sections
}

/// Splits `text` into pieces of at most `max_chars` characters, breaking on
/// line boundaries first and on whitespace within over-long lines.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    let mut push_piece = |piece: &str, sep: char, current: &mut String, len: &mut usize| {
        let piece_len = piece.chars().count();
        let needed = if current.is_empty() { piece_len } else { piece_len + 1 };
        if *len + needed > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(current));
            *len = 0;
        }
        if !current.is_empty() {
            current.push(sep);
            *len += 1;
        }
        current.push_str(piece);
        *len += piece_len;
    };

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.chars().count() <= max_chars {
            push_piece(line, '\n', &mut current, &mut current_len);
            continue;
        }
        for word in line.split_whitespace() {
            for piece in split_long_word(word, max_chars) {
                push_piece(piece, ' ', &mut current, &mut current_len);
            }
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn split_long_word(word: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (i, _) in word.char_indices() {
        if count == max_chars {
            pieces.push(&word[start..i]);
            start = i;
            count = 0;
        }
        count += 1;
    }
    pieces.push(&word[start..]);
    pieces
}

/// Joins per-chunk model outputs into one text per section, in section order.
pub fn combine_results(results: Vec<(String, String)>) -> Map<String, Value> {
    let mut combined: Vec<(String, Vec<String>)> = Vec::new();
    for (section, output) in results {
        let output = output.trim();
        if output.is_empty() {
            continue;
        }
        match combined.iter_mut().find(|(name, _)| *name == section) {
            Some((_, parts)) => parts.push(output.to_string()),
            None => combined.push((section, vec![output.to_string()])),
        }
    }

    combined
        .into_iter()
        .map(|(name, parts)| (name, Value::String(parts.join("\n"))))
        .collect()
}
