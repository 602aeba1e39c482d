//! Defensive parsing of free-text grading responses.
//!
//! The model is asked for a strict two-line format but rarely guaranteed to
//! honor it, so recognition is an ordered list of pattern matchers applied
//! per line; the first line that yields a score wins. An unrecognizable
//! response yields no score at all — the caller fails closed, because
//! unverified marks must never be awarded.

use tracing::debug;

/// Outcome of parsing one model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// Extracted score on the `max_marks` scale, if any pattern matched.
    pub score: Option<f32>,
    /// Extracted reason line, or a placeholder.
    pub explanation: String,
}

/// Ordered score matchers, most specific first.
const SCORE_MATCHERS: &[fn(&str, f32) -> Option<f32>] =
    &[score_line, score_anywhere, percentage_phrase];

/// Scans a response for a score and a reason.
pub fn parse_response(response: &str, max_marks: f32) -> ParsedResponse {
    let mut score = None;
    let mut explanation = None;

    for line in response.lines() {
        let line = line.trim();

        if score.is_none() {
            for matcher in SCORE_MATCHERS {
                if let Some(value) = matcher(line, max_marks) {
                    debug!(line, value, "Matched score pattern");
                    score = Some(value);
                    break;
                }
            }
        }

        if explanation.is_none() {
            if let Some(rest) = line.strip_prefix("Reason:") {
                explanation = Some(rest.trim().to_string());
            }
        }
    }

    ParsedResponse {
        score,
        explanation: explanation.unwrap_or_else(|| "No explanation provided".to_string()),
    }
}

/// `Score:` at the start of the line.
fn score_line(line: &str, max_marks: f32) -> Option<f32> {
    let rest = line.strip_prefix("Score:")?;
    score_from_text(rest, max_marks)
}

/// `Score:` anywhere in the line.
fn score_anywhere(line: &str, max_marks: f32) -> Option<f32> {
    let idx = line.find("Score:")?;
    score_from_text(&line[idx + "Score:".len()..], max_marks)
}

/// Alternate phrasing: "... percentage score of 85% ...".
fn percentage_phrase(line: &str, max_marks: f32) -> Option<f32> {
    if !line.to_lowercase().contains("percentage score of") {
        return None;
    }
    let (value, is_percent) = extract_number(line)?;
    if !is_percent {
        return None;
    }
    Some(((value / 100.0) * max_marks).clamp(0.0, max_marks))
}

/// Converts matched score text to the `max_marks` scale.
///
/// A trailing `%` marks a percentage; a bare value above 100 is treated as
/// an implicit percentage; a bare value at or below 100 is taken as marks.
/// The result is clamped to `[0, max_marks]`.
fn score_from_text(text: &str, max_marks: f32) -> Option<f32> {
    let (value, is_percent) = extract_number(text)?;

    let score = if is_percent || value > 100.0 {
        (value / 100.0) * max_marks
    } else {
        value
    };

    Some(score.clamp(0.0, max_marks))
}

/// Extracts the first number in `text` and whether a `%` follows it.
fn extract_number(text: &str) -> Option<(f32, bool)> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|b| b.is_ascii_digit())?;

    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }

    let value: f32 = text[start..end].parse().ok()?;

    let is_percent = text[end..].trim_start().starts_with('%');

    Some((value, is_percent))
}
