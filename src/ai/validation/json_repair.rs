//! JSON Repair
//!
//! Recovers JSON objects from LLM completions that wrap them in code fences,
//! surround them with prose, or leave trailing commas. A response cut off
//! mid-object is rejected rather than closed, so partial output never passes
//! for a complete answer.

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{DriftError, ErrorCategory, LlmError, Result};

/// Extract and parse JSON from an LLM response
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    JsonRepairer::new().parse_or_repair(content).map(|(value, _)| value)
}

/// Repair strategies applied in increasing order of aggressiveness
pub struct JsonRepairer {
    max_repair_attempts: usize,
}

impl Default for JsonRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairer {
    pub fn new() -> Self {
        Self {
            max_repair_attempts: 2,
        }
    }

    /// Parse JSON, attempting repair if the first parse fails.
    ///
    /// Returns the value and whether any repair was needed.
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool)> {
        let cleaned = preprocess(raw);
        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Ok((value, false));
        }

        debug!("Initial JSON parse failed, attempting repair");

        // Prose around an otherwise valid object
        if let Some(extracted) = extract_balanced(&cleaned)
            && let Ok(value) = serde_json::from_str::<Value>(extracted)
        {
            warn!("JSON extracted from surrounding text");
            return Ok((value, true));
        }

        if let Some(start) = cleaned.find(['{', '[']) {
            for level in 1..=self.max_repair_attempts {
                let repaired = repair(&cleaned[start..], level);
                let candidate = extract_balanced(&repaired).unwrap_or(repaired.as_str());
                if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                    warn!("JSON repaired at level {}", level);
                    return Ok((value, true));
                }
            }
        }

        Err(DriftError::Llm(LlmError::new(
            ErrorCategory::ParseError,
            format!(
                "Response is not valid JSON: {}...",
                cleaned.chars().take(120).collect::<String>()
            ),
        )))
    }
}

fn preprocess(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('\u{feff}');
    strip_code_fences(trimmed).trim().to_string()
}

/// Remove a surrounding ```lang ... ``` fence if present
pub fn strip_code_fences(s: &str) -> &str {
    let mut body = s.trim();
    if body.starts_with("```") {
        body = match body.find('\n') {
            Some(newline) => &body[newline + 1..],
            None => body.trim_start_matches('`'),
        };
        if let Some(stripped) = body.trim_end().strip_suffix("```") {
            body = stripped;
        }
    }
    body
}

fn repair(s: &str, level: usize) -> String {
    let mut result = remove_trailing_commas(s);
    if level >= 2 {
        result = result
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
            .collect();
    }
    result
}

fn remove_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
        } else if in_string {
            match ch {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some(']') | Some('}')) {
                continue;
            }
        }
        result.push(ch);
    }
    result
}

/// First balanced `{...}` or `[...]` in mixed content
fn extract_balanced(s: &str) -> Option<&str> {
    let start = s.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (i, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
