//! LLM Response Validation
//!
//! Structured completions are parsed leniently; anything that still fails to
//! parse is reported as a `ParseError` and the caller degrades.

mod json_repair;

pub use json_repair::{JsonRepairer, extract_json_from_response, strip_code_fences};
