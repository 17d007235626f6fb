//! Documentation targets
//!
//! Project configuration delivers targets with `paths` as a single string, a list,
//! or nothing at all. [`RawDocTarget`] captures that shape and [`DocTarget::from_raw`]
//! normalizes it once, so the engine only ever sees the canonical record.

use serde::{Deserialize, Serialize};

use super::error::{DriftError, Result};
use crate::constants::targets as target_constants;

/// Kind of documentation artifact, derived from the free-form target label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
    Readme,
    ApiReference,
    Architecture,
    Tutorial,
    Guide,
    Other,
}

impl DocKind {
    /// Classify a target label by keyword
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        let has_word = |word: &str| lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == word);
        if lower.contains("readme") {
            DocKind::Readme
        } else if has_word("api") || lower.contains("reference") {
            DocKind::ApiReference
        } else if lower.contains("architecture") || lower.contains("design") {
            DocKind::Architecture
        } else if lower.contains("tutorial") || lower.contains("getting started") {
            DocKind::Tutorial
        } else if lower.contains("guide") || lower.contains("how-to") || lower.contains("howto") {
            DocKind::Guide
        } else {
            DocKind::Other
        }
    }

    /// Fallback directory and filename when the target globs don't name a file
    pub fn fallback_location(&self) -> (&'static str, &'static str) {
        use target_constants::fallback;
        match self {
            DocKind::Readme => fallback::README,
            DocKind::ApiReference => fallback::API_REFERENCE,
            DocKind::Architecture => fallback::ARCHITECTURE,
            DocKind::Tutorial => fallback::TUTORIAL,
            DocKind::Guide => fallback::GUIDE,
            DocKind::Other => fallback::OTHER,
        }
    }

    /// Path patterns used when the configuration omits `paths`
    pub fn default_patterns(&self) -> Vec<String> {
        let (dir, file) = self.fallback_location();
        match self {
            DocKind::Readme => vec![file.to_string()],
            _ => vec![format!("{}/**/*.md", dir)],
        }
    }
}

/// Target `paths` exactly as configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPaths {
    One(String),
    Many(Vec<String>),
}

/// Target exactly as found in project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocTarget {
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default)]
    pub paths: Option<RawPaths>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Canonical documentation target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTarget {
    /// Free-form label, e.g. "README" or "API Reference"
    #[serde(rename = "type")]
    pub target_type: String,
    /// Candidate output path globs, never empty
    pub paths: Vec<String>,
    pub enabled: bool,
}

impl DocTarget {
    pub fn new(target_type: impl Into<String>, paths: Vec<String>, enabled: bool) -> Self {
        Self {
            target_type: target_type.into(),
            paths,
            enabled,
        }
    }

    /// Normalize a configured target. Missing `enabled` means enabled.
    pub fn from_raw(raw: RawDocTarget) -> Result<Self> {
        let target_type = raw.target_type.trim().to_string();
        if target_type.is_empty() {
            return Err(DriftError::InvalidInput(
                "Documentation target is missing a type".to_string(),
            ));
        }

        let kind = DocKind::from_label(&target_type);
        let configured: Vec<String> = match raw.paths {
            Some(RawPaths::One(path)) => vec![path],
            Some(RawPaths::Many(paths)) => paths,
            None => Vec::new(),
        }
        .into_iter()
        .map(|p| p.trim().trim_start_matches("./").to_string())
        .filter(|p| !p.is_empty())
        .collect();

        let paths = if configured.is_empty() {
            kind.default_patterns()
        } else {
            configured
        };

        Ok(Self {
            target_type,
            paths,
            enabled: raw.enabled.unwrap_or(true),
        })
    }

    pub fn kind(&self) -> DocKind {
        DocKind::from_label(&self.target_type)
    }

    pub fn is_readme(&self) -> bool {
        self.kind() == DocKind::Readme
    }
}

/// Normalize a list of configured targets, failing on the first invalid entry
pub fn normalize_targets(raw: Vec<RawDocTarget>) -> Result<Vec<DocTarget>> {
    raw.into_iter().map(DocTarget::from_raw).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RawDocTarget {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_kind_from_label() {
        assert_eq!(DocKind::from_label("README"), DocKind::Readme);
        assert_eq!(DocKind::from_label("API Reference"), DocKind::ApiReference);
        assert_eq!(DocKind::from_label("Architecture"), DocKind::Architecture);
        assert_eq!(DocKind::from_label("Tutorial"), DocKind::Tutorial);
        assert_eq!(DocKind::from_label("Deployment guide"), DocKind::Guide);
        assert_eq!(DocKind::from_label("Changelog"), DocKind::Other);
    }

    #[test]
    fn test_string_paths() {
        let target = DocTarget::from_raw(parse(r#"{"type": "README", "paths": "README.md"}"#))
            .unwrap();
        assert_eq!(target.paths, vec!["README.md"]);
        assert!(target.enabled);
    }

    #[test]
    fn test_array_paths_are_trimmed() {
        let target = DocTarget::from_raw(parse(
            r#"{"type": "Guide", "paths": ["./docs/guides/*.md", "  "], "enabled": false}"#,
        ))
        .unwrap();
        assert_eq!(target.paths, vec!["docs/guides/*.md"]);
        assert!(!target.enabled);
    }

    #[test]
    fn test_absent_paths_use_kind_defaults() {
        let readme = DocTarget::from_raw(parse(r#"{"type": "README"}"#)).unwrap();
        assert_eq!(readme.paths, vec!["README.md"]);

        let arch = DocTarget::from_raw(parse(r#"{"type": "Architecture"}"#)).unwrap();
        assert_eq!(arch.paths, vec!["docs/architecture/**/*.md"]);
    }

    #[test]
    fn test_missing_type_is_rejected() {
        assert!(DocTarget::from_raw(parse(r#"{"type": "  "}"#)).is_err());
    }
}
