//! Glob Matching
//!
//! Restricted glob grammar compiled to anchored regular expressions:
//!
//! - `*`: any run of characters within one path segment
//! - `**/`: zero or more whole path segments
//! - `**`: anything, separators included
//! - `?`: exactly one non-separator character
//!
//! Every other character is literal. A pattern that fails to compile never matches.

use regex::Regex;
use tracing::warn;

/// Compiled glob pattern
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    pattern: String,
    regex: Option<Regex>,
}

impl GlobMatcher {
    pub fn new(pattern: &str) -> Self {
        let regex = if pattern.is_empty() {
            None
        } else {
            match Regex::new(&glob_to_regex(pattern)) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Glob '{}' failed to compile, treating as no-match: {}", pattern, e);
                    None
                }
            }
        };

        Self {
            pattern: pattern.to_string(),
            regex,
        }
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(path))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Translate a glob into an anchored regex source string
fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    out.push_str("(?:[^/]*/)*");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            c => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                i += 1;
            }
        }
    }

    out.push('$');
    out
}

/// True if any pattern matches the path
pub fn any_glob_matches<S: AsRef<str>>(patterns: &[S], path: &str) -> bool {
    patterns
        .iter()
        .any(|p| GlobMatcher::new(p.as_ref()).is_match(path))
}

/// Whether the pattern contains glob tokens
pub fn has_glob_tokens(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// Derive a concrete file path from a possibly-globbed pattern.
///
/// A glob-free `.md` pattern is used verbatim. Otherwise the directory part in front
/// of the first glob token receives `fallback_file`; with no usable directory the
/// result is `fallback_dir/fallback_file`.
pub fn infer_output_path_from_glob(pattern: &str, fallback_dir: &str, fallback_file: &str) -> String {
    let pattern = pattern.trim().trim_start_matches("./");

    let prefix = match pattern.find(['*', '?']) {
        None if pattern.to_lowercase().ends_with(".md") => return pattern.to_string(),
        None => pattern.trim_end_matches('/'),
        Some(idx) => {
            let before = &pattern[..idx];
            before.rfind('/').map(|slash| &before[..slash]).unwrap_or("")
        }
    };

    if prefix.is_empty() {
        join_path(fallback_dir, fallback_file)
    } else {
        join_path(prefix, fallback_file)
    }
}

fn join_path(dir: &str, file: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}
