//! Proposal diffs
//!
//! Turns generated content into a [`ProposalFile`] with a unified diff, or
//! nothing when the content is empty or identical to what is already there.

use similar::TextDiff;

use crate::types::{ProposalFile, ProposalOperation};

const CONTEXT_LINES: usize = 3;

/// Unified diff of `before` to `after`, labelled with `path` on both sides
pub fn unified_diff(path: &str, before: &str, after: &str) -> String {
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(path, path)
        .to_string()
}

/// Proposal for one output file, `None` when there is nothing to propose
pub fn build_proposal(output_path: &str, before: Option<&str>, after: &str) -> Option<ProposalFile> {
    if after.trim().is_empty() {
        return None;
    }
    if before == Some(after) {
        return None;
    }

    let operation = match before {
        Some(_) => ProposalOperation::Update,
        None => ProposalOperation::Create,
    };

    Some(ProposalFile {
        output_path: output_path.to_string(),
        operation,
        before: before.map(String::from),
        after: after.to_string(),
        diff: unified_diff(output_path, before.unwrap_or(""), after),
    })
}
