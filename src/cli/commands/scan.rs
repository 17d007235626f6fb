//! Scan Command
//!
//! Scan a repository and print documentation proposals.
//!
//! Usage:
//!   docdrift scan owner/repo[@ref] [--target TYPE=GLOB[,GLOB]]... [--constraints TEXT]
//!                 [--format text|json] [--output DIR]

use std::path::{Component, Path, PathBuf};

use crate::cli::progress::ConsoleProgress;
use crate::cli::ui::Output;
use crate::config::Config;
use crate::constants::generation;
use crate::scan::{ProgressSink, Scanner};
use crate::types::{
    DocTarget, DriftError, RawDocTarget, RawPaths, RepoRef, Result, ScanResult, normalize_targets,
};

/// Options for a single scan run
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub repo: String,
    /// `TYPE=GLOB[,GLOB]` or bare `TYPE`; replaces the configured targets when non-empty
    pub targets: Vec<String>,
    pub constraints: Option<String>,
    pub format: String,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

pub async fn run(config: &Config, options: ScanOptions) -> Result<()> {
    let repo: RepoRef = options.repo.parse()?;
    let targets = resolve_targets(config, &options.targets)?;
    if !targets.iter().any(|t| t.enabled) {
        return Err(DriftError::InvalidInput(
            "No enabled documentation targets. Configure project.targets or pass --target"
                .to_string(),
        ));
    }

    let constraints = options
        .constraints
        .as_deref()
        .or(config.project.constraints.as_deref());

    let scanner = Scanner::from_config(config)?;
    let json_output = options.format == "json";
    let output = Output::new();
    if !json_output && !scanner.has_llm() {
        output.info("No LLM API key configured, using the built-in generator");
    }

    let console = ConsoleProgress::new();
    let progress: Option<&dyn ProgressSink> = if options.quiet { None } else { Some(&console) };
    let result = scanner.scan(&repo, &targets, constraints, progress).await?;

    if let Some(dir) = &options.output {
        let written = write_proposals(dir, &result)?;
        if !json_output {
            for path in &written {
                output.success(&format!("Wrote {}", path.display()));
            }
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&output, &repo, &result);
    }
    Ok(())
}

/// Targets from `--target` flags, or the configured project targets
fn resolve_targets(config: &Config, flags: &[String]) -> Result<Vec<DocTarget>> {
    if flags.is_empty() {
        return config.project.doc_targets();
    }
    let raw = flags
        .iter()
        .map(|flag| parse_target_flag(flag))
        .collect::<Result<Vec<_>>>()?;
    normalize_targets(raw)
}

/// Parse `TYPE=GLOB[,GLOB]`; a bare `TYPE` uses the kind's default patterns
pub fn parse_target_flag(flag: &str) -> Result<RawDocTarget> {
    let (target_type, globs) = match flag.split_once('=') {
        Some((t, globs)) => (t, Some(globs)),
        None => (flag, None),
    };
    if target_type.trim().is_empty() {
        return Err(DriftError::InvalidInput(format!(
            "Expected --target TYPE=GLOB[,GLOB], got '{}'",
            flag
        )));
    }

    let paths = globs.map(|globs| {
        RawPaths::Many(
            globs
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(String::from)
                .collect(),
        )
    });

    Ok(RawDocTarget {
        target_type: target_type.trim().to_string(),
        paths,
        enabled: Some(true),
    })
}

/// Write each proposal's new content under `dir`, keeping repository-relative paths
fn write_proposals(dir: &Path, result: &ScanResult) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(result.proposals.len());
    for proposal in &result.proposals {
        let relative = Path::new(&proposal.output_path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(DriftError::InvalidInput(format!(
                "Refusing to write outside the output directory: {}",
                proposal.output_path
            )));
        }

        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, &proposal.after)?;
        written.push(target);
    }
    Ok(written)
}

fn print_report(output: &Output, repo: &RepoRef, result: &ScanResult) {
    output.header(&format!("Scan of {}", repo));
    println!(
        "Files: {} listed, {} read ({} chars)",
        result.repo_summary.total_files,
        result.files_scanned,
        result.generation_metadata.chars_read
    );
    println!("Generator: {}", result.model_label);
    let used_llm = result.model_label != generation::BUILTIN_MODEL_LABEL;
    if used_llm && !result.generation_metadata.digest_available {
        output.warning("Repository digest unavailable; prompts used facts only");
    }

    if result.proposals.is_empty() {
        output.success("Documentation is up to date, no proposals");
        return;
    }

    for proposal in &result.proposals {
        output.section(&format!(
            "{} {}",
            Output::operation_label(proposal.operation),
            proposal.output_path
        ));
        output.diff(&proposal.diff);
    }
    println!();
    output.info(&format!("{} proposal(s)", result.proposals.len()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_target_flag_with_globs() {
        let raw = parse_target_flag("API Reference=docs/api/*.md, docs/api/**/*.md").unwrap();
        assert_eq!(raw.target_type, "API Reference");
        assert_eq!(
            raw.paths,
            Some(RawPaths::Many(vec![
                "docs/api/*.md".to_string(),
                "docs/api/**/*.md".to_string()
            ]))
        );
    }

    #[test]
    fn test_parse_bare_target_uses_defaults() {
        let raw = parse_target_flag("Architecture").unwrap();
        let target = DocTarget::from_raw(raw).unwrap();
        assert_eq!(target.paths, vec!["docs/architecture/**/*.md"]);
    }

    #[test]
    fn test_parse_target_flag_rejects_empty_type() {
        assert!(parse_target_flag("=README.md").is_err());
    }

    #[test]
    fn test_flags_override_configured_targets() {
        let mut config = Config::default();
        config.project.targets = vec![parse_target_flag("Guide=docs/*.md").unwrap()];
        let targets = resolve_targets(&config, &["README".to_string()]).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].target_type, "README");

        let configured = resolve_targets(&config, &[]).unwrap();
        assert_eq!(configured[0].target_type, "Guide");
    }

    #[tokio::test]
    async fn test_zero_enabled_targets_is_rejected() {
        let options = ScanOptions {
            repo: "octo/widgets".to_string(),
            format: "text".to_string(),
            quiet: true,
            ..ScanOptions::default()
        };
        let err = run(&Config::default(), options).await.unwrap_err();
        assert!(matches!(err, DriftError::InvalidInput(_)));
    }

    #[test]
    fn test_write_proposals_rejects_escaping_paths() {
        let temp_dir = TempDir::new().unwrap();
        let result_with = |path: &str| {
            let mut result: ScanResult = serde_json::from_value(serde_json::json!({
                "repoSummary": {"repoId": "o/r", "ref": "main", "totalFiles": 0, "topLevel": []},
                "enabledTargets": [],
                "filesScanned": 0,
                "proposals": [],
                "modelLabel": "Built-in generator",
                "generationMetadata": {
                    "scanId": "00000000-0000-0000-0000-000000000000",
                    "startedAt": "2024-01-01T00:00:00Z",
                    "finishedAt": "2024-01-01T00:00:00Z",
                    "digestAvailable": false,
                    "charsRead": 0,
                    "truncatedFiles": 0,
                    "targets": []
                }
            }))
            .unwrap();
            result.proposals.push(crate::types::ProposalFile {
                output_path: path.to_string(),
                operation: crate::types::ProposalOperation::Create,
                before: None,
                after: "# Doc\n".to_string(),
                diff: String::new(),
            });
            result
        };

        let written = write_proposals(temp_dir.path(), &result_with("docs/api/README.md")).unwrap();
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "# Doc\n");
        assert!(write_proposals(temp_dir.path(), &result_with("../evil.md")).is_err());
    }
}
