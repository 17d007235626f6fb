//! Exists Command
//!
//! Check whether a path exists in a repository at a ref.

use serde_json::json;

use crate::cli::ui::Output;
use crate::config::Config;
use crate::scan::Scanner;
use crate::types::{RepoRef, Result};

pub async fn run(config: &Config, repo: &str, path: &str, format: &str) -> Result<()> {
    let repo: RepoRef = repo.parse()?;
    let file = Scanner::from_config(config)?.file_exists(&repo, path).await?;

    if format == "json" {
        let report = json!({
            "repo": repo,
            "path": path,
            "exists": file.exists,
            "content": file.content,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let output = Output::new();
    if file.exists {
        let chars = file.content.as_deref().map_or(0, |c| c.chars().count());
        output.success(&format!("{} exists at {} ({} chars)", path, repo, chars));
    } else {
        output.warning(&format!("{} does not exist at {}", path, repo));
    }
    Ok(())
}
