//! Config Command
//!
//! Inspect docdrift configuration.
//!
//! Usage:
//!   docdrift config show [-f json]
//!   docdrift config path

use console::style;

use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(config: &Config, format: &str) -> Result<()> {
    let as_json = format == "json";
    if !as_json {
        println!("# Effective configuration (secrets omitted)\n");
    }
    println!("{}", ConfigLoader::render(config, as_json)?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    println!("Configuration files (later entries win):");
    for (label, path) in ConfigLoader::paths() {
        match path {
            Some(path) => {
                let marker = if path.exists() {
                    style("found").green()
                } else {
                    style("missing").dim()
                };
                println!("  {:<8} {} ({})", label, path.display(), marker);
            }
            None => println!("  {:<8} (cannot determine config directory)", label),
        }
    }
    println!("  {:<8} DOCDRIFT_* (e.g. DOCDRIFT_SCAN__MAX_FILES)", "Env");
    Ok(())
}
