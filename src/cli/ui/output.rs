use console::style;

use crate::types::ProposalOperation;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Unified diff with added lines green and removed lines red
    pub fn diff(&self, diff: &str) {
        for line in diff.lines() {
            if line.starts_with("+++") || line.starts_with("---") {
                println!("{}", style(line).bold());
            } else if line.starts_with('+') {
                println!("{}", style(line).green());
            } else if line.starts_with('-') {
                println!("{}", style(line).red());
            } else if line.starts_with("@@") {
                println!("{}", style(line).cyan());
            } else {
                println!("{}", line);
            }
        }
    }

    pub fn operation_label(operation: ProposalOperation) -> String {
        match operation {
            ProposalOperation::Create => style("create").green().to_string(),
            ProposalOperation::Update => style("update").yellow().to_string(),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
