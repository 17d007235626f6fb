//! Prompt Builder System
//!
//! Standardized prompt construction for the digest and document prompts.
//!
//! ## Sections
//!
//! 1. **Role**: who the model is and what it produces
//! 2. **Objectives**: numbered goals
//! 3. **Rules**: hard constraints on the output
//! 4. **Anti-Patterns**: explicit bad/good examples
//! 5. **Free text**: style guides, caller constraints

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    Role { expertise: String, task: String },
    Objectives(Vec<String>),
    Rules(Vec<String>),
    Text {
        header: Option<String>,
        content: String,
    },
    AntiPatterns { bad: Vec<String>, good: Vec<String> },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn objectives(mut self, objectives: &[&str]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn rules(mut self, rules: &[&str]) -> Self {
        self.sections
            .push(PromptSection::Rules(rules.iter().map(|s| s.to_string()).collect()));
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Header-less text, skipped when blank
    pub fn text(mut self, content: &str) -> Self {
        if !content.trim().is_empty() {
            self.sections.push(PromptSection::Text {
                header: None,
                content: content.to_string(),
            });
        }
        self
    }

    pub fn anti_patterns(mut self, bad: &[&str], good: &[&str]) -> Self {
        self.sections.push(PromptSection::AntiPatterns {
            bad: bad.iter().map(|s| s.to_string()).collect(),
            good: good.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!("You are an expert {} {}.\n", expertise, task));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Rules(rules) => {
                    prompt.push_str("<RULES>\n");
                    for rule in rules {
                        prompt.push_str(&format!("- {}\n", rule));
                    }
                    prompt.push_str("</RULES>\n\n");
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::AntiPatterns { bad, good } => {
                    prompt.push_str("<what_not_to_do>\n");
                    for example in bad {
                        prompt.push_str(&format!("WRONG: {}\n", example));
                    }
                    prompt.push_str("</what_not_to_do>\n\n");
                    prompt.push_str("<what_to_do>\n");
                    for example in good {
                        prompt.push_str(&format!("CORRECT: {}\n", example));
                    }
                    prompt.push_str("</what_to_do>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

/// README section order the model must follow
pub const README_SECTIONS: &[&str] = &[
    "Features",
    "Tech Stack",
    "Getting Started",
    "Environment Variables",
    "Project Structure",
    "Routes",
    "API Endpoints",
    "Security Notes",
    "Development",
    "Docker",
    "License",
];

/// Preset prompts used by the scan pipeline
pub struct PromptTemplates;

impl PromptTemplates {
    /// System prompt for the structured repository digest
    pub fn digest() -> String {
        PromptBuilder::new()
            .role(
                "software analyst",
                "who summarizes repositories for documentation writers",
            )
            .objectives(&[
                "State the repository's purpose in one or two sentences",
                "List the exact setup commands a new contributor runs",
                "List environment variables with what each one configures",
                "Name the key modules and their responsibilities",
                "List HTTP API routes with methods and a short description",
                "List persisted data models",
                "Record gotchas a newcomer would trip over",
            ])
            .rules(&[
                "Use ONLY facts visible in the provided files and summary",
                "Leave a list empty rather than guessing",
                "Paths are repository-relative",
            ])
            .build()
    }

    /// System prompt for regenerating a README
    pub fn readme(constraints: Option<&str>) -> String {
        let style = README_SECTIONS
            .iter()
            .map(|s| format!("## {}", s))
            .collect::<Vec<_>>()
            .join("\n");

        let mut builder = PromptBuilder::new()
            .role("technical writer", "who maintains project READMEs")
            .objectives(&[
                "Produce a complete README.md for the repository",
                "Keep every fact from the existing README that is still supported by the digest or summary",
                "Correct commands, variables and routes that drifted from the code",
            ])
            .section(
                "Style Guide",
                &format!(
                    "Start with `# <project name>` and a one-paragraph description, then use these sections in order, omitting any with nothing to say:\n\n{}",
                    style
                ),
            )
            .rules(&[
                "Output raw Markdown only, no surrounding code fence",
                "Commands go in fenced shell blocks",
                "Never invent environment variables, routes or scripts",
            ])
            .anti_patterns(
                &["Adding a Contributing section copied from a template"],
                &["Dropping sections the repository gives no material for"],
            );
        if let Some(constraints) = constraints {
            builder = builder.section("Project Constraints", constraints);
        }
        builder.build()
    }

    /// System prompt for a minimal, structure-preserving update of any other document
    pub fn minimal_edit(target_type: &str, constraints: Option<&str>) -> String {
        let mut builder = PromptBuilder::new()
            .role(
                "technical writer",
                &format!("who keeps the project's {} documentation accurate", target_type),
            )
            .objectives(&[
                "Return the full updated document",
                "Change only statements contradicted or left out by the digest and summary",
                "Create a concise first version when no existing document is given",
            ])
            .rules(&[
                "Preserve existing headings, ordering and tone",
                "Output raw Markdown only, no surrounding code fence",
                "If nothing needs to change, return the existing document verbatim",
            ])
            .anti_patterns(
                &["Rewriting paragraphs that are still correct"],
                &["Editing the single line with the outdated command"],
            );
        if let Some(constraints) = constraints {
            builder = builder.section("Project Constraints", constraints);
        }
        builder.build()
    }
}
