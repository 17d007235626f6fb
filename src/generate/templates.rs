//! Deterministic document templates
//!
//! Used whenever no digest is available. The README is rebuilt entirely from
//! repository facts; other kinds get a short skeleton when no document exists yet.

use std::collections::BTreeMap;

use crate::types::{DocKind, RepoFacts, RepoSummary};

/// Dependency name to tech-stack label, in display order
const TECH_LABELS: &[(&str, &str)] = &[
    ("next", "Next.js"),
    ("react", "React"),
    ("vue", "Vue"),
    ("nuxt", "Nuxt"),
    ("svelte", "Svelte"),
    ("@sveltejs/kit", "SvelteKit"),
    ("astro", "Astro"),
    ("express", "Express"),
    ("fastify", "Fastify"),
    ("@nestjs/core", "NestJS"),
    ("typescript", "TypeScript"),
    ("tailwindcss", "Tailwind CSS"),
    ("@prisma/client", "Prisma"),
    ("prisma", "Prisma"),
    ("drizzle-orm", "Drizzle ORM"),
    ("mongoose", "MongoDB (Mongoose)"),
    ("pg", "PostgreSQL"),
    ("next-auth", "NextAuth.js"),
    ("@supabase/supabase-js", "Supabase"),
    ("@trpc/server", "tRPC"),
    ("stripe", "Stripe"),
    ("openai", "OpenAI API"),
    ("zod", "Zod"),
    ("vitest", "Vitest"),
    ("jest", "Jest"),
    ("@playwright/test", "Playwright"),
];

/// Dependency name to the environment variables it requires
const DEPENDENCY_ENV: &[(&str, &[(&str, &str)])] = &[
    ("prisma", &[("DATABASE_URL", "Database connection string used by Prisma")]),
    ("@prisma/client", &[("DATABASE_URL", "Database connection string used by Prisma")]),
    ("drizzle-orm", &[("DATABASE_URL", "Database connection string")]),
    ("mongoose", &[("MONGODB_URI", "MongoDB connection string")]),
    (
        "next-auth",
        &[
            ("NEXTAUTH_SECRET", "Secret used to sign session tokens"),
            ("NEXTAUTH_URL", "Canonical URL of the deployment"),
        ],
    ),
    (
        "@supabase/supabase-js",
        &[
            ("NEXT_PUBLIC_SUPABASE_URL", "Supabase project URL"),
            ("NEXT_PUBLIC_SUPABASE_ANON_KEY", "Supabase anonymous key"),
        ],
    ),
    ("stripe", &[("STRIPE_SECRET_KEY", "Stripe API secret key")]),
    ("openai", &[("OPENAI_API_KEY", "OpenAI API key")]),
    ("resend", &[("RESEND_API_KEY", "Resend API key for outgoing email")]),
];

const MAX_LISTED_ROUTES: usize = 40;

/// Everything the templates draw on
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub summary: &'a RepoSummary,
    pub facts: &'a RepoFacts,
}

impl<'a> TemplateContext<'a> {
    pub fn new(summary: &'a RepoSummary, facts: &'a RepoFacts) -> Self {
        Self { summary, facts }
    }

    fn project_name(&self) -> String {
        self.facts
            .manifest
            .as_ref()
            .and_then(|m| m.name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                self.summary
                    .repo_id
                    .rsplit('/')
                    .next()
                    .unwrap_or(&self.summary.repo_id)
                    .to_string()
            })
    }

    fn has_dependency(&self, name: &str) -> bool {
        self.facts
            .manifest
            .as_ref()
            .is_some_and(|m| m.has_dependency(name))
    }

    fn uses_prisma(&self) -> bool {
        self.facts.has_prisma_schema
            || self.has_dependency("prisma")
            || self.has_dependency("@prisma/client")
    }

    fn script(&self, name: &str) -> Option<String> {
        let manifest = self.facts.manifest.as_ref()?;
        manifest
            .scripts
            .contains_key(name)
            .then(|| self.facts.package_manager.run_command(name))
    }

    /// Tech-stack labels, deduplicated, in table order
    pub fn tech_stack(&self) -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = Vec::new();
        for (dep, label) in TECH_LABELS {
            if self.has_dependency(dep) && !labels.contains(label) {
                labels.push(label);
            }
        }
        if self.facts.has_prisma_schema && !labels.contains(&"Prisma") {
            labels.push("Prisma");
        }
        if self.facts.has_dockerfile || self.facts.has_compose {
            labels.push("Docker");
        }
        labels
    }

    /// Required environment variables with descriptions, sorted by name
    pub fn env_vars(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        for (dep, entries) in DEPENDENCY_ENV {
            if self.has_dependency(dep) {
                for (name, purpose) in *entries {
                    vars.insert(name.to_string(), purpose.to_string());
                }
            }
        }
        if self.facts.has_prisma_schema {
            vars.entry("DATABASE_URL".to_string())
                .or_insert_with(|| "Database connection string used by Prisma".to_string());
        }
        for name in &self.facts.env_example_vars {
            vars.entry(name.clone())
                .or_insert_with(|| "See `.env.example`".to_string());
        }
        vars
    }
}

/// Full README built from repository facts
pub fn render_readme(ctx: &TemplateContext<'_>) -> String {
    let facts = ctx.facts;
    let pm = facts.package_manager;
    let env_vars = ctx.env_vars();
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", ctx.project_name()));
    let description = facts
        .manifest
        .as_ref()
        .and_then(|m| m.description.clone())
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| format!("Source repository for `{}`.", ctx.summary.repo_id));
    out.push_str(&format!("{}\n\n", description));

    let features = features(ctx);
    if !features.is_empty() {
        out.push_str("## Features\n\n");
        for feature in features {
            out.push_str(&format!("- {}\n", feature));
        }
        out.push('\n');
    }

    let stack = ctx.tech_stack();
    if !stack.is_empty() {
        out.push_str("## Tech Stack\n\n");
        for label in stack {
            out.push_str(&format!("- {}\n", label));
        }
        out.push('\n');
    }

    out.push_str("## Getting Started\n\n");
    if facts.manifest.is_some() {
        out.push_str("### Prerequisites\n\n- Node.js (LTS)\n\n");
    }
    out.push_str("### Installation\n\n```bash\n");
    out.push_str(&format!("git clone https://github.com/{}.git\n", ctx.summary.repo_id));
    out.push_str(&format!("cd {}\n", ctx.summary.repo_id.rsplit('/').next().unwrap_or("")));
    if facts.manifest.is_some() {
        out.push_str(&format!("{}\n", pm.install_command()));
    }
    if !facts.env_example_vars.is_empty() {
        out.push_str("cp .env.example .env\n");
    }
    out.push_str("```\n\n");

    if ctx.uses_prisma() {
        out.push_str("### Database Setup\n\n");
        out.push_str("Set `DATABASE_URL`, then apply the schema:\n\n```bash\n");
        out.push_str(&format!("{} prisma migrate dev\n", pm.exec_command()));
        out.push_str("```\n\n");
    }

    let run = ctx.script("dev").or_else(|| ctx.script("start"));
    if let Some(run) = run {
        out.push_str("### Running Locally\n\n```bash\n");
        out.push_str(&format!("{}\n", run));
        out.push_str("```\n\n");
    }

    if !env_vars.is_empty() {
        out.push_str("## Environment Variables\n\n");
        out.push_str("| Variable | Description |\n|----------|-------------|\n");
        for (name, purpose) in &env_vars {
            out.push_str(&format!("| `{}` | {} |\n", name, purpose));
        }
        out.push('\n');
    }

    if !ctx.summary.top_level.is_empty() {
        out.push_str("## Project Structure\n\n");
        for entry in &ctx.summary.top_level {
            if entry.name == crate::scan::summary::ROOT_GROUP {
                out.push_str(&format!("- root files ({})\n", entry.count));
            } else {
                out.push_str(&format!("- `{}/` ({} files)\n", entry.name, entry.count));
            }
        }
        out.push('\n');
    }

    if !facts.page_routes.is_empty() {
        out.push_str("## Routes\n\n");
        for page in facts.page_routes.iter().take(MAX_LISTED_ROUTES) {
            out.push_str(&format!("- `{}`\n", page));
        }
        out.push('\n');
    }

    if !facts.api_routes.is_empty() {
        out.push_str("## API Endpoints\n\n");
        out.push_str("| Method | Path |\n|--------|------|\n");
        for route in facts.api_routes.iter().take(MAX_LISTED_ROUTES) {
            let methods = if route.methods.is_empty() {
                "-".to_string()
            } else {
                route.methods.join(", ")
            };
            out.push_str(&format!("| {} | `{}` |\n", methods, route.api_path));
        }
        out.push('\n');
    }

    let cron: Vec<_> = facts.api_routes.iter().filter(|r| r.is_cron()).collect();
    if !cron.is_empty() {
        out.push_str("## Scheduled Jobs\n\n");
        out.push_str("These endpoints are meant to be triggered by a scheduler:\n\n");
        for route in &cron {
            out.push_str(&format!("- `{}`\n", route.api_path));
        }
        out.push('\n');
    }

    let notes = security_notes(ctx, &env_vars, !cron.is_empty());
    if !notes.is_empty() {
        out.push_str("## Security Notes\n\n");
        for note in notes {
            out.push_str(&format!("- {}\n", note));
        }
        out.push('\n');
    }

    if let Some(manifest) = &facts.manifest
        && !manifest.scripts.is_empty()
    {
        out.push_str("## Development\n\n");
        out.push_str("| Command | Runs |\n|---------|------|\n");
        for (name, command) in &manifest.scripts {
            out.push_str(&format!("| `{}` | `{}` |\n", pm.run_command(name), command.replace('|', "\\|")));
        }
        out.push('\n');
    }

    if facts.has_dockerfile || facts.has_compose {
        out.push_str("## Docker\n\n```bash\n");
        if facts.has_compose {
            out.push_str("docker compose up --build\n");
        } else {
            let name = ctx.project_name();
            out.push_str(&format!("docker build -t {} .\n", name));
            out.push_str(&format!("docker run --env-file .env -p 3000:3000 {}\n", name));
        }
        out.push_str("```\n\n");
    }

    let license = facts.manifest.as_ref().and_then(|m| m.license.clone());
    match license {
        Some(license) => {
            out.push_str(&format!("## License\n\n{}\n", license));
        }
        None if facts.has_license_file => {
            out.push_str("## License\n\nSee [LICENSE](LICENSE).\n");
        }
        None => {}
    }

    out.trim_end().to_string() + "\n"
}

fn features(ctx: &TemplateContext<'_>) -> Vec<String> {
    let facts = ctx.facts;
    let mut features = Vec::new();
    if !facts.page_routes.is_empty() {
        features.push(format!("{} application pages", facts.page_routes.len()));
    }
    if !facts.api_routes.is_empty() {
        features.push(format!("HTTP API with {} endpoints", facts.api_routes.len()));
    }
    if ctx.uses_prisma() {
        features.push("Relational data model managed with Prisma".to_string());
    }
    if ctx.has_dependency("next-auth") {
        features.push("Authentication via NextAuth.js".to_string());
    }
    if facts.api_routes.iter().any(|r| r.is_cron()) {
        features.push("Scheduled background jobs".to_string());
    }
    features
}

fn security_notes(
    ctx: &TemplateContext<'_>,
    env_vars: &BTreeMap<String, String>,
    has_cron: bool,
) -> Vec<String> {
    let mut notes = Vec::new();
    if !env_vars.is_empty() {
        notes.push("Keep `.env` files out of version control; they hold credentials.".to_string());
    }
    if has_cron {
        notes.push("Protect scheduled-job endpoints so only the scheduler can call them.".to_string());
    }
    if ctx.has_dependency("next-auth") {
        notes.push("Rotate `NEXTAUTH_SECRET` if it is ever exposed.".to_string());
    }
    notes
}

/// Starting document for a non-README target with no existing file
pub fn render_skeleton(kind: DocKind, title: &str, ctx: &TemplateContext<'_>) -> String {
    let facts = ctx.facts;
    let pm = facts.package_manager;
    let mut out = String::new();

    match kind {
        DocKind::ApiReference => {
            out.push_str(&format!("# {}\n\n", title));
            if facts.api_routes.is_empty() {
                out.push_str("No HTTP API routes were detected in this repository.\n");
            } else {
                out.push_str("| Method | Path | Description |\n|--------|------|-------------|\n");
                for route in &facts.api_routes {
                    out.push_str(&format!("| {} | `{}` | |\n", route.methods.join(", "), route.api_path));
                }
            }
        }
        DocKind::Architecture => {
            out.push_str(&format!("# {}\n\n", title));
            out.push_str("## Overview\n\n");
            out.push_str(&format!("`{}` contains {} files.\n\n", ctx.summary.repo_id, ctx.summary.total_files));
            out.push_str("## Directory Layout\n\n");
            for entry in &ctx.summary.top_level {
                out.push_str(&format!("- `{}`: {} files\n", entry.name, entry.count));
            }
            let stack = ctx.tech_stack();
            if !stack.is_empty() {
                out.push_str(&format!("\n## Components\n\n{}\n", stack.join(", ")));
            }
        }
        DocKind::Tutorial => {
            out.push_str(&format!("# {}\n\n", title));
            out.push_str("## Steps\n\n");
            out.push_str(&format!("1. Install dependencies: `{}`\n", pm.install_command()));
            let scripts = facts
                .manifest
                .as_ref()
                .map(|m| m.scripts.keys().cloned().collect::<Vec<_>>())
                .unwrap_or_default();
            for (i, script) in scripts.iter().enumerate() {
                out.push_str(&format!("{}. Run `{}`\n", i + 2, pm.run_command(script)));
            }
        }
        DocKind::Guide => {
            out.push_str(&format!("# {}\n\n", title));
            out.push_str("## Steps\n\n");
            out.push_str(&format!("1. Clone `{}`.\n", ctx.summary.repo_id));
            out.push_str(&format!("2. Install dependencies with `{}`.\n", pm.install_command()));
            if !ctx.env_vars().is_empty() {
                out.push_str("3. Configure the environment variables listed in the README.\n");
            }
        }
        DocKind::Readme | DocKind::Other => {
            out.push_str(&format!("# {}\n\n", title));
            out.push_str(&format!("Documentation for `{}`.\n", ctx.summary.repo_id));
        }
    }

    out
}
