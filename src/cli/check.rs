use std::path::{Path, PathBuf};

use anyhow::Context;
use backend_lint::{Config, Issue, Module, ModuleRunner, Ruleset, domain::OutputFormat};
use clap::Parser;
use serde::Serialize;
use tracing::instrument;

use super::terminal;

#[derive(Debug, Default, Parser)]
#[command(about = "Check the module in the root directory")]
pub struct Check {
    /// Configuration file (defaults to `.backend-lint.toml` in the root)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (overrides the configuration file)
    #[arg(long, value_name = "FORMAT")]
    format: Option<Format>,

    /// Set an input variable (can be specified multiple times)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    Table,
    Json,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => Self::Table,
            OutputFormat::Json => Self::Json,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    issues: &'a [Issue],
}

/// Parse a `NAME=VALUE` pair.
fn parse_var(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, found '{s}'"))?;
    if name.is_empty() {
        return Err(format!("missing variable name in '{s}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

impl Check {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => Config::load_or_default(root)?,
        };

        let mut ruleset = Ruleset::builtin();
        ruleset.apply_config(&config)?;

        let module = Module::load(root)
            .with_context(|| format!("failed to load module in {}", root.display()))?;
        tracing::info!(
            files = ?module.filenames().collect::<Vec<_>>(),
            "Checking module in {}",
            root.display()
        );
        let mut variables = module.variables()?;
        variables.extend_strings(config.variables());
        for (name, value) in &self.vars {
            variables.set(name.clone(), value.clone());
        }

        let runner = ModuleRunner::new(module, &variables);
        ruleset.check(&runner)?;
        let issues = runner.take_issues();

        match self.format.unwrap_or_else(|| config.format.into()) {
            Format::Table => self.output_table(&issues),
            Format::Json => Self::output_json(&issues)?,
        }

        // Exit with appropriate code
        if !issues.is_empty() {
            std::process::exit(2);
        }

        Ok(())
    }

    fn output_table(&self, issues: &[Issue]) {
        if self.quiet {
            return;
        }

        for issue in issues {
            let location = format!(
                "{}:{}:{}:",
                issue.range().filename.display(),
                issue.range().start.line,
                issue.range().start.column
            );
            println!(
                "{} {}: {} {}",
                location,
                terminal::severity(&issue.severity().to_string(), issue.severity()),
                issue.message(),
                terminal::dim(&format!("({})", issue.rule()))
            );
        }

        // the summary takes the colour of the most severe issue
        let Some(worst) = issues.iter().map(Issue::severity).min() else {
            println!("{}", terminal::success("✅ No issues found."));
            return;
        };
        let count = issues.len();
        println!();
        println!(
            "{}",
            terminal::severity(&format!("⚠️  {count} issue(s) found"), worst)
        );
    }

    fn output_json(issues: &[Issue]) -> anyhow::Result<()> {
        let report = JsonReport { issues };
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}
