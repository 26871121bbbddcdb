use std::path::{Path, PathBuf};

use anyhow::Context;
use backend_lint::{Config, Ruleset};
use clap::Parser;

use super::terminal;

#[derive(Debug, Parser)]
#[command(about = "List the available rules")]
pub struct Rules {
    /// Configuration file (defaults to `.backend-lint.toml` in the root)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Rules {
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => Config::load_or_default(root)?,
        };

        let mut ruleset = Ruleset::builtin();
        ruleset.apply_config(&config)?;

        for (rule, enabled) in ruleset.iter() {
            let state = if enabled {
                terminal::success("enabled")
            } else {
                terminal::dim("disabled")
            };
            let link = if rule.link().is_empty() {
                String::new()
            } else {
                format!(" {}", terminal::dim(rule.link()))
            };
            println!("{} ({state}, {}){link}", rule.name(), rule.severity());
        }

        Ok(())
    }
}
