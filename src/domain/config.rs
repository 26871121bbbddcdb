use std::{collections::BTreeMap, io, path::Path};

use serde::Deserialize;

/// The default name of the configuration file within a module directory.
pub const CONFIG_FILE_NAME: &str = ".backend-lint.toml";

/// Configuration for a lint run.
///
/// This struct holds per-rule overrides, input variable values used when
/// evaluating expressions, and the preferred output format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Versions")]
pub struct Config {
    /// Per-rule settings, keyed by rule name.
    ///
    /// Rules without an entry use their default enabled state.
    rules: BTreeMap<String, RuleConfig>,

    /// Values for input variables, keyed by variable name.
    ///
    /// These take precedence over `default` values declared in `variable`
    /// blocks.
    variables: BTreeMap<String, String>,

    /// The output format used when none is given on the command line.
    pub format: OutputFormat,
}

/// Settings for a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RuleConfig {
    /// Whether the rule runs.
    pub enabled: bool,
}

/// How issues are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per issue, coloured when the terminal supports it.
    #[default]
    Table,
    /// A single JSON document.
    Json,
}

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    /// The file contents are not valid configuration.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the configuration file from a module directory, falling back to
    /// the default configuration if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(CONFIG_FILE_NAME);
        match Self::load(&path) {
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Returns the configured enabled state of a rule, if any.
    #[must_use]
    pub fn rule_enabled(&self, name: &str) -> Option<bool> {
        self.rules.get(name).map(|rule| rule.enabled)
    }

    /// Returns the names of all rules mentioned in the configuration.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Returns the configured input variable values.
    #[must_use]
    pub const fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        rules: BTreeMap<String, RuleConfig>,

        #[serde(default)]
        variables: BTreeMap<String, String>,

        #[serde(default)]
        format: OutputFormat,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                rules,
                variables,
                format,
            } => Self {
                rules,
                variables,
                format,
            },
        }
    }
}
