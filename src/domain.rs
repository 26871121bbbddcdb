//! Domain models for lint runs.
//!
//! This module contains the core domain types including source ranges,
//! issues and configuration.

mod config;
pub use config::{CONFIG_FILE_NAME, Config, Error as ConfigError, OutputFormat, RuleConfig};

/// Issues raised by rules.
pub mod issue;
pub use issue::{Issue, Severity};

mod range;
pub use range::{LineIndex, Pos, Range};
