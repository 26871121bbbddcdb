//! Terraform State Backend Linting
//!
//! Checks that a module's remote state backend is `http`, acquiring locks
//! with `POST` and releasing them with `DELETE`.

pub mod domain;
pub use domain::{Config, Issue, Pos, Range, Severity};

/// Loading modules, extracting content and evaluating expressions.
pub mod runner;
pub use runner::{Module, ModuleRunner, Runner};

pub mod rules;
pub use rules::{Rule, RuleMeta, Ruleset, TerraformBackendTypeRule};
