//! Lint rules and the set of rules a run executes.

use crate::{
    domain::{Config, Severity},
    runner::{self, Runner},
};

/// Enforces an `http` state backend with `POST`/`DELETE` locking.
pub mod terraform_backend_type;
pub use terraform_backend_type::TerraformBackendTypeRule;

/// Static facts about a rule, used for registration and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMeta {
    /// The unique rule name.
    pub name: &'static str,
    /// Whether the rule runs when the configuration does not mention it.
    pub enabled: bool,
    /// The severity of issues the rule raises.
    pub severity: Severity,
    /// A link to the rule's documentation. Empty if there is none.
    pub link: &'static str,
}

/// A check run against a module.
pub trait Rule {
    /// The rule's static metadata.
    fn meta(&self) -> &RuleMeta;

    /// The unique rule name.
    fn name(&self) -> &'static str {
        self.meta().name
    }

    /// Whether the rule is enabled by default.
    fn enabled(&self) -> bool {
        self.meta().enabled
    }

    /// The severity of issues the rule raises.
    fn severity(&self) -> Severity {
        self.meta().severity
    }

    /// A link to the rule's documentation.
    fn link(&self) -> &'static str {
        self.meta().link
    }

    /// Checks the module behind `runner`, reporting violations through
    /// [`Runner::emit_issue`].
    ///
    /// # Errors
    ///
    /// Returns an error if the host fails; violations are not errors.
    fn check(&self, runner: &dyn Runner) -> Result<(), runner::Error>;
}

/// Errors raised when building a [`Ruleset`] from configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The configuration refers to a rule that does not exist.
    #[error("unknown rule '{0}' in configuration")]
    UnknownRule(String),
}

/// An ordered collection of rules together with their enabled state.
pub struct Ruleset {
    rules: Vec<(Box<dyn Rule>, bool)>,
}

impl Ruleset {
    /// All built-in rules with their default enabled state.
    #[must_use]
    pub fn builtin() -> Self {
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(TerraformBackendTypeRule::new())];
        Self::from_rules(rules)
    }

    /// Builds a ruleset from explicit rules, each with its default enabled
    /// state.
    #[must_use]
    pub fn from_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| {
                    let enabled = rule.enabled();
                    (rule, enabled)
                })
                .collect(),
        }
    }

    /// Applies the per-rule overrides from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration names a rule that is not in the
    /// set.
    pub fn apply_config(&mut self, config: &Config) -> Result<(), Error> {
        if let Some(unknown) = config
            .rule_names()
            .find(|name| !self.rules.iter().any(|(rule, _)| rule.name() == *name))
        {
            return Err(Error::UnknownRule(unknown.to_string()));
        }

        for (rule, enabled) in &mut self.rules {
            if let Some(configured) = config.rule_enabled(rule.name()) {
                *enabled = configured;
            }
        }
        Ok(())
    }

    /// Iterates over every rule with its enabled state.
    pub fn iter(&self) -> impl Iterator<Item = (&dyn Rule, bool)> {
        self.rules.iter().map(|(rule, enabled)| (rule.as_ref(), *enabled))
    }

    /// Iterates over the enabled rules.
    pub fn enabled(&self) -> impl Iterator<Item = &dyn Rule> {
        self.iter()
            .filter_map(|(rule, enabled)| enabled.then_some(rule))
    }

    /// Runs every enabled rule against `runner`, in order.
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first host error raised by a rule.
    pub fn check(&self, runner: &dyn Runner) -> Result<(), runner::Error> {
        for rule in self.enabled() {
            tracing::debug!("Running rule {}", rule.name());
            rule.check(runner)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Ruleset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(rule, enabled)| (rule.name(), enabled)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_are_enabled_by_default() {
        let ruleset = Ruleset::builtin();

        let enabled: Vec<_> = ruleset.enabled().map(|rule| rule.name()).collect();
        assert_eq!(enabled, vec!["terraform_backend_type"]);
    }

    #[test]
    fn config_can_disable_a_rule() {
        let config: Config =
            toml::from_str("_version = \"1\"\n[rules.terraform_backend_type]\nenabled = false\n")
                .unwrap();
        let mut ruleset = Ruleset::builtin();

        ruleset.apply_config(&config).unwrap();

        assert_eq!(ruleset.enabled().count(), 0);
        assert_eq!(ruleset.iter().count(), 1);
    }

    #[test]
    fn unknown_rule_in_config_is_an_error() {
        let config: Config =
            toml::from_str("_version = \"1\"\n[rules.no_such_rule]\nenabled = true\n").unwrap();
        let mut ruleset = Ruleset::builtin();

        let error = ruleset.apply_config(&config).unwrap_err();

        assert_eq!(error, Error::UnknownRule("no_such_rule".to_string()));
    }
}
