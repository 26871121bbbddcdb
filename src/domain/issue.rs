use std::fmt;

use serde::{Deserialize, Serialize};

use super::Range;

/// How serious a rule violation is.
///
/// Variants are ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The configuration is considered broken.
    Error,
    /// The configuration works but is likely a mistake.
    Warning,
    /// Informational only.
    Notice,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
        };
        f.write_str(s)
    }
}

/// A single located rule violation.
///
/// Issues are created by a [`Runner`](crate::Runner) when a rule emits one
/// and are never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    rule: String,
    severity: Severity,
    message: String,
    range: Range,
}

impl Issue {
    /// Creates an issue for the named rule.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        range: Range,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            range,
        }
    }

    /// The name of the rule that raised the issue.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// The severity of the rule at the time the issue was raised.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// The human-readable description of the violation.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the violation was found.
    #[must_use]
    pub const fn range(&self) -> &Range {
        &self.range
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {} ({})",
            self.range.filename.display(),
            self.range.start.line,
            self.range.start.column,
            self.severity,
            self.message,
            self.rule
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Pos;

    #[test]
    fn display_uses_start_position() {
        let range = Range {
            filename: "main.tf".into(),
            start: Pos::new(2, 3, 14),
            end: Pos::new(2, 17, 28),
        };
        let issue = Issue::new("terraform_backend_type", Severity::Error, "bad", range);

        assert_eq!(
            issue.to_string(),
            "main.tf:2:3: error: bad (terraform_backend_type)"
        );
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
