use std::cell::RefCell;

use hcl::eval::Context;

use super::{Attribute, BodyContent, BodySchema, Error, Module, Runner, Variables, eval};
use crate::{
    domain::{Issue, Range},
    rules::Rule,
};

/// Runs rules against a single loaded [`Module`], collecting their issues.
pub struct ModuleRunner {
    module: Module,
    context: Context<'static>,
    issues: RefCell<Vec<Issue>>,
}

impl ModuleRunner {
    /// Creates a runner whose expressions see `variables` as `var.*`.
    #[must_use]
    pub fn new(module: Module, variables: &Variables) -> Self {
        Self {
            module,
            context: variables.context(),
            issues: RefCell::default(),
        }
    }

    /// Creates a runner using the variable defaults declared by the module
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable default cannot be evaluated.
    pub fn with_declared_variables(module: Module) -> Result<Self, Error> {
        let variables = module.variables()?;
        Ok(Self::new(module, &variables))
    }

    /// The issues emitted so far, in emission order.
    #[must_use]
    pub fn issues(&self) -> Vec<Issue> {
        self.issues.borrow().clone()
    }

    /// Takes the issues emitted so far, leaving the runner empty.
    #[must_use]
    pub fn take_issues(&self) -> Vec<Issue> {
        self.issues.take()
    }
}

impl Runner for ModuleRunner {
    fn module_content(&self, schema: &BodySchema) -> Result<BodyContent, Error> {
        self.module.content(schema)
    }

    fn evaluate_string(&self, attr: &Attribute) -> Result<String, Error> {
        eval::evaluate_string(attr, &self.context)
    }

    fn emit_issue(&self, rule: &dyn Rule, message: String, range: Range) -> Result<(), Error> {
        tracing::debug!(rule = rule.name(), %range, "{message}");
        self.issues
            .borrow_mut()
            .push(Issue::new(rule.name(), rule.severity(), message, range));
        Ok(())
    }
}

impl std::fmt::Debug for ModuleRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRunner")
            .field("module", &self.module)
            .field("issues", &self.issues)
            .finish_non_exhaustive()
    }
}
