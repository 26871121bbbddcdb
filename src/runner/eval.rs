//! Expression evaluation against a module's input variables.

use std::collections::BTreeMap;

use hcl::{
    Value,
    eval::{Context, Evaluate},
};

use super::{Attribute, Error};

/// Input variable values visible to expressions as `var.<name>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables(BTreeMap<String, Value>);

impl Variables {
    /// Sets a variable, replacing any earlier value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Overrides variables with string values, e.g. from configuration or the
    /// command line.
    pub fn extend_strings<'a>(
        &mut self,
        values: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) {
        for (name, value) in values {
            self.set(name.clone(), value.clone());
        }
    }

    /// Builds an evaluation context declaring the variables as `var`.
    #[must_use]
    pub fn context(&self) -> Context<'static> {
        let mut ctx = Context::new();
        let vars: Value = self
            .0
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        ctx.declare_var("var", vars);
        ctx
    }
}

/// Evaluates an attribute and converts the result to a string.
///
/// Numbers and booleans convert to their literal text. Null, lists and
/// objects cannot be used where a string is expected.
///
/// # Errors
///
/// Returns an error if the expression cannot be evaluated in `ctx`, or
/// resolves to a value with no string form.
pub fn evaluate_string(attr: &Attribute, ctx: &Context) -> Result<String, Error> {
    let value = attr
        .expr
        .evaluate(ctx)
        .map_err(|source| Error::Evaluate {
            range: attr.expr_range.clone(),
            source: Box::new(source),
        })?;

    tracing::trace!(attribute = %attr.name, ?value, "evaluated attribute");

    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(Error::TypeMismatch {
            range: attr.expr_range.clone(),
            reason: "null value cannot be used as a string".to_string(),
        }),
        Value::Array(_) => Err(Error::TypeMismatch {
            range: attr.expr_range.clone(),
            reason: "a list is not a string".to_string(),
        }),
        Value::Object(_) => Err(Error::TypeMismatch {
            range: attr.expr_range.clone(),
            reason: "an object is not a string".to_string(),
        }),
    }
}
