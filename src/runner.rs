//! The host side of a lint run.
//!
//! Rules never touch parsed files directly. They describe the shape they are
//! interested in with a [`BodySchema`], receive the matching [`BodyContent`],
//! and report violations back through the [`Runner`].

use std::{io, path::PathBuf};

mod content;
pub use content::{Attribute, Block, BodyContent};

mod eval;
pub use eval::Variables;

mod module;
pub use module::Module;

mod module_runner;
pub use module_runner::ModuleRunner;

mod schema;
pub use schema::{AttributeSchema, BlockSchema, BodySchema};

use crate::{domain::Range, rules::Rule};

/// The capabilities a rule needs from its host.
pub trait Runner {
    /// Extracts the parts of the module's top-level bodies described by
    /// `schema`.
    ///
    /// # Errors
    ///
    /// Returns an error if a matching block does not have the shape the
    /// schema requires.
    fn module_content(&self, schema: &BodySchema) -> Result<BodyContent, Error>;

    /// Evaluates an attribute's expression to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression cannot be resolved, or resolves to
    /// a value that cannot be used as a string.
    fn evaluate_string(&self, attr: &Attribute) -> Result<String, Error>;

    /// Records a violation of `rule` at `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot accept the issue.
    fn emit_issue(&self, rule: &dyn Rule, message: String, range: Range) -> Result<(), Error>;
}

/// Failures of the host while loading, extracting or evaluating.
///
/// These are distinct from rule violations, which are reported as
/// [`Issue`](crate::Issue)s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration file could not be read.
    #[error("failed to read {}", .path.display())]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The module directory could not be listed.
    #[error("failed to list module directory")]
    Walk(#[from] walkdir::Error),

    /// A configuration file is not valid HCL.
    #[error("{}:{line}:{column}: {message}", .path.display())]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// The 1-based line of the error.
        line: usize,
        /// The 1-based column of the error.
        column: usize,
        /// What the parser expected.
        message: String,
    },

    /// A block matched by a schema has the wrong number of labels.
    #[error(
        "{range}: {kind} blocks must have {} label(s) ({}), found {found}",
        .expected.len(),
        .expected.join(", ")
    )]
    LabelCount {
        /// The block type.
        kind: String,
        /// The label names the schema requires.
        expected: Vec<String>,
        /// The number of labels found.
        found: usize,
        /// The block definition.
        range: Range,
    },

    /// A required attribute is absent.
    #[error("{range}: the attribute \"{name}\" is required, but no definition was found")]
    MissingAttribute {
        /// The attribute name.
        name: String,
        /// The enclosing block definition.
        range: Range,
    },

    /// An expression could not be evaluated.
    #[error("{range}: failed to evaluate expression")]
    Evaluate {
        /// The expression.
        range: Range,
        /// The evaluation failure.
        #[source]
        source: Box<hcl::eval::Error>,
    },

    /// An expression evaluated to a value of the wrong type.
    #[error("{range}: unsuitable value: {reason}")]
    TypeMismatch {
        /// The expression.
        range: Range,
        /// Why the value is unsuitable.
        reason: String,
    },
}
