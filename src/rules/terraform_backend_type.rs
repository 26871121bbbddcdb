use crate::{
    domain::{Range, Severity},
    rules::{Rule, RuleMeta},
    runner::{self, Attribute, Block, BlockSchema, BodySchema, Runner},
};

const BACKEND_TYPE: &str = "http";
const LOCK_METHOD: &str = "POST";
const UNLOCK_METHOD: &str = "DELETE";

/// Checks that the state backend is `http`, locking with `POST` and
/// unlocking with `DELETE`.
///
/// Checking stops at the first violation found in the module.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerraformBackendTypeRule;

impl TerraformBackendTypeRule {
    /// The rule's static metadata.
    pub const META: RuleMeta = RuleMeta {
        name: "terraform_backend_type",
        enabled: true,
        severity: Severity::Error,
        link: "",
    };

    /// Creates the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn schema() -> BodySchema {
        BodySchema::new().block(
            BlockSchema::new("terraform").body(
                BodySchema::new().block(
                    BlockSchema::new("backend").label("type").body(
                        BodySchema::new()
                            .attribute("address")
                            .attribute("lock_method")
                            .attribute("unlock_method"),
                    ),
                ),
            ),
        )
    }
}

impl Rule for TerraformBackendTypeRule {
    fn meta(&self) -> &RuleMeta {
        &Self::META
    }

    fn check(&self, runner: &dyn Runner) -> Result<(), runner::Error> {
        let content = runner.module_content(&Self::schema())?;

        let backends = content
            .blocks
            .into_iter()
            .flat_map(|terraform| terraform.body.blocks)
            .map(BackendDeclaration::from);

        for backend in backends {
            if let Some(violation) = backend.first_violation(runner)? {
                return runner.emit_issue(self, violation.message, violation.range);
            }
        }

        Ok(())
    }
}

/// A `backend` block nested in a `terraform` block.
#[derive(Debug)]
struct BackendDeclaration {
    backend_type: String,
    def_range: Range,
    address: Option<Attribute>,
    lock_method: Option<Attribute>,
    unlock_method: Option<Attribute>,
}

impl From<Block> for BackendDeclaration {
    fn from(mut block: Block) -> Self {
        let mut take = |name: &str| block.body.attributes.remove(name);
        let address = take("address");
        let lock_method = take("lock_method");
        let unlock_method = take("unlock_method");
        Self {
            // the schema guarantees exactly one label
            backend_type: block.labels.swap_remove(0),
            def_range: block.def_range,
            address,
            lock_method,
            unlock_method,
        }
    }
}

/// The progress of checking one declaration.
///
/// Passing a presence check binds the attribute whose value is checked next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage<'a> {
    Start,
    TypeChecked,
    LockPresent(&'a Attribute),
    LockValueChecked,
    UnlockPresent(&'a Attribute),
    UnlockValueChecked,
}

#[derive(Debug, PartialEq, Eq)]
struct Violation {
    message: String,
    range: Range,
}

impl BackendDeclaration {
    /// Runs the checks in order and returns the first that fails.
    fn first_violation(&self, runner: &dyn Runner) -> Result<Option<Violation>, runner::Error> {
        tracing::debug!(
            backend_type = %self.backend_type,
            address = self.address.is_some(),
            range = %self.def_range,
            "checking backend"
        );

        let mut stage = Stage::Start;
        loop {
            let next = match stage {
                Stage::Start => self.check_type().map(|()| Stage::TypeChecked),
                Stage::TypeChecked => self
                    .require(self.lock_method.as_ref(), "lock_method")
                    .map(Stage::LockPresent),
                Stage::LockPresent(attr) => check_value(runner, attr, "lock_method", LOCK_METHOD)?
                    .map(|()| Stage::LockValueChecked),
                Stage::LockValueChecked => self
                    .require(self.unlock_method.as_ref(), "unlock_method")
                    .map(Stage::UnlockPresent),
                Stage::UnlockPresent(attr) => {
                    check_value(runner, attr, "unlock_method", UNLOCK_METHOD)?
                        .map(|()| Stage::UnlockValueChecked)
                }
                Stage::UnlockValueChecked => return Ok(None),
            };
            match next {
                Ok(next) => stage = next,
                Err(violation) => return Ok(Some(violation)),
            }
        }
    }

    fn check_type(&self) -> Result<(), Violation> {
        if self.backend_type == BACKEND_TYPE {
            return Ok(());
        }
        Err(Violation {
            message: format!(
                "backend type must be '{BACKEND_TYPE}', but found '{}'",
                self.backend_type
            ),
            range: self.def_range.clone(),
        })
    }

    fn require<'a>(
        &self,
        attr: Option<&'a Attribute>,
        name: &str,
    ) -> Result<&'a Attribute, Violation> {
        attr.ok_or_else(|| Violation {
            message: format!("\"{name}\" attribute is required"),
            range: self.def_range.clone(),
        })
    }
}

/// Compares an attribute's value with the expected method.
///
/// The outer error is a host failure to evaluate the value; the inner one is
/// a policy violation.
fn check_value(
    runner: &dyn Runner,
    attr: &Attribute,
    name: &str,
    expected: &str,
) -> Result<Result<(), Violation>, runner::Error> {
    let value = runner.evaluate_string(attr)?;
    if value == expected {
        return Ok(Ok(()));
    }
    Ok(Err(Violation {
        message: format!("\"{name}\" must be \"{expected}\""),
        range: attr.range.clone(),
    }))
}
