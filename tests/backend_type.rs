#![allow(missing_docs)]

use std::path::PathBuf;

use backend_lint::{
    Issue, Module, ModuleRunner, Rule, Ruleset, Severity, TerraformBackendTypeRule, runner,
};
use test_case::test_case;

/// An expected issue: message, then start and end as (line, column).
type Expected = (&'static str, (usize, usize), (usize, usize));

fn run(content: &str) -> Result<Vec<Issue>, runner::Error> {
    let module = Module::from_sources([("resource.tf", content)])?;
    let runner = ModuleRunner::with_declared_variables(module)?;
    TerraformBackendTypeRule::new().check(&runner)?;
    Ok(runner.issues())
}

fn assert_issues(actual: &[Issue], expected: &[Expected]) {
    let actual: Vec<_> = actual
        .iter()
        .map(|issue| {
            assert_eq!(issue.rule(), "terraform_backend_type");
            assert_eq!(issue.severity(), Severity::Error);
            assert_eq!(issue.range().filename, PathBuf::from("resource.tf"));
            (
                issue.message(),
                (issue.range().start.line, issue.range().start.column),
                (issue.range().end.line, issue.range().end.column),
            )
        })
        .collect();
    assert_eq!(actual, expected);
}

#[test_case(
    r#"terraform {
  backend "http" {
    address = "https://example.com/state"
    lock_method = "POST"
    unlock_method = "DELETE"
  }
}
"#,
    &[];
    "valid backend with correct methods"
)]
#[test_case(
    r#"terraform {
  backend "s3" {
    lock_method = "POST"
    unlock_method = "DELETE"
  }
}
"#,
    &[("backend type must be 'http', but found 's3'", (2, 3), (2, 15))];
    "wrong backend type"
)]
#[test_case(
    r#"terraform {
  backend "s3" {
    lock_method = "GET"
  }
}
"#,
    &[("backend type must be 'http', but found 's3'", (2, 3), (2, 15))];
    "wrong backend type hides method errors"
)]
#[test_case(
    r#"terraform {
  backend "http" {
    unlock_method = "DELETE"
  }
}
"#,
    &[(r#""lock_method" attribute is required"#, (2, 3), (2, 17))];
    "missing lock_method"
)]
#[test_case(
    r#"terraform {
  backend "http" {
    lock_method = "GET"
    unlock_method = "DELETE"
  }
}
"#,
    &[(r#""lock_method" must be "POST""#, (3, 5), (3, 24))];
    "wrong lock_method"
)]
#[test_case(
    r#"terraform {
  backend "http" {
    lock_method = "POST"
  }
}
"#,
    &[(r#""unlock_method" attribute is required"#, (2, 3), (2, 17))];
    "missing unlock_method"
)]
#[test_case(
    r#"terraform {
  backend "http" {
    lock_method = "GET"
  }
}
"#,
    &[(r#""lock_method" must be "POST""#, (3, 5), (3, 24))];
    "wrong lock_method reported before missing unlock_method"
)]
#[test_case(
    r#"terraform {
  backend "http" {
    unlock_method = "GET"
  }
}
"#,
    &[(r#""lock_method" attribute is required"#, (2, 3), (2, 17))];
    "missing lock_method reported before wrong unlock_method"
)]
#[test_case(
    r#"terraform {
  backend "http" {
    lock_method = "POST"
    unlock_method = "GET"
  }
}
"#,
    &[(r#""unlock_method" must be "DELETE""#, (4, 5), (4, 26))];
    "wrong unlock_method"
)]
#[test_case(
    r#"terraform {
  required_version = ">= 1.5"
}
"#,
    &[];
    "no backend"
)]
fn check_reports_expected_issues(content: &str, expected: &[Expected]) {
    let issues = run(content).unwrap();
    assert_issues(&issues, expected);
}

#[test]
fn check_is_idempotent() {
    let module = Module::from_sources([(
        "resource.tf",
        "terraform {\n  backend \"http\" {\n    lock_method = \"PUT\"\n  }\n}\n",
    )])
    .unwrap();
    let runner = ModuleRunner::with_declared_variables(module).unwrap();
    let rule = TerraformBackendTypeRule::new();

    rule.check(&runner).unwrap();
    let first = runner.take_issues();
    rule.check(&runner).unwrap();
    let second = runner.take_issues();

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
}

#[test]
fn backend_spread_across_files_is_found() {
    let module = Module::from_sources([
        ("main.tf", "resource \"null_resource\" \"x\" {}\n"),
        ("backend.tf", "terraform {\n  backend \"local\" {}\n}\n"),
    ])
    .unwrap();
    let runner = ModuleRunner::with_declared_variables(module).unwrap();

    Ruleset::builtin().check(&runner).unwrap();

    let issues = runner.issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].range().filename, PathBuf::from("backend.tf"));
}

#[test]
fn backend_without_label_is_a_hard_error() {
    let error = run("terraform {\n  backend {\n  }\n}\n").unwrap_err();

    assert!(matches!(error, runner::Error::LabelCount { .. }));
}

#[test]
fn non_string_method_is_a_hard_error() {
    let error = run(
        "terraform {\n  backend \"http\" {\n    lock_method = [\"POST\"]\n  }\n}\n",
    )
    .unwrap_err();

    assert!(matches!(error, runner::Error::TypeMismatch { .. }));
}

#[test]
fn module_loaded_from_disk_is_checked() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("backend.tf"),
        r#"terraform {
  backend "http" {
    lock_method = var.lock
    unlock_method = "DELETE"
  }
}
"#,
    )
    .unwrap();
    std::fs::write(
        tmp.path().join("variables.tf"),
        "variable \"lock\" {\n  default = \"POST\"\n}\n",
    )
    .unwrap();

    let module = Module::load(tmp.path()).unwrap();
    let mut variables = module.variables().unwrap();
    variables.set("lock", "PATCH");
    let runner = ModuleRunner::new(module, &variables);

    Ruleset::builtin().check(&runner).unwrap();

    let issues = runner.issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].message(), r#""lock_method" must be "POST""#);
    assert_eq!(issues[0].range().filename, PathBuf::from("backend.tf"));
}
