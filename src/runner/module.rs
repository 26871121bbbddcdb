//! A Terraform module: the set of `.tf` files in one directory.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use hcl::{
    edit::{parser, structure},
    eval::{Context, Evaluate},
};
use walkdir::WalkDir;

use super::{
    BlockSchema, BodySchema, Error,
    content::{self, BodyContent},
    eval::Variables,
};
use crate::domain::LineIndex;

/// A parsed configuration file.
#[derive(Debug, Clone)]
struct File {
    index: LineIndex,
    body: structure::Body,
}

/// The parsed files of a single module, in file name order.
#[derive(Debug, Clone, Default)]
pub struct Module {
    files: Vec<File>,
}

impl Module {
    /// Loads and parses every `.tf` file directly inside `dir`.
    ///
    /// Subdirectories are not searched; they hold other modules.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read, or if any file cannot
    /// be read or parsed.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let paths = collect_config_paths(dir)?;
        tracing::debug!("Found {} configuration files in {}", paths.len(), dir.display());

        let files = paths
            .into_iter()
            .map(|path| {
                let source = std::fs::read_to_string(&path).map_err(|source| Error::Io {
                    path: path.clone(),
                    source,
                })?;
                let filename = path.strip_prefix(dir).unwrap_or(&path).to_path_buf();
                File::parse(filename, source)
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { files })
    }

    /// Builds a module from in-memory sources, keyed by file name.
    ///
    /// Files are ordered by name, as they would be when loaded from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if any source fails to parse.
    pub fn from_sources<I, P, S>(sources: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        let mut sources: Vec<(PathBuf, String)> = sources
            .into_iter()
            .map(|(path, source)| (path.into(), source.into()))
            .collect();
        sources.sort_by(|(a, _), (b, _)| a.cmp(b));

        let files = sources
            .into_iter()
            .map(|(filename, source)| File::parse(filename, source))
            .collect::<Result<_, _>>()?;

        Ok(Self { files })
    }

    /// The names of the files in the module.
    pub fn filenames(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|file| file.index.filename().as_path())
    }

    /// Extracts the content described by `schema` from every file, merged
    /// in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if a matching block has the wrong number of labels, or
    /// a required attribute is missing.
    pub fn content(&self, schema: &BodySchema) -> Result<BodyContent, Error> {
        let mut merged = BodyContent::default();
        for file in &self.files {
            merged.extend(content::extract(&file.body, schema, &file.index)?);
        }

        let range = self
            .files
            .first()
            .map(|file| file.index.range(None))
            .unwrap_or_default();
        merged.check_required(schema, &range)?;

        Ok(merged)
    }

    /// Collects the default values of the module's input variables.
    ///
    /// Variables without a `default` are left unset, so expressions that
    /// reference them fail to evaluate unless a value is supplied.
    ///
    /// # Errors
    ///
    /// Returns an error if a `variable` block is malformed or its default
    /// cannot be evaluated.
    pub fn variables(&self) -> Result<Variables, Error> {
        let schema = BodySchema::new().block(
            BlockSchema::new("variable")
                .label("name")
                .body(BodySchema::new().attribute("default")),
        );
        let content = self.content(&schema)?;
        let ctx = Context::new();

        let mut variables = Variables::default();
        for block in content.blocks {
            let Some(default) = block.body.attributes.get("default") else {
                continue;
            };
            let value = default
                .expr
                .evaluate(&ctx)
                .map_err(|source| Error::Evaluate {
                    range: default.expr_range.clone(),
                    source: Box::new(source),
                })?;
            variables.set(block.labels[0].clone(), value);
        }
        Ok(variables)
    }
}

impl File {
    fn parse(filename: PathBuf, source: String) -> Result<Self, Error> {
        let body = parser::parse_body(&source).map_err(|e| Error::Parse {
            path: filename.clone(),
            line: e.location().line(),
            column: e.location().column(),
            message: e.message().to_string(),
        })?;
        tracing::debug!("Parsed {}", filename.display());
        Ok(Self {
            index: LineIndex::new(filename, source),
            body,
        })
    }
}

fn collect_config_paths(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries
        .into_iter()
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new("tf")))
        .map(walkdir::DirEntry::into_path)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_only_tf_files_in_directory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.tf"), "terraform {}\n").unwrap();
        std::fs::write(tmp.path().join("a.tf"), "variable \"x\" {}\n").unwrap();
        std::fs::write(tmp.path().join("notes.md"), "# not config\n").unwrap();
        std::fs::create_dir(tmp.path().join("child")).unwrap();
        std::fs::write(tmp.path().join("child").join("c.tf"), "terraform {}\n").unwrap();

        let module = Module::load(tmp.path()).unwrap();

        let names: Vec<_> = module.filenames().map(Path::to_path_buf).collect();
        assert_eq!(names, vec![PathBuf::from("a.tf"), PathBuf::from("b.tf")]);
    }

    #[test]
    fn load_missing_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();

        let error = Module::load(&tmp.path().join("missing")).unwrap_err();
        assert!(matches!(error, Error::Walk(_)));
    }

    #[test]
    fn parse_error_names_file_and_location() {
        let error =
            Module::from_sources([("main.tf", "terraform {\n  backend \"http\" {\n")]).unwrap_err();

        match error {
            Error::Parse { path, line, .. } => {
                assert_eq!(path, PathBuf::from("main.tf"));
                assert!(line >= 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn content_merges_files_in_name_order() {
        let module = Module::from_sources([
            ("b.tf", "terraform {\n  backend \"s3\" {}\n}\n"),
            ("a.tf", "terraform {\n  backend \"http\" {}\n}\n"),
        ])
        .unwrap();
        let schema = BodySchema::new().block(
            BlockSchema::new("terraform")
                .body(BodySchema::new().block(BlockSchema::new("backend").label("type"))),
        );

        let content = module.content(&schema).unwrap();

        let labels: Vec<_> = content
            .blocks
            .iter()
            .flat_map(|terraform| &terraform.body.blocks)
            .map(|backend| backend.labels[0].as_str())
            .collect();
        assert_eq!(labels, vec!["http", "s3"]);
        assert_eq!(content.blocks[1].type_range.filename, PathBuf::from("b.tf"));
    }

    #[test]
    fn variables_use_declared_defaults() {
        let module = Module::from_sources([(
            "variables.tf",
            "variable \"lock\" {\n  default = \"POST\"\n}\nvariable \"unset\" {}\n",
        )])
        .unwrap();

        let variables = module.variables().unwrap();

        let mut expected = Variables::default();
        expected.set("lock", "POST");
        assert_eq!(variables, expected);
    }
}
