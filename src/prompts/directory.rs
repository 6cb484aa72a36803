// src/prompts/directory.rs — Template package loaded from a directory
//
// Layout:
//   <dir>/templates.toml          entry module (required)
//   <dir>/<name>.toml             sibling module, exposed as `<name>`
//   <dir>/<name>/templates.toml   nested package, exposed as `<name>`
//
// Other files and directories without an entry file are ignored.

use std::path::{Path, PathBuf};

use super::builtin::BUILTIN_NAMES;
use super::context::DomainContext;
use super::package::{assemble, parse_module, PackageSources, Sibling, ENTRY_FILE};
use super::{TemplateNamespace, TemplateProvider, TemplateSource};
use crate::infra::errors::TemplateError;

#[derive(Debug)]
pub struct DirectoryTemplateProvider {
    namespace: TemplateNamespace,
    source: TemplateSource,
}

impl DirectoryTemplateProvider {
    /// Load the package at `dir` and register it under `alias`.
    ///
    /// The package must define every built-in name; a partial package is
    /// rejected rather than mixed with built-in content.
    pub fn load(dir: &Path, alias: &str, context: &DomainContext) -> Result<Self, TemplateError> {
        let dir = dir.canonicalize().map_err(|source| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let namespace = load_package(&dir, context)?;

        let missing: Vec<String> = BUILTIN_NAMES
            .iter()
            .filter(|name| !namespace.contains(name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(TemplateError::MissingBuiltinNames { missing });
        }

        Ok(Self {
            namespace,
            source: TemplateSource::External {
                alias: alias.to_string(),
                dir,
            },
        })
    }
}

impl TemplateProvider for DirectoryTemplateProvider {
    fn source(&self) -> &TemplateSource {
        &self.source
    }

    fn namespace(&self) -> &TemplateNamespace {
        &self.namespace
    }
}

fn read(path: &Path) -> Result<String, TemplateError> {
    std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_package(dir: &Path, context: &DomainContext) -> Result<TemplateNamespace, TemplateError> {
    let entry_path = dir.join(ENTRY_FILE);
    if !entry_path.is_file() {
        return Err(TemplateError::MissingEntry {
            dir: dir.to_path_buf(),
            entry: ENTRY_FILE,
        });
    }
    let entry = parse_module(&read(&entry_path)?, &entry_path)?;

    let io_err = |source| TemplateError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|item| item.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(io_err)?;
    paths.sort();

    let mut siblings = Vec::new();
    for path in paths {
        if path.is_dir() {
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if path.join(ENTRY_FILE).is_file() {
                let nested = load_package(&path, context)?;
                siblings.push((name.to_string(), Sibling::Package(nested)));
            }
        } else if path.extension().is_some_and(|ext| ext == "toml") && path != entry_path {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let module = parse_module(&read(&path)?, &path)?;
            siblings.push((stem, Sibling::File { path, module }));
        }
    }

    assemble(
        PackageSources {
            entry_path,
            entry,
            siblings,
        },
        context,
        true,
    )
}
