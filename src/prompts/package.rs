// src/prompts/package.rs — Template package format shared by built-in and external sets
//
// A package is an entry file plus sibling modules. Every module is TOML:
//
// ```toml
// exports = ["NAME", ...]          # optional; default: names not starting with `_`
//
// [templates]
// NAME = '''text with {placeholders}'''
// LIST_NAME = ["first alternative", "second alternative"]
//
// [imports]                        # entry file only
// prompts_meta = ["META_STEP1_SYSTEM_MSG"]
// ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::context::DomainContext;
use super::template::Template;
use super::TemplateNamespace;
use crate::infra::errors::TemplateError;

pub(crate) const ENTRY_FILE: &str = "templates.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ModuleFile {
    #[serde(default)]
    exports: Option<Vec<String>>,
    #[serde(default)]
    templates: BTreeMap<String, TemplateValue>,
    #[serde(default)]
    imports: BTreeMap<String, Vec<String>>,
}

/// A template is either one text or a list of alternatives.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TemplateValue {
    Text(String),
    List(Vec<String>),
}

pub(crate) fn parse_module(text: &str, path: &Path) -> Result<ModuleFile, TemplateError> {
    toml::from_str(text).map_err(|e| TemplateError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// A module living next to the entry file.
pub(crate) enum Sibling {
    /// `name.toml`
    File { path: PathBuf, module: ModuleFile },
    /// `name/templates.toml`, already assembled
    Package(TemplateNamespace),
}

pub(crate) struct PackageSources {
    pub entry_path: PathBuf,
    pub entry: ModuleFile,
    pub siblings: Vec<(String, Sibling)>,
}

/// Build the published namespace of a package.
///
/// Fails as a whole: no partially built namespace ever escapes.
pub(crate) fn assemble(
    sources: PackageSources,
    context: &DomainContext,
    expose_modules: bool,
) -> Result<TemplateNamespace, TemplateError> {
    // 1. Siblings: every defined name (import targets) and the public view.
    let mut defined_by_module: BTreeMap<String, BTreeMap<String, Template>> = BTreeMap::new();
    let mut public_modules: Vec<(String, TemplateNamespace)> = Vec::new();

    for (name, sibling) in sources.siblings {
        match sibling {
            Sibling::File { path, module } => {
                if !module.imports.is_empty() {
                    return Err(TemplateError::Parse {
                        path,
                        message: "[imports] is only allowed in the package entry file".into(),
                    });
                }
                let defined = expand_all(&module.templates, context)?;
                let public = select_public(module.exports.as_deref(), &defined, &path)?;
                defined_by_module.insert(name.clone(), defined);
                public_modules.push((name, public));
            }
            Sibling::Package(namespace) => {
                let defined = namespace
                    .templates()
                    .map(|t| (t.name().to_string(), t.clone()))
                    .collect();
                defined_by_module.insert(name.clone(), defined);
                public_modules.push((name, namespace));
            }
        }
    }

    // 2. Entry: local definitions plus imports from siblings.
    let mut defined = expand_all(&sources.entry.templates, context)?;
    for (module, names) in &sources.entry.imports {
        for name in names {
            let template = defined_by_module
                .get(module)
                .and_then(|m| m.get(name))
                .ok_or_else(|| TemplateError::UnresolvedImport {
                    module: module.clone(),
                    name: name.clone(),
                })?;
            defined.insert(name.clone(), template.clone());
        }
    }

    // 3. Publish.
    let mut namespace =
        select_public(sources.entry.exports.as_deref(), &defined, &sources.entry_path)?;
    if expose_modules {
        for (name, module) in public_modules {
            namespace.insert_module(name, module);
        }
    }

    Ok(namespace)
}

fn expand_all(
    templates: &BTreeMap<String, TemplateValue>,
    context: &DomainContext,
) -> Result<BTreeMap<String, Template>, TemplateError> {
    templates
        .iter()
        .map(|(name, value)| -> Result<(String, Template), TemplateError> {
            let template = match value {
                TemplateValue::Text(text) => Template::new(name.clone(), context.expand(text)?),
                TemplateValue::List(items) => Template::list(
                    name.clone(),
                    items
                        .iter()
                        .map(|item| context.expand(item))
                        .collect::<Result<Vec<_>, _>>()?,
                ),
            };
            Ok((name.clone(), template))
        })
        .collect()
}

/// The export list if declared, otherwise every name without a leading `_`.
fn select_public(
    exports: Option<&[String]>,
    defined: &BTreeMap<String, Template>,
    path: &Path,
) -> Result<TemplateNamespace, TemplateError> {
    let mut namespace = TemplateNamespace::new();
    match exports {
        Some(names) => {
            for name in names {
                let template = defined.get(name).ok_or_else(|| TemplateError::UnknownExport {
                    name: name.clone(),
                    path: path.to_path_buf(),
                })?;
                namespace.insert(template.clone());
            }
        }
        None => {
            for template in defined.values().filter(|t| !t.name().starts_with('_')) {
                namespace.insert(template.clone());
            }
        }
    }
    Ok(namespace)
}
