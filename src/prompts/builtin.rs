// src/prompts/builtin.rs — Prompt templates compiled into the crate

use std::path::PathBuf;

use super::context::DomainContext;
use super::package::{assemble, parse_module, PackageSources, Sibling, ENTRY_FILE};
use super::{TemplateNamespace, TemplateProvider, TemplateSource};
use crate::infra::errors::TemplateError;

const BUILTIN_ENTRY: &str = include_str!("../../templates/templates.toml");

/// Sibling modules of the built-in package (embedded in binary via include_str!).
const BUILTIN_MODULES: &[(&str, &str)] = &[
    ("prompts_base", include_str!("../../templates/prompts_base.toml")),
    ("prompts_diff", include_str!("../../templates/prompts_diff.toml")),
    ("prompts_full", include_str!("../../templates/prompts_full.toml")),
    ("prompts_cross", include_str!("../../templates/prompts_cross.toml")),
    ("prompts_init", include_str!("../../templates/prompts_init.toml")),
    ("prompts_meta", include_str!("../../templates/prompts_meta.toml")),
    (
        "prompts_novelty",
        include_str!("../../templates/prompts_novelty.toml"),
    ),
];

/// Every name the built-in set publishes. External packages must define all of them.
pub const BUILTIN_NAMES: &[&str] = &[
    "construct_eval_history_msg",
    "construct_individual_program_msg",
    "perf_str",
    "format_text_feedback_section",
    "BASE_SYSTEM_MSG",
    "DIFF_SYS_FORMAT",
    "DIFF_ITER_MSG",
    "FULL_SYS_FORMAT_DEFAULT",
    "FULL_SYS_FORMATS",
    "FULL_ITER_MSG",
    "CROSS_SYS_FORMAT",
    "CROSS_ITER_MSG",
    "get_cross_component",
    "INIT_SYSTEM_MSG",
    "INIT_USER_MSG",
    "META_STEP1_SYSTEM_MSG",
    "META_STEP1_USER_MSG",
    "META_STEP2_SYSTEM_MSG",
    "META_STEP2_USER_MSG",
    "META_STEP3_SYSTEM_MSG",
    "META_STEP3_USER_MSG",
    "NOVELTY_SYSTEM_MSG",
    "NOVELTY_USER_MSG",
];

fn builtin_path(file: &str) -> PathBuf {
    PathBuf::from("<builtin>").join(file)
}

/// The default template set.
///
/// Loading needs the task description and hints files: several templates
/// splice them in.
#[derive(Debug)]
pub struct BuiltinTemplateProvider {
    namespace: TemplateNamespace,
    source: TemplateSource,
}

impl BuiltinTemplateProvider {
    pub fn load(context: &DomainContext) -> Result<Self, TemplateError> {
        let entry_path = builtin_path(ENTRY_FILE);
        let entry = parse_module(BUILTIN_ENTRY, &entry_path)?;

        let mut siblings = Vec::with_capacity(BUILTIN_MODULES.len());
        for (name, content) in BUILTIN_MODULES {
            let path = builtin_path(&format!("{name}.toml"));
            let module = parse_module(content, &path)?;
            siblings.push((name.to_string(), Sibling::File { path, module }));
        }

        let namespace = assemble(
            PackageSources {
                entry_path,
                entry,
                siblings,
            },
            context,
            false,
        )?;

        Ok(Self {
            namespace,
            source: TemplateSource::Builtin,
        })
    }
}

impl TemplateProvider for BuiltinTemplateProvider {
    fn source(&self) -> &TemplateSource {
        &self.source
    }

    fn namespace(&self) -> &TemplateNamespace {
        &self.namespace
    }
}
