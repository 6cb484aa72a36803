// src/prompts/resolver.rs — Pick the template set once at startup
//
// 1. SHINKA_PROMPT_ROOT unset (or empty) → built-in set.
// 2. Set → load that directory as a package under the `_env_prompts` alias.
// 3. Load failed → `LoadErrorPolicy` decides: fall back to the built-in set
//    (default) or return the error. Nothing in between is ever published.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::builtin::BuiltinTemplateProvider;
use super::context::{DomainContext, HINTS_DESCRIPTION_ENV, TASK_DESCRIPTION_ENV};
use super::directory::DirectoryTemplateProvider;
use super::TemplateProvider;
use crate::infra::config::Config;
use crate::infra::errors::TemplateError;

pub const PROMPT_ROOT_ENV: &str = "SHINKA_PROMPT_ROOT";

/// Name the external package is registered under. Never a real package name.
pub const EXTERNAL_ALIAS: &str = "_env_prompts";

/// What to do when the external package cannot be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadErrorPolicy {
    /// Log a warning and publish the built-in set.
    #[default]
    Fallback,
    /// Return the load error to the caller.
    Fail,
}

/// Inputs to template resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolverSettings {
    pub prompt_root: Option<PathBuf>,
    pub task_description_path: Option<PathBuf>,
    pub hints_path: Option<PathBuf>,
    pub on_load_error: LoadErrorPolicy,
}

impl ResolverSettings {
    pub fn from_env() -> Self {
        Self {
            prompt_root: env_path(PROMPT_ROOT_ENV),
            task_description_path: env_path(TASK_DESCRIPTION_ENV),
            hints_path: env_path(HINTS_DESCRIPTION_ENV),
            on_load_error: LoadErrorPolicy::default(),
        }
    }

    /// Env-derived paths with the policy from `[templates]`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            on_load_error: config.templates.on_load_error,
            ..Self::from_env()
        }
    }

    pub fn with_policy(mut self, policy: LoadErrorPolicy) -> Self {
        self.on_load_error = policy;
        self
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Resolve the template set. Call once and share the result.
pub fn resolve_templates(
    settings: &ResolverSettings,
) -> Result<Arc<dyn TemplateProvider>, TemplateError> {
    let context = DomainContext::new(
        settings.task_description_path.clone(),
        settings.hints_path.clone(),
    );

    if let Some(dir) = &settings.prompt_root {
        match DirectoryTemplateProvider::load(dir, EXTERNAL_ALIAS, &context) {
            Ok(provider) => {
                tracing::info!(
                    alias = EXTERNAL_ALIAS,
                    dir = %dir.display(),
                    templates = provider.names().len(),
                    "Loaded external prompt package"
                );
                return Ok(Arc::new(provider));
            }
            Err(e) => match settings.on_load_error {
                LoadErrorPolicy::Fail => return Err(e),
                LoadErrorPolicy::Fallback => {
                    tracing::warn!(
                        dir = %dir.display(),
                        "External prompt package failed to load, using built-in templates: {}",
                        e
                    );
                }
            },
        }
    }

    let provider = BuiltinTemplateProvider::load(&context)?;
    tracing::debug!(templates = provider.names().len(), "Using built-in prompt templates");
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::TemplateSource;

    #[test]
    fn test_policy_default_is_fallback() {
        assert_eq!(LoadErrorPolicy::default(), LoadErrorPolicy::Fallback);
    }

    #[test]
    fn test_with_policy() {
        let settings = ResolverSettings::default().with_policy(LoadErrorPolicy::Fail);
        assert_eq!(settings.on_load_error, LoadErrorPolicy::Fail);
    }

    #[test]
    fn test_no_root_and_no_context_is_fatal() {
        let err = resolve_templates(&ResolverSettings::default()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingEnv { .. }));
    }

    #[test]
    fn test_external_package_needs_no_context_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut entry = String::from("[templates]\n");
        for name in crate::prompts::BUILTIN_NAMES {
            entry.push_str(&format!("{name} = 'x'\n"));
        }
        std::fs::write(dir.path().join("templates.toml"), entry).unwrap();

        let settings = ResolverSettings {
            prompt_root: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let provider = resolve_templates(&settings).unwrap();
        assert!(matches!(provider.source(), TemplateSource::External { .. }));
        assert!(format!("{provider:?}").starts_with("DirectoryTemplateProvider"));
    }

    #[test]
    fn test_fail_policy_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ResolverSettings {
            prompt_root: Some(dir.path().to_path_buf()),
            ..Default::default()
        }
        .with_policy(LoadErrorPolicy::Fail);

        let err = resolve_templates(&settings).unwrap_err();
        assert!(matches!(err, TemplateError::MissingEntry { .. }));
    }
}
