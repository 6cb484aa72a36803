// src/prompts/mod.rs — Prompt template namespace and its providers
//
// A namespace is resolved once at startup (see `resolver`) and then shared
// read-only with every consumer, usually as `Arc<dyn TemplateProvider>`.

pub mod builtin;
pub mod context;
pub mod directory;
mod package;
pub mod resolver;
pub mod template;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use builtin::{BuiltinTemplateProvider, BUILTIN_NAMES};
pub use context::DomainContext;
pub use directory::DirectoryTemplateProvider;
pub use resolver::{resolve_templates, LoadErrorPolicy, ResolverSettings};
pub use template::Template;

/// Flat name → template mapping, plus named sub-namespaces for the sibling
/// modules of an external package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateNamespace {
    templates: BTreeMap<String, Template>,
    modules: BTreeMap<String, TemplateNamespace>,
}

impl TemplateNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.name().to_string(), template);
    }

    pub fn insert_module(&mut self, name: impl Into<String>, module: TemplateNamespace) {
        self.modules.insert(name.into(), module);
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Template names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn module(&self, name: &str) -> Option<&TemplateNamespace> {
        self.modules.get(name)
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Where a resolved namespace came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Templates compiled into the crate
    Builtin,
    /// A package directory, registered under a fixed alias
    External { alias: String, dir: PathBuf },
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => write!(f, "builtin"),
            Self::External { alias, dir } => write!(f, "{}:{}", alias, dir.display()),
        }
    }
}

/// Read-only access to a resolved set of prompt templates.
pub trait TemplateProvider: std::fmt::Debug + Send + Sync {
    fn source(&self) -> &TemplateSource;

    fn namespace(&self) -> &TemplateNamespace;

    fn get(&self, name: &str) -> Option<&Template> {
        self.namespace().get(name)
    }

    /// Template text by name.
    fn text(&self, name: &str) -> Option<&str> {
        self.get(name).map(Template::text)
    }

    fn names(&self) -> Vec<&str> {
        self.namespace().names()
    }

    fn module(&self, name: &str) -> Option<&TemplateNamespace> {
        self.namespace().module(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_insert_and_lookup() {
        let mut ns = TemplateNamespace::new();
        assert!(ns.is_empty());
        ns.insert(Template::new("B", "two"));
        ns.insert(Template::new("A", "one"));

        assert_eq!(ns.len(), 2);
        assert_eq!(ns.names(), vec!["A", "B"]);
        assert_eq!(ns.get("A").map(Template::text), Some("one"));
        assert!(ns.contains("B"));
        assert!(!ns.contains("C"));
    }

    #[test]
    fn test_modules_kept_apart_from_templates() {
        let mut child = TemplateNamespace::new();
        child.insert(Template::new("X", "x"));

        let mut ns = TemplateNamespace::new();
        ns.insert_module("prompts_extra", child);

        assert!(ns.is_empty());
        assert_eq!(ns.module_names(), vec!["prompts_extra"]);
        assert!(ns.module("prompts_extra").unwrap().contains("X"));
    }

    #[test]
    fn test_source_display() {
        assert_eq!(TemplateSource::Builtin.to_string(), "builtin");
        let ext = TemplateSource::External {
            alias: "_env_prompts".into(),
            dir: PathBuf::from("/opt/prompts"),
        };
        assert_eq!(ext.to_string(), "_env_prompts:/opt/prompts");
    }
}
