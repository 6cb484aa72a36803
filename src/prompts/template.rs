// src/prompts/template.rs — A named prompt text with `{placeholder}` fields

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::infra::errors::TemplateError;

/// Separator between items when a list template is viewed as one text.
const LIST_JOIN: &str = "\n\n";

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder pattern")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    text: String,
    /// Set for list-valued templates, one alternative per item.
    items: Option<Vec<String>>,
}

impl Template {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            items: None,
        }
    }

    /// A template holding alternatives, e.g. several system formats.
    pub fn list(name: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            name: name.into(),
            text: items.join(LIST_JOIN),
            items: Some(items),
        }
    }

    pub fn is_list(&self) -> bool {
        self.items.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for caps in placeholder_pattern().captures_iter(&self.text) {
            if let Some(m) = caps.get(1) {
                if !names.contains(&m.as_str()) {
                    names.push(m.as_str());
                }
            }
        }
        names
    }

    /// The alternatives of a list template; a text template is its own only one.
    pub fn variants(&self) -> Vec<&str> {
        match &self.items {
            Some(items) => items.iter().map(String::as_str).collect(),
            None => vec![self.text.as_str()],
        }
    }

    /// One alternative as a standalone text template, named `NAME[index]`.
    pub fn variant(&self, index: usize) -> Option<Template> {
        self.variants()
            .get(index)
            .map(|text| Template::new(format!("{}[{}]", self.name, index), *text))
    }

    /// Substitute `{name}` fields. `{{` and `}}` produce literal braces; braces
    /// around anything that is not an ASCII identifier are left as written.
    pub fn render<K, V>(&self, vars: &HashMap<K, V>) -> Result<String, TemplateError>
    where
        K: Borrow<str> + Hash + Eq,
        V: AsRef<str>,
    {
        let mut missing = None;
        let rendered = placeholder_pattern().replace_all(&self.text, |caps: &Captures| {
            match caps.get(1) {
                None if &caps[0] == "{{" => "{".to_string(),
                None => "}".to_string(),
                Some(key) => match vars.get(key.as_str()) {
                    Some(value) => value.as_ref().to_string(),
                    None => {
                        missing.get_or_insert_with(|| key.as_str().to_string());
                        String::new()
                    }
                },
            }
        });

        match missing {
            Some(variable) => Err(TemplateError::MissingVariable {
                template: self.name.clone(),
                variable,
            }),
            None => Ok(rendered.into_owned()),
        }
    }
}
