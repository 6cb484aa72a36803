// src/prompts/context.rs — Task description and hints interpolated at load time

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::infra::errors::TemplateError;

pub const TASK_DESCRIPTION_ENV: &str = "SHINKA_TASK_DESCRIPTION_PATH";
pub const HINTS_DESCRIPTION_ENV: &str = "SHINKA_HINTS_DESCRIPTION_PATH";

pub const TASK_DESCRIPTION_TOKEN: &str = "${TASK_DESCRIPTION}";
pub const HINTS_TOKEN: &str = "${HINTS}";

/// Domain text spliced into templates. Each file is read at most once, and
/// only when a template actually contains its token.
#[derive(Debug, Default)]
pub struct DomainContext {
    task_path: Option<PathBuf>,
    hints_path: Option<PathBuf>,
    task: OnceLock<String>,
    hints: OnceLock<String>,
}

impl DomainContext {
    pub fn new(task_path: Option<PathBuf>, hints_path: Option<PathBuf>) -> Self {
        Self {
            task_path,
            hints_path,
            ..Default::default()
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os(TASK_DESCRIPTION_ENV).map(PathBuf::from),
            std::env::var_os(HINTS_DESCRIPTION_ENV).map(PathBuf::from),
        )
    }

    /// Context with the texts already in hand.
    pub fn from_text(task: impl Into<String>, hints: impl Into<String>) -> Self {
        let ctx = Self::default();
        let _ = ctx.task.set(task.into());
        let _ = ctx.hints.set(hints.into());
        ctx
    }

    pub fn task_description(&self) -> Result<&str, TemplateError> {
        read_once(&self.task, self.task_path.as_ref(), TASK_DESCRIPTION_ENV)
    }

    pub fn hints(&self) -> Result<&str, TemplateError> {
        read_once(&self.hints, self.hints_path.as_ref(), HINTS_DESCRIPTION_ENV)
    }

    /// Replace `${TASK_DESCRIPTION}` and `${HINTS}` in `text`.
    ///
    /// Single pass over `text`: spliced file contents are never rescanned.
    pub fn expand(&self, text: &str) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for token in token_pattern().find_iter(text) {
            out.push_str(&text[last..token.start()]);
            let value = match token.as_str() {
                TASK_DESCRIPTION_TOKEN => self.task_description()?,
                _ => self.hints()?,
            };
            out.push_str(value);
            last = token.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{(?:TASK_DESCRIPTION|HINTS)\}").expect("valid context token pattern")
    })
}

fn read_once<'a>(
    cell: &'a OnceLock<String>,
    path: Option<&PathBuf>,
    var: &'static str,
) -> Result<&'a str, TemplateError> {
    if let Some(text) = cell.get() {
        return Ok(text.as_str());
    }

    let path = path.ok_or(TemplateError::MissingEnv { var })?;
    let text = std::fs::read_to_string(path).map_err(|source| TemplateError::MissingContextFile {
        path: path.clone(),
        source,
    })?;

    Ok(cell.get_or_init(|| text).as_str())
}
