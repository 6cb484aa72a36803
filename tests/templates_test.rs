// tests/templates_test.rs — Integration test: template resolution (built-in, external, fallback)

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use shinka_llm::prompts::{LoadErrorPolicy, TemplateSource, BUILTIN_NAMES};
use shinka_llm::{resolve_templates, ResolverSettings, TemplateError};

/// Task description and hints files, as a task directory would ship them.
fn context_files() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("task.md"),
        "Design a potential for the k-server problem.",
    )
    .unwrap();
    fs::write(dir.path().join("hints.md"), "Prefer work-function style updates.").unwrap();
    dir
}

fn settings(ctx: &Path, prompt_root: Option<&Path>) -> ResolverSettings {
    ResolverSettings {
        prompt_root: prompt_root.map(Path::to_path_buf),
        task_description_path: Some(ctx.join("task.md")),
        hints_path: Some(ctx.join("hints.md")),
        ..Default::default()
    }
}

fn write_complete_package(dir: &Path) {
    let mut entry = String::from("[templates]\n");
    for name in BUILTIN_NAMES {
        if *name != "META_STEP1_SYSTEM_MSG" {
            entry.push_str(&format!("{name} = 'custom {name}'\n"));
        }
    }
    entry.push_str("\n[imports]\nprompts_meta = ['META_STEP1_SYSTEM_MSG']\n");
    fs::write(dir.join("templates.toml"), entry).unwrap();
    fs::write(
        dir.join("prompts_meta.toml"),
        "[templates]\nMETA_STEP1_SYSTEM_MSG = '''${TASK_DESCRIPTION}\n\nSummarize {program_count} programs.'''\n",
    )
    .unwrap();
}

#[test]
fn test_builtin_set_when_no_root() {
    let ctx = context_files();
    let provider = resolve_templates(&settings(ctx.path(), None)).unwrap();

    assert_eq!(provider.source(), &TemplateSource::Builtin);
    let published: BTreeSet<&str> = provider.names().into_iter().collect();
    let expected: BTreeSet<&str> = BUILTIN_NAMES.iter().copied().collect();
    assert_eq!(published, expected);

    let step3 = provider.text("META_STEP3_SYSTEM_MSG").unwrap();
    assert!(step3.starts_with(
        "Design a potential for the k-server problem.\n\nPrefer work-function style updates.\n\n"
    ));
}

#[test]
fn test_builtin_templates_render() {
    let ctx = context_files();
    let provider = resolve_templates(&settings(ctx.path(), None)).unwrap();

    let template = provider.get("construct_individual_program_msg").unwrap();
    let vars: HashMap<String, String> = template
        .placeholders()
        .into_iter()
        .map(|name| (name.to_string(), format!("<{name}>")))
        .collect();
    let rendered = template.render(&vars).unwrap();
    assert!(rendered.contains("<code_content>"));
    assert!(!rendered.contains("{code_content}"));
}

#[test]
fn test_complete_external_package_replaces_builtin() {
    let ctx = context_files();
    let root = tempfile::tempdir().unwrap();
    write_complete_package(root.path());

    let provider = resolve_templates(&settings(ctx.path(), Some(root.path()))).unwrap();

    match provider.source() {
        TemplateSource::External { alias, .. } => assert_eq!(alias, "_env_prompts"),
        other => panic!("expected external package, got {other}"),
    }
    assert_eq!(provider.text("DIFF_SYS_FORMAT"), Some("custom DIFF_SYS_FORMAT"));
    assert_eq!(
        provider.text("META_STEP1_SYSTEM_MSG"),
        Some("Design a potential for the k-server problem.\n\nSummarize {program_count} programs.")
    );
    assert_eq!(provider.namespace().module_names(), vec!["prompts_meta"]);
}

#[test]
fn test_root_without_entry_falls_back_to_builtin() {
    let ctx = context_files();
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("README.md"), "not a package").unwrap();

    let provider = resolve_templates(&settings(ctx.path(), Some(root.path()))).unwrap();

    assert_eq!(provider.source(), &TemplateSource::Builtin);
    assert_eq!(provider.names().len(), BUILTIN_NAMES.len());
}

#[test]
fn test_partial_package_falls_back_whole() {
    let ctx = context_files();
    let root = tempfile::tempdir().unwrap();
    fs::write(
        root.path().join("templates.toml"),
        "[templates]\nDIFF_SYS_FORMAT = 'only this'\n",
    )
    .unwrap();

    let provider = resolve_templates(&settings(ctx.path(), Some(root.path()))).unwrap();

    assert_eq!(provider.source(), &TemplateSource::Builtin);
    assert_ne!(provider.text("DIFF_SYS_FORMAT"), Some("only this"));
}

#[test]
fn test_fail_policy_surfaces_load_error() {
    let ctx = context_files();
    let root = tempfile::tempdir().unwrap();

    let err = resolve_templates(
        &settings(ctx.path(), Some(root.path())).with_policy(LoadErrorPolicy::Fail),
    )
    .unwrap_err();

    assert!(matches!(err, TemplateError::MissingEntry { .. }), "got {err}");
}

#[test]
fn test_missing_task_description_file() {
    let ctx = tempfile::tempdir().unwrap();
    let err = resolve_templates(&settings(ctx.path(), None)).unwrap_err();
    assert!(matches!(err, TemplateError::MissingContextFile { .. }), "got {err}");
}
