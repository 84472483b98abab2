//! pyproject.toml build descriptors.

use super::ParsedManifest;
use toml::{Table, Value};

/// Parse `project.dependencies` and `project.name`.
///
/// A Poetry-style `[tool.poetry.dependencies]` table is used when there is
/// no `project.dependencies` array; its `python` entry is not a package.
/// Returns `None` when the document is not valid TOML.
#[must_use]
pub fn parse(content: &str) -> Option<ParsedManifest> {
    let document: Table = match content.parse() {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("pyproject.toml is not valid TOML: {}", e);
            return None;
        }
    };

    let project = document.get("project");
    let project_name = project
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .or_else(|| poetry(&document).and_then(|p| p.get("name")).and_then(Value::as_str))
        .map(String::from);

    let declarations = match project.and_then(|p| p.get("dependencies")) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        Some(_) => {
            tracing::warn!("project.dependencies is not an array");
            Vec::new()
        }
        None => poetry_dependencies(&document),
    };

    Some(ParsedManifest {
        project_name,
        declarations,
    })
}

fn poetry(document: &Table) -> Option<&Value> {
    document.get("tool").and_then(|t| t.get("poetry"))
}

fn poetry_dependencies(document: &Table) -> Vec<String> {
    let Some(table) = poetry(document)
        .and_then(|p| p.get("dependencies"))
        .and_then(Value::as_table)
    else {
        return Vec::new();
    };
    table
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("python"))
        .map(|(name, constraint)| match constraint.as_str() {
            Some(version) if is_exact(version) => format!("{name}=={}", version.trim_start_matches('=')),
            _ => name.clone(),
        })
        .collect()
}

fn is_exact(version: &str) -> bool {
    let version = version.trim_start_matches('=');
    !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '+')
}
