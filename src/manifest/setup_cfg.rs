//! setup.cfg files.

use super::ParsedManifest;

/// Parse `[options] install_requires` and `[metadata] name`.
///
/// `install_requires` is a multi-line INI value: entries may follow the
/// `=` on the same line and continue on indented lines.
#[must_use]
pub fn parse(content: &str) -> ParsedManifest {
    let mut section = String::new();
    let mut project_name = None;
    let mut declarations = Vec::new();
    let mut in_requires = false;

    for raw in content.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let continuation = raw.starts_with(char::is_whitespace);
        if in_requires && continuation {
            declarations.push(trimmed.to_string());
            continue;
        }
        in_requires = false;

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            section = trimmed[1..trimmed.len() - 1].trim().to_lowercase();
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();
        match (section.as_str(), key.as_str()) {
            ("options", "install_requires") => {
                in_requires = true;
                if !value.is_empty() {
                    declarations.push(value.to_string());
                }
            }
            ("metadata", "name") if !value.is_empty() => project_name = Some(value.to_string()),
            _ => {}
        }
    }

    ParsedManifest {
        project_name,
        declarations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_requires() {
        let parsed = parse(
            "[metadata]\n\
             name = cfg-app\n\
             \n\
             [options]\n\
             packages = find:\n\
             install_requires =\n    requests>=2.0\n    attrs==23.1.0\n\
             python_requires = >=3.8\n\
             \n\
             [options.extras_require]\n\
             test =\n    pytest\n",
        );
        assert_eq!(parsed.project_name.as_deref(), Some("cfg-app"));
        assert_eq!(parsed.declarations, vec!["requests>=2.0", "attrs==23.1.0"]);
    }

    #[test]
    fn test_missing_section_is_empty() {
        let parsed = parse("[metadata]\nname = nothing\n");
        assert!(parsed.declarations.is_empty());
    }
}
