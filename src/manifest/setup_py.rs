//! setup.py scripts.
//!
//! The script is never executed; the `install_requires = [ ... ]` literal
//! is located in the source text and its string items are extracted.

use super::ParsedManifest;
use regex::Regex;
use std::sync::LazyLock;

static INSTALL_REQUIRES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"install_requires\s*=\s*\[").expect("static regex"));

/// Tokens inside the list literal: a quoted item, a comment, or the closing bracket.
static LIST_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"\n]*)"|'([^'\n]*)'|#[^\n]*|\]"#).expect("static regex")
});

static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bname\s*=\s*["']([^"'\n]+)["']"#).expect("static regex")
});

/// Extract the dependency list and package name.
#[must_use]
pub fn parse(content: &str) -> ParsedManifest {
    let declarations = INSTALL_REQUIRES
        .find(content)
        .and_then(|open| list_items(&content[open.end()..]))
        .unwrap_or_default();

    let project_name = NAME
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    ParsedManifest {
        project_name,
        declarations,
    }
}

/// String items up to the first `]` outside quotes, or `None` when the
/// literal is never closed.
fn list_items(body: &str) -> Option<Vec<String>> {
    let mut items = Vec::new();
    for caps in LIST_TOKEN.captures_iter(body) {
        if let Some(item) = caps.get(1).or_else(|| caps.get(2)) {
            let item = item.as_str().trim();
            if !item.is_empty() {
                items.push(item.to_string());
            }
        } else if &caps[0] == "]" {
            return Some(items);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_requires_literal() {
        let parsed = parse(
            r#"
from setuptools import setup

setup(
    name="py-app",
    version="0.1",
    install_requires=[
        "requests>=2.0",  # http
        'six==1.16.0',
    ],
)
"#,
        );
        assert_eq!(parsed.project_name.as_deref(), Some("py-app"));
        assert_eq!(parsed.declarations, vec!["requests>=2.0", "six==1.16.0"]);
    }

    #[test]
    fn test_extras_brackets_inside_items() {
        let parsed = parse(
            r#"
setup(
    name="demo",
    install_requires=[
        "requests[socks]>=2.0",
        'uvicorn[standard]',  # server [fast]
        "click",
    ],
    extras_require={"dev": ["pytest"]},
)
"#,
        );
        assert_eq!(
            parsed.declarations,
            vec!["requests[socks]>=2.0", "uvicorn[standard]", "click"]
        );
    }

    #[test]
    fn test_unclosed_literal() {
        let parsed = parse("setup(install_requires=[\"flask\",\n");
        assert!(parsed.declarations.is_empty());
    }

    #[test]
    fn test_no_literal() {
        let parsed = parse("from setuptools import setup\nsetup(install_requires=REQS)\n");
        assert!(parsed.declarations.is_empty());
    }
}
