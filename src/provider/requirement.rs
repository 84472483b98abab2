//! Dependency declaration preprocessing.
//!
//! Turns `requests[socks]>=2.0; python_version >= "3.8"` into the bare name
//! `requests`, and `Django==4.2.1` into (`Django`, `4.2.1`).

use serde::{Deserialize, Serialize};

/// A parsed dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Declared name, not yet normalized
    pub name: String,
    /// Version pinned with `==` or `===`
    pub version: Option<String>,
    /// Extras listed in brackets
    pub extras: Vec<String>,
}

impl DependencySpec {
    /// Parse one declaration.
    ///
    /// Returns `None` for blank lines, comments and anything without a
    /// recognisable name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let line = raw.split_once(" #").map_or(raw, |(before, _)| before).trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        // Environment markers
        let line = line.split_once(';').map_or(line, |(before, _)| before).trim();

        let (line, extras) = strip_extras(line);

        let (name_part, version) = match line.split_once("==") {
            Some((name, rest)) => (name, pinned_version(rest)),
            None => (line.as_str(), None),
        };

        let name: String = name_part
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            .collect();
        let name = name.trim_end_matches('.').to_string();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name,
            version,
            extras,
        })
    }
}

/// Remove a `[a,b]` extras block, returning the rest and the extras.
fn strip_extras(line: &str) -> (String, Vec<String>) {
    let Some(open) = line.find('[') else {
        return (line.to_string(), Vec::new());
    };
    let Some(close) = line[open..].find(']').map(|i| open + i) else {
        return (line[..open].to_string(), Vec::new());
    };
    let extras = line[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(String::from)
        .collect();
    (format!("{}{}", &line[..open], &line[close + 1..]), extras)
}

/// The version after an exact-pin operator; wildcards are not pins.
fn pinned_version(rest: &str) -> Option<String> {
    let version: String = rest
        .trim_start_matches('=')
        .trim()
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if version.is_empty() || version.contains('*') {
        None
    } else {
        Some(version)
    }
}
