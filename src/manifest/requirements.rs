//! requirements.txt style files.

use super::ParsedManifest;

/// Parse a requirement-per-line file.
///
/// Backslash continuations are joined; comments, blank lines and pip
/// options (`-r`, `-e`, `--index-url`, ...) are skipped.
#[must_use]
pub fn parse(content: &str) -> ParsedManifest {
    let mut declarations = Vec::new();
    let mut pending = String::new();

    for line in content.lines() {
        let line = line.trim_end();
        if let Some(continued) = line.strip_suffix('\\') {
            pending.push_str(continued);
            pending.push(' ');
            continue;
        }
        pending.push_str(line);
        let logical = std::mem::take(&mut pending);
        push_declaration(&mut declarations, &logical);
    }
    if !pending.is_empty() {
        push_declaration(&mut declarations, &pending);
    }

    ParsedManifest {
        project_name: None,
        declarations,
    }
}

fn push_declaration(declarations: &mut Vec<String>, logical: &str) {
    let without_comment = if logical.trim_start().starts_with('#') {
        ""
    } else {
        logical.split_once(" #").map_or(logical, |(before, _)| before)
    };
    let entry = without_comment.trim();
    if entry.is_empty() || entry.starts_with('-') {
        return;
    }
    declarations.push(entry.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_requirements() {
        let parsed = parse(
            "# top comment\n\
             requests==2.31.0\n\
             -r other.txt\n\
             --index-url https://example.org/simple\n\
             \n\
             flask>=2.0  # web\n\
             numpy \\\n    ==1.26.0\n\
             importlib-metadata; python_version < \"3.8\"\n",
        );
        assert_eq!(parsed.declarations.len(), 4);
        assert_eq!(parsed.declarations[0], "requests==2.31.0");
        assert_eq!(parsed.declarations[1], "flask>=2.0");
        assert_eq!(
            parsed.declarations[2].split_whitespace().collect::<String>(),
            "numpy==1.26.0"
        );
        assert!(parsed.declarations[3].starts_with("importlib-metadata;"));
        assert_eq!(parsed.project_name, None);
    }
}
