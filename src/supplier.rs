//! Supplier attribution formatting.
//!
//! Package metadata carries the author as free text spread over the
//! `Author` and `Author-email` fields, e.g. `Jane Doe`,
//! `"Jane Doe" <jane@example.org>` or `The Foo Team, foo-dev@example.org`.
//! This module reduces that text to `Name (email)` and classifies the
//! result as a person or an organization.

use crate::model::{Supplier, SupplierKind};
use regex::Regex;
use std::sync::LazyLock;

static NAME_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][\w.'-]*(?:[ \t]+[A-Z][\w.'-]*)+").expect("static regex")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+")
        .expect("static regex")
});

/// Token count above which a supplier is treated as an organization
const ORGANIZATION_TOKENS: usize = 3;

/// Format a raw attribution string as `Name (email)`.
///
/// Names are runs of two or more capitalised words; when there are none,
/// the raw text minus any email addresses is used. Only the last email
/// address is kept.
#[must_use]
pub fn format(raw: &str, include_email: bool) -> String {
    let (name, email) = split(raw);
    let mut out = name;
    if include_email {
        if let Some(email) = email {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push('(');
            out.push_str(&email);
            out.push(')');
        }
    }
    out
}

/// Classify a formatted supplier by whitespace token count.
#[must_use]
pub fn classify(formatted: &str) -> SupplierKind {
    match formatted.split_whitespace().count() {
        0 => SupplierKind::Unknown,
        n if n > ORGANIZATION_TOKENS => SupplierKind::Organization,
        _ => SupplierKind::Person,
    }
}

/// Extract the name part and the last email address.
fn split(raw: &str) -> (String, Option<String>) {
    let email = EMAIL.find_iter(raw).last().map(|m| m.as_str().to_string());

    let names: Vec<&str> = NAME_RUN.find_iter(raw).map(|m| m.as_str()).collect();
    let name = if names.is_empty() {
        let without_email = EMAIL.replace_all(raw, " ");
        without_email
            .chars()
            .filter(|c| !matches!(c, '<' | '>' | '"' | '(' | ')'))
            .collect::<String>()
            .trim_matches(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .to_string()
    } else {
        names.join(" ")
    };

    (collapse_whitespace(&name), email)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Supplier {
    /// Build a supplier from the `Author` and `Author-email` metadata fields.
    ///
    /// Classification counts the email as a token whether or not it is
    /// included, so the kind does not change with `include_email`.
    #[must_use]
    pub fn from_metadata(author: &str, author_email: &str, include_email: bool) -> Self {
        let raw = format!("{} {}", author.trim(), author_email.trim());
        let (name, email) = split(&raw);
        let kind = classify(&format(&raw, true));
        if kind == SupplierKind::Unknown {
            return Self::unknown();
        }
        Self {
            kind,
            name,
            email: if include_email { email } else { None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_name_and_email() {
        assert_eq!(
            format("Jane Doe <jane@example.org>", true),
            "Jane Doe (jane@example.org)"
        );
        assert_eq!(format("Jane Doe <jane@example.org>", false), "Jane Doe");
    }

    #[test]
    fn test_last_email_wins() {
        assert_eq!(
            format("Jane Doe <jane@example.org>, John Roe <john@example.org>", true),
            "Jane Doe John Roe (john@example.org)"
        );
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(format("  Jane    Doe  ", true), "Jane Doe");
    }

    #[test]
    fn test_single_word_vendor_kept() {
        assert_eq!(format("psf", true), "psf");
        assert_eq!(format("<team@example.org>", true), "(team@example.org)");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(""), SupplierKind::Unknown);
        assert_eq!(classify("Jane Doe (jane@example.org)"), SupplierKind::Person);
        assert_eq!(
            classify("Python Software Foundation (psf@python.org)"),
            SupplierKind::Organization
        );
    }

    #[test]
    fn test_from_metadata() {
        let supplier = Supplier::from_metadata("Kenneth Reitz", "me@kennethreitz.org", true);
        assert_eq!(supplier.kind, SupplierKind::Person);
        assert_eq!(supplier.name, "Kenneth Reitz");
        assert_eq!(supplier.email.as_deref(), Some("me@kennethreitz.org"));

        let supplier = Supplier::from_metadata(
            "Python Software Foundation",
            "psf@python.org",
            false,
        );
        assert_eq!(supplier.kind, SupplierKind::Organization);
        assert_eq!(supplier.email, None);

        assert!(Supplier::from_metadata("", "", true).is_unknown());
    }
}
