//! Free-text license string to canonical identifier.

use super::{synonyms, LicenseEntry, LicenseTable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifier returned when nothing matched
pub const UNKNOWN_LICENSE: &str = "UNKNOWN";

/// Default acceptance threshold for similarity matching, in percent
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 95.0;

/// Result of resolving one license string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseResolution {
    /// Canonical identifier or expression, or `UNKNOWN`
    pub identifier: String,
    /// Whether `identifier` is a valid SPDX identifier or expression
    pub is_valid_spdx: bool,
    /// Whether the resolved identifier is marked deprecated
    pub is_deprecated: bool,
    /// Reference URL of the resolved license
    pub reference: Option<String>,
}

impl LicenseResolution {
    /// The unresolved result
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            identifier: UNKNOWN_LICENSE.to_string(),
            is_valid_spdx: false,
            is_deprecated: false,
            reference: None,
        }
    }

    fn from_entry(entry: &LicenseEntry) -> Self {
        Self {
            identifier: entry.license_id.clone(),
            is_valid_spdx: true,
            is_deprecated: entry.is_deprecated,
            reference: entry.reference.clone(),
        }
    }

    /// Whether a canonical identifier was found
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.is_valid_spdx
    }

    /// Explanation to attach to a package for the declared string `raw`.
    ///
    /// `None` when `raw` resolved to a current identifier.
    #[must_use]
    pub fn comment(&self, raw: &str) -> Option<String> {
        if !self.is_valid_spdx {
            Some(format!(
                "Declared license '{}' could not be resolved to an SPDX identifier",
                raw.trim()
            ))
        } else if self.is_deprecated {
            Some(format!(
                "Declared license '{}' resolved to deprecated SPDX identifier {}",
                raw.trim(),
                self.identifier
            ))
        } else {
            None
        }
    }
}

/// Resolves declared license strings against a [`LicenseTable`].
///
/// The lookup order is identifier, display name, synonym, compound SPDX
/// expression, then (only when enabled) similarity matching.
#[derive(Debug, Clone)]
pub struct LicenseResolver {
    table: Arc<LicenseTable>,
    fuzzy_threshold: Option<f64>,
}

impl LicenseResolver {
    /// Exact-matching resolver over a table
    #[must_use]
    pub fn new(table: Arc<LicenseTable>) -> Self {
        Self {
            table,
            fuzzy_threshold: None,
        }
    }

    /// Enable similarity matching with a threshold in percent.
    #[must_use]
    pub fn with_fuzzy(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = Some(threshold.clamp(0.0, 100.0));
        self
    }

    /// The table this resolver reads
    #[must_use]
    pub fn table(&self) -> &LicenseTable {
        &self.table
    }

    /// Resolve a declared license string.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> LicenseResolution {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(UNKNOWN_LICENSE) {
            return LicenseResolution::unknown();
        }

        if let Some(entry) = self.table.get(raw) {
            return LicenseResolution::from_entry(entry);
        }
        if let Some(entry) = self.table.get_by_name(raw) {
            return LicenseResolution::from_entry(entry);
        }
        if let Some(entry) = synonyms::lookup(raw).and_then(|id| self.table.get(id)) {
            return LicenseResolution::from_entry(entry);
        }
        if let Some(resolution) = self.resolve_expression(raw) {
            return resolution;
        }
        if let Some(threshold) = self.fuzzy_threshold {
            if let Some(entry) = self.best_similar(raw, threshold) {
                tracing::debug!("License '{}' matched {} by similarity", raw, entry.license_id);
                return LicenseResolution::from_entry(entry);
            }
        }
        LicenseResolution::unknown()
    }

    /// Resolve a compound expression such as `mit or Apache-2.0`.
    ///
    /// Every license term must be in the table; operators are upper-cased
    /// and terms are rewritten to their canonical spelling before the
    /// result is validated with the `spdx` parser in lax mode, which accepts
    /// the `+` suffix on GNU identifiers.
    fn resolve_expression(&self, raw: &str) -> Option<LicenseResolution> {
        let spaced = raw.replace('(', " ( ").replace(')', " ) ");
        let tokens: Vec<&str> = spaced.split_whitespace().collect();
        let has_operator = tokens
            .iter()
            .any(|t| matches!(t.to_uppercase().as_str(), "AND" | "OR" | "WITH"));
        if !has_operator {
            return None;
        }

        let mut deprecated = false;
        let mut after_with = false;
        let mut canonical = Vec::with_capacity(tokens.len());
        for token in tokens {
            let upper = token.to_uppercase();
            match upper.as_str() {
                "AND" | "OR" | "WITH" => {
                    after_with = upper == "WITH";
                    canonical.push(upper);
                }
                "(" | ")" => canonical.push(upper),
                _ if after_with => {
                    after_with = false;
                    canonical.push(token.to_string());
                }
                _ => {
                    let (id, plus) = match token.strip_suffix('+') {
                        Some(base) if self.table.get(token).is_none() => (base, "+"),
                        _ => (token, ""),
                    };
                    let entry = self.table.get(id)?;
                    deprecated |= entry.is_deprecated;
                    canonical.push(format!("{}{plus}", entry.license_id));
                }
            }
        }

        let expression = canonical.join(" ").replace("( ", "(").replace(" )", ")");
        match spdx::Expression::parse_mode(&expression, spdx::ParseMode::LAX) {
            Ok(_) => Some(LicenseResolution {
                identifier: expression,
                is_valid_spdx: true,
                is_deprecated: deprecated,
                reference: None,
            }),
            Err(e) => {
                tracing::debug!("'{}' is not a valid license expression: {}", raw, e);
                None
            }
        }
    }

    /// Highest scoring table entry strictly above `threshold`.
    ///
    /// Entries are scanned in table order with a strict comparison, so the
    /// first-seen entry wins a tie.
    fn best_similar(&self, raw: &str, threshold: f64) -> Option<&LicenseEntry> {
        let needle = raw.to_lowercase();
        let mut best: Option<(&LicenseEntry, f64)> = None;
        for entry in self.table.entries() {
            let score = similarity(&needle, entry);
            if score > threshold && best.map_or(true, |(_, top)| score > top) {
                best = Some((entry, score));
            }
        }
        best.map(|(entry, _)| entry)
    }
}

/// Weighted similarity of a lower-cased needle to one entry, in percent.
fn similarity(needle: &str, entry: &LicenseEntry) -> f64 {
    let name = entry.name.to_lowercase();
    let id = entry.license_id.to_lowercase();
    let by_name = strsim::normalized_levenshtein(needle, &name);
    let by_id = strsim::normalized_levenshtein(needle, &id);
    let partial = partial_ratio(needle, &name);
    by_name.max(by_id).max(partial) * 100.0
}

/// Best normalized Levenshtein score of the shorter string against every
/// equally long window of the longer one.
fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_len = short.chars().count();
    if short_len == 0 {
        return 0.0;
    }
    let long_chars: Vec<char> = long.chars().collect();
    long_chars
        .windows(short_len)
        .map(|window| {
            let window: String = window.iter().collect();
            strsim::normalized_levenshtein(short, &window)
        })
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LicenseResolver {
        LicenseResolver::new(LicenseTable::builtin())
    }

    #[test]
    fn test_exact_identifier_any_case() {
        let resolver = resolver();
        for raw in ["MIT", "mit", "Mit"] {
            let resolved = resolver.resolve(raw);
            assert_eq!(resolved.identifier, "MIT");
            assert!(resolved.is_valid_spdx);
            assert!(!resolved.is_deprecated);
            assert_eq!(resolved.comment(raw), None);
        }
    }

    #[test]
    fn test_display_name_and_synonym() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("Apache License 2.0").identifier, "Apache-2.0");
        assert_eq!(resolver.resolve("Apache 2.0").identifier, "Apache-2.0");
        assert_eq!(resolver.resolve("BSD License").identifier, "BSD-3-Clause");
    }

    #[test]
    fn test_unknown_license() {
        let resolved = resolver().resolve("Not A Real License");
        assert_eq!(resolved.identifier, UNKNOWN_LICENSE);
        assert!(!resolved.is_valid_spdx);
        let comment = resolved.comment("Not A Real License").expect("comment");
        assert!(comment.contains("'Not A Real License'"));
        assert_eq!(resolver().resolve("").identifier, UNKNOWN_LICENSE);
    }

    #[test]
    fn test_deprecated_identifier() {
        let resolved = resolver().resolve("GPL-2.0");
        assert_eq!(resolved.identifier, "GPL-2.0");
        assert!(resolved.is_valid_spdx);
        assert!(resolved.is_deprecated);
        assert!(resolved
            .comment("GPL-2.0")
            .expect("deprecation comment")
            .contains("deprecated"));
    }

    #[test]
    fn test_compound_expression() {
        let resolver = resolver();
        let resolved = resolver.resolve("mit or apache-2.0");
        assert_eq!(resolved.identifier, "MIT OR Apache-2.0");
        assert!(resolved.is_valid_spdx);

        let resolved = resolver.resolve("(MIT AND BSD-3-Clause) OR GPL-3.0-only");
        assert_eq!(resolved.identifier, "(MIT AND BSD-3-Clause) OR GPL-3.0-only");

        let resolved = resolver.resolve("GPL-2.0-only WITH Classpath-exception-2.0");
        assert!(resolved.is_valid_spdx);

        assert!(!resolver.resolve("MIT OR Made-Up-1.0").is_valid_spdx);
    }

    #[test]
    fn test_compound_expression_with_or_later_suffix() {
        let resolver = resolver();
        let resolved = resolver.resolve("GPL-2.0+ OR MIT");
        assert_eq!(resolved.identifier, "GPL-2.0+ OR MIT");
        assert!(resolved.is_valid_spdx);
        assert!(resolved.is_deprecated);

        let resolved = resolver.resolve("lgpl-2.1+ or mit");
        assert_eq!(resolved.identifier, "LGPL-2.1+ OR MIT");
        assert!(resolved.is_valid_spdx);

        let resolved = resolver.resolve("Apache-2.0+ AND MIT");
        assert_eq!(resolved.identifier, "Apache-2.0+ AND MIT");
        assert!(resolved.is_valid_spdx);
        assert!(!resolved.is_deprecated);
    }

    #[test]
    fn test_every_builtin_identifier_round_trips() {
        let resolver = resolver();
        for entry in resolver.table().entries() {
            for spelling in [entry.license_id.to_lowercase(), entry.license_id.to_uppercase()] {
                let resolved = resolver.resolve(&spelling);
                assert_eq!(resolved.identifier, entry.license_id, "{spelling}");
                assert!(resolved.is_valid_spdx, "{spelling}");
            }
        }
    }

    #[test]
    fn test_fuzzy_is_opt_in() {
        let exact = resolver();
        assert!(!exact.resolve("Apache License 2").is_valid_spdx);

        let fuzzy = resolver().with_fuzzy(DEFAULT_FUZZY_THRESHOLD);
        let resolved = fuzzy.resolve("Mozilla Public Licence 2.0");
        assert_eq!(resolved.identifier, "MPL-2.0");
        assert!(!fuzzy.resolve("Something Completely Different").is_valid_spdx);
    }

    #[test]
    fn test_partial_ratio() {
        assert!((partial_ratio("mit", "mit license") - 1.0).abs() < f64::EPSILON);
        assert!(partial_ratio("abc", "xyz") < 0.5);
        assert!(partial_ratio("", "anything").abs() < f64::EPSILON);
    }
}
