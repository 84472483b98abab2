//! License resolution.
//!
//! Package metadata declares licenses as free text ("Apache Software
//! License", "MIT", "BSD", a whole license body...). The [`LicenseResolver`]
//! maps such strings onto the canonical identifiers of a [`LicenseTable`]:
//!
//! 1. identifier match, ignoring case
//! 2. display-name match, ignoring case
//! 3. a static synonym table of common spellings
//! 4. compound SPDX expressions whose terms are all known
//! 5. optionally, similarity matching above a threshold
//!
//! Anything else resolves to `UNKNOWN`, which documents render as
//! `NOASSERTION` together with a comment naming the declared string.

mod resolver;
mod synonyms;
mod table;

pub use resolver::{LicenseResolution, LicenseResolver, DEFAULT_FUZZY_THRESHOLD, UNKNOWN_LICENSE};
pub use synonyms::{lookup as lookup_synonym, SYNONYMS};
pub use table::{LicenseEntry, LicenseTable};
