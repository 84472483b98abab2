//! Free-text license spellings that map to a canonical identifier.
//!
//! Most entries are Python trove classifier names or the short forms that
//! package authors put in the `License` metadata field.

/// (spelling, identifier) pairs, matched case-insensitively.
pub const SYNONYMS: &[(&str, &str)] = &[
    ("Apache Software License", "Apache-2.0"),
    ("Apache License, Version 2.0", "Apache-2.0"),
    ("Apache License Version 2.0", "Apache-2.0"),
    ("Apache License 2.0", "Apache-2.0"),
    ("Apache 2.0", "Apache-2.0"),
    ("Apache 2", "Apache-2.0"),
    ("Apache-2", "Apache-2.0"),
    ("Apache2", "Apache-2.0"),
    ("ASL 2.0", "Apache-2.0"),
    ("MIT License", "MIT"),
    ("The MIT License", "MIT"),
    ("MIT license", "MIT"),
    ("Expat", "MIT"),
    ("BSD License", "BSD-3-Clause"),
    ("BSD", "BSD-3-Clause"),
    ("New BSD", "BSD-3-Clause"),
    ("New BSD License", "BSD-3-Clause"),
    ("Modified BSD License", "BSD-3-Clause"),
    ("3-Clause BSD License", "BSD-3-Clause"),
    ("BSD 3-Clause", "BSD-3-Clause"),
    ("Simplified BSD", "BSD-2-Clause"),
    ("BSD 2-Clause", "BSD-2-Clause"),
    ("GNU General Public License v2 (GPLv2)", "GPL-2.0-only"),
    ("GNU General Public License v2 or later (GPLv2+)", "GPL-2.0-or-later"),
    ("GNU General Public License v3 (GPLv3)", "GPL-3.0-only"),
    ("GNU General Public License v3 or later (GPLv3+)", "GPL-3.0-or-later"),
    ("GPLv2", "GPL-2.0-only"),
    ("GPLv2+", "GPL-2.0-or-later"),
    ("GPLv3", "GPL-3.0-only"),
    ("GPLv3+", "GPL-3.0-or-later"),
    ("GNU Lesser General Public License v2 (LGPLv2)", "LGPL-2.0-only"),
    ("GNU Lesser General Public License v2 or later (LGPLv2+)", "LGPL-2.0-or-later"),
    ("GNU Lesser General Public License v3 (LGPLv3)", "LGPL-3.0-only"),
    ("GNU Lesser General Public License v3 or later (LGPLv3+)", "LGPL-3.0-or-later"),
    ("LGPLv2.1", "LGPL-2.1-only"),
    ("LGPLv3", "LGPL-3.0-only"),
    ("GNU Affero General Public License v3", "AGPL-3.0-only"),
    ("GNU Affero General Public License v3 or later (AGPLv3+)", "AGPL-3.0-or-later"),
    ("Mozilla Public License 2.0 (MPL 2.0)", "MPL-2.0"),
    ("MPL 2.0", "MPL-2.0"),
    ("Mozilla Public License 1.1 (MPL 1.1)", "MPL-1.1"),
    ("ISC License (ISCL)", "ISC"),
    ("ISCL", "ISC"),
    ("Python Software Foundation License", "PSF-2.0"),
    ("PSF", "PSF-2.0"),
    ("Zope Public License", "ZPL-2.1"),
    ("Eclipse Public License 2.0 (EPL-2.0)", "EPL-2.0"),
    ("Boost Software License 1.0 (BSL-1.0)", "BSL-1.0"),
    ("The Unlicense (Unlicense)", "Unlicense"),
    ("Public Domain", "Unlicense"),
    ("CC0 1.0 Universal (CC0 1.0) Public Domain Dedication", "CC0-1.0"),
];

/// Identifier for a known spelling, ignoring case and surrounding whitespace.
#[must_use]
pub fn lookup(spelling: &str) -> Option<&'static str> {
    let spelling = spelling.trim();
    SYNONYMS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(spelling))
        .map(|(_, id)| *id)
}
