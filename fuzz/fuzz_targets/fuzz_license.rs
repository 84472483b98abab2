#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_builder::license::{LicenseResolver, LicenseTable};
use sbom_builder::supplier;

/// Fuzz license resolution (including expressions) and supplier formatting.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let resolution = LicenseResolver::new(LicenseTable::builtin()).resolve(s);
        let _ = resolution.comment(s);
        let formatted = supplier::format(s, true);
        let _ = supplier::classify(&formatted);
    }
});
