#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_builder::provider::DependencySpec;

/// Fuzz dependency declaration preprocessing.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        for line in s.lines() {
            if let Some(spec) = DependencySpec::parse(line) {
                assert!(!spec.name.is_empty());
            }
        }
    }
});
