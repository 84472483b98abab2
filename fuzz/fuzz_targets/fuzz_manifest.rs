#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_builder::manifest::{parse, ManifestKind};
use sbom_builder::provider::DependencySpec;

/// Fuzz every manifest parser with the same input.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        for kind in [
            ManifestKind::Requirements,
            ManifestKind::Pyproject,
            ManifestKind::SetupCfg,
            ManifestKind::SetupPy,
        ] {
            let parsed = parse(kind, s);
            for declaration in &parsed.declarations {
                let _ = DependencySpec::parse(declaration);
            }
        }
    }
});
