//! Integration tests for manifest loading and declaration preprocessing.

use sbom_builder::manifest::{Manifest, ManifestKind};
use sbom_builder::provider::DependencySpec;
use sbom_builder::SbomError;
use tempfile::TempDir;

fn load(dir: &TempDir, file_name: &str, content: &str) -> Manifest {
    let path = dir.path().join(file_name);
    std::fs::write(&path, content).unwrap();
    Manifest::load(&path).expect("manifest should load")
}

fn names_and_pins(manifest: &Manifest) -> Vec<(String, Option<String>)> {
    manifest
        .dependencies()
        .into_iter()
        .map(|DependencySpec { name, version, .. }| (name, version))
        .collect()
}

fn pin(name: &str, version: Option<&str>) -> (String, Option<String>) {
    (name.to_string(), version.map(String::from))
}

#[test]
fn requirements_txt() {
    let dir = TempDir::new().unwrap();
    let manifest = load(
        &dir,
        "requirements.txt",
        "\
# production deps
--index-url https://pypi.example/simple
-r base.txt
Django==4.2.1
requests[socks]>=2.0 ; python_version >= \"3.8\"
zope.interface \\
    ==6.0
numpy  # pinned elsewhere
",
    );

    assert_eq!(manifest.kind, ManifestKind::Requirements);
    assert_eq!(
        names_and_pins(&manifest),
        vec![
            pin("Django", Some("4.2.1")),
            pin("requests", None),
            pin("zope.interface", Some("6.0")),
            pin("numpy", None),
        ]
    );
}

#[test]
fn pyproject_toml_names_the_root() {
    let dir = TempDir::new().unwrap();
    let manifest = load(
        &dir,
        "pyproject.toml",
        r#"
[project]
name = "webapp"
dependencies = ["flask==3.0.0", "click>=8; platform_system != 'Windows'"]
"#,
    );

    assert_eq!(manifest.kind, ManifestKind::Pyproject);
    assert_eq!(manifest.root_name(), "webapp");
    assert_eq!(
        names_and_pins(&manifest),
        vec![pin("flask", Some("3.0.0")), pin("click", None)]
    );
}

#[test]
fn setup_cfg_install_requires() {
    let dir = TempDir::new().unwrap();
    let manifest = load(
        &dir,
        "setup.cfg",
        "\
[metadata]
name = tool

[options]
install_requires =
    attrs>=22
    six==1.16.0
python_requires = >=3.8
",
    );

    assert_eq!(
        names_and_pins(&manifest),
        vec![pin("attrs", None), pin("six", Some("1.16.0"))]
    );
}

#[test]
fn setup_py_literal_is_read_not_executed() {
    let dir = TempDir::new().unwrap();
    let manifest = load(
        &dir,
        "setup.py",
        r#"
import os
os.system("echo should never run")
from setuptools import setup

setup(
    name="legacy",
    install_requires=[
        "pyyaml==6.0.1",  # config
        'jinja2',
    ],
)
"#,
    );

    assert_eq!(manifest.root_name(), "legacy");
    assert_eq!(
        names_and_pins(&manifest),
        vec![pin("pyyaml", Some("6.0.1")), pin("jinja2", None)]
    );
}

#[test]
fn setup_py_items_with_extras_keep_the_whole_list() {
    let dir = TempDir::new().unwrap();
    let manifest = load(
        &dir,
        "setup.py",
        r#"
setup(
    name="demo",
    install_requires=[
        "requests[socks]>=2.0",
        "click",
        "celery[redis,msgpack]==5.3.4",
    ],
)
"#,
    );

    assert_eq!(
        names_and_pins(&manifest),
        vec![
            pin("requests", None),
            pin("click", None),
            pin("celery", Some("5.3.4")),
        ]
    );
}

#[test]
fn root_name_falls_back_to_directory() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("my-service");
    std::fs::create_dir(&project).unwrap();
    let path = project.join("requirements.txt");
    std::fs::write(&path, "flask\n").unwrap();

    let manifest = Manifest::load(&path).unwrap();
    assert_eq!(manifest.root_name(), "my-service");
}

#[test]
fn malformed_content_yields_no_dependencies() {
    let dir = TempDir::new().unwrap();
    let manifest = load(&dir, "pyproject.toml", "[project\nname = ");
    assert!(manifest.dependencies().is_empty());

    let manifest = load(&dir, "setup.py", "from setuptools import setup\nsetup()\n");
    assert!(manifest.dependencies().is_empty());
}

#[test]
fn unsupported_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Pipfile.lock");
    std::fs::write(&path, "{}").unwrap();
    assert!(matches!(Manifest::load(&path), Err(SbomError::Manifest { .. })));
}

#[test]
fn unreadable_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("requirements.txt");
    assert!(matches!(Manifest::load(&path), Err(SbomError::Io { .. })));
}
