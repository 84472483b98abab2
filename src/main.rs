//! sbom-builder: dependency-graph SBOM generator for Python environments
//!
//! Walks installed package metadata and writes SPDX or `CycloneDX` documents.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sbom_builder::{
    config::{self, AppConfig, DEFAULT_FUZZY_THRESHOLD},
    document::{Encoding, RandomIds, SbomType},
    pipeline::{exit_code_for, run_generate, GenerateRequest, InputSource},
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nOutput Formats:",
        "\n  SPDX:      2.3 (tag-value, JSON, YAML)",
        "\n  CycloneDX: 1.4 (JSON, XML)",
        "\n\nInputs:",
        "\n  installed module, requirements.txt, pyproject.toml, setup.cfg, setup.py, whole environment"
    )
}

#[derive(Parser)]
#[command(name = "sbom-builder")]
#[command(author = "Binarly.io")]
#[command(version, long_version = build_long_version())]
#[command(about = "Dependency-graph SBOM generator for Python environments", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  SBOM generated
    2  Nothing to process (no input given, or the root package was not found)
    3  Error occurred

EXAMPLES:
    # SPDX tag-value for an installed module
    sbom-builder generate -m requests

    # CycloneDX JSON for a requirements file, with a dependency graph
    sbom-builder generate -r requirements.txt --sbom cyclonedx --format json -g deps.dot

    # Whole environment from a frozen metadata snapshot
    sbom-builder generate --system --metadata env.json -o env.spdx.json --format json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `generate` subcommand
#[derive(Parser)]
struct GenerateArgs {
    /// Installed module to describe
    #[arg(short, long, conflicts_with_all = ["requirement", "system"])]
    module: Option<String>,

    /// Requirements file or project manifest to describe
    #[arg(short, long, conflicts_with = "system")]
    requirement: Option<PathBuf>,

    /// Describe every package installed in the environment
    #[arg(long)]
    system: bool,

    /// Read package metadata from a JSON snapshot instead of pip
    #[arg(long, value_name = "JSON")]
    metadata: Option<PathBuf>,

    /// Report every license as NOASSERTION
    #[arg(long)]
    exclude_license: bool,

    /// Record installed files with CONTAINS relationships
    #[arg(long)]
    include_file: bool,

    /// Emit CPE identifiers
    #[arg(long)]
    include_cpe: bool,

    /// Omit package URLs
    #[arg(long)]
    no_purl: bool,

    /// Resolve unrecognised licenses by name similarity
    #[arg(long)]
    fuzzy_license: bool,

    /// Similarity threshold in percent for --fuzzy-license
    #[arg(long, value_name = "N", requires = "fuzzy_license")]
    license_threshold: Option<f64>,

    /// SPDX license list JSON to use instead of the built-in copy
    #[arg(long, value_name = "JSON")]
    license_list: Option<PathBuf>,

    /// Document schema
    #[arg(long, value_enum)]
    sbom: Option<SbomType>,

    /// Document encoding (unsupported combinations are corrected)
    #[arg(long, value_enum)]
    format: Option<Encoding>,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// Write the dependency graph as Graphviz DOT
    #[arg(short, long, value_name = "DOT")]
    graph: Option<PathBuf>,

    /// Metadata prefetch workers (0 or 1 runs sequentially)
    #[arg(long)]
    jobs: Option<usize>,

    /// Python interpreter used to run pip
    #[arg(long)]
    python: Option<String>,
}

impl GenerateArgs {
    fn request(&self) -> GenerateRequest {
        let input = if let Some(module) = &self.module {
            Some(InputSource::Module(module.clone()))
        } else if let Some(path) = &self.requirement {
            Some(InputSource::Requirement(path.clone()))
        } else if self.system {
            Some(InputSource::System)
        } else {
            None
        };
        GenerateRequest {
            input,
            metadata: self.metadata.clone(),
        }
    }

    /// Flags as a config layer; untouched flags keep their defaults so
    /// they never override file values.
    fn overrides(&self) -> AppConfig {
        let mut builder = AppConfig::builder()
            .output_file(self.output_file.clone())
            .graph_file(self.graph.clone())
            .license_table(self.license_list.clone())
            .include_license(!self.exclude_license)
            .include_purl(!self.no_purl)
            .include_cpe(self.include_cpe)
            .include_files(self.include_file);
        if let Some(sbom) = self.sbom {
            builder = builder.sbom_type(sbom);
        }
        if let Some(encoding) = self.format {
            builder = builder.encoding(encoding);
        }
        if self.fuzzy_license {
            builder =
                builder.fuzzy_license(self.license_threshold.unwrap_or(DEFAULT_FUZZY_THRESHOLD));
        }
        if let Some(jobs) = self.jobs {
            builder = builder.jobs(jobs);
        }
        if let Some(python) = &self.python {
            builder = builder.python(python.clone());
        }
        builder.build()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an SBOM
    Generate(GenerateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .sbom-builder.yaml in the current directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match cli.command {
        Commands::Generate(args) => {
            let (config, loaded_from) =
                AppConfig::from_file_with_overrides(cli.config.as_deref(), &args.overrides());
            if let Some(path) = &loaded_from {
                tracing::debug!("Loaded config from {}", path.display());
            }

            match run_generate(&config, &args.request(), &RandomIds) {
                Ok(_) => Ok(()),
                Err(err) => {
                    let code = exit_code_for(&err);
                    eprintln!("Error: {:#}", anyhow::Error::new(err));
                    std::process::exit(code);
                }
            }
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sbom-builder", &mut io::stdout());
            Ok(())
        }

        Commands::ConfigSchema { output } => {
            let schema = config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) = config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    config::user_config_dir().map(|p| p.display().to_string()),
                    dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in config::CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".sbom-builder.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                std::fs::write(&target, config::generate_example_config())
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
        },
    }
}
