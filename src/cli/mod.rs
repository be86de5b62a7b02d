//! CLI subcommands: init, validate, generate, digest.

use crate::core::{assembler, defaults, digest, output, parser, types};
use crate::resources::dns;
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter services.yaml
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate services.yaml without generating
    Validate {
        /// Path to services.yaml
        #[arg(short, long, default_value = "services.yaml")]
        file: PathBuf,
    },

    /// Generate the CloudFormation template
    Generate {
        /// Path to services.yaml
        #[arg(short, long, default_value = "services.yaml")]
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the BLAKE3 fingerprint of the generated template
    Digest {
        /// Path to services.yaml
        #[arg(short, long, default_value = "services.yaml")]
        file: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Generate {
            file,
            output,
            compact,
        } => cmd_generate(&file, output.as_deref(), compact),
        Commands::Digest { file } => cmd_digest(&file),
    }
}

const STARTER_CONFIG: &str = r#"dns_domain: example.com
# default_ssl_cert_id: arn:aws:acm:ap-southeast-2:123456789012:certificate/abcd
source_bucket: my-ciinabox-bucket
ciinabox_version: "0.1.0"

services:
  - jenkins:
      service_port: 8080
      # https_enabled: true
      # subdomain_prefix: ci
"#;

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("services.yaml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }
    std::fs::create_dir_all(path)
        .map_err(|e| format!("cannot create {}: {}", path.display(), e))?;
    std::fs::write(&config_path, STARTER_CONFIG)
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;

    println!("Created: {}", config_path.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let config = parse_and_validate(file)?;
    println!(
        "OK: {} service(s) under {}",
        config.services.len(),
        config.globals.dns_domain
    );
    let resolved =
        defaults::resolve_all(&config.services, &config.globals).map_err(|e| e.to_string())?;
    for service in &resolved {
        let scheme = if service.https_enabled() { "https" } else { "http" };
        println!(
            "  {} → {}://{} (port {})",
            service.name,
            scheme,
            dns::record_name(&service.subdomain_prefix, &config.globals.dns_domain),
            service.service_port
        );
    }
    Ok(())
}

/// Parse and validate a services file, printing every error if invalid.
fn parse_and_validate(file: &Path) -> Result<types::ServicesConfig, String> {
    let config = parser::parse_config_file(file).map_err(|e| e.to_string())?;
    let errors = parser::validate_config(&config);
    if errors.is_empty() {
        return Ok(config);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err(format!("{} validation error(s)", errors.len()))
}

fn render(file: &Path, compact: bool) -> Result<String, String> {
    let config = parse_and_validate(file)?;
    let template = assembler::generate(&config).map_err(|e| e.to_string())?;
    template.to_json(!compact).map_err(|e| e.to_string())
}

fn cmd_generate(file: &Path, out: Option<&Path>, compact: bool) -> Result<(), String> {
    let rendered = render(file, compact)?;
    match out {
        Some(path) => output::write_atomic(path, &rendered).map_err(|e| e.to_string()),
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}

fn cmd_digest(file: &Path) -> Result<(), String> {
    let config = parse_and_validate(file)?;
    let template = assembler::generate(&config).map_err(|e| e.to_string())?;
    let hash = digest::fingerprint(&template).map_err(|e| e.to_string())?;
    println!("{}", hash);
    Ok(())
}
