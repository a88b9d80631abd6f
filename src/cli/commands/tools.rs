//! Tooling and configuration checks.

use std::path::Path;

use crate::catalog::fingerprint;
use crate::config::{self, Config};

use super::print_fpcalc_install_instructions;

/// Check if fingerprinting tools are installed
pub fn cmd_check_tools(config: &Config) -> anyhow::Result<()> {
    println!("Checking fingerprint tools...\n");

    if let Some(version) = fingerprint::fpcalc_version(config.services.fpcalc_path.as_deref()) {
        println!("✓ fpcalc: {}", version);
    } else {
        println!("✗ fpcalc: NOT FOUND");
        print_fpcalc_install_instructions();
    }

    println!();
    println!("API Keys:");
    if std::env::var("ACOUSTID_API_KEY").is_ok() {
        println!("✓ ACOUSTID_API_KEY: set");
    } else if config.credentials.acoustid_api_key.is_some() {
        println!("✓ acoustid_api_key: set in config");
    } else {
        println!("✗ AcoustID API key: not set");
        println!("  Get one at: https://acoustid.org/new-application");
    }

    Ok(())
}

/// Show where the config lives and what it resolves to
pub fn cmd_config(explicit: Option<&Path>, config: &Config, init: bool) -> anyhow::Result<()> {
    let path = explicit.map(Path::to_path_buf).or_else(config::config_path);
    if init && !path.as_deref().is_some_and(Path::exists) {
        match explicit {
            Some(path) => config::save_to(config, path)?,
            None => config::save(config)?,
        }
    }
    match path {
        Some(path) if path.exists() => println!("# Config file: {}", path.display()),
        Some(path) => println!("# Config file: {} (not created, showing defaults)", path.display()),
        None => println!("# No config directory on this system, showing defaults"),
    }
    println!();

    let mut shown = config.clone();
    if shown.credentials.acoustid_api_key.is_some() {
        shown.credentials.acoustid_api_key = Some("<hidden>".to_string());
    }
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}
