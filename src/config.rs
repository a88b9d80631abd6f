//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\track-resolver\config.toml
//! - macOS: ~/Library/Application Support/track-resolver/config.toml
//! - Linux: ~/.config/track-resolver/config.toml
//!
//! The config file is human-readable and editable. Every section falls back
//! to defaults, so a partial file is always valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::CatalogSettings;
use crate::model::TagFields;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials (keep separate for potential future encryption)
    pub credentials: Credentials,

    /// Matching thresholds
    pub matching: MatchingConfig,

    /// Resolution preferences
    pub preferences: PreferencesConfig,

    /// External service endpoints
    pub services: ServicesConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// AcoustID API key for fingerprint lookups
    pub acoustid_api_key: Option<String>,
}

/// Thresholds used by the matching pipeline.
///
/// Similarities are in `0.0..=1.0`, scores in `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// "Confident match" similarity
    pub confident_similarity: f64,
    /// "Near-certain" similarity (album fast path, duplicate slots)
    pub near_certain_similarity: f64,
    /// Below this a match is rejected outright
    pub reject_similarity: f64,
    /// Composite score a match must reach when its title is not confident
    pub replace_threshold: u8,
    /// Candidates released within this window are ordered by preference, not date
    pub date_window_days: i64,
    /// Length difference that still earns the full duration bonus
    pub duration_grace_secs: f64,
    /// Length difference at which the duration bonus reaches zero
    pub duration_tolerance_secs: f64,
    /// Minimum fingerprint service confidence
    pub fingerprint_min_confidence: f32,
    /// Results requested per search
    pub search_limit: u32,
    /// Releases tried per album batch
    pub album_release_candidates: usize,
    /// Length tolerance when pairing album tracks
    pub pairing_length_tolerance_secs: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            confident_similarity: 0.8,
            near_certain_similarity: 0.9,
            reject_similarity: 0.5,
            replace_threshold: 90,
            date_window_days: 360,
            duration_grace_secs: 2.0,
            duration_tolerance_secs: 15.0,
            fingerprint_min_confidence: 0.5,
            search_limit: 25,
            album_release_candidates: 8,
            pairing_length_tolerance_secs: 5.0,
        }
    }
}

/// Resolution preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// Prefer studio albums over singles released around the same time
    pub prefer_albums: bool,
    /// Skip compilation/various-artists releases
    pub avoid_compilations: bool,
    /// Release countries in order of preference
    pub preferred_countries: Vec<String>,
    /// List artwork for located tracks
    pub fetch_artwork: bool,
    /// Track fields to overwrite
    pub fields: TagFields,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            prefer_albums: false,
            avoid_compilations: true,
            preferred_countries: vec!["US".to_string(), "GB".to_string(), "XW".to_string()],
            fetch_artwork: true,
            fields: TagFields::all(),
        }
    }
}

/// External service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub musicbrainz_url: String,
    pub coverart_url: String,
    /// Minimum milliseconds between MusicBrainz requests
    pub musicbrainz_interval_ms: u64,
    /// Explicit fpcalc executable (searched in common locations otherwise)
    pub fpcalc_path: Option<PathBuf>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        let catalog = CatalogSettings::default();
        Self {
            musicbrainz_url: catalog.musicbrainz_url,
            coverart_url: catalog.coverart_url,
            musicbrainz_interval_ms: catalog.min_interval.as_millis() as u64,
            fpcalc_path: None,
        }
    }
}

impl ServicesConfig {
    pub fn catalog_settings(&self) -> CatalogSettings {
        CatalogSettings {
            musicbrainz_url: self.musicbrainz_url.clone(),
            coverart_url: self.coverart_url.clone(),
            min_interval: std::time::Duration::from_millis(self.musicbrainz_interval_ms),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("track-resolver"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to a specific file
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
