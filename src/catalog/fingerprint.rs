//! Audio fingerprint generation using Chromaprint/fpcalc
//!
//! This module shells out to the `fpcalc` command-line tool (part of Chromaprint)
//! to generate audio fingerprints, and pairs it with the AcoustID client to
//! provide the pipeline's [`FingerprintApi`].
//!
//! Install fpcalc:
//! - Windows: `winget install AcoustID.Chromaprint` or download from https://acoustid.org/chromaprint
//! - macOS: `brew install chromaprint`
//! - Linux: `apt install libchromaprint-tools` or equivalent

use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;

use super::acoustid::AcoustIdClient;
use super::domain::{AudioFingerprint, CatalogError, FingerprintMatch};
use super::traits::FingerprintApi;

/// Common installation paths for fpcalc on Windows
#[cfg(windows)]
const FPCALC_PATHS: &[&str] = &[
    "fpcalc", // In PATH
    r"C:\Program Files\Chromaprint\fpcalc.exe",
    r"C:\Program Files\MusicBrainz Picard\fpcalc.exe",
    r"C:\Program Files (x86)\Chromaprint\fpcalc.exe",
];

#[cfg(not(windows))]
const FPCALC_PATHS: &[&str] = &[
    "fpcalc", // In PATH
    "/usr/bin/fpcalc",
    "/usr/local/bin/fpcalc",
    "/opt/homebrew/bin/fpcalc",
];

/// Find the fpcalc executable: the configured one, else common install paths
pub fn find_fpcalc(configured: Option<&Path>) -> Option<PathBuf> {
    let runs = |path: &Path| {
        Command::new(path)
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    };

    if let Some(path) = configured {
        return runs(path).then(|| path.to_path_buf());
    }

    FPCALC_PATHS
        .iter()
        .map(Path::new)
        .find(|path| runs(path))
        .map(Path::to_path_buf)
}

/// Get fpcalc version string (for diagnostics)
pub fn fpcalc_version(configured: Option<&Path>) -> Option<String> {
    let fpcalc = find_fpcalc(configured)?;
    Command::new(fpcalc)
        .arg("-version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

/// Generate an audio fingerprint for the given file with the given fpcalc binary
pub fn generate_fingerprint(fpcalc: &Path, path: &Path) -> Result<AudioFingerprint, CatalogError> {
    let output = Command::new(fpcalc)
        .arg("-json")
        .arg(path)
        .output()
        .map_err(|e| CatalogError::Fingerprint(format!("Failed to run fpcalc: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CatalogError::Fingerprint(format!(
            "fpcalc failed: {}",
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_fpcalc_json(&stdout)
}

/// Parse the JSON output from fpcalc
fn parse_fpcalc_json(json: &str) -> Result<AudioFingerprint, CatalogError> {
    let parsed: FpcalcOutput = serde_json::from_str(json)
        .map_err(|e| CatalogError::Fingerprint(format!("Failed to parse fpcalc output: {}", e)))?;

    Ok(AudioFingerprint {
        fingerprint: parsed.fingerprint,
        duration_secs: parsed.duration.round() as u32,
    })
}

/// fpcalc JSON output structure
#[derive(serde::Deserialize)]
struct FpcalcOutput {
    fingerprint: String,
    duration: f64,
}

/// Fingerprint identification via fpcalc + AcoustID
pub struct AcoustIdFingerprinter {
    client: AcoustIdClient,
    fpcalc: Option<PathBuf>,
}

impl AcoustIdFingerprinter {
    /// Create a fingerprinter; `fpcalc` overrides the executable search
    pub fn new(api_key: impl Into<String>, fpcalc: Option<PathBuf>) -> Self {
        Self {
            client: AcoustIdClient::new(api_key),
            fpcalc,
        }
    }
}

#[async_trait]
impl FingerprintApi for AcoustIdFingerprinter {
    async fn identify(&self, path: &Path) -> Result<Vec<FingerprintMatch>, CatalogError> {
        let configured = self.fpcalc.clone();
        let file = path.to_path_buf();

        // fpcalc decodes the whole file; keep it off the async workers
        let fingerprint = tokio::task::spawn_blocking(move || {
            let fpcalc = find_fpcalc(configured.as_deref()).ok_or_else(|| {
                CatalogError::Fingerprint(
                    "fpcalc not found. Please install Chromaprint: https://acoustid.org/chromaprint"
                        .to_string(),
                )
            })?;
            generate_fingerprint(&fpcalc, &file)
        })
        .await
        .map_err(|e| CatalogError::Fingerprint(e.to_string()))??;

        if fingerprint.duration_secs == 0 {
            return Ok(Vec::new());
        }

        self.client.lookup(&fingerprint).await
    }
}
