//! Track resolution command.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::catalog::{AcoustIdFingerprinter, CatalogService, FingerprintApi, fingerprint};
use crate::config::Config;
use crate::metadata;
use crate::model::Track;
use crate::resolve::{BatchManager, Resolver, TrackOutcome};

use super::print_fpcalc_install_instructions;

/// Arguments of `resolve`
pub struct ResolveArgs {
    pub paths: Vec<PathBuf>,
    pub album: bool,
    pub fingerprint: bool,
    pub api_key: Option<String>,
    pub json: bool,
}

/// Resolve audio files and print the outcomes
pub fn cmd_resolve(rt: &Runtime, config: &Config, args: &ResolveArgs) -> anyhow::Result<()> {
    let files = metadata::collect_audio_files(&args.paths);
    if files.is_empty() {
        anyhow::bail!("No audio files found");
    }

    let tracks: Vec<Track> = files
        .iter()
        .filter_map(|path| match metadata::read_track(path) {
            Ok(track) => Some(track),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable file");
                None
            }
        })
        .collect();
    tracing::info!(files = files.len(), readable = tracks.len(), "Resolving tracks");

    let fingerprinter = if args.fingerprint {
        build_fingerprinter(config, args.api_key.as_deref())
    } else {
        None
    };
    let catalog = Arc::new(CatalogService::new(&config.services.catalog_settings()));
    let resolver = Resolver::new(catalog, fingerprinter, config);

    let outcomes = rt.block_on(async {
        let token = CancellationToken::new();
        let interrupt = {
            let token = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, canceling outstanding lookups");
                    token.cancel();
                }
            })
        };

        let manager = BatchManager::new(&config.preferences).with_token(token);
        let outcomes = if args.album {
            resolver.resolve_albums(group_by_directory(tracks), &manager).await
        } else {
            resolver.resolve_tracks(tracks, &manager).await
        };

        interrupt.abort();
        outcomes
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            println!("{}", format_outcome(outcome));
        }
        let located = outcomes.iter().filter(|o| o.located().is_some()).count();
        println!();
        println!("Located {} of {} tracks", located, outcomes.len());
    }
    Ok(())
}

fn build_fingerprinter(config: &Config, api_key: Option<&str>) -> Option<Arc<dyn FingerprintApi>> {
    let Some(api_key) = api_key.or(config.credentials.acoustid_api_key.as_deref()) else {
        tracing::info!("No AcoustID API key, fingerprinting disabled");
        return None;
    };
    let configured = config.services.fpcalc_path.as_deref();
    let Some(fpcalc) = fingerprint::find_fpcalc(configured) else {
        print_fpcalc_install_instructions();
        tracing::warn!("Fingerprinting disabled");
        return None;
    };
    Some(Arc::new(AcoustIdFingerprinter::new(api_key, Some(fpcalc))))
}

/// Tracks grouped by containing directory, in path order
fn group_by_directory(tracks: Vec<Track>) -> Vec<Vec<Track>> {
    let mut groups: BTreeMap<PathBuf, Vec<Track>> = BTreeMap::new();
    for track in tracks {
        let dir = track.path.parent().map(PathBuf::from).unwrap_or_default();
        groups.entry(dir).or_default().push(track);
    }
    groups.into_values().collect()
}

fn format_outcome(outcome: &TrackOutcome) -> String {
    match outcome {
        TrackOutcome::Located { track, located } => {
            let mut out = format!("✓ {}\n", track.path.display());
            out.push_str(&format!("    {} - {}\n", located.artist, located.title));
            let year = located.year.map(|y| format!(" ({y})")).unwrap_or_default();
            out.push_str(&format!(
                "    {}{}, disc {} track {}\n",
                located.album, year, located.disc_number, located.track_number
            ));
            out.push_str(&format!(
                "    https://musicbrainz.org/recording/{} via {:?} (score {})",
                located.recording_id, located.source, located.score
            ));
            out
        }
        TrackOutcome::Failed { path, error } => format!("✗ {}: {}", path.display(), error),
        TrackOutcome::Canceled { path } => format!("- {}: canceled", path.display()),
    }
}
