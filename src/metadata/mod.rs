//! Audio file metadata reading.
//!
//! Uses the lofty crate for format-independent metadata access.
//! Supports reading from MP3, FLAC, OGG, M4A, and WAV files.
//!
//! # Features
//! - Read the tags the resolver matches on (title, artists, album, numbers, year)
//! - Read the duration from the audio properties
//! - Pick up stored MusicBrainz recording/release/release group IDs
//! - Collect audio files from files and directories

use std::path::{Path, PathBuf};

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::model::{Track, TrackLinks};

/// Extensions treated as audio (case-insensitive)
pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "flac", "ogg", "wav", "m4a"];

/// Read a track's tags and duration.
pub fn read_track(path: &Path) -> Result<Track> {
    if !path.exists() {
        return Err(Error::not_found(path));
    }

    // Probe the file to determine format and read tags
    let tagged_file = Probe::open(path)
        .map_err(|e| Error::metadata(path, format!("Failed to open file for probing: {e}")))?
        .read()
        .map_err(|e| Error::metadata(path, format!("Failed to read file metadata: {e}")))?;

    let mut track = Track::new(path);
    track.length_ms = Some(tagged_file.properties().duration().as_millis() as u64).filter(|&ms| ms > 0);

    // Get the primary tag, or fall back to the first available tag
    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        tracing::debug!(path = %path.display(), "No tags found");
        return Ok(track);
    };

    track.title = non_empty(tag.title().map(|s| s.to_string()));
    track.artist = non_empty(tag.artist().map(|s| s.to_string()));
    track.album = non_empty(tag.album().map(|s| s.to_string()));
    track.album_artist = text(tag, &ItemKey::AlbumArtist);
    track.track_number = tag.track();
    track.disc_number = tag.disk();
    track.year = tag.year().filter(|&y| y > 0);
    track.links = TrackLinks {
        recording: text(tag, &ItemKey::MusicBrainzRecordingId),
        release: text(tag, &ItemKey::MusicBrainzReleaseId),
        release_group: text(tag, &ItemKey::MusicBrainzReleaseGroupId),
    };

    Ok(track)
}

fn text(tag: &Tag, key: &ItemKey) -> Option<String> {
    non_empty(tag.get_string(key).map(str::to_string))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Expand the given files and directories into a sorted list of audio files.
///
/// Directories are walked recursively; unreadable entries are skipped.
pub fn collect_audio_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() && is_audio_file(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if is_audio_file(path) {
            files.push(path.clone());
        } else {
            tracing::warn!(path = %path.display(), "Skipping non-audio file");
        }
    }
    files.sort();
    files.dedup();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn test_read_non_audio_file_returns_error() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "This is just some text, not music.").expect("Failed to write to temp file");

        let result = read_track(file.path());

        assert!(matches!(result, Err(Error::Metadata { .. })));
    }

    #[test]
    fn test_read_non_existent_file_returns_error() {
        let result = read_track(Path::new("non_existent_file.mp3"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_collect_audio_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        File::create(root.join("song.mp3")).unwrap();
        File::create(root.join("notes.txt")).unwrap();
        File::create(root.join("UPPERCASE.OGG")).unwrap();
        std::fs::create_dir(root.join("disc2")).unwrap();
        File::create(root.join("disc2").join("track.flac")).unwrap();

        let files = collect_audio_files(&[root.to_path_buf(), root.join("song.mp3")]);

        assert_eq!(files.len(), 3);
        assert!(files.iter().any(|p| p.ends_with("UPPERCASE.OGG")));
        assert!(files.iter().any(|p| p.ends_with("disc2/track.flac")));
        assert!(!files.iter().any(|p| p.ends_with("notes.txt")));
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("/music/a.FLAC")));
        assert!(!is_audio_file(Path::new("/music/cover.jpg")));
        assert!(!is_audio_file(Path::new("/music/README")));
    }
}
