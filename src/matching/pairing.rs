//! Album pairing: a set of local tracks against one release tracklist.

use std::collections::{BTreeSet, HashMap};

use super::candidate::Probe;
use super::dates::{DatePadding, decode_date, year_of};
use super::similarity::{string_similarity, strip_brackets};
use crate::catalog::domain::Release;
use crate::config::MatchingConfig;
use crate::model::{ReleaseTrack, ResolvedRelease};

const DUPLICATE_TITLE_SIMILARITY: f64 = 0.9;
const POINTS_PER_TRACK: u32 = 20;
const MAX_DATE_BONUS: u32 = 10;

/// One distinct track of the album being resolved.
///
/// Local near-duplicates (same rounded length, near-identical title) share a
/// slot so that e.g. two rips of the same song pair with one release track.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumSlot {
    pub probe: Probe,
    /// Indices of the input tracks in this slot
    pub members: Vec<usize>,
}

impl AlbumSlot {
    fn rounded_secs(&self) -> Option<u64> {
        self.probe.length_ms.map(|ms| (ms + 500) / 1000)
    }
}

/// Collapse near-duplicate probes into slots, in input order
pub fn build_slots(probes: &[Probe]) -> Vec<AlbumSlot> {
    let mut slots: Vec<AlbumSlot> = Vec::new();
    for (index, probe) in probes.iter().enumerate() {
        let secs = probe.length_ms.map(|ms| (ms + 500) / 1000);
        let existing = slots.iter_mut().find(|slot| {
            slot.rounded_secs() == secs
                && string_similarity(&slot.probe.title, &probe.title) >= DUPLICATE_TITLE_SIMILARITY
        });
        match existing {
            Some(slot) => slot.members.push(index),
            None => slots.push(AlbumSlot {
                probe: probe.clone(),
                members: vec![index],
            }),
        }
    }
    slots
}

/// Slots paired to release tracks.
///
/// Release tracks are addressed by their index in [`ResolvedRelease::tracks`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pairing {
    /// `slot index → release track index`
    pub pairs: HashMap<usize, usize>,
    /// Release track indices already taken
    pub consumed: BTreeSet<usize>,
}

impl Pairing {
    fn pair(&mut self, slot: usize, track: usize) {
        self.pairs.insert(slot, track);
        self.consumed.insert(track);
    }

    fn is_paired(&self, slot: usize) -> bool {
        self.pairs.contains_key(&slot)
    }

    /// Every slot found a release track
    pub fn is_complete(&self, slots: &[AlbumSlot]) -> bool {
        !slots.is_empty() && (0..slots.len()).all(|slot| self.is_paired(slot))
    }

    pub fn track_for(&self, slot: usize) -> Option<usize> {
        self.pairs.get(&slot).copied()
    }

    /// Number of input tracks covered by the pairs
    pub fn covered_tracks(&self, slots: &[AlbumSlot]) -> usize {
        self.pairs.keys().map(|&slot| slots[slot].members.len()).sum()
    }
}

fn length_within(probe: &Probe, track: &ReleaseTrack, tolerance_secs: f64) -> bool {
    match (probe.length_ms, track.length_ms) {
        (Some(a), Some(b)) => (a as f64 - b as f64).abs() / 1000.0 <= tolerance_secs,
        _ => true,
    }
}

fn title_score(probe: &Probe, track: &ReleaseTrack) -> f64 {
    string_similarity(&probe.title, &track.title).max(string_similarity(
        &strip_brackets(&probe.title),
        &strip_brackets(&track.title),
    ))
}

fn number_matches(probe: &Probe, track: &ReleaseTrack, lettered: bool) -> bool {
    let Some(number) = probe.track_number else {
        return false;
    };
    if lettered {
        return track.global_index == number;
    }
    track.disc == probe.disc_number.unwrap_or(1) && track.position == number
}

/// Pair slots against a release in three rounds.
///
/// 1. disc and track number, with the length inside the tolerance
/// 2. title similarity at or above the confident threshold
/// 3. closest length inside the tolerance
///
/// Each round only considers slots and release tracks left by the earlier ones.
pub fn pair_release(slots: &[AlbumSlot], release: &ResolvedRelease, config: &MatchingConfig) -> Pairing {
    let tracks: Vec<&ReleaseTrack> = release.tracks().collect();
    let lettered = release.has_lettered_numbers();
    let tolerance = config.pairing_length_tolerance_secs;
    let mut pairing = Pairing::default();

    for (slot_index, slot) in slots.iter().enumerate() {
        let found = tracks.iter().enumerate().find(|(i, track)| {
            !pairing.consumed.contains(i)
                && number_matches(&slot.probe, track, lettered)
                && length_within(&slot.probe, track, tolerance)
        });
        if let Some((track_index, _)) = found {
            pairing.pair(slot_index, track_index);
        }
    }

    for (slot_index, slot) in slots.iter().enumerate() {
        if pairing.is_paired(slot_index) {
            continue;
        }
        let best = tracks
            .iter()
            .enumerate()
            .filter(|(i, _)| !pairing.consumed.contains(i))
            .map(|(i, track)| (i, title_score(&slot.probe, track)))
            .filter(|(_, score)| *score >= config.confident_similarity)
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)));
        if let Some((track_index, _)) = best {
            pairing.pair(slot_index, track_index);
        }
    }

    pair_by_length(slots, &tracks, tolerance, &mut pairing);
    pairing
}

/// Round three: a one-to-one length matching over what is left.
///
/// Each slot tries its candidates closest first and may move an earlier slot
/// to that slot's next candidate, so a full matching is found whenever one
/// exists.
fn pair_by_length(slots: &[AlbumSlot], tracks: &[&ReleaseTrack], tolerance: f64, pairing: &mut Pairing) {
    let mut candidates: HashMap<usize, Vec<usize>> = HashMap::new();
    for (slot_index, slot) in slots.iter().enumerate() {
        if pairing.is_paired(slot_index) {
            continue;
        }
        let Some(wanted) = slot.probe.length_ms else {
            continue;
        };
        let mut near: Vec<(usize, f64)> = tracks
            .iter()
            .enumerate()
            .filter(|(i, _)| !pairing.consumed.contains(i))
            .filter_map(|(i, track)| track.length_ms.map(|len| (i, (wanted as f64 - len as f64).abs() / 1000.0)))
            .filter(|(_, diff)| *diff <= tolerance)
            .collect();
        near.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        candidates.insert(slot_index, near.into_iter().map(|(i, _)| i).collect());
    }

    let mut owners: HashMap<usize, usize> = HashMap::new();
    for slot_index in 0..slots.len() {
        if candidates.contains_key(&slot_index) {
            augment(slot_index, &candidates, &mut owners, &mut BTreeSet::new());
        }
    }
    for (track_index, slot_index) in owners {
        pairing.pair(slot_index, track_index);
    }
}

fn augment(
    slot: usize,
    candidates: &HashMap<usize, Vec<usize>>,
    owners: &mut HashMap<usize, usize>,
    visited: &mut BTreeSet<usize>,
) -> bool {
    for &track in candidates.get(&slot).into_iter().flatten() {
        if !visited.insert(track) {
            continue;
        }
        let free = match owners.get(&track).copied() {
            None => true,
            Some(owner) => augment(owner, candidates, owners, visited),
        };
        if free {
            owners.insert(track, slot);
            return true;
        }
    }
    false
}

/// Most common tagged year; ties go to the earlier year
pub fn implied_year(years: &[u32]) -> Option<u32> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for &year in years.iter().filter(|&&y| y > 0) {
        *counts.entry(year).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(year, _)| year)
}

/// Score a pairing: 20 per covered input track plus up to 10 for a release
/// year close to the year the tags imply.
pub fn score_pairing(slots: &[AlbumSlot], pairing: &Pairing, release: &ResolvedRelease, tag_year: Option<u32>) -> u32 {
    let base = pairing.covered_tracks(slots) as u32 * POINTS_PER_TRACK;
    let release_year = release
        .date
        .as_deref()
        .or(release.original_date.as_deref())
        .and_then(|d| year_of(decode_date(d, DatePadding::Earliest)));
    let bonus = match (tag_year, release_year) {
        (Some(tagged), Some(released)) => MAX_DATE_BONUS.saturating_sub(tagged.abs_diff(released)),
        _ => 0,
    };
    base + bonus
}

/// Vinyl-style media, or printed numbers with a letter prefix
pub fn looks_lettered(release: &Release) -> bool {
    release.media.iter().any(|m| {
        m.format
            .as_deref()
            .is_some_and(|f| f.to_ascii_lowercase().contains("vinyl") || f.eq_ignore_ascii_case("cassette"))
            || m.tracks
                .iter()
                .any(|t| t.number.trim().starts_with(|c: char| c.is_ascii_alphabetic()))
    })
}

/// Order release search results for pairing.
///
/// Closest album title first, then releases with exactly `track_count`
/// tracks, then releases without lettered numbering.
pub fn rank_releases(releases: &mut [Release], album: &str, track_count: usize) {
    let key = |r: &Release| {
        (
            string_similarity(album, &r.title),
            r.total_tracks() == track_count as u32,
            !looks_lettered(r),
        )
    };
    super::compare::sort_by_preference(releases, |a, b| {
        let (ka, kb) = (key(a), key(b));
        kb.0
            .total_cmp(&ka.0)
            .then_with(|| kb.1.cmp(&ka.1))
            .then_with(|| kb.2.cmp(&ka.2))
    });
}
