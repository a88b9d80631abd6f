//! Composite scoring and disambiguation.

use serde::Serialize;

use super::Preferences;
use super::candidate::{Candidate, Probe};
use super::compare::{sort_by_preference, sort_candidates};
use super::dates::sort_key;
use crate::config::MatchingConfig;

const SHORT_TITLE_CHARS: usize = 5;

/// A candidate with its composite score (0-100)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scored {
    pub candidate: Candidate,
    pub score: u8,
}

/// Outcome of disambiguation
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// A winner was picked
    Located(Scored),
    /// Candidates exist but none was trusted
    Declined { best: Option<Scored> },
    /// Nothing to choose from
    Empty,
}

impl Decision {
    pub fn located(&self) -> Option<&Scored> {
        match self {
            Decision::Located(s) => Some(s),
            _ => None,
        }
    }
}

/// Duration closeness: full bonus within the grace window, zero at the tolerance
pub fn duration_bonus(length_diff_sec: Option<f64>, config: &MatchingConfig) -> f64 {
    let Some(diff) = length_diff_sec else {
        return 0.0;
    };
    let grace = config.duration_grace_secs;
    let tolerance = config.duration_tolerance_secs.max(grace);
    if diff <= grace {
        2.0
    } else if diff >= tolerance {
        0.0
    } else {
        2.0 * (tolerance - diff) / (tolerance - grace)
    }
}

/// Unscaled composite score
pub fn raw_score(probe: &Probe, candidate: &Candidate, config: &MatchingConfig) -> f64 {
    let mut score = 0.0;
    if !probe.artists.is_empty() && candidate.artist_score >= config.confident_similarity {
        score += 1.0;
    }
    if probe.album.is_some() && candidate.album_score >= config.confident_similarity {
        score += 4.0 * candidate.album_score;
    }
    if let (Some(wanted), Some(found)) = (probe.track_number, candidate.number_on_disc)
        && wanted == found
    {
        score += 1.0;
    }
    score += 5.0 * candidate.best_title_score();
    score += duration_bonus(candidate.length_diff_sec, config);
    if candidate.is_official() {
        score += 1.0;
    }
    score
}

/// Composite score rescaled to 0-100
pub fn composite_score(probe: &Probe, candidate: &Candidate, config: &MatchingConfig) -> u8 {
    (raw_score(probe, candidate, config) * 20.0).clamp(0.0, 100.0) as u8
}

/// Track and disc numbers agree, or the probe has none
fn numbers_agree(probe: &Probe, candidate: &Candidate) -> bool {
    let disc_ok = match (probe.disc_number, candidate.disc_number) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    };
    let track_ok = match (probe.track_number, candidate.number_on_disc) {
        (Some(a), Some(b)) => a == b,
        (Some(_), None) => false,
        (None, _) => true,
    };
    disc_ok && track_ok
}

/// Pick the winner among a probe's candidates.
pub fn disambiguate(
    probe: &Probe,
    candidates: Vec<Candidate>,
    prefs: &Preferences,
    config: &MatchingConfig,
) -> Decision {
    if candidates.is_empty() {
        return Decision::Empty;
    }

    let scored: Vec<Scored> = candidates
        .into_iter()
        .map(|candidate| Scored {
            score: composite_score(probe, &candidate, config),
            candidate,
        })
        .collect();

    // Old album found: a near-certain album match with agreeing numbers wins outright
    if probe.album.is_some() {
        let fast = scored
            .iter()
            .filter(|s| {
                s.candidate.album_score >= config.near_certain_similarity
                    && s.candidate.best_title_score() >= config.confident_similarity
                    && numbers_agree(probe, &s.candidate)
            })
            .min_by(|a, b| {
                sort_key(a.candidate.date)
                    .cmp(&sort_key(b.candidate.date))
                    .then_with(|| b.score.cmp(&a.score))
                    .then_with(|| a.candidate.release_id().cmp(&b.candidate.release_id()))
            });
        if let Some(winner) = fast {
            tracing::debug!(
                release = ?winner.candidate.release_id(),
                score = winner.score,
                "Album fast path"
            );
            return Decision::Located(winner.clone());
        }
    }

    let best_overall = scored.iter().max_by_key(|s| s.score).cloned();

    let mut pool: Vec<Scored> = scored
        .iter()
        .filter(|s| s.candidate.is_official())
        .cloned()
        .collect();
    if pool.is_empty() {
        if !prefs.avoid_compilations {
            return match best_overall {
                Some(best) => Decision::Located(best),
                None => Decision::Empty,
            };
        }
        pool = scored
            .iter()
            .filter(|s| !s.candidate.is_compilation())
            .cloned()
            .collect();
        if pool.is_empty() {
            return Decision::Declined { best: best_overall };
        }
    }

    if pool
        .iter()
        .any(|s| s.candidate.best_title_score() >= config.confident_similarity)
    {
        pool.retain(|s| s.candidate.best_title_score() >= config.confident_similarity);
    }

    if probe.title.chars().count() < SHORT_TITLE_CHARS {
        sort_by_preference(&mut pool, |a, b| {
            b.candidate
                .best_title_score()
                .partial_cmp(&a.candidate.best_title_score())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| sort_key(a.candidate.date).cmp(&sort_key(b.candidate.date)))
        });
    } else {
        let mut ordered: Vec<Candidate> = pool.iter().map(|s| s.candidate.clone()).collect();
        sort_candidates(&mut ordered, prefs, config.date_window_days);
        pool = reorder_like(pool, &ordered);
    }

    // Album carve-out: close album matches go first
    if probe.album.is_some() {
        sort_by_preference(&mut pool, |a, b| {
            let a_album = a.candidate.album_score >= config.confident_similarity;
            let b_album = b.candidate.album_score >= config.confident_similarity;
            b_album.cmp(&a_album)
        });
    }

    if !probe.title.to_lowercase().contains("remix") {
        sort_by_preference(&mut pool, |a, b| a.candidate.is_remix().cmp(&b.candidate.is_remix()));
    }

    let mut winner = pool[0].clone();

    // Same release, several matching recordings: best summed title similarity
    if let Some(release_id) = winner.candidate.release_id().map(str::to_string) {
        let summed = |s: &Scored| s.candidate.title_score + s.candidate.title_score_no_brackets;
        for other in pool.iter().skip(1) {
            if other.candidate.release_id() == Some(release_id.as_str()) && summed(other) > summed(&winner) {
                winner = other.clone();
            }
        }
    }

    if winner.candidate.best_title_score() < config.confident_similarity
        && winner.score < config.replace_threshold
        && !probe.fingerprinted
        && prefs.avoid_compilations
    {
        tracing::debug!(
            title = %probe.title,
            best = winner.score,
            "Declining unconfident match"
        );
        return Decision::Declined { best: Some(winner) };
    }

    tracing::debug!(
        recording = %winner.candidate.recording_id,
        release = ?winner.candidate.release_id(),
        score = winner.score,
        "Candidate selected"
    );
    Decision::Located(winner)
}

/// Reorder scored entries to follow `ordered` (matched by recording and release)
fn reorder_like(pool: Vec<Scored>, ordered: &[Candidate]) -> Vec<Scored> {
    let mut remaining: Vec<Option<Scored>> = pool.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(remaining.len());
    for candidate in ordered {
        if let Some(slot) = remaining.iter_mut().find(|slot| {
            slot.as_ref().is_some_and(|s| {
                s.candidate.recording_id == candidate.recording_id
                    && s.candidate.release_id() == candidate.release_id()
            })
        }) && let Some(scored) = slot.take()
        {
            out.push(scored);
        }
    }
    out.extend(remaining.into_iter().flatten());
    out
}
