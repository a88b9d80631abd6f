//! Candidate ordering.

use std::cmp::Ordering;

use super::Preferences;
use super::candidate::Candidate;
use super::dates::{date_distance_days, sort_key};

/// Order two candidates, best first.
///
/// Candidates released within `window_days` of each other are ordered by
/// preference: singles after albums when albums are preferred, exact titles
/// first, preferred countries first, then server score. Otherwise the
/// earlier release wins and unknown dates go last.
pub fn compare_candidates(a: &Candidate, b: &Candidate, prefs: &Preferences, window_days: i64) -> Ordering {
    let within_window = date_distance_days(a.date, b.date).is_some_and(|d| d <= window_days);

    let ordering = if within_window {
        let singles_last = if prefs.prefer_albums {
            a.is_single().cmp(&b.is_single())
        } else {
            Ordering::Equal
        };
        singles_last
            .then_with(|| is_exact(b).cmp(&is_exact(a)))
            .then_with(|| country_rank(a, prefs).cmp(&country_rank(b, prefs)))
            .then_with(|| desc(a.server_score, b.server_score))
            .then_with(|| a.date.cmp(&b.date))
    } else {
        sort_key(a.date)
            .cmp(&sort_key(b.date))
            .then_with(|| desc(a.server_score, b.server_score))
    };

    ordering
        .then_with(|| a.release_id().cmp(&b.release_id()))
        .then_with(|| a.recording_id.cmp(&b.recording_id))
}

fn is_exact(c: &Candidate) -> bool {
    c.title_score >= 1.0
}

fn country_rank(c: &Candidate, prefs: &Preferences) -> usize {
    c.country()
        .and_then(|country| {
            prefs
                .preferred_countries
                .iter()
                .position(|p| p.eq_ignore_ascii_case(country))
        })
        .unwrap_or(prefs.preferred_countries.len())
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Stable insertion sort.
///
/// The date-window rule is not transitive, and `slice::sort_by` may panic on
/// an inconsistent order, so candidate lists are sorted with this instead.
pub fn sort_by_preference<T>(items: &mut [T], mut cmp: impl FnMut(&T, &T) -> Ordering) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && cmp(&items[j], &items[j - 1]) == Ordering::Less {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Sort candidates with [`compare_candidates`]
pub fn sort_candidates(candidates: &mut [Candidate], prefs: &Preferences, window_days: i64) {
    sort_by_preference(candidates, |a, b| compare_candidates(a, b, prefs, window_days));
}
