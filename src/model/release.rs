//! Fully fetched release with a normalized tracklist.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::domain::{ArtistCredit, PrimaryType, Relation, Release};

/// One track of a resolved release
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReleaseTrack {
    /// Disc (medium) position, 1-based
    pub disc: u32,
    /// Position on the disc, 1-based
    pub position: u32,
    /// Monotonic index across the whole release, 1-based
    pub global_index: u32,
    /// Printed number ("7", "A3", ...)
    pub number: String,
    pub title: String,
    pub length_ms: Option<u64>,
    pub recording_id: Option<String>,
    pub artists: Vec<ArtistCredit>,
    pub relations: Vec<Relation>,
}

/// A disc of a resolved release
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedMedium {
    pub position: u32,
    pub format: Option<String>,
    pub tracks: Vec<ReleaseTrack>,
}

/// A release fetched with its tracklist
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedRelease {
    pub id: String,
    pub release_group_id: Option<String>,
    pub title: String,
    pub date: Option<String>,
    /// First release date of the release group
    pub original_date: Option<String>,
    pub country: Option<String>,
    pub status: Option<String>,
    pub primary_type: PrimaryType,
    pub secondary_types: Vec<String>,
    pub artists: Vec<ArtistCredit>,
    pub labels: Vec<String>,
    pub media: Vec<ResolvedMedium>,
}

impl ResolvedRelease {
    pub fn from_release(release: Release) -> Self {
        let mut media: Vec<ResolvedMedium> = release
            .media
            .into_iter()
            .map(|medium| {
                let disc = medium.position;
                ResolvedMedium {
                    position: disc,
                    format: medium.format,
                    tracks: medium
                        .tracks
                        .into_iter()
                        .enumerate()
                        .map(|(i, t)| ReleaseTrack {
                            disc,
                            position: t.position.unwrap_or(i as u32 + 1),
                            global_index: 0,
                            number: t.number,
                            title: t.title,
                            length_ms: t.length_ms,
                            recording_id: t.recording_id,
                            artists: t.artists,
                            relations: t.relations,
                        })
                        .collect(),
                }
            })
            .collect();
        media.sort_by_key(|m| m.position);

        let numbers: Vec<(u32, &str, u32)> = media
            .iter()
            .flat_map(|m| m.tracks.iter().map(|t| (t.disc, t.number.as_str(), t.position)))
            .collect();
        let indices = normalize_track_numbers(&numbers);
        for (track, index) in media
            .iter_mut()
            .flat_map(|m| m.tracks.iter_mut())
            .zip(indices)
        {
            track.global_index = index;
        }

        let (release_group_id, original_date, primary_type, secondary_types) =
            match release.release_group {
                Some(rg) => (
                    Some(rg.id),
                    rg.first_release_date,
                    rg.primary_type,
                    rg.secondary_types,
                ),
                None => (None, None, PrimaryType::Other, Vec::new()),
            };

        Self {
            id: release.id,
            release_group_id,
            title: release.title,
            date: release.date,
            original_date,
            country: release.country,
            status: release.status,
            primary_type,
            secondary_types,
            artists: release.artists,
            labels: release.labels,
            media,
        }
    }

    pub fn tracks(&self) -> impl Iterator<Item = &ReleaseTrack> {
        self.media.iter().flat_map(|m| m.tracks.iter())
    }

    pub fn track_count(&self) -> usize {
        self.media.iter().map(|m| m.tracks.len()).sum()
    }

    pub fn find_by_recording(&self, recording_id: &str) -> Option<&ReleaseTrack> {
        self.tracks()
            .find(|t| t.recording_id.as_deref() == Some(recording_id))
    }

    pub fn medium(&self, disc: u32) -> Option<&ResolvedMedium> {
        self.media.iter().find(|m| m.position == disc)
    }

    /// Whether any track uses vinyl-style lettered numbering ("A1")
    pub fn has_lettered_numbers(&self) -> bool {
        self.tracks().any(|t| split_number(&t.number).0.is_some())
    }
}

/// Split a printed number into its letter prefix and numeric part
fn split_number(number: &str) -> (Option<String>, Option<u32>) {
    let trimmed = number.trim();
    let digits_at = trimmed
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (prefix, rest) = trimmed.split_at(digits_at);
    let prefix = prefix.trim();
    let letter = (!prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| prefix.to_ascii_uppercase());
    let value = rest
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok();
    (letter, value)
}

/// Map printed track numbers to one monotonic 1-based index.
///
/// Input is `(disc, printed number, position on disc)` in release order.
/// Lettered numbers group by letter (a vinyl side), plain numbers by disc.
/// Each group is offset by the sum of the highest index of every group that
/// appeared before it, so sides A{1,2,3} and B{1,2} put "B2" at 5.
pub fn normalize_track_numbers(numbers: &[(u32, &str, u32)]) -> Vec<u32> {
    let keyed: Vec<(String, u32)> = numbers
        .iter()
        .map(|(disc, number, position)| match split_number(number) {
            (Some(letter), value) => (letter, value.unwrap_or(*position)),
            (None, value) => (format!("#{disc}"), value.unwrap_or(*position)),
        })
        .collect();

    let mut order: Vec<&str> = Vec::new();
    let mut max_index: HashMap<&str, u32> = HashMap::new();
    for (key, index) in &keyed {
        let entry = max_index.entry(key.as_str()).or_insert_with(|| {
            order.push(key.as_str());
            0
        });
        *entry = (*entry).max(*index);
    }

    let mut offsets: HashMap<&str, u32> = HashMap::new();
    let mut running = 0;
    for key in order {
        offsets.insert(key, running);
        running += max_index[key];
    }

    keyed
        .iter()
        .map(|(key, index)| offsets[key.as_str()] + index)
        .collect()
}

/// Credits extracted from recording and work relations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Credits {
    pub composer: Vec<String>,
    pub lyricist: Vec<String>,
    pub publisher: Vec<String>,
    /// (role, name) pairs for everyone else credited
    pub involved_people: Vec<(String, String)>,
}

impl Credits {
    pub fn from_relations(relations: &[Relation], labels: &[String]) -> Self {
        let mut credits = Credits::default();
        for rel in relations {
            let target = rel.target.clone();
            let list = match rel.kind.as_str() {
                "composer" => &mut credits.composer,
                "lyricist" => &mut credits.lyricist,
                "writer" => {
                    push_unique(&mut credits.composer, target.clone());
                    &mut credits.lyricist
                }
                "publishing" | "publisher" => &mut credits.publisher,
                _ => {
                    let pair = (rel.kind.clone(), target);
                    if !credits.involved_people.contains(&pair) {
                        credits.involved_people.push(pair);
                    }
                    continue;
                }
            };
            push_unique(list, target);
        }
        if credits.publisher.is_empty() {
            for label in labels {
                push_unique(&mut credits.publisher, label.clone());
            }
        }
        credits
    }

    pub fn is_empty(&self) -> bool {
        self.composer.is_empty()
            && self.lyricist.is_empty()
            && self.publisher.is_empty()
            && self.involved_people.is_empty()
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::{Medium, MediumTrack, ReleaseGroupRef};

    fn medium(position: u32, numbers: &[&str]) -> Medium {
        Medium {
            position,
            format: Some("Vinyl".to_string()),
            track_count: numbers.len() as u32,
            tracks: numbers
                .iter()
                .enumerate()
                .map(|(i, n)| MediumTrack {
                    number: n.to_string(),
                    position: Some(i as u32 + 1),
                    title: format!("Track {n}"),
                    recording_id: Some(format!("rec-{n}")),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_lettered_sides_normalize() {
        let numbers = [
            (1, "A1", 1),
            (1, "A2", 2),
            (1, "A3", 3),
            (1, "B1", 4),
            (1, "B2", 5),
        ];

        assert_eq!(normalize_track_numbers(&numbers), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_plain_numbers_accumulate_across_discs() {
        let numbers = [(1, "1", 1), (1, "2", 2), (2, "1", 1), (2, "2", 2), (2, "3", 3)];

        assert_eq!(normalize_track_numbers(&numbers), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unparseable_number_uses_position() {
        let numbers = [(1, "", 1), (1, "x", 2)];
        assert_eq!(normalize_track_numbers(&numbers), vec![1, 2]);
    }

    #[test]
    fn test_from_release_sets_global_index() {
        let release = Release {
            id: "rel".to_string(),
            title: "Sides".to_string(),
            release_group: Some(ReleaseGroupRef {
                id: "rg".to_string(),
                first_release_date: Some("1977".to_string()),
                primary_type: PrimaryType::Album,
                ..Default::default()
            }),
            media: vec![medium(1, &["A1", "A2", "A3", "B1", "B2"])],
            ..Default::default()
        };

        let resolved = ResolvedRelease::from_release(release);

        let b2 = resolved.find_by_recording("rec-B2").unwrap();
        assert_eq!(b2.global_index, 5);
        assert!(resolved.has_lettered_numbers());
        assert_eq!(resolved.release_group_id.as_deref(), Some("rg"));
        assert_eq!(resolved.original_date.as_deref(), Some("1977"));
        assert_eq!(resolved.track_count(), 5);
    }

    #[test]
    fn test_credits_from_relations() {
        let relations = vec![
            Relation {
                kind: "composer".to_string(),
                target: "Comp".to_string(),
            },
            Relation {
                kind: "writer".to_string(),
                target: "Both".to_string(),
            },
            Relation {
                kind: "producer".to_string(),
                target: "Prod".to_string(),
            },
            Relation {
                kind: "producer".to_string(),
                target: "Prod".to_string(),
            },
        ];

        let credits = Credits::from_relations(&relations, &["Label Co".to_string()]);

        assert_eq!(credits.composer, vec!["Comp", "Both"]);
        assert_eq!(credits.lyricist, vec!["Both"]);
        assert_eq!(credits.publisher, vec!["Label Co"]);
        assert_eq!(
            credits.involved_people,
            vec![("producer".to_string(), "Prod".to_string())]
        );
    }
}
