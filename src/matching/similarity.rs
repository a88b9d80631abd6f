//! String similarity and artist comparison.
//!
//! Every fuzzy comparison in the pipeline goes through [`string_similarity`]:
//! a normalized Levenshtein ratio over case-folded, quote-normalized,
//! whitespace-collapsed text.

use strsim::normalized_levenshtein;

/// Normalize text for comparison
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' | '\u{2032}' | '`' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201F}' => '"',
            '\u{2010}'..='\u{2015}' => '-',
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity in `0.0..=1.0`; empty input never matches
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    normalized_levenshtein(&a, &b)
}

/// Remove `(...)`, `[...]` and `{...}` sections
pub fn strip_brackets(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut depth = 0usize;
    for c in title.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop a leading "the " article
pub fn strip_article(name: &str) -> &str {
    let trimmed = name.trim();
    match trimmed.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("the ") => trimmed[4..].trim_start(),
        _ => trimmed,
    }
}

/// Split a free-text artist field on `;` and featuring markers
pub fn split_artists(raw: &str) -> Vec<String> {
    const MARKERS: [&str; 7] = [
        " (featuring ",
        " (feat. ",
        " (ft. ",
        " featuring ",
        " feat. ",
        " feat ",
        " ft. ",
    ];

    let mut parts: Vec<String> = Vec::new();
    for chunk in raw.split(';') {
        let mut rest = chunk.to_string();
        loop {
            let lower = rest.to_ascii_lowercase();
            let hit = MARKERS
                .iter()
                .filter_map(|m| lower.find(m).map(|at| (at, m.len())))
                .min_by_key(|(at, _)| *at);
            match hit {
                Some((at, len)) => {
                    parts.push(rest[..at].to_string());
                    rest = rest[at + len..].to_string();
                }
                None => {
                    parts.push(rest);
                    break;
                }
            }
        }
    }
    parts
        .into_iter()
        .map(|p| p.trim().trim_matches(|c| c == '(' || c == ')').trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Best similarity of two artist names, with and without a leading "the"
pub fn artist_similarity(a: &str, b: &str) -> f64 {
    string_similarity(a, b).max(string_similarity(strip_article(a), strip_article(b)))
}

/// Best similarity of any probe artist against any credited artist
pub fn best_artist_similarity(probe: &[String], credited: &[String]) -> f64 {
    probe
        .iter()
        .flat_map(|p| credited.iter().map(move |c| artist_similarity(p, c)))
        .fold(0.0, f64::max)
}

/// At least one probe artist matches a credited artist at `threshold`
pub fn artists_match(probe: &[String], credited: &[String], threshold: f64) -> bool {
    best_artist_similarity(probe, credited) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_identity_and_empty() {
        assert_eq!(string_similarity("Nine", "nine"), 1.0);
        assert_eq!(string_similarity("", "nine"), 0.0);
        assert_eq!(string_similarity("  ", "  "), 0.0);
    }

    #[test]
    fn test_similarity_normalizes_quotes_and_space() {
        assert_eq!(string_similarity("Don\u{2019}t  Stop", "don't stop"), 1.0);
    }

    #[test]
    fn test_similarity_thresholds() {
        assert!(string_similarity("Nine", "Number 9") < 0.8);
        assert!(string_similarity("Yellow Submarine", "Yellow Submarin") >= 0.9);
    }

    #[test]
    fn test_strip_brackets() {
        assert_eq!(strip_brackets("Song (Remastered 2011)"), "Song");
        assert_eq!(strip_brackets("Song [Live] (feat. X) End"), "Song End");
        assert_eq!(strip_brackets("No Brackets"), "No Brackets");
    }

    #[test]
    fn test_strip_article() {
        assert_eq!(strip_article("The Beatles"), "Beatles");
        assert_eq!(strip_article("Theatre"), "Theatre");
    }

    #[test]
    fn test_split_artists() {
        assert_eq!(
            split_artists("Artist A feat. Artist B; Artist C"),
            vec!["Artist A", "Artist B", "Artist C"]
        );
        assert_eq!(split_artists("A ft. B"), vec!["A", "B"]);
        assert_eq!(split_artists("A (featuring B)"), vec!["A", "B"]);
        assert_eq!(split_artists("Solo"), vec!["Solo"]);
    }

    #[test]
    fn test_artists_match_ignores_article() {
        let probe = vec!["Beatles".to_string()];
        let credited = vec!["The Beatles".to_string()];
        assert!(artists_match(&probe, &credited, 0.8));
        assert!(!artists_match(&probe, &["Rolling Stones".to_string()], 0.8));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn similarity_is_bounded_and_symmetric(a in "\\PC{0,20}", b in "\\PC{0,20}") {
                let ab = string_similarity(&a, &b);
                let ba = string_similarity(&b, &a);
                prop_assert!((0.0..=1.0).contains(&ab));
                prop_assert!((ab - ba).abs() < 1e-9);
            }

            #[test]
            fn nonempty_text_matches_itself(a in "[a-zA-Z0-9]{1,20}") {
                prop_assert_eq!(string_similarity(&a, &a), 1.0);
            }
        }
    }
}
