//! Title variants for text search.

use super::similarity::strip_brackets;

const NUMBER_WORDS: [&str; 21] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty",
];

const HONORIFICS: [(&str, &str); 2] = [("mister", "mr."), ("miss", "ms.")];

/// Distinct search variants of a title, the original first
pub fn title_variants(title: &str) -> Vec<String> {
    let title = title.trim();
    let mut variants: Vec<String> = Vec::new();
    let mut push = |v: String| {
        let v = v.split_whitespace().collect::<Vec<_>>().join(" ");
        if !v.is_empty() && !variants.iter().any(|e| e.eq_ignore_ascii_case(&v)) {
            variants.push(v);
        }
    };

    push(title.to_string());
    let stripped = strip_brackets(title);
    push(stripped.clone());

    for base in [title.to_string(), stripped] {
        push(map_words(&base, swap_number));
        push(map_words(&base, swap_honorific));
        if base.contains(['\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}']) {
            push(replace_curly(&base, "'", "\""));
            push(replace_curly(&base, "-", "-"));
        }
    }
    variants
}

fn map_words(text: &str, f: impl Fn(&str) -> Option<String>) -> String {
    text.split(' ')
        .map(|word| f(word).unwrap_or_else(|| word.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// "nine" ⇄ "9"
fn swap_number(word: &str) -> Option<String> {
    let lower = word.to_lowercase();
    if let Some(n) = NUMBER_WORDS.iter().position(|w| *w == lower) {
        return Some(n.to_string());
    }
    let n: usize = word.parse().ok()?;
    NUMBER_WORDS.get(n).map(|w| capitalize_like(w, word))
}

/// "Mister" ⇄ "Mr."
fn swap_honorific(word: &str) -> Option<String> {
    let lower = word.to_lowercase();
    HONORIFICS.iter().find_map(|(long, short)| {
        if lower == *long {
            Some(capitalize_like(short, word))
        } else if lower == *short {
            Some(capitalize_like(long, word))
        } else {
            None
        }
    })
}

fn capitalize_like(word: &str, model: &str) -> String {
    if model.chars().next().is_some_and(char::is_uppercase) || model.chars().all(|c| c.is_ascii_digit()) {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        word.to_string()
    }
}

fn replace_curly(text: &str, single: &str, double: &str) -> String {
    text.replace(['\u{2018}', '\u{2019}'], single)
        .replace(['\u{201C}', '\u{201D}'], double)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_variants() {
        let variants = title_variants("Nine");
        assert_eq!(variants, vec!["Nine", "9"]);

        let variants = title_variants("Love Potion 9");
        assert!(variants.contains(&"Love Potion Nine".to_string()));
    }

    #[test]
    fn test_bracket_and_honorific_variants() {
        let variants = title_variants("Mister Blue Sky (Remastered)");
        assert_eq!(variants[0], "Mister Blue Sky (Remastered)");
        assert!(variants.contains(&"Mister Blue Sky".to_string()));
        assert!(variants.contains(&"Mr. Blue Sky".to_string()));
    }

    #[test]
    fn test_curly_quote_variants() {
        let variants = title_variants("Don\u{2019}t Stop");
        assert!(variants.contains(&"Don't Stop".to_string()));
        assert!(variants.contains(&"Don-t Stop".to_string()));
    }

    #[test]
    fn test_variants_are_distinct_case_insensitively() {
        let variants = title_variants("plain title");
        assert_eq!(variants, vec!["plain title"]);
    }
}
