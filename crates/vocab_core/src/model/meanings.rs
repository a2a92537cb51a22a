//! Meanings string codec.
//!
//! A word's meanings are stored as one comma-joined string. This module is the
//! only place that builds or splits that string.
//!
//! # Invariants
//! - Encoded output never has a trailing separator.
//! - Encoded output never has an empty segment between separators.
//! - The empty string is the only encoding of "no meanings".

/// Separator between meanings in the stored string.
pub const MEANINGS_SEPARATOR: char = ',';

/// Encodes an ordered list of meanings into the stored representation.
///
/// Each element has embedded separators removed and is trimmed; elements that
/// end up empty are dropped. Survivors keep their order.
pub fn encode_meanings<I, S>(meanings: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut encoded = String::new();
    for meaning in meanings {
        let cleaned = meaning.as_ref().replace(MEANINGS_SEPARATOR, "");
        let trimmed = cleaned.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !encoded.is_empty() {
            encoded.push(MEANINGS_SEPARATOR);
        }
        encoded.push_str(trimmed);
    }
    encoded
}

/// Normalizes free text typed into a meanings field (`" a , , b "` -> `"a,b"`).
pub fn normalize_meanings_input(raw: &str) -> String {
    encode_meanings(raw.split(MEANINGS_SEPARATOR))
}

/// Decodes a stored meanings string.
///
/// Returns `None` for the empty string. Trailing empty segments left by rows
/// written before normalization are ignored; other segments are returned as
/// stored.
pub fn decode_meanings(stored: &str) -> Option<Vec<String>> {
    if stored.is_empty() {
        return None;
    }

    let mut meanings: Vec<String> = stored
        .split(MEANINGS_SEPARATOR)
        .map(str::to_string)
        .collect();
    while meanings.last().is_some_and(|last| last.is_empty()) {
        meanings.pop();
    }

    if meanings.is_empty() {
        None
    } else {
        Some(meanings)
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_meanings, encode_meanings, normalize_meanings_input};

    #[test]
    fn encode_trims_and_drops_blank_entries() {
        let encoded = encode_meanings(["  to run ", "", "   ", "to jog"]);
        assert_eq!(encoded, "to run,to jog");
    }

    #[test]
    fn encode_single_entry_has_no_separator() {
        assert_eq!(encode_meanings(["", " hello "]), "hello");
    }

    #[test]
    fn encode_never_leaves_trailing_separator() {
        let encoded = encode_meanings(["one", "two", "  "]);
        assert_eq!(encoded, "one,two");
        assert!(!encoded.ends_with(','));
    }

    #[test]
    fn encode_strips_embedded_separators() {
        assert_eq!(encode_meanings(["busy, occupied", "x"]), "busy occupied,x");
    }

    #[test]
    fn encode_of_nothing_is_empty() {
        assert_eq!(encode_meanings(Vec::<String>::new()), "");
        assert_eq!(encode_meanings([" ", ""]), "");
    }

    #[test]
    fn normalize_input_handles_spaced_blank_segments() {
        assert_eq!(normalize_meanings_input(" to run , , to jog "), "to run,to jog");
        assert_eq!(normalize_meanings_input("a,b,"), "a,b");
        assert_eq!(normalize_meanings_input(",,,"), "");
    }

    #[test]
    fn decode_empty_is_no_meanings() {
        assert_eq!(decode_meanings(""), None);
        assert_eq!(decode_meanings(",,"), None);
    }

    #[test]
    fn decode_inverts_encode_for_clean_input() {
        let samples: Vec<Vec<&str>> = vec![
            vec!["hello"],
            vec!["to say", "to tell", "to speak"],
            vec!["кальмари", "squid"],
        ];
        for sample in samples {
            let decoded = decode_meanings(&encode_meanings(&sample)).unwrap();
            assert_eq!(decoded, sample);
        }
    }

    #[test]
    fn decode_ignores_legacy_trailing_separator() {
        assert_eq!(
            decode_meanings("a,b,").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
