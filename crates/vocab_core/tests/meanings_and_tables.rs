use vocab_core::{decode_meanings, encode_meanings, sanitize_table_name, TableName};

#[test]
fn decode_inverts_encode_for_clean_lists() {
    let samples: &[&[&str]] = &[
        &["to run"],
        &["to run", "to jog"],
        &["всё", "everything", "all of it"],
    ];
    for meanings in samples {
        let encoded = encode_meanings(meanings.iter());
        let expected: Vec<String> = meanings.iter().map(|m| m.to_string()).collect();
        assert_eq!(decode_meanings(&encoded), Some(expected));
    }
}

#[test]
fn encode_drops_blank_elements_without_trailing_separator() {
    assert_eq!(encode_meanings(["a", "", "  ", "b", " "]), "a,b");
    assert_eq!(encode_meanings(["", " "]), "");
}

#[test]
fn derived_tables_respect_length_and_alphabet() {
    let names = [
        "Spanish Basics!!",
        "a-b+c.d^e:f,g",
        "   many    spaces   here   ",
        "Ünïcödé wörds and more words",
        "हिन्दी शब्द",
        "ภาษาไทย",
        "sqlite_sequence",
        "!!!",
        "x",
    ];
    for name in names {
        let table = TableName::derive(name);
        let value = table.as_str();
        assert!(value.chars().count() <= 15, "{value}");
        assert!(!value.contains(['-', '+', '.', '^', ':', ',', ' ']), "{value}");
        assert!(!value.contains("__"), "{value}");
        assert!(TableName::parse(value).is_ok(), "{value}");
    }
}

#[test]
fn sanitize_matches_known_examples() {
    assert_eq!(sanitize_table_name("Spanish Basics!!"), "Spanish_Basics");
    assert_eq!(sanitize_table_name("a-b+c.d^e:f,g"), "abcdefg");
    assert_eq!(sanitize_table_name("  Technical terms "), "Technical_terms");
}
