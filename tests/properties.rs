//! Property-based tests for normalisation and number extraction.

use proptest::prelude::*;

use ef_extract::measure::{find_measurement, find_numbers};
use ef_extract::mentions::second_clean;
use ef_extract::text::{clean, normalize, standard_spacing};

/// Note-like text: letters, digits and the noise characters `clean` targets.
fn note_text() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 \t\n.:%'•-]{0,60}").unwrap()
}

proptest! {
    #[test]
    fn clean_is_idempotent(s in note_text()) {
        let once = clean(&s);
        prop_assert_eq!(clean(&once), once);
    }

    #[test]
    fn standard_spacing_is_idempotent(s in note_text()) {
        let once = standard_spacing(&s);
        prop_assert_eq!(standard_spacing(&once), once.clone());
        prop_assert!(!once.contains("  "));
        prop_assert_eq!(once.trim(), once.as_str());
    }

    #[test]
    fn normalized_text_has_no_noise(s in note_text()) {
        let out = normalize(&s);
        for c in ['-', '%', '.', ':', '\'', '•', '\n', '\t'] {
            prop_assert!(!out.contains(c));
        }
    }

    #[test]
    fn numbers_are_dd_or_dd_d(s in "[0-9a-z ,.]{0,40}") {
        for n in find_numbers(&s) {
            let b = n.as_bytes();
            let ok = match b.len() {
                2 => b.iter().all(u8::is_ascii_digit),
                4 => b[..2].iter().all(u8::is_ascii_digit) && b[2] == b'.' && b[3].is_ascii_digit(),
                _ => false,
            };
            prop_assert!(ok, "bad number token {:?} from {:?}", n, s);
            prop_assert!(n.matches('.').count() <= 1);
        }
    }

    #[test]
    fn measurement_bounds_are_ordered(s in "[0-9a-z ]{0,40}") {
        let range = find_measurement(&s);
        prop_assert!(range.lower <= range.upper);
        if find_numbers(&s).is_empty() {
            prop_assert_eq!((range.lower, range.upper), (0.0, 0.0));
        }
    }

    #[test]
    fn second_clean_leaves_no_list_artifacts(items in proptest::collection::vec("[a-z0-9 ]{0,10}", 0..5)) {
        let stringified = format!(
            "[{}]",
            items.iter().map(|i| format!("'{i}'")).collect::<Vec<_>>().join(", ")
        );
        let out = second_clean(&stringified);
        prop_assert!(!out.contains(['[', ']', '\'']));
        prop_assert_eq!(out, items.join(", "));
    }
}
