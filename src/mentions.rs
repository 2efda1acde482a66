// ---------------------------------------------------------------------------
// Mention lists at the storage boundary
// ---------------------------------------------------------------------------

/// Separator used when a mention list is flattened into a single cell.
pub const SEPARATOR: &str = ", ";

/// Strip `[`, `]` and `'` from a stringified mention list without parsing it:
/// `"['ef 55', 'imaging']"` → `"ef 55, imaging"`.
pub fn second_clean(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '[' | ']' | '\''))
        .collect()
}

/// Join mentions into one display cell.
pub fn flatten(mentions: &[String]) -> String {
    mentions.join(SEPARATOR)
}

/// Read a stored mentions cell back into a list.
///
/// Accepts both the flattened form written by this crate and a legacy
/// stringified list (`['a', 'b']`). A comma inside a mention (`1,200`)
/// splits it in two.
pub fn parse_serialized(text: &str) -> Vec<String> {
    second_clean(text)
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_clean_strips_list_artifacts() {
        let out = second_clean("['ef 55', 'imaging']");
        assert_eq!(out, "ef 55, imaging");
        assert!(!out.contains(['[', ']', '\'']));
    }

    #[test]
    fn second_clean_of_empty_list() {
        assert_eq!(second_clean("[]"), "");
    }

    #[test]
    fn flatten_matches_second_clean_shape() {
        let mentions = vec!["ef 55".to_string(), "imaging".to_string()];
        assert_eq!(flatten(&mentions), second_clean("['ef 55', 'imaging']"));
        assert_eq!(flatten(&[]), "");
    }

    #[test]
    fn parse_serialized_reads_both_forms() {
        let expected = vec!["ef 55".to_string(), "3d imaging".to_string()];
        assert_eq!(parse_serialized("['ef 55', '3d imaging']"), expected);
        assert_eq!(parse_serialized("ef 55, 3d imaging"), expected);
        assert!(parse_serialized("[]").is_empty());
        assert!(parse_serialized("").is_empty());
    }
}
