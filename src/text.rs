// ---------------------------------------------------------------------------
// Text normalisation for raw clinical notes
// ---------------------------------------------------------------------------

/// Noise substrings removed (or replaced) by [`clean`], applied in order.
///
/// `â€¢` is how a UTF-8 bullet shows up after a Latin-1 round trip in the
/// source exports; the real bullet is removed as well.
const NOISE: &[(&str, &str)] = &[
    ("â€¢", ""),
    ("•", ""),
    ("-", " "),
    ("%", ""),
    (".", ""),
    (":", ""),
    ("'", ""),
];

/// Strip bullet markers, percent signs, periods, colons and apostrophes.
/// Hyphens become a single space, so `55-60` splits into `55 60`
/// (and `well-known` into `well known`).
pub fn clean(text: &str) -> String {
    NOISE
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn standard_spacing(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`clean`] followed by [`standard_spacing`].
///
/// Cleaning can open up new whitespace runs, so the order is fixed.
pub fn normalize(text: &str) -> String {
    standard_spacing(&clean(text))
}
