use std::ops::Range;

// ---------------------------------------------------------------------------
// Token – one lexical unit of a note with its surface attributes
// ---------------------------------------------------------------------------

/// A token borrowed from the source text, plus the lexical attributes token
/// patterns can constrain.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    /// Surface text exactly as it appears in the note.
    pub text: &'a str,
    /// Byte offsets of `text` inside the source string.
    pub span: Range<usize>,
    pub lower: String,
    pub lemma: String,
    pub shape: String,
}

/// Spelled-out numbers recognised by [`Token::like_num`].
const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    "hundred",
];

impl<'a> Token<'a> {
    fn new(source: &'a str, span: Range<usize>) -> Self {
        let text = &source[span.clone()];
        let lower = text.to_lowercase();
        let lemma = lemmatize(&lower);
        let shape = word_shape(text);
        Token {
            text,
            span,
            lower,
            lemma,
            shape,
        }
    }

    /// Length in characters (not bytes).
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_alpha(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_alphabetic)
    }

    pub fn is_ascii(&self) -> bool {
        self.text.is_ascii()
    }

    pub fn is_digit(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(|c| c.is_ascii_digit())
    }

    pub fn is_punct(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(|c| !c.is_alphanumeric())
    }

    pub fn is_lower(&self) -> bool {
        self.text.chars().any(char::is_alphabetic) && !self.text.chars().any(char::is_uppercase)
    }

    pub fn is_upper(&self) -> bool {
        self.text.chars().any(char::is_alphabetic) && !self.text.chars().any(char::is_lowercase)
    }

    pub fn is_title(&self) -> bool {
        let mut chars = self.text.chars();
        match chars.next() {
            Some(first) if first.is_uppercase() => !chars.any(char::is_uppercase),
            _ => false,
        }
    }

    /// Digits (optionally with `.`/`,` separators), simple fractions like
    /// `1/2`, or a spelled-out number.
    pub fn like_num(&self) -> bool {
        let stripped: String = self
            .text
            .trim_start_matches(['+', '-', '~', '±'])
            .chars()
            .filter(|c| *c != ',' && *c != '.')
            .collect();
        if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
        if let Some((num, den)) = self.text.split_once('/') {
            let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
            if digits(num) && digits(den) {
                return true;
            }
        }
        NUMBER_WORDS.contains(&self.lower.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Split `text` into tokens.
///
/// Whitespace separates tokens and never appears inside one. Within a
/// whitespace-delimited chunk, runs of alphanumeric characters form one token
/// (a `.` or `,` between two digits stays inside, so `55.5` is one token) and
/// every other character becomes a token of its own.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let end_of = |i: usize| chars.get(i).map_or(text.len(), |(b, _)| *b);

    let mut i = 0;
    while i < chars.len() {
        let (start, c) = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c.is_alphanumeric() {
            let mut j = i + 1;
            while j < chars.len() {
                let (_, cj) = chars[j];
                if cj.is_alphanumeric() {
                    j += 1;
                    continue;
                }
                let joins_digits = (cj == '.' || cj == ',')
                    && chars[j - 1].1.is_ascii_digit()
                    && chars.get(j + 1).is_some_and(|(_, n)| n.is_ascii_digit());
                if joins_digits {
                    j += 1;
                    continue;
                }
                break;
            }
            tokens.push(Token::new(text, start..end_of(j)));
            i = j;
        } else {
            tokens.push(Token::new(text, start..end_of(i + 1)));
            i += 1;
        }
    }
    tokens
}

/// Rule-based lemma for a lowercased word: plural `-ies` → `-y`, plural `-s`
/// dropped (`simpsons` → `simpson`, `fractions` → `fraction`).
/// Words ending in `ss`, `us`, `is` and short words are left alone.
fn lemmatize(lower: &str) -> String {
    if lower.chars().count() <= 3 || !lower.chars().all(char::is_alphabetic) {
        return lower.to_string();
    }
    if let Some(stem) = lower.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return lower.to_string();
    }
    lower.strip_suffix('s').unwrap_or(lower).to_string()
}

/// Orthographic shape: letters map to `X`/`x`, digits to `d`, other
/// characters kept; runs longer than four are truncated (`Simpson` → `Xxxxx`).
fn word_shape(text: &str) -> String {
    let mut shape = String::new();
    let mut last = None;
    let mut run = 0;
    for c in text.chars() {
        let s = if c.is_uppercase() {
            'X'
        } else if c.is_alphabetic() {
            'x'
        } else if c.is_ascii_digit() {
            'd'
        } else {
            c
        };
        if Some(s) == last {
            run += 1;
        } else {
            last = Some(s);
            run = 1;
        }
        if run <= 4 {
            shape.push(s);
        }
    }
    shape
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<&str> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn splits_on_whitespace_and_punctuation() {
        assert_eq!(
            texts("EF: 55-60%, 2D Simpson's"),
            vec!["EF", ":", "55", "-", "60", "%", ",", "2D", "Simpson", "'", "s"]
        );
    }

    #[test]
    fn keeps_decimals_together() {
        assert_eq!(texts("ef 55.5. ok"), vec!["ef", "55.5", ".", "ok"]);
        assert_eq!(texts("1,200 units"), vec!["1,200", "units"]);
    }

    #[test]
    fn offsets_point_into_source() {
        let src = "  LVEF   is 60 ";
        for tok in tokenize(src) {
            assert_eq!(&src[tok.span.clone()], tok.text);
        }
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n ").is_empty());
    }

    #[test]
    fn lexical_attributes() {
        let toks = tokenize("Simpsons 55 BIPLANE ten 1/2 ,");
        assert_eq!(toks[0].lower, "simpsons");
        assert_eq!(toks[0].lemma, "simpson");
        assert!(toks[0].is_title());
        assert_eq!(toks[0].shape, "Xxxxx");
        assert!(toks[1].is_digit() && toks[1].like_num());
        assert_eq!(toks[1].shape, "dd");
        assert!(toks[2].is_upper() && toks[2].is_alpha());
        assert!(toks[3].like_num() && !toks[3].is_digit());
        assert!(toks[4].like_num());
        assert!(toks[5].is_punct());
    }

    #[test]
    fn lemma_leaves_short_and_sibilant_words() {
        assert_eq!(lemmatize("was"), "was");
        assert_eq!(lemmatize("process"), "process");
        assert_eq!(lemmatize("studies"), "study");
        assert_eq!(lemmatize("fractions"), "fraction");
    }
}
