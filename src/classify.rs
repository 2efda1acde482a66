use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MethodLabel – how the ejection fraction was measured
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MethodLabel {
    SimpsonBiplane,
    Imaging3d,
    /// No method phrase found. Displayed as `None`.
    NotFound,
}

impl MethodLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            MethodLabel::SimpsonBiplane => "2d simpson biplane",
            MethodLabel::Imaging3d => "3d imaging",
            MethodLabel::NotFound => "None",
        }
    }
}

impl fmt::Display for MethodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2d simpson biplane" => Ok(MethodLabel::SimpsonBiplane),
            "3d imaging" => Ok(MethodLabel::Imaging3d),
            "None" | "" => Ok(MethodLabel::NotFound),
            other => Err(format!("unknown method label '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

/// A phrase rule: if `pattern` occurs anywhere in the lowercased text, the
/// rule fires with `label`.
struct Rule<L> {
    pattern: Regex,
    label: L,
}

fn rule<L>(pattern: &str, label: L) -> Rule<L> {
    Rule {
        pattern: Regex::new(pattern).expect("static rule pattern"),
        label,
    }
}

/// First rule whose pattern occurs in `text`, in table order.
fn first_hit<L: Copy>(rules: &[Rule<L>], text: &str) -> Option<L> {
    let lower = text.to_lowercase();
    rules
        .iter()
        .find(|r| r.pattern.is_match(&lower))
        .map(|r| r.label)
}

/// Narrow phrasing before broad within each method, and every Simpson rule
/// before any imaging rule: a lone `biplane` wins over `3d imaging`.
static METHOD_RULES: Lazy<Vec<Rule<MethodLabel>>> = Lazy::new(|| {
    vec![
        rule(r"2d simpsons? biplane", MethodLabel::SimpsonBiplane),
        rule(r"biplane", MethodLabel::SimpsonBiplane),
        rule(r"3d imaging", MethodLabel::Imaging3d),
        rule(r"imaging", MethodLabel::Imaging3d),
    ]
});

/// Best-effort method label for a mention string. Only presence matters;
/// match count and position are ignored.
pub fn find_method(text: &str) -> MethodLabel {
    first_hit(METHOD_RULES.as_slice(), text).unwrap_or(MethodLabel::NotFound)
}

// ---------------------------------------------------------------------------
// Ejection-fraction presence (alternate rule variant)
// ---------------------------------------------------------------------------

/// Which ejection fraction a note must mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EfMode {
    /// `ejection fraction` or `ef`
    General,
    /// `left ventricular ejection fraction` or `lvef`
    Left,
    /// `right ventricular ejection fraction` or `rvef`
    Right,
}

static EF_GENERAL: Lazy<Vec<Rule<&'static str>>> = Lazy::new(|| {
    vec![
        rule(r"ejection fraction", "ejection fraction"),
        rule(r"\bef\b", "ejection fraction"),
    ]
});

static EF_LEFT: Lazy<Vec<Rule<&'static str>>> = Lazy::new(|| {
    vec![
        rule(
            r"left ventricular ejection fraction",
            "left ventricular ejection fraction",
        ),
        rule(r"\blvef\b", "ejection fraction"),
    ]
});

static EF_RIGHT: Lazy<Vec<Rule<&'static str>>> = Lazy::new(|| {
    vec![
        rule(
            r"right ventricular ejection fraction",
            "right ventricular ejection fraction",
        ),
        rule(r"\brvef\b", "ejection fraction"),
    ]
});

/// Phrase naming the ejection fraction `mode` asks for, if `text` has one.
/// The full phrase returns itself; the abbreviation returns
/// `"ejection fraction"`.
pub fn find_ef_mention(mode: EfMode, text: &str) -> Option<&'static str> {
    let rules: &[Rule<&'static str>] = match mode {
        EfMode::General => EF_GENERAL.as_slice(),
        EfMode::Left => EF_LEFT.as_slice(),
        EfMode::Right => EF_RIGHT.as_slice(),
    };
    first_hit(rules, text)
}
