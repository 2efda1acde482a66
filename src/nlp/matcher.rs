use std::collections::BTreeSet;

use super::pattern::{PatternSet, Quantifier, TokenPattern};
use super::token::{tokenize, Token};

// ---------------------------------------------------------------------------
// Span matches
// ---------------------------------------------------------------------------

/// One match: half-open token range plus the index of the pattern (in
/// [`PatternSet`] order) that produced it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpanMatch {
    pub start: usize,
    pub end: usize,
    pub pattern: usize,
}

/// Every non-empty token range `pattern` matches, over all start positions.
///
/// Optional and repeated specs produce every possible length, so
/// `[ef] [num]?` over `ef 55` yields both `ef` and `ef 55`.
fn match_pattern(pattern: &TokenPattern, tokens: &[Token<'_>]) -> BTreeSet<(usize, usize)> {
    let complete = pattern.tokens.len();
    let mut found = BTreeSet::new();
    for start in 0..tokens.len() {
        let mut live = closure(pattern, BTreeSet::from([0]));
        for (ti, token) in tokens.iter().enumerate().skip(start) {
            live = closure(pattern, advance(pattern, &live, token));
            if live.is_empty() {
                break;
            }
            if live.contains(&complete) {
                found.insert((start, ti + 1));
            }
        }
    }
    found
}

/// Add every spec index reachable from `live` without consuming a token.
fn closure(pattern: &TokenPattern, mut live: BTreeSet<usize>) -> BTreeSet<usize> {
    let mut pending: Vec<usize> = live.iter().copied().collect();
    while let Some(pi) = pending.pop() {
        let skippable = pattern.tokens.get(pi).is_some_and(|spec| {
            matches!(spec.quantifier, Quantifier::Optional | Quantifier::ZeroOrMore)
        });
        if skippable && live.insert(pi + 1) {
            pending.push(pi + 1);
        }
    }
    live
}

/// Spec indices live after `token` is consumed from each index in `live`.
fn advance(pattern: &TokenPattern, live: &BTreeSet<usize>, token: &Token<'_>) -> BTreeSet<usize> {
    let mut next = BTreeSet::new();
    for &pi in live {
        let Some(spec) = pattern.tokens.get(pi) else {
            continue;
        };
        let hit = spec.matches(token);
        match spec.quantifier {
            Quantifier::One | Quantifier::Optional if hit => {
                next.insert(pi + 1);
            }
            Quantifier::Negate if !hit => {
                next.insert(pi + 1);
            }
            Quantifier::ZeroOrMore if hit => {
                next.insert(pi);
            }
            Quantifier::OneOrMore if hit => {
                next.insert(pi);
                next.insert(pi + 1);
            }
            _ => {}
        }
    }
    next
}

// ---------------------------------------------------------------------------
// PatternMatcher
// ---------------------------------------------------------------------------

/// Finds phrase mentions in normalised notes.
///
/// All patterns of the set run as a single group: callers get every span any
/// pattern matched, overlapping spans included, without knowing which
/// pattern produced it. The pattern set is fixed at construction.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    patterns: PatternSet,
}

impl PatternMatcher {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Raw matches over an already tokenised text, ordered by start token,
    /// then end token, then pattern index. Identical spans from different
    /// patterns are all kept.
    pub fn matches(&self, tokens: &[Token<'_>]) -> Vec<SpanMatch> {
        let mut out: Vec<SpanMatch> = self
            .patterns
            .iter()
            .enumerate()
            .flat_map(|(pattern, p)| {
                match_pattern(p, tokens)
                    .into_iter()
                    .map(move |(start, end)| SpanMatch {
                        start,
                        end,
                        pattern,
                    })
            })
            .collect();
        out.sort();
        out
    }

    /// Surface text of every matched span in `text`.
    pub fn find_pattern(&self, text: &str) -> Vec<String> {
        let tokens = tokenize(text);
        self.matches(&tokens)
            .iter()
            .map(|m| {
                let from = tokens[m.start].span.start;
                let to = tokens[m.end - 1].span.end;
                text[from..to].to_string()
            })
            .collect()
    }
}
