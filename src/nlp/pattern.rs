use std::path::Path;

use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use super::token::Token;
use crate::error::PatternError;

// ---------------------------------------------------------------------------
// Token attributes a pattern can constrain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrAttr {
    Orth,
    Lower,
    Norm,
    Lemma,
    Shape,
}

impl StrAttr {
    fn value<'t>(self, token: &'t Token<'_>) -> &'t str {
        match self {
            StrAttr::Orth => token.text,
            // NORM has no separate table here, it is the lowercase form.
            StrAttr::Lower | StrAttr::Norm => token.lower.as_str(),
            StrAttr::Lemma => token.lemma.as_str(),
            StrAttr::Shape => token.shape.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagAttr {
    IsAlpha,
    IsAscii,
    IsDigit,
    IsLower,
    IsUpper,
    IsTitle,
    IsPunct,
    LikeNum,
}

impl FlagAttr {
    fn value(self, token: &Token<'_>) -> bool {
        match self {
            FlagAttr::IsAlpha => token.is_alpha(),
            FlagAttr::IsAscii => token.is_ascii(),
            FlagAttr::IsDigit => token.is_digit(),
            FlagAttr::IsLower => token.is_lower(),
            FlagAttr::IsUpper => token.is_upper(),
            FlagAttr::IsTitle => token.is_title(),
            FlagAttr::IsPunct => token.is_punct(),
            FlagAttr::LikeNum => token.like_num(),
        }
    }
}

enum AttrKind {
    Str(StrAttr),
    Length,
    Flag(FlagAttr),
}

fn attr_kind(key: &str) -> Option<AttrKind> {
    let kind = match key {
        "ORTH" | "TEXT" => AttrKind::Str(StrAttr::Orth),
        "LOWER" => AttrKind::Str(StrAttr::Lower),
        "NORM" => AttrKind::Str(StrAttr::Norm),
        "LEMMA" => AttrKind::Str(StrAttr::Lemma),
        "SHAPE" => AttrKind::Str(StrAttr::Shape),
        "LENGTH" => AttrKind::Length,
        "IS_ALPHA" => AttrKind::Flag(FlagAttr::IsAlpha),
        "IS_ASCII" => AttrKind::Flag(FlagAttr::IsAscii),
        "IS_DIGIT" => AttrKind::Flag(FlagAttr::IsDigit),
        "IS_LOWER" => AttrKind::Flag(FlagAttr::IsLower),
        "IS_UPPER" => AttrKind::Flag(FlagAttr::IsUpper),
        "IS_TITLE" => AttrKind::Flag(FlagAttr::IsTitle),
        "IS_PUNCT" => AttrKind::Flag(FlagAttr::IsPunct),
        "LIKE_NUM" => AttrKind::Flag(FlagAttr::LikeNum),
        _ => return None,
    };
    Some(kind)
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum StrPredicate {
    Equals(String),
    In(Vec<String>),
    NotIn(Vec<String>),
    Regex(Regex),
}

impl StrPredicate {
    fn test(&self, value: &str) -> bool {
        match self {
            StrPredicate::Equals(s) => s == value,
            StrPredicate::In(set) => set.iter().any(|s| s == value),
            StrPredicate::NotIn(set) => !set.iter().any(|s| s == value),
            StrPredicate::Regex(re) => re.is_match(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntPredicate {
    Eq(i64),
    Ne(i64),
    Ge(i64),
    Le(i64),
    Gt(i64),
    Lt(i64),
    In(Vec<i64>),
    NotIn(Vec<i64>),
}

impl IntPredicate {
    fn test(&self, value: i64) -> bool {
        match self {
            IntPredicate::Eq(n) => value == *n,
            IntPredicate::Ne(n) => value != *n,
            IntPredicate::Ge(n) => value >= *n,
            IntPredicate::Le(n) => value <= *n,
            IntPredicate::Gt(n) => value > *n,
            IntPredicate::Lt(n) => value < *n,
            IntPredicate::In(set) => set.contains(&value),
            IntPredicate::NotIn(set) => !set.contains(&value),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Constraint {
    Str(StrAttr, StrPredicate),
    Length(IntPredicate),
    Flag(FlagAttr, bool),
}

impl Constraint {
    fn test(&self, token: &Token<'_>) -> bool {
        match self {
            Constraint::Str(attr, pred) => pred.test(attr.value(token)),
            Constraint::Length(pred) => i64::try_from(token.len()).is_ok_and(|n| pred.test(n)),
            Constraint::Flag(attr, expected) => attr.value(token) == *expected,
        }
    }
}

// ---------------------------------------------------------------------------
// TokenSpec / TokenPattern / PatternSet
// ---------------------------------------------------------------------------

/// How many tokens a [`TokenSpec`] consumes (`OP` in the pattern file).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Exactly one matching token (no `OP`).
    One,
    /// `!`: exactly one token that does *not* match.
    Negate,
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

/// Constraints on a single token position. An empty constraint list matches
/// any token.
#[derive(Debug, Clone)]
pub struct TokenSpec {
    pub constraints: Vec<Constraint>,
    pub quantifier: Quantifier,
}

impl TokenSpec {
    pub fn matches(&self, token: &Token<'_>) -> bool {
        self.constraints.iter().all(|c| c.test(token))
    }
}

#[derive(Debug, Clone)]
pub struct TokenPattern {
    pub name: String,
    pub tokens: Vec<TokenSpec>,
}

/// Named token patterns, compiled and validated up front.
///
/// Patterns are kept sorted by name so matching order is stable across runs.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<TokenPattern>,
}

impl PatternSet {
    /// Load and compile a pattern file.
    pub fn from_path(path: &Path) -> Result<Self, PatternError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, PatternError> {
        let root: JsonValue = serde_json::from_str(text)?;
        Self::from_json(&root)
    }

    /// Compile a parsed pattern document:
    ///
    /// ```json
    /// { "ef_value": [ {"LOWER": "ef"}, {"LIKE_NUM": true, "OP": "+"} ] }
    /// ```
    pub fn from_json(root: &JsonValue) -> Result<Self, PatternError> {
        let obj = root.as_object().ok_or(PatternError::NotAnObject)?;
        if obj.is_empty() {
            return Err(PatternError::EmptySet);
        }

        let mut patterns = Vec::with_capacity(obj.len());
        for (name, value) in obj {
            let specs = value
                .as_array()
                .filter(|a| !a.is_empty())
                .ok_or_else(|| PatternError::EmptyPattern { name: name.clone() })?;

            let tokens = specs
                .iter()
                .enumerate()
                .map(|(index, spec)| compile_token(name, index, spec))
                .collect::<Result<Vec<_>, _>>()?;

            patterns.push(TokenPattern {
                name: name.clone(),
                tokens,
            });
        }
        patterns.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(PatternSet { patterns })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenPattern> {
        self.patterns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

// -- compilation helpers --

fn compile_token(name: &str, index: usize, spec: &JsonValue) -> Result<TokenSpec, PatternError> {
    let obj = spec.as_object().ok_or_else(|| PatternError::TokenNotObject {
        name: name.to_string(),
        index,
    })?;

    let mut constraints = Vec::new();
    let mut quantifier = Quantifier::One;

    for (raw_key, value) in obj {
        let key = raw_key.to_ascii_uppercase();
        let invalid = |reason: &str| PatternError::InvalidValue {
            name: name.to_string(),
            index,
            attr: key.clone(),
            reason: reason.to_string(),
        };

        if key == "OP" {
            let op = value.as_str().ok_or_else(|| invalid("OP must be a string"))?;
            quantifier = match op {
                "!" => Quantifier::Negate,
                "?" => Quantifier::Optional,
                "*" => Quantifier::ZeroOrMore,
                "+" => Quantifier::OneOrMore,
                "1" => Quantifier::One,
                other => {
                    return Err(PatternError::UnknownOperator {
                        name: name.to_string(),
                        index,
                        op: other.to_string(),
                    })
                }
            };
            continue;
        }

        let kind = attr_kind(&key).ok_or_else(|| PatternError::UnknownAttribute {
            name: name.to_string(),
            index,
            attr: raw_key.clone(),
        })?;

        let constraint = match kind {
            AttrKind::Flag(attr) => {
                let b = value.as_bool().ok_or_else(|| invalid("expected a boolean"))?;
                Constraint::Flag(attr, b)
            }
            AttrKind::Str(attr) => match value {
                JsonValue::String(s) => Constraint::Str(attr, StrPredicate::Equals(s.clone())),
                JsonValue::Object(preds) => {
                    Constraint::Str(attr, str_predicate(name, index, &key, preds)?)
                }
                _ => return Err(invalid("expected a string or predicate object")),
            },
            AttrKind::Length => match value {
                JsonValue::Number(n) => {
                    let n = n.as_i64().ok_or_else(|| invalid("expected an integer"))?;
                    Constraint::Length(IntPredicate::Eq(n))
                }
                JsonValue::Object(preds) => Constraint::Length(int_predicate(&preds, invalid)?),
                _ => return Err(invalid("expected an integer or predicate object")),
            },
        };
        constraints.push(constraint);
    }

    Ok(TokenSpec {
        constraints,
        quantifier,
    })
}

fn single_predicate<'m>(
    preds: &'m Map<String, JsonValue>,
    invalid: &impl Fn(&str) -> PatternError,
) -> Result<(&'m str, &'m JsonValue), PatternError> {
    let mut iter = preds.iter();
    match (iter.next(), iter.next()) {
        (Some((k, v)), None) => Ok((k.as_str(), v)),
        _ => Err(invalid("predicate object must have exactly one key")),
    }
}

fn str_predicate(
    name: &str,
    index: usize,
    attr: &str,
    preds: &Map<String, JsonValue>,
) -> Result<StrPredicate, PatternError> {
    let invalid = |reason: &str| PatternError::InvalidValue {
        name: name.to_string(),
        index,
        attr: attr.to_string(),
        reason: reason.to_string(),
    };
    let (op, value) = single_predicate(preds, &invalid)?;

    let string_list = |v: &JsonValue| -> Result<Vec<String>, PatternError> {
        v.as_array()
            .ok_or_else(|| invalid("expected an array of strings"))?
            .iter()
            .map(|s| {
                s.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("expected an array of strings"))
            })
            .collect()
    };

    match op {
        "IN" => Ok(StrPredicate::In(string_list(value)?)),
        "NOT_IN" => Ok(StrPredicate::NotIn(string_list(value)?)),
        "REGEX" => {
            let src = value.as_str().ok_or_else(|| invalid("REGEX expects a string"))?;
            Regex::new(src)
                .map(StrPredicate::Regex)
                .map_err(|source| PatternError::Regex {
                    name: name.to_string(),
                    index,
                    source,
                })
        }
        "==" => value
            .as_str()
            .map(|s| StrPredicate::Equals(s.to_string()))
            .ok_or_else(|| invalid("== expects a string")),
        other => Err(invalid(&format!("unsupported predicate '{other}'"))),
    }
}

fn int_predicate(
    preds: &Map<String, JsonValue>,
    invalid: impl Fn(&str) -> PatternError,
) -> Result<IntPredicate, PatternError> {
    let (op, value) = single_predicate(preds, &invalid)?;

    if op == "IN" || op == "NOT_IN" {
        let list = value
            .as_array()
            .ok_or_else(|| invalid("expected an array of integers"))?
            .iter()
            .map(|n| n.as_i64().ok_or_else(|| invalid("expected an array of integers")))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(if op == "IN" {
            IntPredicate::In(list)
        } else {
            IntPredicate::NotIn(list)
        });
    }

    let n = value
        .as_i64()
        .ok_or_else(|| invalid(&format!("{op} expects an integer")))?;
    match op {
        "==" => Ok(IntPredicate::Eq(n)),
        "!=" => Ok(IntPredicate::Ne(n)),
        ">=" => Ok(IntPredicate::Ge(n)),
        "<=" => Ok(IntPredicate::Le(n)),
        ">" => Ok(IntPredicate::Gt(n)),
        "<" => Ok(IntPredicate::Lt(n)),
        other => Err(invalid(&format!("unsupported predicate '{other}'"))),
    }
}
