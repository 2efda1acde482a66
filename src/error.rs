use thiserror::Error;

/// Errors raised while loading or compiling a token-pattern set.
///
/// Every variant carries enough location information (pattern name and
/// token index) to point at the offending entry in the pattern file.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("reading pattern file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing pattern JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pattern document must be a JSON object of name -> token list")]
    NotAnObject,

    #[error("pattern set contains no patterns")]
    EmptySet,

    #[error("pattern '{name}' must be a non-empty array of token specs")]
    EmptyPattern { name: String },

    #[error("pattern '{name}', token {index}: expected a JSON object")]
    TokenNotObject { name: String, index: usize },

    #[error("pattern '{name}', token {index}: unknown attribute '{attr}'")]
    UnknownAttribute {
        name: String,
        index: usize,
        attr: String,
    },

    #[error("pattern '{name}', token {index}: invalid value for '{attr}': {reason}")]
    InvalidValue {
        name: String,
        index: usize,
        attr: String,
        reason: String,
    },

    #[error("pattern '{name}', token {index}: unknown operator '{op}'")]
    UnknownOperator {
        name: String,
        index: usize,
        op: String,
    },

    #[error("pattern '{name}', token {index}: invalid regex: {source}")]
    Regex {
        name: String,
        index: usize,
        #[source]
        source: regex::Error,
    },
}
