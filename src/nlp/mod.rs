/// Token-pattern matching over clinical notes.
///
/// ```text
///   clean text
///       │
///       ▼
///   ┌──────────┐
///   │  token    │  split text → Vec<Token> with lexical attributes
///   └──────────┘
///       │
///       ▼
///   ┌──────────┐
///   │  pattern  │  JSON pattern file → validated PatternSet
///   └──────────┘
///       │
///       ▼
///   ┌──────────┐
///   │  matcher  │  PatternSet × tokens → matched span texts
///   └──────────┘
/// ```

pub mod matcher;
pub mod pattern;
pub mod token;

pub use matcher::PatternMatcher;
pub use pattern::PatternSet;
