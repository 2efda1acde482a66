//! Ejection-fraction extraction from free-text clinical notes.
//!
//! ```text
//!  raw note ─▶ text::normalize ─▶ nlp::PatternMatcher ─▶ mentions
//!                                                          │
//!                        classify::find_method ◀───────────┤
//!                        measure::find_measurement ◀───────┘
//! ```

pub mod classify;
pub mod config;
pub mod data;
pub mod error;
pub mod measure;
pub mod mentions;
pub mod nlp;
pub mod pipeline;
pub mod prompt;
pub mod text;
