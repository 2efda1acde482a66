use std::collections::BTreeMap;
use std::fmt;

use crate::classify::{find_method, MethodLabel};
use crate::data::filter::{self, RecordFilter};
use crate::data::model::{NoteDataset, NoteRecord};
use crate::measure::attach_measurement;
use crate::nlp::PatternMatcher;
use crate::text;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Fill `clean_text` from `raw_text`.
pub fn normalize(records: &mut [NoteRecord]) {
    for rec in records {
        rec.clean_text = text::normalize(&rec.raw_text);
    }
}

/// Fill `mentions` by running the matcher over `clean_text`.
pub fn find_mentions(matcher: &PatternMatcher, records: &mut [NoteRecord]) {
    for rec in records {
        rec.mentions = matcher.find_pattern(&rec.clean_text);
        log::debug!("record {}: {} mentions", rec.id, rec.mentions.len());
    }
}

/// Fill `method` from the flattened mentions.
pub fn classify(records: &mut [NoteRecord]) {
    for rec in records {
        rec.method = Some(find_method(&rec.mention_text()));
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The full extraction pass: normalise, match, filter, classify, measure.
#[derive(Debug, Clone)]
pub struct Pipeline {
    matcher: PatternMatcher,
    filter: RecordFilter,
}

impl Pipeline {
    pub fn new(matcher: PatternMatcher) -> Self {
        Self {
            matcher,
            filter: RecordFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn run(&self, mut dataset: NoteDataset) -> NoteDataset {
        log::info!(
            "processing {} records with {} patterns",
            dataset.len(),
            self.matcher.patterns().len()
        );
        normalize(&mut dataset.records);
        find_mentions(&self.matcher, &mut dataset.records);
        finish(dataset, &self.filter)
    }
}

/// Re-run classification and measurement on records whose mentions were
/// loaded from a saved dataset. No pattern matching happens.
pub fn reclassify(mut dataset: NoteDataset, filter: &RecordFilter) -> NoteDataset {
    log::info!("reclassifying {} records", dataset.len());
    normalize(&mut dataset.records);
    finish(dataset, filter)
}

fn finish(mut dataset: NoteDataset, filter: &RecordFilter) -> NoteDataset {
    filter::apply(&mut dataset, filter);
    classify(&mut dataset.records);
    dataset.records = attach_measurement(dataset.records);

    let summary = Summary::of(&dataset);
    log::info!("{summary}");
    dataset
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Counts shown before the save prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub records: usize,
    pub with_mentions: usize,
    pub with_measurement: usize,
    pub by_method: BTreeMap<MethodLabel, usize>,
}

impl Summary {
    pub fn of(dataset: &NoteDataset) -> Self {
        let mut summary = Summary {
            records: dataset.len(),
            ..Default::default()
        };
        for rec in &dataset.records {
            if !rec.mentions.is_empty() {
                summary.with_mentions += 1;
            }
            if rec.measurement.is_some_and(|m| m.is_found()) {
                summary.with_measurement += 1;
            }
            if let Some(method) = rec.method {
                *summary.by_method.entry(method).or_default() += 1;
            }
        }
        summary
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records, {} with mentions, {} with a measurement",
            self.records, self.with_mentions, self.with_measurement
        )?;
        for (method, count) in &self.by_method {
            write!(f, "; {method}: {count}")?;
        }
        Ok(())
    }
}
