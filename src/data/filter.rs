use super::model::{NoteDataset, NoteRecord};
use crate::classify::{find_ef_mention, EfMode};

// ---------------------------------------------------------------------------
// Record filters: which notes stay in the dataset
// ---------------------------------------------------------------------------

/// Optional record filters. The default keeps every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Drop records with no pattern mention.
    pub require_mentions: bool,
    /// Drop records whose clean text never mentions this ejection fraction.
    pub require_ef: Option<EfMode>,
}

impl RecordFilter {
    pub fn is_active(&self) -> bool {
        self.require_mentions || self.require_ef.is_some()
    }

    /// Whether a record passes all active filters.
    pub fn keeps(&self, rec: &NoteRecord) -> bool {
        if self.require_mentions && rec.mentions.is_empty() {
            return false;
        }
        if let Some(mode) = self.require_ef {
            if find_ef_mention(mode, &rec.clean_text).is_none() {
                return false;
            }
        }
        true
    }
}

/// Remove records that fail `filter`, keeping the order of the rest.
pub fn apply(dataset: &mut NoteDataset, filter: &RecordFilter) {
    if !filter.is_active() {
        return;
    }
    let before = dataset.len();
    dataset.records.retain(|rec| filter.keeps(rec));
    log::info!(
        "filter kept {} of {before} records ({filter:?})",
        dataset.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn dataset() -> NoteDataset {
        let mut with_ef = NoteRecord::new(CellValue::Integer(1), "");
        with_ef.clean_text = "LVEF 55".into();
        with_ef.mentions = vec!["LVEF 55".into()];

        let mut plain = NoteRecord::new(CellValue::Integer(2), "");
        plain.clean_text = "normal study".into();

        let mut ef_only = NoteRecord::new(CellValue::Integer(3), "");
        ef_only.clean_text = "ejection fraction preserved".into();

        NoteDataset::from_records(vec![with_ef, plain, ef_only])
    }

    fn kept_ids(filter: &RecordFilter) -> Vec<CellValue> {
        let mut ds = dataset();
        apply(&mut ds, filter);
        ds.records.into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn default_filter_keeps_everything() {
        assert!(!RecordFilter::default().is_active());
        assert_eq!(
            kept_ids(&RecordFilter::default()),
            vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Integer(3)]
        );
    }

    #[test]
    fn require_mentions() {
        let filter = RecordFilter {
            require_mentions: true,
            ..Default::default()
        };
        assert_eq!(kept_ids(&filter), vec![CellValue::Integer(1)]);
    }

    #[test]
    fn require_ef_mode() {
        let general = RecordFilter {
            require_ef: Some(EfMode::General),
            ..Default::default()
        };
        assert_eq!(kept_ids(&general), vec![CellValue::Integer(3)]);

        let left = RecordFilter {
            require_ef: Some(EfMode::Left),
            ..Default::default()
        };
        let ds = dataset();
        assert!(left.keeps(&ds.records[0]));
        assert!(!left.keeps(&ds.records[2]));
        assert_eq!(kept_ids(&left), vec![CellValue::Integer(1)]);
    }
}
