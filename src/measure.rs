use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::model::NoteRecord;

// ---------------------------------------------------------------------------
// MeasurementRange
// ---------------------------------------------------------------------------

/// Lower/upper ejection fraction bounds found in a mention string.
/// `(0.0, 0.0)` means no numeric evidence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasurementRange {
    pub lower: f64,
    pub upper: f64,
}

impl MeasurementRange {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Whether any number was found.
    pub fn is_found(&self) -> bool {
        *self != Self::default()
    }
}

// ---------------------------------------------------------------------------
// Number extraction
// ---------------------------------------------------------------------------

static EF_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{2,3}").unwrap());

/// All runs of 2-3 digits, leftmost first and non-overlapping.
///
/// A 3-digit run is read as a percentage with its decimal point dropped:
/// `655` → `65.5`. This also turns an unrelated `120` into `12.0`.
pub fn find_numbers(text: &str) -> Vec<String> {
    EF_NUMBER
        .find_iter(text)
        .map(|m| {
            let digits = m.as_str();
            if digits.len() > 2 {
                format!("{}.{}", &digits[..2], &digits[2..])
            } else {
                digits.to_string()
            }
        })
        .collect()
}

/// Range spanned by every number in `text`; order of appearance is ignored.
pub fn find_measurement(text: &str) -> MeasurementRange {
    let values: Vec<f64> = find_numbers(text)
        .iter()
        .filter_map(|n| n.parse::<f64>().ok())
        .collect();

    match values.as_slice() {
        [] => MeasurementRange::default(),
        [only] => MeasurementRange::new(*only, *only),
        many => {
            let lower = many.iter().copied().fold(f64::INFINITY, f64::min);
            let upper = many.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            MeasurementRange::new(lower, upper)
        }
    }
}

/// Attach a measurement computed from each record's mentions. Count, order
/// and every other field are left untouched.
pub fn attach_measurement(mut records: Vec<NoteRecord>) -> Vec<NoteRecord> {
    for rec in &mut records {
        rec.measurement = Some(find_measurement(&rec.mention_text()));
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::MethodLabel;
    use crate::data::model::CellValue;

    #[test]
    fn no_numbers_is_zero_range() {
        assert_eq!(find_measurement(""), MeasurementRange::new(0.0, 0.0));
        assert_eq!(find_measurement("ef normal"), MeasurementRange::default());
        assert!(!find_measurement("ef 5").is_found());
    }

    #[test]
    fn single_number_is_degenerate_range() {
        assert_eq!(find_measurement("ef 55"), MeasurementRange::new(55.0, 55.0));
    }

    #[test]
    fn three_digit_run_gets_decimal_point() {
        assert_eq!(find_numbers("ef 45 to 655"), vec!["45", "65.5"]);
        assert_eq!(find_measurement("ef 45 to 655"), MeasurementRange::new(45.0, 65.5));
    }

    #[test]
    fn unrelated_three_digit_number_is_corrupted() {
        // Known hazard: a heart rate of 120 reads as an EF of 12.0.
        assert_eq!(find_numbers("hr 120"), vec!["12.0"]);
    }

    #[test]
    fn long_digit_runs_split_leftmost_first() {
        assert_eq!(find_numbers("12345"), vec!["12.3", "45"]);
        assert_eq!(find_numbers("2d 1"), Vec::<String>::new());
    }

    #[test]
    fn many_numbers_keep_extremes() {
        assert_eq!(
            find_measurement("ef 60, ef 50 to 55, ef 65"),
            MeasurementRange::new(50.0, 65.0)
        );
    }

    #[test]
    fn attach_preserves_records() {
        let mut a = NoteRecord::new(CellValue::Integer(7), "raw a");
        a.clean_text = "clean a".into();
        a.mentions = vec!["EF 55".into(), "EF 55 60".into()];
        a.method = Some(MethodLabel::NotFound);
        let b = NoteRecord::new(CellValue::String("b".into()), "raw b");

        let out = attach_measurement(vec![a.clone(), b.clone()]);
        assert_eq!(out.len(), 2);

        assert_eq!(out[0].measurement, Some(MeasurementRange::new(55.0, 60.0)));
        assert_eq!(out[1].measurement, Some(MeasurementRange::default()));

        for (before, after) in [a, b].iter().zip(&out) {
            let mut after = after.clone();
            after.measurement = None;
            assert_eq!(&after, before);
        }
    }
}
