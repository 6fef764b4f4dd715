mod dose_time;
mod medication;

pub use dose_time::DoseTime;
pub use medication::{legacy_id, MedicationFields, MedicationRecord, ValidatedFields};

use serde::{Deserialize, Serialize};

/// Today's completion summary, as shown by the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub taken: usize,
    pub total: usize,
    /// `taken / total`, `0.0` when nothing is tracked.
    pub ratio: f64,
    /// Ratio as a whole percentage, rounded to nearest.
    pub percent: u32,
    /// 1 when every medication is taken today, 0 otherwise.
    pub streak: u32,
}

impl DailyProgress {
    pub fn new(taken: usize, total: usize) -> Self {
        let ratio = if total > 0 {
            taken as f64 / total as f64
        } else {
            0.0
        };
        Self {
            taken,
            total,
            ratio,
            percent: (ratio * 100.0).round() as u32,
            streak: u32::from(total > 0 && taken == total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_progress_is_zero() {
        let p = DailyProgress::new(0, 0);
        assert_eq!(p.ratio, 0.0);
        assert_eq!(p.percent, 0);
        assert_eq!(p.streak, 0);
    }

    #[test]
    fn test_percent_rounds() {
        assert_eq!(DailyProgress::new(1, 3).percent, 33);
        assert_eq!(DailyProgress::new(2, 3).percent, 67);
        let full = DailyProgress::new(4, 4);
        assert_eq!(full.ratio, 1.0);
        assert_eq!(full.percent, 100);
        assert_eq!(full.streak, 1);
    }
}
