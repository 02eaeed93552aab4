//! Floating-point helpers shared by the validator and the requirements engine.

mod matrix;

pub use matrix::Matrix;

pub const PERCENT_SCALE: f64 = 100.0;
pub const COLUMN_SUM_TOLERANCE: f64 = 1.0e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceComparison {
    pub expected: f64,
    pub actual: f64,
    pub abs_diff: f64,
    pub passes: bool,
}

pub fn compare_absolute(expected: f64, actual: f64, abs_tol: f64) -> ToleranceComparison {
    let abs_diff = (actual - expected).abs();
    ToleranceComparison {
        expected,
        actual,
        abs_diff,
        // NaN never passes.
        passes: abs_diff <= abs_tol,
    }
}

/// Absolute tolerance for comparing a seeded final-mix total against the target.
///
/// Scales the percentage tolerance by `target / 100`, floored at the percentage
/// tolerance itself.
pub fn seed_tolerance(target_amount: f64) -> f64 {
    COLUMN_SUM_TOLERANCE * (target_amount.abs() / PERCENT_SCALE).max(1.0)
}

pub fn share_of(amount: f64, percentage: f64) -> f64 {
    amount * percentage / PERCENT_SCALE
}

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut correction = 0.0;

    for value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

pub fn nonzero_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    stable_sum(values.into_iter().filter(|value| *value != 0.0))
}

#[cfg(test)]
mod tests {
    use super::{
        COLUMN_SUM_TOLERANCE, compare_absolute, nonzero_sum, seed_tolerance, share_of, stable_sum,
    };

    #[test]
    fn stable_sum_reduces_order_loss_for_large_and_small_values() {
        assert_eq!(stable_sum([1.0e16, 1.0, -1.0e16]), 0.0);
    }

    #[test]
    fn nonzero_sum_ignores_zero_cells() {
        assert_eq!(nonzero_sum([0.0, 60.0, 0.0, 40.0]), 100.0);
        assert_eq!(nonzero_sum(std::iter::empty()), 0.0);
    }

    #[test]
    fn compare_absolute_reports_difference() {
        let comparison = compare_absolute(100.0, 97.0, COLUMN_SUM_TOLERANCE);
        assert_eq!(comparison.abs_diff, 3.0);
        assert!(!comparison.passes);

        assert!(compare_absolute(100.0, 100.0 + 5.0e-7, COLUMN_SUM_TOLERANCE).passes);
        assert!(!compare_absolute(100.0, f64::NAN, COLUMN_SUM_TOLERANCE).passes);
    }

    #[test]
    fn seed_tolerance_never_drops_below_percentage_tolerance() {
        assert_eq!(seed_tolerance(1.0), COLUMN_SUM_TOLERANCE);
        assert_eq!(seed_tolerance(100.0), COLUMN_SUM_TOLERANCE);
        assert!((seed_tolerance(1000.0) - 1.0e-5).abs() < 1.0e-18);
    }

    #[test]
    fn share_of_applies_percentage() {
        assert_eq!(share_of(200.0, 50.0), 100.0);
        assert_eq!(share_of(100.0, 70.0), 70.0);
    }
}
