use thiserror::Error;

use super::model::{Comparison, ComparisonResult, NumericSeries, PairedSample, ScatterPoint, SeriesRole};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompareError {
    /// Lengths differ, or at least one side is empty.
    #[error("data length mismatch: predicted has {x_len} values, actual has {y_len} values")]
    InputMismatch { x_len: usize, y_len: usize },

    /// The named series is constant, so R² or correlation has a zero denominator.
    #[error("{series} series has zero variance; R² / correlation are undefined")]
    DegenerateInput { series: SeriesRole },

    #[error("{series} series has a non-finite value at position {position}")]
    NonFinite { series: SeriesRole, position: usize },
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Compare a predicted series (X) against an actual series (Y).
///
/// Statistics are accumulated in positional order, left to right. The scatter
/// projection is sorted by `x` afterwards; that ordering never feeds back into
/// the numbers.
pub fn compare(x: &NumericSeries, y: &NumericSeries) -> Result<Comparison, CompareError> {
    let cmp = compute(x.values(), y.values())?;
    log::info!("Compared '{}' against '{}': {}", x.label, y.label, cmp.result);
    Ok(cmp)
}

/// Like [`compare`] but for already-parsed slices that skipped the loader.
pub fn compare_values(x: &[f64], y: &[f64]) -> Result<Comparison, CompareError> {
    check_finite(x, SeriesRole::Predicted)?;
    check_finite(y, SeriesRole::Actual)?;
    compute(x, y)
}

fn check_finite(values: &[f64], series: SeriesRole) -> Result<(), CompareError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(position) => Err(CompareError::NonFinite { series, position }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Core
// ---------------------------------------------------------------------------

fn compute(x: &[f64], y: &[f64]) -> Result<Comparison, CompareError> {
    if x.is_empty() || y.is_empty() || x.len() != y.len() {
        return Err(CompareError::InputMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }

    let pairs: Vec<PairedSample> = x
        .iter()
        .zip(y)
        .map(|(&x, &y)| PairedSample { x, y })
        .collect();

    let n = pairs.len();
    let nf = n as f64;

    let mean_x = pairs.iter().map(|p| p.x).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|p| p.y).sum::<f64>() / nf;

    // SS_res doubles as the RMSE numerator.
    let ss_res: f64 = pairs.iter().map(|p| (p.y - p.x).powi(2)).sum();
    let rmse = (ss_res / nf).sqrt();

    // Check constancy on the raw values; the mean of a constant 0.1 series is inexact.
    let ss_tot: f64 = pairs.iter().map(|p| (p.y - mean_y).powi(2)).sum();
    if is_constant(y) || ss_tot == 0.0 {
        return Err(CompareError::DegenerateInput {
            series: SeriesRole::Actual,
        });
    }
    let r_squared = 1.0 - ss_res / ss_tot;

    let ss_x: f64 = pairs.iter().map(|p| (p.x - mean_x).powi(2)).sum();
    if is_constant(x) || ss_x == 0.0 {
        return Err(CompareError::DegenerateInput {
            series: SeriesRole::Predicted,
        });
    }
    let cross: f64 = pairs
        .iter()
        .map(|p| (p.x - mean_x) * (p.y - mean_y))
        .sum();
    let correlation = cross / (ss_x.sqrt() * ss_tot.sqrt());

    Ok(Comparison {
        result: ComparisonResult {
            n,
            mean_x,
            mean_y,
            rmse,
            r_squared,
            correlation,
        },
        scatter: scatter_projection(&pairs),
    })
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|&v| v == values[0])
}

/// One point per pair, stably sorted by ascending `x`.
fn scatter_projection(pairs: &[PairedSample]) -> Vec<ScatterPoint> {
    let mut points: Vec<ScatterPoint> = pairs
        .iter()
        .enumerate()
        .map(|(index, p)| ScatterPoint { x: p.x, y: p.y, index })
        .collect();
    points.sort_by(|a, b| a.x.total_cmp(&b.x));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn series(values: &[f64]) -> NumericSeries {
        NumericSeries::new("test", values.to_vec())
    }

    #[test]
    fn identical_series_fit_perfectly() {
        let s = series(&[1.0, 2.0, 3.0, 4.0]);
        let cmp = compare(&s, &s).unwrap();
        assert_eq!(cmp.result.n, 4);
        assert_eq!(cmp.result.rmse, 0.0);
        assert_eq!(cmp.result.r_squared, 1.0);
        assert!((cmp.result.correlation - 1.0).abs() < 1e-12);
        assert_eq!(cmp.result.mean_x, 2.5);
        assert_eq!(cmp.result.mean_y, 2.5);
    }

    #[test]
    fn constant_offset_keeps_correlation_but_hurts_r_squared() {
        let cmp = compare(&series(&[1.0, 2.0, 3.0]), &series(&[2.0, 3.0, 4.0])).unwrap();
        assert_eq!(cmp.result.rmse, 1.0);
        assert!((cmp.result.correlation - 1.0).abs() < 1e-12);
        assert_eq!(cmp.result.r_squared, -0.5);
        assert_eq!(cmp.result.mean_x, 2.0);
        assert_eq!(cmp.result.mean_y, 3.0);
    }

    #[test]
    fn length_mismatch_names_both_lengths() {
        let err = compare(&series(&[1.0, 2.0]), &series(&[1.0, 2.0, 3.0])).unwrap_err();
        assert_eq!(err, CompareError::InputMismatch { x_len: 2, y_len: 3 });
        let msg = err.to_string();
        assert!(msg.contains('2') && msg.contains('3'), "{msg}");
    }

    #[test]
    fn empty_series_is_a_mismatch() {
        let err = compare(&series(&[]), &series(&[])).unwrap_err();
        assert_eq!(err, CompareError::InputMismatch { x_len: 0, y_len: 0 });

        let err = compare(&series(&[1.0]), &series(&[])).unwrap_err();
        assert_eq!(err, CompareError::InputMismatch { x_len: 1, y_len: 0 });
    }

    #[test]
    fn constant_predicted_is_degenerate() {
        let err = compare(&series(&[5.0, 5.0, 5.0]), &series(&[1.0, 2.0, 3.0])).unwrap_err();
        assert_eq!(
            err,
            CompareError::DegenerateInput {
                series: SeriesRole::Predicted
            }
        );
    }

    #[test]
    fn constant_actual_is_degenerate() {
        let err = compare(&series(&[1.0, 2.0, 3.0]), &series(&[4.0, 4.0, 4.0])).unwrap_err();
        assert_eq!(
            err,
            CompareError::DegenerateInput {
                series: SeriesRole::Actual
            }
        );
    }

    #[test]
    fn constant_inexact_values_are_degenerate() {
        let err = compare_values(&[1.0, 2.0, 3.0], &[0.1, 0.1, 0.1]).unwrap_err();
        assert_eq!(
            err,
            CompareError::DegenerateInput {
                series: SeriesRole::Actual
            }
        );

        let err = compare_values(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            CompareError::DegenerateInput {
                series: SeriesRole::Predicted
            }
        );
    }

    #[test]
    fn single_sample_is_degenerate() {
        let err = compare(&series(&[1.0]), &series(&[2.0])).unwrap_err();
        assert!(matches!(err, CompareError::DegenerateInput { .. }));
    }

    #[test]
    fn scatter_is_sorted_by_x_and_keeps_row_positions() {
        let cmp = compare(&series(&[3.0, 1.0, 2.0]), &series(&[30.0, 10.0, 25.0])).unwrap();
        let xs: Vec<f64> = cmp.scatter.iter().map(|p| p.x).collect();
        let idx: Vec<usize> = cmp.scatter.iter().map(|p| p.index).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(idx, vec![1, 2, 0]);
        assert_eq!(cmp.scatter[0].y, 10.0);
    }

    #[test]
    fn compare_values_rejects_nan() {
        let err = compare_values(&[1.0, f64::NAN], &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            CompareError::NonFinite {
                series: SeriesRole::Predicted,
                position: 1
            }
        );
    }

    #[test]
    fn compare_values_matches_compare() {
        let x = [1.5, 2.5, 2.0, 4.0];
        let y = [1.0, 3.0, 2.5, 3.5];
        let a = compare_values(&x, &y).unwrap();
        let b = compare(&series(&x), &series(&y)).unwrap();
        assert_eq!(a, b);
    }

    fn varied_pair() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
        (2usize..40).prop_flat_map(|n| {
            (
                prop::collection::vec(-1e3f64..1e3, n),
                prop::collection::vec(-1e3f64..1e3, n),
            )
        })
    }

    proptest! {
        /// Property: identical input gives bit-identical output
        #[test]
        fn compare_is_deterministic((x, y) in varied_pair()) {
            let a = compare_values(&x, &y);
            let b = compare_values(&x, &y);
            prop_assert_eq!(a, b);
        }

        /// Property: a series predicts itself with zero error
        #[test]
        fn self_comparison_has_zero_rmse(x in prop::collection::vec(-1e3f64..1e3, 2..40)) {
            if let Ok(cmp) = compare_values(&x, &x) {
                prop_assert_eq!(cmp.result.rmse, 0.0);
                prop_assert_eq!(cmp.result.r_squared, 1.0);
            }
        }

        /// Property: swapping sides leaves correlation unchanged
        #[test]
        fn correlation_is_symmetric((x, y) in varied_pair()) {
            if let (Ok(a), Ok(b)) = (compare_values(&x, &y), compare_values(&y, &x)) {
                prop_assert_eq!(a.result.correlation, b.result.correlation);
            }
        }

        /// Property: the projection has one point per pair
        #[test]
        fn scatter_preserves_count((x, y) in varied_pair()) {
            if let Ok(cmp) = compare_values(&x, &y) {
                prop_assert_eq!(cmp.scatter.len(), x.len());
                prop_assert_eq!(cmp.result.n, y.len());
            }
        }
    }
}
