use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// SeriesRole – which side of the comparison a series sits on
// ---------------------------------------------------------------------------

/// The two sides of a comparison. Predicted is the estimate (X), actual is
/// the ground truth (Y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SeriesRole {
    Predicted,
    Actual,
}

impl fmt::Display for SeriesRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesRole::Predicted => write!(f, "predicted (X)"),
            SeriesRole::Actual => write!(f, "actual (Y)"),
        }
    }
}

// ---------------------------------------------------------------------------
// NumericSeries – one column of one file
// ---------------------------------------------------------------------------

/// An ordered run of finite values pulled from a single column.
///
/// Cells that failed to parse were dropped before they got here; `dropped`
/// only counts them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericSeries {
    /// Human-readable origin, usually the file name plus column.
    pub label: String,
    values: Vec<f64>,
    /// Rows skipped because the cell was missing or not a finite number.
    pub dropped: usize,
}

impl NumericSeries {
    /// Build a series, discarding any non-finite entries.
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        let total = values.len();
        let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        let dropped = total - values.len();
        NumericSeries {
            label: label.into(),
            values,
            dropped,
        }
    }

    pub(crate) fn from_parts(label: String, values: Vec<f64>, dropped: usize) -> Self {
        debug_assert!(values.iter().all(|v| v.is_finite()));
        NumericSeries {
            label,
            values,
            dropped,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PairedSample / ScatterPoint
// ---------------------------------------------------------------------------

/// One (predicted, actual) pair sharing a row position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedSample {
    pub x: f64,
    pub y: f64,
}

/// A scatter-plot record. `index` is the pair's original row position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub index: usize,
}

impl ScatterPoint {
    /// Absolute residual `|y - x|`, used for colouring.
    pub fn residual(&self) -> f64 {
        (self.y - self.x).abs()
    }
}

// ---------------------------------------------------------------------------
// ComparisonResult – the fit statistics
// ---------------------------------------------------------------------------

/// Fit statistics for one pair of series, treating Y as ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub n: usize,
    pub mean_x: f64,
    pub mean_y: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub correlation: f64,
}

/// Everything one `compare` call produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    #[serde(flatten)]
    pub result: ComparisonResult,
    /// Pairs sorted by ascending `x` for plotting.
    pub scatter: Vec<ScatterPoint>,
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} rmse={:.4} r2={:.4} r={:.4} mean_x={:.4} mean_y={:.4}",
            self.n, self.rmse, self.r_squared, self.correlation, self.mean_x, self.mean_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_series_drops_non_finite_values() {
        let s = NumericSeries::new("pm25", vec![1.0, f64::NAN, 2.0, f64::INFINITY]);
        assert_eq!(s.values(), &[1.0, 2.0]);
        assert_eq!(s.dropped, 2);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn comparison_serializes_flat() {
        let cmp = Comparison {
            result: ComparisonResult {
                n: 1,
                mean_x: 1.0,
                mean_y: 2.0,
                rmse: 1.0,
                r_squared: 0.0,
                correlation: 0.0,
            },
            scatter: vec![ScatterPoint { x: 1.0, y: 2.0, index: 0 }],
        };
        let json = serde_json::to_value(&cmp).unwrap();
        assert_eq!(json["n"], 1);
        assert_eq!(json["rmse"], 1.0);
        assert_eq!(json["scatter"][0]["index"], 0);
    }
}
