use serde::{Deserialize, Serialize};

use super::model::ComparisonResult;

/// Coarse quality grade for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Band {
    Good,
    Fair,
    Poor,
}

/// Band boundaries. RMSE is "lower is better", the scores are "higher is better".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_rmse_good")]
    pub rmse_good: f64,
    #[serde(default = "default_rmse_fair")]
    pub rmse_fair: f64,
    #[serde(default = "default_score_good")]
    pub score_good: f64,
    #[serde(default = "default_score_fair")]
    pub score_fair: f64,
}

fn default_rmse_good() -> f64 { 10.0 }
fn default_rmse_fair() -> f64 { 20.0 }
fn default_score_good() -> f64 { 0.8 }
fn default_score_fair() -> f64 { 0.6 }

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            rmse_good: default_rmse_good(),
            rmse_fair: default_rmse_fair(),
            score_good: default_score_good(),
            score_fair: default_score_fair(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grades {
    pub rmse: Band,
    pub r_squared: Band,
    pub correlation: Band,
}

pub fn grade(result: &ComparisonResult, t: &Thresholds) -> Grades {
    Grades {
        rmse: lower_is_better(result.rmse, t.rmse_good, t.rmse_fair),
        r_squared: higher_is_better(result.r_squared, t.score_good, t.score_fair),
        correlation: higher_is_better(result.correlation, t.score_good, t.score_fair),
    }
}

fn lower_is_better(v: f64, good: f64, fair: f64) -> Band {
    if v <= good {
        Band::Good
    } else if v <= fair {
        Band::Fair
    } else {
        Band::Poor
    }
}

fn higher_is_better(v: f64, good: f64, fair: f64) -> Band {
    if v >= good {
        Band::Good
    } else if v >= fair {
        Band::Fair
    } else {
        Band::Poor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rmse: f64, r_squared: f64, correlation: f64) -> ComparisonResult {
        ComparisonResult {
            n: 10,
            mean_x: 0.0,
            mean_y: 0.0,
            rmse,
            r_squared,
            correlation,
        }
    }

    #[test]
    fn boundaries_fall_into_the_better_band() {
        let g = grade(&result(10.0, 0.8, 0.6), &Thresholds::default());
        assert_eq!(g.rmse, Band::Good);
        assert_eq!(g.r_squared, Band::Good);
        assert_eq!(g.correlation, Band::Fair);

        let g = grade(&result(20.0, 0.6, 0.8), &Thresholds::default());
        assert_eq!(g.rmse, Band::Fair);
        assert_eq!(g.r_squared, Band::Fair);
        assert_eq!(g.correlation, Band::Good);
    }

    #[test]
    fn poor_values() {
        let g = grade(&result(20.5, -0.5, 0.1), &Thresholds::default());
        assert_eq!(
            g,
            Grades {
                rmse: Band::Poor,
                r_squared: Band::Poor,
                correlation: Band::Poor
            }
        );
    }

    #[test]
    fn custom_thresholds() {
        let t = Thresholds {
            rmse_good: 1.0,
            rmse_fair: 2.0,
            ..Thresholds::default()
        };
        assert_eq!(grade(&result(1.5, 1.0, 1.0), &t).rmse, Band::Fair);
    }
}
