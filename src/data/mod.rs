/// Data layer: core types, loading, comparison.
///
/// Architecture:
/// ```text
///  predicted.csv         actual.csv
///        │                    │
///        ▼                    ▼
///   ┌──────────┐  digest  ┌──────────┐
///   │  cache    │◄───────►│  loader   │  pick one column → NumericSeries
///   └──────────┘          └──────────┘
///        │  X                 │  Y
///        └────────┬───────────┘
///                 ▼
///           ┌──────────┐
///           │ compare   │  RMSE / R² / r + scatter projection
///           └──────────┘
///                 │
///                 ▼
///           ┌──────────┐
///           │  grade    │  Good / Fair / Poor per metric
///           └──────────┘
/// ```

pub mod cache;
pub mod compare;
pub mod grade;
pub mod loader;
pub mod model;
