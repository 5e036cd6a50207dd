use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color::ResidualColorMap;
use crate::config::Settings;
use crate::data::cache::SeriesCache;
use crate::data::compare::compare;
use crate::data::grade::{Grades, grade};
use crate::data::loader::{self, ColumnSelector, SourceFormat};
use crate::data::model::{Comparison, NumericSeries, SeriesRole};

// ---------------------------------------------------------------------------
// Loaded series slot
// ---------------------------------------------------------------------------

/// Where a slot's series was read from.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotSource {
    /// Built in memory, nothing to reload.
    Memory,
    /// One value column of a single file, read with the current selector.
    File(PathBuf),
    /// The PREDICTED or TARGET column of a combined forecast file.
    Combined(PathBuf),
}

/// A series together with its origin.
#[derive(Debug, Clone)]
pub struct SeriesSlot {
    pub source: SlotSource,
    pub series: NumericSeries,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Column read from each uploaded file.
    pub selector: ColumnSelector,

    /// Predicted values (X). None until the user loads a file.
    pub predicted: Option<SeriesSlot>,

    /// Actual values (Y). None until the user loads a file.
    pub actual: Option<SeriesSlot>,

    /// Latest successful comparison. Cleared whenever an input changes.
    pub comparison: Option<Comparison>,
    pub grades: Option<Grades>,
    pub color_map: Option<ResidualColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    cache: SeriesCache,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            selector: settings.input.selector(),
            cache: SeriesCache::new(settings.cache.capacity),
            settings,
            predicted: None,
            actual: None,
            comparison: None,
            grades: None,
            color_map: None,
            status_message: None,
        }
    }

    pub fn slot(&self, role: SeriesRole) -> Option<&SeriesSlot> {
        match role {
            SeriesRole::Predicted => self.predicted.as_ref(),
            SeriesRole::Actual => self.actual.as_ref(),
        }
    }

    fn slot_mut(&mut self, role: SeriesRole) -> &mut Option<SeriesSlot> {
        match role {
            SeriesRole::Predicted => &mut self.predicted,
            SeriesRole::Actual => &mut self.actual,
        }
    }

    /// Read one column from `path` through the content cache.
    fn read_series(&mut self, path: &Path) -> Result<NumericSeries> {
        let format = SourceFormat::from_path(path)?;
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let label = loader::source_label(path);
        let selector = self.selector.clone();
        let mut series = self.cache.get_or_parse(&bytes, &selector, |b| {
            loader::parse_series(b, format, &label, &selector)
        })?;
        // A hit may come from a different file with the same bytes.
        series.label = format!("{label} [{selector}]");
        Ok(series)
    }

    /// Load a file into one slot. On failure the slot keeps its old content.
    pub fn load_file(&mut self, role: SeriesRole, path: &Path) {
        match self.read_series(path) {
            Ok(series) => {
                self.status_message = series
                    .is_empty()
                    .then(|| format!("No numeric values found in {}", series.label));
                self.set_series(role, SlotSource::File(path.to_path_buf()), series);
            }
            Err(e) => self.report_error(&format!("Failed to load {role} file"), &e),
        }
    }

    /// Load both slots from one `<POLLUTANT> PREDICTED / TARGET` CSV.
    pub fn load_combined(&mut self, path: &Path) {
        let pollutant = self.settings.input.pollutant.clone();
        match loader::load_paired(path, &pollutant) {
            Ok((x, y)) => {
                let source = SlotSource::Combined(path.to_path_buf());
                self.set_series(SeriesRole::Predicted, source.clone(), x);
                self.set_series(SeriesRole::Actual, source, y);
                self.status_message = None;
            }
            Err(e) => self.report_error("Failed to load forecast file", &e),
        }
    }

    pub fn set_series(&mut self, role: SeriesRole, source: SlotSource, series: NumericSeries) {
        *self.slot_mut(role) = Some(SeriesSlot { source, series });
        self.clear_result();
    }

    /// Change the value column and re-read single-column files with it.
    /// Combined files are named by pollutant, not by column, and stay as they
    /// are. A slot whose file can no longer be read is emptied so it never
    /// holds values from the previous column.
    pub fn set_selector(&mut self, selector: ColumnSelector) {
        if selector == self.selector {
            return;
        }
        self.selector = selector;
        for role in [SeriesRole::Predicted, SeriesRole::Actual] {
            let path = match self.slot(role).map(|s| &s.source) {
                Some(SlotSource::File(path)) => path.clone(),
                _ => continue,
            };
            match self.read_series(&path) {
                Ok(series) => self.set_series(role, SlotSource::File(path), series),
                Err(e) => {
                    *self.slot_mut(role) = None;
                    self.report_error(&format!("Failed to reload {role} file"), &e);
                }
            }
        }
        self.clear_result();
    }

    /// Compare the loaded series. Either the whole result is published or
    /// nothing is.
    pub fn run_compare(&mut self) {
        self.clear_result();
        let empty = NumericSeries::default();
        let x = self.predicted.as_ref().map_or(&empty, |s| &s.series);
        let y = self.actual.as_ref().map_or(&empty, |s| &s.series);

        match compare(x, y) {
            Ok(cmp) => {
                self.grades = Some(grade(&cmp.result, &self.settings.grading));
                self.color_map = Some(ResidualColorMap::new(cmp.scatter.iter().map(|p| p.residual())));
                self.comparison = Some(cmp);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Comparison failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Forget both inputs and the result. The cache is kept.
    pub fn reset(&mut self) {
        self.predicted = None;
        self.actual = None;
        self.status_message = None;
        self.clear_result();
    }

    pub fn clear_cache(&mut self) {
        log::debug!("Clearing {} cached series", self.cache.len());
        self.cache.clear();
    }

    pub fn cached_series(&self) -> usize {
        self.cache.len()
    }

    fn clear_result(&mut self) {
        self.comparison = None;
        self.grades = None;
        self.color_map = None;
    }

    fn report_error(&mut self, what: &str, e: &anyhow::Error) {
        log::error!("{what}: {e:#}");
        self.status_message = Some(format!("Error: {e:#}"));
    }
}
