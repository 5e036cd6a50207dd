//! Compare forecast (predicted) air-quality series against measured (actual)
//! ones: RMSE, R², Pearson correlation and a scatter projection.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
