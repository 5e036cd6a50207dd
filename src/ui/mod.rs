/// egui rendering: side/top panels and the central scatter plot.

pub mod panels;
pub mod plot;
