use eframe::egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotPoints, Points};

use crate::color::ResidualColorMap;
use crate::data::model::ScatterPoint;
use crate::state::AppState;

/// Number of colour buckets the points are grouped into.
const RESIDUAL_BINS: usize = 6;

// ---------------------------------------------------------------------------
// Predicted vs actual scatter (central panel)
// ---------------------------------------------------------------------------

/// Render the scatter plot in the central panel.
pub fn scatter_plot(ui: &mut Ui, state: &AppState) {
    let (comparison, color_map) = match (&state.comparison, &state.color_map) {
        (Some(cmp), Some(cm)) => (cmp, cm),
        _ => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Load predicted and actual files, then press Compare");
            });
            return;
        }
    };

    let bins = bin_by_residual(&comparison.scatter, color_map);

    // Reference diagonal across the full data range.
    let (lo, hi) = comparison
        .scatter
        .iter()
        .flat_map(|p| [p.x, p.y])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    Plot::new("scatter_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Predicted (X)")
        .y_axis_label("Actual (Y)")
        .data_aspect(1.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(vec![[lo, lo], [hi, hi]]))
                    .name("y = x")
                    .color(Color32::GRAY)
                    .width(1.0),
            );

            for (name, color, points) in bins {
                if points.is_empty() {
                    continue;
                }
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(&name)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

/// Group points into residual buckets so each bucket gets one colour and one
/// legend entry.
fn bin_by_residual(
    scatter: &[ScatterPoint],
    color_map: &ResidualColorMap,
) -> Vec<(String, Color32, Vec<[f64; 2]>)> {
    let legend = color_map.legend_entries(RESIDUAL_BINS);
    let max = scatter.iter().map(ScatterPoint::residual).fold(0.0_f64, f64::max);

    let mut bins: Vec<(String, Color32, Vec<[f64; 2]>)> = legend
        .into_iter()
        .map(|(label, color)| (label, color, Vec::new()))
        .collect();

    for p in scatter {
        let idx = if max > 0.0 {
            ((p.residual() / max) * (RESIDUAL_BINS - 1) as f64).round() as usize
        } else {
            0
        };
        bins[idx.min(RESIDUAL_BINS - 1)].2.push([p.x, p.y]);
    }
    bins
}
