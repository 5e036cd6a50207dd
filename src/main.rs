use airq_compare::app::AirqCompareApp;
use airq_compare::config::Settings;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{e}; falling back to default settings");
            Settings::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.viewer.width, settings.viewer.height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "airq-compare – Predicted vs Actual",
        options,
        Box::new(|_cc| Ok(Box::new(AirqCompareApp::new(settings)))),
    )
}
