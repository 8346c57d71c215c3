mod app;
mod color;
mod data;
mod state;
mod ui;

use app::SalesDashApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // The only CLI input: an optional path to a sales file to open at startup.
    let initial_path = std::env::args().nth(1).map(std::path::PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SalesDash – Supermarket Sales",
        options,
        Box::new(|_cc| Ok(Box::new(SalesDashApp::new(initial_path)))),
    )
}
