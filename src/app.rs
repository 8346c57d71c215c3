use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashApp {
    pub state: AppState,
}

impl SalesDashApp {
    /// Optionally load a dataset before the first frame.
    pub fn new(initial_path: Option<PathBuf>) -> Self {
        let mut state = AppState::default();
        if let Some(path) = initial_path {
            state.load_path(&path);
        }
        Self { state }
    }
}

impl eframe::App for SalesDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs + charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &self.state);
        });
    }
}
