use eframe::egui;

use crate::data::loader;
use crate::state::{AppState, Tab};
use crate::ui::{panels, views};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AttriscopeApp {
    pub state: AppState,
}

impl Default for AttriscopeApp {
    fn default() -> Self {
        let mut state = AppState::default();

        // Single load of the source file; the table is immutable for the
        // rest of the session.
        match loader::load_default() {
            Ok(table) => {
                log::info!(
                    "Loaded {} records with columns {:?}",
                    table.len(),
                    table.column_names
                );
                state.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load default dataset: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }

        Self { state }
    }
}

impl eframe::App for AttriscopeApp {
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

        // ---- Central panel: tabbed views ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.table.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a file to explore attrition data  (File → Open…)");
                });
                return;
            }

            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.active_tab, tab, tab.label());
                }
            });
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.active_tab {
                    Tab::Overview => views::overview(ui, &self.state),
                    Tab::Breakdown => views::breakdown(ui, &self.state),
                    Tab::Drivers => views::drivers(ui, &self.state),
                    Tab::Demographics => views::demographics(ui, &self.state),
                    Tab::Data => views::data_downloads(ui, &mut self.state),
                });
        });
    }
}
