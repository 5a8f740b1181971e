//! Control Panel Widget
//! Left side panel with the filter controls and data actions.

use crate::data::{AgeGroup, FilterSelection, IslandGroup};
use egui::{Color32, RichText};
use std::collections::BTreeSet;

/// Left side control panel with the filter selection and reload/export buttons.
pub struct ControlPanel {
    pub selection: FilterSelection,
    pub status: String,
    /// Disables the buttons while a load or export is running
    pub busy: bool,
}

impl ControlPanel {
    pub fn new(selection: FilterSelection) -> Self {
        Self {
            selection,
            status: "Ready".to_string(),
            busy: false,
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Filter Data")
                    .size(22.0)
                    .color(Color32::from_rgb(255, 75, 75)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Age Groups =====
        ui.label(RichText::new("Select Age Groups").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                for age in AgeGroup::ALL {
                    if toggle(ui, &mut self.selection.age_groups, age, age.label()) {
                        action = ControlPanelAction::FiltersChanged;
                    }
                }
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                self.selection.age_groups = AgeGroup::ALL.into_iter().collect();
                action = ControlPanelAction::FiltersChanged;
            }
            if ui.small_button("Clear All").clicked() {
                self.selection.age_groups.clear();
                action = ControlPanelAction::FiltersChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Island Groups =====
        ui.label(RichText::new("Select Island Group").size(14.0).strong());
        ui.add_space(5.0);

        for island in IslandGroup::SELECTABLE {
            if toggle(ui, &mut self.selection.island_groups, island, island.label()) {
                action = ControlPanelAction::FiltersChanged;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Cause Search =====
        ui.label(RichText::new("Search Complication").size(14.0).strong());
        ui.add_space(5.0);

        let search = egui::TextEdit::singleline(&mut self.selection.cause_search)
            .hint_text("e.g. Hypertension")
            .desired_width(f32::INFINITY);
        if ui.add(search).changed() {
            action = ControlPanelAction::FiltersChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.busy, |ui| {
                let reload = egui::Button::new(RichText::new("🔄 Reload Data").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(reload).clicked() {
                    action = ControlPanelAction::ReloadData;
                }

                ui.add_space(8.0);

                let export = egui::Button::new(RichText::new("💾 Export Report").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(export).clicked() {
                    action = ControlPanelAction::ExportReport;
                }
            });
        });

        ui.add_space(10.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Exported") || self.status.starts_with("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Checkbox bound to set membership. Returns true when toggled.
fn toggle<T: Ord + Copy>(
    ui: &mut egui::Ui,
    set: &mut BTreeSet<T>,
    item: T,
    label: &str,
) -> bool {
    let mut checked = set.contains(&item);
    if !ui.checkbox(&mut checked, label).changed() {
        return false;
    }
    if checked {
        set.insert(item);
    } else {
        set.remove(&item);
    }
    true
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    FiltersChanged,
    ReloadData,
    ExportReport,
}
