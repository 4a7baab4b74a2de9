use eframe::egui;

use crate::common::MedicationInfo;
use crate::ui::markup::{PREVIEW_CHARS, preview};

pub fn render(ui: &mut egui::Ui, info: &MedicationInfo) {
    egui::Frame::new()
        .fill(egui::Color32::from_rgb(20, 35, 60))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(40, 80, 140)))
        .corner_radius(egui::CornerRadius::same(6))
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new("📋 Medication Information")
                    .strong()
                    .color(egui::Color32::from_rgb(140, 180, 255)),
            );
            field(ui, "Name", &info.name);

            if let Some(purpose) = &info.purpose {
                field(ui, "Purpose", &preview(purpose, PREVIEW_CHARS));
            }
            if let Some(dosage) = &info.dosage {
                field(ui, "Dosage", &preview(dosage, PREVIEW_CHARS));
            }
            if let Some(side_effects) = non_empty(&info.side_effects) {
                field(ui, "Side effects", &preview(&side_effects.join(", "), PREVIEW_CHARS));
            }
            if let Some(interactions) = non_empty(&info.interactions) {
                field(ui, "Interactions", &preview(&interactions.join(", "), PREVIEW_CHARS));
            }
            if let Some(warnings) = &info.warnings {
                ui.horizontal_wrapped(|ui| {
                    ui.colored_label(egui::Color32::from_rgb(255, 120, 120), "⚠ Warnings:");
                    ui.colored_label(
                        egui::Color32::from_rgb(255, 200, 200),
                        preview(warnings, PREVIEW_CHARS),
                    );
                });
            }
        });
}

fn field(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal_wrapped(|ui| {
        ui.label(egui::RichText::new(format!("{label}:")).strong());
        ui.label(value);
    });
}

fn non_empty(items: &Option<Vec<String>>) -> Option<&[String]> {
    items.as_deref().filter(|items| !items.is_empty())
}
