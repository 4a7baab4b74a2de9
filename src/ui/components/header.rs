use eframe::egui;

use crate::common::HealthStatus;
use crate::ui::state::AppState;

const DISCLAIMER: &str = "IMPORTANT MEDICAL DISCLAIMER: This chatbot provides general medical \
information and should NOT replace professional medical advice. Always consult a licensed \
healthcare provider for personalized medical guidance, diagnosis, and treatment.";

const PRIVACY_NOTICE: &str = "By using MediBot, you agree to our Terms and Privacy Policy. \
Don't share sensitive personal medical information.";

pub fn render(ui: &mut egui::Ui, state: &mut AppState, api_base_url: &str) {
    ui.horizontal(|ui| {
        ui.heading("MediBot");
        ui.label(egui::RichText::new("AI Medical Assistant").weak().small());

        let (color, hint) = status_indicator(state.health());
        ui.colored_label(color, "●").on_hover_text(hint);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(egui::RichText::new(api_base_url).weak().small());
        });
    });

    if state.show_disclaimer {
        let dismissed = banner(ui, egui::Color32::from_rgb(90, 30, 30), |ui| {
            ui.colored_label(egui::Color32::from_rgb(255, 200, 200), DISCLAIMER);
        });
        if dismissed {
            state.show_disclaimer = false;
        }
    }

    if state.show_privacy_notice {
        let dismissed = banner(ui, egui::Color32::from_gray(45), |ui| {
            ui.label(PRIVACY_NOTICE);
        });
        if dismissed {
            state.show_privacy_notice = false;
        }
    }
}

fn status_indicator(health: &HealthStatus) -> (egui::Color32, String) {
    match health {
        HealthStatus::Unknown => (egui::Color32::GRAY, "Checking service status...".to_string()),
        HealthStatus::Unreachable => (egui::Color32::RED, "Service unreachable".to_string()),
        HealthStatus::Reachable {
            ai_configured,
            version,
        } => {
            let version = version
                .as_deref()
                .map(|v| format!(" (v{v})"))
                .unwrap_or_default();
            if *ai_configured {
                (egui::Color32::GREEN, format!("Image analysis available{version}"))
            } else {
                (egui::Color32::YELLOW, format!("Image analysis unavailable{version}"))
            }
        }
    }
}

/// Dismissible full-width banner; returns true when the close button was clicked.
fn banner(ui: &mut egui::Ui, fill: egui::Color32, body: impl FnOnce(&mut egui::Ui)) -> bool {
    let mut dismissed = false;
    egui::Frame::new()
        .fill(fill)
        .inner_margin(egui::Margin::same(6))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                if ui.small_button("✖").clicked() {
                    dismissed = true;
                }
                ui.add_space(4.0);
                body(ui);
            });
        });
    dismissed
}
