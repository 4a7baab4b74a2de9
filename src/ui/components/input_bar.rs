use std::path::PathBuf;

use eframe::egui;

use crate::ui::composer::Composer;

#[derive(Default)]
pub struct InputBarActions {
    pub send: bool,
    pub stage_path: Option<PathBuf>,
}

pub fn render(ui: &mut egui::Ui, composer: &mut Composer, can_send: bool) -> InputBarActions {
    let mut actions = InputBarActions::default();

    ui.horizontal(|ui| {
        ui.label("📎");
        let path_edit = egui::TextEdit::singleline(&mut composer.image_path)
            .hint_text("Image path (or drop a file on the window)")
            .desired_width(280.0);
        let response = ui.add(path_edit);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (ui.button("Attach").clicked() || submitted) && !composer.image_path.trim().is_empty() {
            actions.stage_path = Some(PathBuf::from(composer.image_path.trim()));
        }
    });

    if let Some(notice) = composer.notice() {
        ui.colored_label(egui::Color32::from_rgb(255, 150, 80), notice);
    }

    ui.horizontal(|ui| {
        let text_id = ui.make_persistent_id("composer_text");
        let focused = ui.memory(|m| m.has_focus(text_id));
        let enter_pressed = focused
            && ui.input_mut(|i| {
                let pressed = i.key_pressed(egui::Key::Enter) && is_send_shortcut(i.modifiers);
                if pressed {
                    i.consume_key(egui::Modifiers::NONE, egui::Key::Enter);
                }
                pressed
            });

        let send_width = 70.0;
        let text_edit = egui::TextEdit::multiline(&mut composer.text)
            .id(text_id)
            .hint_text("Ask about medications, symptoms, or upload an image...")
            .desired_rows(2)
            .desired_width(ui.available_width() - send_width);
        ui.add(text_edit);

        let clicked = ui
            .add_enabled(can_send, egui::Button::new("Send"))
            .clicked();

        if (clicked || enter_pressed) && can_send {
            actions.send = true;
        }
    });

    ui.label(
        egui::RichText::new(
            "MediBot provides general medical information only. Always consult healthcare professionals for medical advice.",
        )
        .weak()
        .small(),
    );

    actions
}

/// Bare Enter sends; Enter with any modifier is left to the text edit.
fn is_send_shortcut(modifiers: egui::Modifiers) -> bool {
    modifiers.is_none()
}
