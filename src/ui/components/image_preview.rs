use eframe::egui;

use crate::ui::composer::Composer;

use super::thumbnail;

/// Staged-image preview above the input bar, with a remove button.
pub fn render(ui: &mut egui::Ui, composer: &mut Composer) {
    let Some(image) = composer.image() else {
        return;
    };

    let mut remove = false;
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            thumbnail::render(ui, image, egui::vec2(160.0, 120.0));
        });
        if ui.small_button("✖").on_hover_text("Remove image").clicked() {
            remove = true;
        }
    });

    if remove {
        composer.clear_image();
    }
}
