use eframe::egui;

use crate::media::StagedImage;

/// Decoded picture bounded to `max_size`, captioned with name and size.
pub fn render(ui: &mut egui::Ui, image: &StagedImage, max_size: egui::Vec2) {
    ui.add(
        egui::Image::from_bytes(image.texture_uri(), image.bytes.clone())
            .max_size(max_size)
            .corner_radius(egui::CornerRadius::same(6)),
    )
    .on_hover_text(image.media_type);
    ui.label(egui::RichText::new(image.summary()).weak().small());
}
