use eframe::egui;

use crate::common::{ChatMessage, Sender};
use crate::ui::markup::{self, Emphasis};

use super::{medication_card, thumbnail};

pub fn render(ui: &mut egui::Ui, messages: &[ChatMessage], loading: bool) {
    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for message in messages {
                let align = match message.sender {
                    Sender::User => egui::Align::Max,
                    Sender::Bot => egui::Align::Min,
                };
                ui.with_layout(egui::Layout::top_down(align), |ui| {
                    render_message(ui, message);
                });
                ui.add_space(8.0);
            }

            if loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(egui::RichText::new("Analyzing your request...").weak());
                });
            }
        });
}

fn bubble_fill(message: &ChatMessage) -> egui::Color32 {
    match (message.sender, message.is_error) {
        (Sender::User, _) => egui::Color32::from_gray(60),
        (Sender::Bot, true) => egui::Color32::from_rgb(80, 25, 25),
        (Sender::Bot, false) => egui::Color32::from_gray(35),
    }
}

fn render_message(ui: &mut egui::Ui, message: &ChatMessage) {
    let author = match message.sender {
        Sender::User => "You",
        Sender::Bot => "MediBot",
    };
    let time = message
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M");
    ui.label(egui::RichText::new(format!("{author} · {time}")).weak().small());

    egui::Frame::new()
        .fill(bubble_fill(message))
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::same(10))
        .show(ui, |ui| {
            ui.set_max_width(ui.available_width() * 0.8);
            ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                if let Some(image) = &message.image {
                    thumbnail::render(ui, image, egui::vec2(320.0, 240.0));
                }

                render_markup(ui, &message.text);

                if let Some(label) = markup::confidence_label(message.confidence) {
                    ui.label(egui::RichText::new(label).weak().small());
                }
            });
        });

    if let Some(info) = &message.medication_info {
        ui.add_space(4.0);
        medication_card::render(ui, info);
    }

    if !message.sources.is_empty() {
        ui.label(
            egui::RichText::new(format!("Sources: {}", message.sources.join(", ")))
                .weak()
                .small(),
        );
    }

    if message.sender == Sender::Bot
        && !message.is_error
        && ui.small_button("📋 Copy").on_hover_text("Copy message").clicked()
    {
        ui.ctx().copy_text(message.text.clone());
    }
}

fn render_markup(ui: &mut egui::Ui, text: &str) {
    for line in markup::expand(text) {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            if line.bullet {
                ui.label("  •  ");
            }
            for span in line.spans {
                let rich = egui::RichText::new(span.text);
                ui.label(match span.emphasis {
                    Emphasis::Plain => rich,
                    Emphasis::Strong => rich.strong(),
                    Emphasis::Italic => rich.italics(),
                });
            }
        });
    }
}
