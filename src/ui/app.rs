use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{ApiCommand, ApiEvent};
use crate::media;

use super::components::{chat_area, header, image_preview, input_bar};
use super::state::AppState;

pub struct ChatApp {
    state: AppState,
    api_base_url: String,
    max_image_bytes: usize,
    command_sender: mpsc::Sender<ApiCommand>,
    event_receiver: mpsc::Receiver<ApiEvent>,
}

impl ChatApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        api_base_url: String,
        max_image_bytes: usize,
        command_sender: mpsc::Sender<ApiCommand>,
        event_receiver: mpsc::Receiver<ApiEvent>,
    ) -> Self {
        // Decoders for the png/jpeg/gif/webp thumbnails.
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let app = Self {
            state: AppState::new(),
            api_base_url,
            max_image_bytes,
            command_sender,
            event_receiver,
        };
        // Probe once on mount.
        if let Err(err) = app.command_sender.try_send(ApiCommand::CheckHealth) {
            log::warn!("Failed to schedule health check: {err}");
        }
        app
    }

    fn handle_api_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.state.handle_event(event);
        }
    }

    fn send(&mut self) {
        let Some(request) = self.state.begin_send() else {
            return;
        };
        if let Err(err) = self.command_sender.try_send(ApiCommand::SendChat(request)) {
            log::error!("Failed to send command to network: {err}");
            // Resolve right away so the loading flag cannot stick.
            self.state
                .finish_send(Err(format!("could not reach the network worker ({err})")));
        }
    }

    fn stage_image(&mut self, path: PathBuf) {
        let generation = self.state.composer.begin_staging();
        if let Err(err) = self
            .command_sender
            .try_send(ApiCommand::StageImage { path, generation })
        {
            log::warn!("Failed to send command to network: {err}");
            self.state
                .composer
                .reject_image("Could not load the image right now".to_string());
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        // Only one image can be staged; the last dropped file wins.
        let Some(file) = dropped.into_iter().last() else {
            return;
        };

        if let Some(path) = file.path {
            self.stage_image(path);
        } else if let Some(bytes) = file.bytes {
            match media::encode(&file.name, &bytes, self.max_image_bytes) {
                Ok(image) => self.state.composer.stage_image(image),
                Err(err) => self.state.composer.reject_image(err.to_string()),
            }
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_api_events();
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            header::render(ui, &mut self.state, &self.api_base_url);
        });

        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
            ui.add_space(4.0);
            image_preview::render(ui, &mut self.state.composer);
            let can_send = self.state.can_send();
            let actions = input_bar::render(ui, &mut self.state.composer, can_send);
            if let Some(path) = actions.stage_path {
                self.stage_image(path);
            }
            if actions.send {
                self.send();
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            chat_area::render(ui, self.state.store.messages(), self.state.is_loading());
        });

        // Worker replies arrive over a channel; keep polling for them.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
