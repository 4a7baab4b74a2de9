use std::path::Path;

use tokio::sync::mpsc;

use crate::common::{ApiCommand, ApiEvent, ChatRequest};
use crate::media;

use super::api::ApiClient;

/// Background worker: receives [`ApiCommand`]s from the UI, performs the
/// I/O, and reports the outcome as [`ApiEvent`]s.
pub struct ApiWorker {
    client: ApiClient,
    max_image_bytes: usize,
    event_sender: mpsc::Sender<ApiEvent>,
    command_receiver: mpsc::Receiver<ApiCommand>,
}

impl ApiWorker {
    pub fn new(
        client: ApiClient,
        max_image_bytes: usize,
        event_sender: mpsc::Sender<ApiEvent>,
        command_receiver: mpsc::Receiver<ApiCommand>,
    ) -> Self {
        Self {
            client,
            max_image_bytes,
            event_sender,
            command_receiver,
        }
    }

    pub async fn run(mut self) {
        log::info!("API worker started for {}", self.client.base_url());

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command);
        }

        log::info!("Command channel closed; API worker exiting");
    }

    // Each command runs on its own task so a slow health probe never
    // delays a chat send.
    fn handle_command(&self, command: ApiCommand) {
        let client = self.client.clone();
        let events = self.event_sender.clone();
        let max_image_bytes = self.max_image_bytes;

        tokio::spawn(async move {
            let event = match command {
                ApiCommand::CheckHealth => probe_health(&client).await,
                ApiCommand::SendChat(request) => send_chat(&client, &request).await,
                ApiCommand::StageImage { path, generation } => {
                    stage_image(&path, max_image_bytes, generation).await
                }
            };

            if let Err(err) = events.send(event).await {
                log::warn!("Failed to notify UI: {err}");
            }
        });
    }
}

pub async fn probe_health(client: &ApiClient) -> ApiEvent {
    match client.health().await {
        Ok(health) => {
            log::info!(
                "API health: status={:?} version={:?} image analysis={}",
                health.status,
                health.version,
                health.google_ai_configured
            );
            ApiEvent::HealthChecked(health)
        }
        Err(err) => {
            log::error!("API health check failed: {err}");
            ApiEvent::HealthFailed(err.to_string())
        }
    }
}

pub async fn send_chat(client: &ApiClient, request: &ChatRequest) -> ApiEvent {
    match client.chat(request).await {
        Ok(response) => {
            log::info!(
                "Chat reply received ({} chars, medication info: {})",
                response.response.len(),
                response.medication_info.is_some()
            );
            ApiEvent::ChatReplied(response)
        }
        Err(err) => {
            log::error!("Error sending message: {err}");
            ApiEvent::ChatFailed(err.detail())
        }
    }
}

pub async fn stage_image(path: &Path, max_image_bytes: usize, generation: u64) -> ApiEvent {
    match media::load(path, max_image_bytes).await {
        Ok(image) => ApiEvent::ImageStaged { generation, image },
        Err(err) => {
            log::warn!("Could not stage image {}: {err}", path.display());
            ApiEvent::ImageRejected {
                generation,
                reason: err.to_string(),
            }
        }
    }
}
