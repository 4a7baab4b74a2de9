use crate::media::StagedImage;

use super::types::{ChatResponse, HealthResponse};

/// Outcomes reported by the network worker to the UI.
#[derive(Debug, Clone)]
pub enum ApiEvent {
    HealthChecked(HealthResponse),
    HealthFailed(String),
    ChatReplied(ChatResponse),
    /// Carries the most specific failure detail available.
    ChatFailed(String),
    ImageStaged { generation: u64, image: StagedImage },
    ImageRejected { generation: u64, reason: String },
}
