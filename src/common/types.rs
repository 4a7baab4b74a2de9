use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::media::StagedImage;

pub const WELCOME_TEXT: &str = "🏥 **Welcome to MediBot!**

I'm your AI-powered medical information assistant. I can help you with:

📷 **Image Analysis** - Upload photos of medication packaging
💊 **Drug Information** - Get details about medications and dosages
🩺 **Symptom Guidance** - Receive general advice for common health concerns
⚕️ **OTC Recommendations** - Suggestions for over-the-counter options

**How to get started:**
1. Type your medical question in the chat
2. Upload an image of medication packaging for analysis
3. Ask about symptoms, side effects, or drug interactions

What can I help you with today?";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single entry in the conversation.
///
/// Messages are immutable once appended to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Only on user messages that carried an upload.
    pub image: Option<StagedImage>,
    /// Only on bot messages.
    pub medication_info: Option<MedicationInfo>,
    pub confidence: Option<f64>,
    pub sources: Vec<String>,
    pub is_error: bool,
}

impl ChatMessage {
    pub fn welcome(id: u64) -> Self {
        Self::bot_text(id, WELCOME_TEXT.to_string(), false)
    }

    pub fn user(id: u64, text: String, image: Option<StagedImage>) -> Self {
        Self {
            id,
            sender: Sender::User,
            text,
            timestamp: Utc::now(),
            image,
            medication_info: None,
            confidence: None,
            sources: Vec::new(),
            is_error: false,
        }
    }

    pub fn reply(id: u64, response: ChatResponse) -> Self {
        Self {
            medication_info: response.medication_info,
            confidence: response.confidence,
            sources: response.sources.unwrap_or_default(),
            ..Self::bot_text(id, response.response, false)
        }
    }

    /// Client-side failure report rendered in place of a bot answer.
    pub fn failure(id: u64, detail: &str) -> Self {
        let text = format!(
            "❌ Sorry, I encountered an error: {detail}. Please try again or check if the backend server is running."
        );
        Self::bot_text(id, text, true)
    }

    fn bot_text(id: u64, text: String, is_error: bool) -> Self {
        Self {
            id,
            sender: Sender::Bot,
            text,
            timestamp: Utc::now(),
            image: None,
            medication_info: None,
            confidence: None,
            sources: Vec::new(),
            is_error,
        }
    }
}

/// Structured metadata about a recognised medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationInfo {
    pub name: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub warnings: Option<String>,
    #[serde(default)]
    pub interactions: Option<Vec<String>>,
    #[serde(default)]
    pub side_effects: Option<Vec<String>>,
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Data URI; serialized as `null` when no image was staged.
    pub image_data: Option<String>,
}

/// Successful body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub medication_info: Option<MedicationInfo>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub google_ai_configured: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// What the last health probe told us about the remote service.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Unreachable,
    Reachable {
        ai_configured: bool,
        version: Option<String>,
    },
}

impl HealthStatus {
    pub fn ai_configured(&self) -> bool {
        matches!(
            self,
            HealthStatus::Reachable {
                ai_configured: true,
                ..
            }
        )
    }
}

impl From<HealthResponse> for HealthStatus {
    fn from(response: HealthResponse) -> Self {
        HealthStatus::Reachable {
            ai_configured: response.google_ai_configured,
            version: response.version,
        }
    }
}
