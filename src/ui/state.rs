use crate::common::{ApiEvent, ChatMessage, ChatRequest, ChatResponse, HealthStatus};

use super::composer::Composer;

/// Append-only, ordered list of messages; the single source of truth for
/// what the chat area renders.
#[derive(Debug)]
pub struct MessageStore {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl MessageStore {
    /// A store seeded with the welcome message.
    pub fn new() -> Self {
        let mut store = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        let id = store.allocate_id();
        store.messages.push(ChatMessage::welcome(id));
        store
    }

    /// Ids come from a counter, so two messages created in the same
    /// instant still get distinct, increasing ids.
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn append(&mut self, build: impl FnOnce(u64) -> ChatMessage) {
        let id = self.allocate_id();
        self.messages.push(build(id));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Local UI state.
///
/// Also owns the send state machine: `idle -> sending -> idle`, with at
/// most one `/chat` request in flight.
pub struct AppState {
    pub store: MessageStore,
    pub composer: Composer,
    loading: bool,
    health: HealthStatus,
    pub show_disclaimer: bool,
    pub show_privacy_notice: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            store: MessageStore::new(),
            composer: Composer::default(),
            loading: false,
            health: HealthStatus::Unknown,
            show_disclaimer: true,
            show_privacy_notice: true,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn health(&self) -> &HealthStatus {
        &self.health
    }

    /// Whether the remote image-analysis capability is enabled. Only feeds
    /// the status indicator; never gates sending.
    pub fn api_configured(&self) -> bool {
        self.health.ai_configured()
    }

    pub fn can_send(&self) -> bool {
        !self.loading && self.composer.has_content()
    }

    /// `idle -> sending`. Appends the user message, clears the composer and
    /// raises the loading flag, returning the request to deliver. Returns
    /// `None` without touching anything when a request is already in flight
    /// or there is nothing to send.
    pub fn begin_send(&mut self) -> Option<ChatRequest> {
        if self.loading {
            log::debug!("Send rejected: a request is already in flight");
            return None;
        }
        if !self.composer.has_content() {
            return None;
        }

        let (text, image) = self.composer.take();
        let request = ChatRequest {
            message: text.clone(),
            image_data: image.as_ref().map(|image| image.data_uri.clone()),
        };
        self.store.append(|id| ChatMessage::user(id, text, image));
        self.loading = true;

        Some(request)
    }

    /// `sending -> idle`. `Err` carries the failure detail to show. Any
    /// image staged while the request was in flight is discarded too, so
    /// the composer holds no image once a send settles.
    pub fn finish_send(&mut self, outcome: Result<ChatResponse, String>) {
        if !self.loading {
            log::warn!("Ignoring chat result with no request in flight");
            return;
        }

        match outcome {
            Ok(response) => self.store.append(|id| ChatMessage::reply(id, response)),
            Err(detail) => self.store.append(|id| ChatMessage::failure(id, &detail)),
        }
        self.loading = false;
        self.composer.clear_image();
        log::debug!("Conversation now has {} messages", self.store.len());
    }

    pub fn handle_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::HealthChecked(health) => self.health = health.into(),
            ApiEvent::HealthFailed(_) => self.health = HealthStatus::Unreachable,
            ApiEvent::ChatReplied(response) => self.finish_send(Ok(response)),
            ApiEvent::ChatFailed(detail) => self.finish_send(Err(detail)),
            ApiEvent::ImageStaged { generation, image } => {
                self.composer.finish_staging(generation, Ok(image));
            }
            ApiEvent::ImageRejected { generation, reason } => {
                self.composer.finish_staging(generation, Err(reason));
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{HealthResponse, MedicationInfo, Sender};
    use crate::media::{self, DEFAULT_MAX_IMAGE_BYTES};

    fn reply(text: &str) -> ChatResponse {
        ChatResponse {
            response: text.to_string(),
            medication_info: None,
            confidence: None,
            sources: None,
        }
    }

    fn send_text(state: &mut AppState, text: &str) -> Option<ChatRequest> {
        state.composer.text = text.to_string();
        state.begin_send()
    }

    #[test]
    fn starts_with_welcome_message() {
        let state = AppState::new();
        assert_eq!(state.store.len(), 1);
        let welcome = state.store.last().unwrap();
        assert_eq!(welcome.id, 1);
        assert_eq!(welcome.sender, Sender::Bot);
        assert!(!state.is_loading());
        assert!(!state.api_configured());
    }

    #[test]
    fn each_send_adds_two_messages() {
        let mut state = AppState::new();
        for n in 1..=5 {
            send_text(&mut state, &format!("question {n}")).unwrap();
            if n % 2 == 0 {
                state.finish_send(Err("boom".to_string()));
            } else {
                state.finish_send(Ok(reply("answer")));
            }
            assert_eq!(state.store.len(), 1 + 2 * n);
        }
    }

    #[test]
    fn ids_strictly_increase() {
        let mut state = AppState::new();
        send_text(&mut state, "a").unwrap();
        state.finish_send(Ok(reply("b")));
        send_text(&mut state, "c").unwrap();
        state.finish_send(Ok(reply("d")));

        let ids: Vec<u64> = state.store.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn blank_send_is_a_no_op() {
        let mut state = AppState::new();
        assert!(send_text(&mut state, "").is_none());
        assert!(send_text(&mut state, "   \n ").is_none());
        assert_eq!(state.store.len(), 1);
        assert!(!state.is_loading());
        // Whitespace stays in the composer untouched.
        assert_eq!(state.composer.text, "   \n ");
    }

    #[test]
    fn send_is_optimistic() {
        let mut state = AppState::new();
        let request = send_text(&mut state, "What is aspirin?").unwrap();

        assert_eq!(request.message, "What is aspirin?");
        assert!(request.image_data.is_none());
        assert!(state.is_loading());
        assert!(state.composer.text.is_empty());

        let user = state.store.last().unwrap();
        assert_eq!(user.sender, Sender::User);
        assert_eq!(user.text, "What is aspirin?");
        assert!(user.image.is_none());
    }

    #[test]
    fn second_send_while_loading_is_rejected() {
        let mut state = AppState::new();
        send_text(&mut state, "first").unwrap();

        assert!(!state.can_send());
        assert!(send_text(&mut state, "second").is_none());
        assert_eq!(state.store.len(), 2);
        // The rejected text is still pending for the next attempt.
        assert_eq!(state.composer.text, "second");

        state.finish_send(Ok(reply("done")));
        assert_eq!(state.store.len(), 3);
        assert!(state.can_send());
    }

    #[test]
    fn composer_empty_and_idle_after_resolution() {
        for outcome in [Ok(reply("fine")), Err("down".to_string())] {
            let mut state = AppState::new();
            let image =
                media::encode("a.png", &[0x89, 0x50, 0x4E, 0x47], DEFAULT_MAX_IMAGE_BYTES).unwrap();
            state.composer.stage_image(image);
            send_text(&mut state, "look").unwrap();

            state.finish_send(outcome);

            assert!(!state.is_loading());
            assert!(state.composer.text.is_empty());
            assert!(state.composer.image().is_none());
        }
    }

    #[test]
    fn image_only_send_carries_data_uri() {
        let mut state = AppState::new();
        let image =
            media::encode("box.png", &[0x89, 0x50, 0x4E, 0x47], DEFAULT_MAX_IMAGE_BYTES).unwrap();
        let data_uri = image.data_uri.clone();
        state.composer.stage_image(image);

        let request = state.begin_send().unwrap();

        assert_eq!(request.message, "");
        assert_eq!(request.image_data.as_deref(), Some(data_uri.as_str()));
        let user = state.store.last().unwrap();
        assert_eq!(user.image.as_ref().unwrap().data_uri, data_uri);
    }

    #[test]
    fn success_appends_bot_reply() {
        let mut state = AppState::new();
        send_text(&mut state, "hi").unwrap();
        state.handle_event(ApiEvent::ChatReplied(ChatResponse {
            response: "X".to_string(),
            medication_info: None,
            confidence: Some(0.9),
            sources: None,
        }));

        let bot = state.store.last().unwrap();
        assert_eq!(bot.sender, Sender::Bot);
        assert_eq!(bot.text, "X");
        assert!(bot.medication_info.is_none());
        assert_eq!(bot.confidence, Some(0.9));
        assert!(!bot.is_error);
    }

    #[test]
    fn reply_keeps_medication_info() {
        let mut state = AppState::new();
        send_text(&mut state, "tylenol?").unwrap();
        state.handle_event(ApiEvent::ChatReplied(ChatResponse {
            response: "Acetaminophen".to_string(),
            medication_info: Some(MedicationInfo {
                name: "Acetaminophen".to_string(),
                purpose: Some("Pain reliever".to_string()),
                dosage: None,
                warnings: Some("Liver warning".to_string()),
                interactions: None,
                side_effects: None,
            }),
            confidence: None,
            sources: Some(vec!["FDA Database".to_string()]),
        }));

        let bot = state.store.last().unwrap();
        assert_eq!(bot.medication_info.as_ref().unwrap().name, "Acetaminophen");
        assert_eq!(bot.sources, vec!["FDA Database".to_string()]);
    }

    #[test]
    fn failure_appends_error_message() {
        let mut state = AppState::new();
        send_text(&mut state, "hi").unwrap();
        state.handle_event(ApiEvent::ChatFailed("model unavailable".to_string()));

        let bot = state.store.last().unwrap();
        assert_eq!(bot.sender, Sender::Bot);
        assert!(bot.is_error);
        assert!(bot.text.contains("model unavailable"));
        assert!(!state.is_loading());

        // The conversation stays usable.
        assert!(send_text(&mut state, "again").is_some());
    }

    #[test]
    fn stray_result_is_ignored() {
        let mut state = AppState::new();
        state.finish_send(Ok(reply("unexpected")));
        assert_eq!(state.store.len(), 1);
    }

    #[test]
    fn health_failure_only_affects_indicator() {
        let mut state = AppState::new();
        state.handle_event(ApiEvent::HealthFailed("connection refused".to_string()));

        assert_eq!(state.health(), &HealthStatus::Unreachable);
        assert!(!state.api_configured());
        assert_eq!(state.store.len(), 1);
        assert!(!state.is_loading());
    }

    #[test]
    fn health_success_sets_capability() {
        let mut state = AppState::new();
        state.handle_event(ApiEvent::HealthChecked(HealthResponse {
            google_ai_configured: true,
            status: None,
            version: Some("2.0".to_string()),
            timestamp: None,
        }));
        assert!(state.api_configured());

        // Capability never gates sending.
        state.handle_event(ApiEvent::HealthChecked(HealthResponse {
            google_ai_configured: false,
            status: None,
            version: None,
            timestamp: None,
        }));
        assert!(!state.api_configured());
        assert!(send_text(&mut state, "still works").is_some());
    }

    #[test]
    fn markup_never_touches_stored_text() {
        let mut state = AppState::new();
        send_text(&mut state, "**bold**").unwrap();

        let lines = crate::ui::markup::expand(&state.store.last().unwrap().text);
        assert_eq!(lines[0].spans[0].text, "bold");
        assert_eq!(lines[0].spans[0].emphasis, crate::ui::markup::Emphasis::Strong);
        assert_eq!(state.store.last().unwrap().text, "**bold**");
    }

    #[test]
    fn image_events_update_composer() {
        let mut state = AppState::new();
        let generation = state.composer.begin_staging();
        state.handle_event(ApiEvent::ImageRejected {
            generation,
            reason: "too large".to_string(),
        });
        assert_eq!(state.composer.notice(), Some("too large"));

        let generation = state.composer.begin_staging();
        let image = media::encode("a.gif", b"GIF89a", DEFAULT_MAX_IMAGE_BYTES).unwrap();
        state.handle_event(ApiEvent::ImageStaged { generation, image });
        assert!(state.composer.notice().is_none());
        assert_eq!(state.composer.image().unwrap().file_name, "a.gif");
    }

    fn png(name: &str) -> crate::media::StagedImage {
        media::encode(name, &[0x89, 0x50, 0x4E, 0x47], DEFAULT_MAX_IMAGE_BYTES).unwrap()
    }

    #[test]
    fn slower_older_pick_does_not_replace_newer_one() {
        let mut state = AppState::new();
        let older = state.composer.begin_staging();
        let newer = state.composer.begin_staging();

        // The small file finishes first, the big one last.
        state.handle_event(ApiEvent::ImageStaged {
            generation: newer,
            image: png("newer-small.png"),
        });
        state.handle_event(ApiEvent::ImageStaged {
            generation: older,
            image: png("older-big.png"),
        });

        assert_eq!(state.composer.image().unwrap().file_name, "newer-small.png");
    }

    #[test]
    fn removed_image_does_not_reappear_when_load_finishes() {
        let mut state = AppState::new();
        state.composer.stage_image(png("first.png"));
        let pending = state.composer.begin_staging();

        state.composer.clear_image();
        state.handle_event(ApiEvent::ImageStaged {
            generation: pending,
            image: png("late.png"),
        });

        assert!(state.composer.image().is_none());
        assert!(!state.can_send());
    }

    #[test]
    fn image_staged_during_send_is_cleared_when_it_settles() {
        for outcome in [Ok(reply("fine")), Err("down".to_string())] {
            let mut state = AppState::new();
            send_text(&mut state, "first").unwrap();
            assert!(state.is_loading());

            let generation = state.composer.begin_staging();
            state.handle_event(ApiEvent::ImageStaged {
                generation,
                image: png("while-loading.png"),
            });
            assert!(state.composer.image().is_some());

            state.finish_send(outcome);

            assert!(!state.is_loading());
            assert!(state.composer.image().is_none());
        }
    }

    #[test]
    fn load_in_flight_when_send_settles_is_dropped() {
        let mut state = AppState::new();
        send_text(&mut state, "first").unwrap();
        let pending = state.composer.begin_staging();

        state.finish_send(Ok(reply("done")));
        state.handle_event(ApiEvent::ImageStaged {
            generation: pending,
            image: png("late.png"),
        });

        assert!(state.composer.image().is_none());
    }

    #[test]
    fn default_matches_new() {
        let state = AppState::default();
        assert_eq!(state.store.len(), 1);
        assert_eq!(MessageStore::default().len(), 1);
    }
}
