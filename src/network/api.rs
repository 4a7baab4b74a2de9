use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::common::{ChatRequest, ChatResponse, HealthResponse};

use super::error::{ApiError, extract_detail};

/// HTTP client for the assistant service's `/health` and `/chat` endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|err| ApiError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url,
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let response = self.http.get(self.endpoint("health")).send().await?;
        decode(response).await
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        log::debug!(
            "POST /chat ({} chars, image: {})",
            request.message.len(),
            request.image_data.is_some()
        );
        let response = self
            .http
            .post(self.endpoint("chat"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            detail: extract_detail(&body),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn rejects_invalid_base_urls() {
        let err = ApiClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));

        let err = ApiClient::new("ftp://example.com", Duration::from_secs(1)).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn normalizes_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint("chat"), "http://localhost:8000/chat");
    }

    #[tokio::test]
    async fn test_health_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "timestamp": "2025-01-01T00:00:00",
                "google_ai_configured": true,
                "version": "2.0"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let health = client_for(&server).health().await.unwrap();
        assert!(health.google_ai_configured);
        assert_eq!(health.version.as_deref(), Some("2.0"));
    }

    #[tokio::test]
    async fn test_health_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
            .mount(&server)
            .await;

        let err = client_for(&server).health().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "Error: {err}");
    }

    #[tokio::test]
    async fn test_chat_sends_message_and_null_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({"message": "What is ibuprofen?", "image_data": null})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "Ibuprofen is an NSAID.",
                "medication_info": {"name": "Ibuprofen", "purpose": "Pain relief"},
                "confidence": 0.8,
                "timestamp": "2025-01-01T00:00:00",
                "sources": ["FDA Database"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = ChatRequest {
            message: "What is ibuprofen?".to_string(),
            image_data: None,
        };
        let response = client_for(&server).chat(&request).await.unwrap();

        assert_eq!(response.response, "Ibuprofen is an NSAID.");
        assert_eq!(response.medication_info.unwrap().name, "Ibuprofen");
        assert_eq!(response.confidence, Some(0.8));
    }

    #[tokio::test]
    async fn test_chat_sends_image_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({
                "message": "",
                "image_data": "data:image/png;base64,iVBORw0KGgo="
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let request = ChatRequest {
            message: String::new(),
            image_data: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
        };
        let response = client_for(&server).chat(&request).await.unwrap();
        assert_eq!(response.response, "ok");
    }

    #[tokio::test]
    async fn test_chat_server_error_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"detail": "model unavailable"})),
            )
            .mount(&server)
            .await;

        let request = ChatRequest {
            message: "hi".to_string(),
            image_data: None,
        };
        let err = client_for(&server).chat(&request).await.unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(err.detail(), "model unavailable");
    }

    #[tokio::test]
    async fn test_chat_error_without_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let request = ChatRequest {
            message: "hi".to_string(),
            image_data: None,
        };
        let err = client_for(&server).chat(&request).await.unwrap_err();
        assert_eq!(err.detail(), "request failed with status code 502");
    }

    #[tokio::test]
    async fn test_chat_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Duration::from_millis(100)).unwrap();
        let request = ChatRequest {
            message: "hi".to_string(),
            image_data: None,
        };
        let err = client.chat(&request).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(ref e) if e.is_timeout()), "Error: {err}");
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Nothing listens on port 1.
        let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "Error: {err}");
    }
}
