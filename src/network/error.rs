use thiserror::Error;

/// Errors that can occur when talking to the assistant service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid API base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The request could not complete (connect failure, timeout, reset).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("request failed with status code {status}")]
    Status { status: u16, detail: Option<String> },

    /// The body could not be decoded into the expected shape.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Most specific human-readable description: the server-supplied
    /// `detail` when there is one, else the error itself.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Pull `detail` out of an error body. FastAPI sends either a string or a
/// list of validation errors.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) if text.trim().is_empty() => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_prefers_server_message() {
        let err = ApiError::Status {
            status: 503,
            detail: Some("model unavailable".to_string()),
        };
        assert_eq!(err.detail(), "model unavailable");
    }

    #[test]
    fn detail_falls_back_to_display() {
        let err = ApiError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(err.detail(), "request failed with status code 500");
    }

    #[test]
    fn extract_detail_handles_shapes() {
        assert_eq!(
            extract_detail(r#"{"detail": "Internal server error: boom"}"#).as_deref(),
            Some("Internal server error: boom")
        );
        assert_eq!(extract_detail(r#"{"detail": null}"#), None);
        assert_eq!(extract_detail(r#"{"detail": "  "}"#), None);
        assert_eq!(extract_detail("<html>bad gateway</html>"), None);
        assert_eq!(extract_detail(r#"{"error": "x"}"#), None);

        let list = extract_detail(r#"{"detail": [{"loc": ["body", "message"], "msg": "field required"}]}"#)
            .unwrap();
        assert!(list.contains("field required"));
    }
}
