use serde_json::Value;
use thiserror::Error;

use crate::models::{RecommendationRecord, ResumeDraft};

const RECOMMEND_PATH: &str = "/recommend/";

pub const GENERIC_FAILURE: &str =
    "Failed to fetch recommendations. Please make sure the API server is running and reachable.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("{0}")]
    Transport(String),
}

impl RequestError {
    fn status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("request failed with status {}", status.as_u16())
        } else {
            body.to_string()
        };
        Self::Status {
            status: status.as_u16(),
            message,
        }
    }

    fn transport(message: impl ToString) -> Self {
        let message = message.to_string();
        if message.trim().is_empty() {
            Self::Transport(GENERIC_FAILURE.to_string())
        } else {
            Self::Transport(message)
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecommendClient {
    base_url: String,
    client: reqwest::Client,
}

impl RecommendClient {
    /// `base_url` is expected to be normalised already (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, RECOMMEND_PATH)
    }

    pub async fn fetch_recommendations(
        &self,
        draft: &ResumeDraft,
    ) -> Result<Vec<RecommendationRecord>, RequestError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(draft)
            .send()
            .await
            .map_err(RequestError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(RequestError::transport)?;

        if !status.is_success() {
            return Err(RequestError::status(status, &body));
        }

        parse_recommendations(&body)
    }
}

/// Decodes a success body. Anything that parses as JSON but is not an array
/// counts as zero results.
pub fn parse_recommendations(body: &str) -> Result<Vec<RecommendationRecord>, RequestError> {
    let value: Value = serde_json::from_str(body).map_err(RequestError::transport)?;
    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(RequestError::transport),
        other => {
            tracing::debug!(kind = json_kind(&other), "non-array response, treating as empty");
            Ok(Vec::new())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_with(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/recommend/"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = RecommendClient::new("http://127.0.0.1:8000");
        assert_eq!(client.endpoint(), "http://127.0.0.1:8000/recommend/");
    }

    #[tokio::test]
    async fn test_posts_draft_as_json() {
        let server = MockServer::start().await;
        let draft = ResumeDraft::sample();
        Mock::given(method("POST"))
            .and(path("/recommend/"))
            .and(header("content-type", "application/json"))
            .and(body_json(&draft))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let client = RecommendClient::new(server.uri());
        let records = client.fetch_recommendations(&draft).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_single_record_response() {
        let server = mock_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"title":"A","company":"X","location":"Remote","description":"d","requirements":"r"}]"#,
        ))
        .await;

        let records = RecommendClient::new(server.uri())
            .fetch_recommendations(&ResumeDraft::sample())
            .await
            .unwrap();

        assert_eq!(
            records,
            vec![RecommendationRecord {
                title: "A".to_string(),
                company: "X".to_string(),
                location: "Remote".to_string(),
                description: "d".to_string(),
                requirements: "r".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_records_keep_server_order() {
        let server = mock_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"title":"first"},{"title":"second","location":null},{"title":"third"}]"#,
        ))
        .await;

        let records = RecommendClient::new(server.uri())
            .fetch_recommendations(&ResumeDraft::sample())
            .await
            .unwrap();

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["first", "second", "third"]);
        assert_eq!(records[1].location, "");
    }

    #[tokio::test]
    async fn test_object_body_is_empty_result() {
        let server = mock_with(
            ResponseTemplate::new(200).set_body_string(r#"{"detail":"unexpected shape"}"#),
        )
        .await;

        let records = RecommendClient::new(server.uri())
            .fetch_recommendations(&ResumeDraft::sample())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_carries_body() {
        let server =
            mock_with(ResponseTemplate::new(500).set_body_string("internal error")).await;

        let err = RecommendClient::new(server.uri())
            .fetch_recommendations(&ResumeDraft::sample())
            .await
            .unwrap_err();

        assert!(matches!(err, RequestError::Status { status: 500, .. }));
        assert!(err.to_string().contains("internal error"));
    }

    #[tokio::test]
    async fn test_server_error_without_body_uses_status_message() {
        let server = mock_with(ResponseTemplate::new(503)).await;

        let err = RecommendClient::new(server.uri())
            .fetch_recommendations(&ResumeDraft::sample())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "request failed with status 503");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = RecommendClient::new(format!("http://127.0.0.1:{}", port))
            .fetch_recommendations(&ResumeDraft::sample())
            .await
            .unwrap_err();

        assert!(matches!(err, RequestError::Transport(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_malformed_success_body_is_transport_error() {
        let err = parse_recommendations("<html>oops</html>").unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)));
    }

    #[test]
    fn test_non_array_scalars_are_empty() {
        assert!(parse_recommendations("null").unwrap().is_empty());
        assert!(parse_recommendations("\"text\"").unwrap().is_empty());
        assert!(parse_recommendations("42").unwrap().is_empty());
    }

    #[test]
    fn test_blank_transport_message_falls_back() {
        assert_eq!(
            RequestError::transport("").to_string(),
            GENERIC_FAILURE.to_string()
        );
    }
}
