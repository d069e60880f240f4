//! Single network exchange plus response classification.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::request::RequestDescriptor;
use super::ApiError;

/// Normalized success payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    /// Non-JSON or empty 2xx body, passed through untouched.
    Text(String),
    /// 204 No Content.
    NoContent,
}

impl ApiResponse {
    pub fn is_no_content(&self) -> bool {
        matches!(self, ApiResponse::NoContent)
    }

    /// Deserialize a JSON payload, treating any other shape as malformed.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            ApiResponse::Json(value) => serde_json::from_value(value)
                .map_err(|e| ApiError::MalformedResponse(format!("unexpected JSON shape: {}", e))),
            ApiResponse::Text(text) => Err(ApiError::MalformedResponse(format!(
                "expected JSON, got: {}",
                ApiError::truncate_body(&text)
            ))),
            ApiResponse::NoContent => Err(ApiError::MalformedResponse(
                "expected JSON, got no content".to_string(),
            )),
        }
    }
}

/// Sends exactly one request per `execute` call. Never retries and never
/// touches credentials.
#[derive(Clone)]
pub struct RequestExecutor {
    client: Client,
}

impl RequestExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn execute(
        &self,
        request: &RequestDescriptor,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = body {
            // Serialized by hand so the Content-Type from the descriptor is kept
            builder = builder.body(serde_json::to_vec(body).map_err(|e| {
                ApiError::InvalidRequest(format!("failed to encode request body: {}", e))
            })?);
        }

        let response = builder.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        let text = response.text().await?;

        debug!(method = %request.method, path = %request.url.path(), status = status.as_u16(), "API response");
        classify(status, is_json, text)
    }
}

fn classify(status: StatusCode, is_json: bool, body: String) -> Result<ApiResponse, ApiError> {
    if status == StatusCode::NO_CONTENT {
        return Ok(ApiResponse::NoContent);
    }
    if !status.is_success() {
        if status != StatusCode::UNAUTHORIZED {
            warn!(status = status.as_u16(), "API request failed");
        }
        return Err(ApiError::from_status(status, &body));
    }
    if is_json && !body.trim().is_empty() {
        return serde_json::from_str(&body).map(ApiResponse::Json).map_err(|e| {
            ApiError::MalformedResponse(format!("{}: {}", e, ApiError::truncate_body(&body)))
        });
    }
    Ok(ApiResponse::Text(body))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_no_content_is_never_parsed() {
        let result = classify(StatusCode::NO_CONTENT, true, "{not json".to_string()).unwrap();
        assert_eq!(result, ApiResponse::NoContent);
    }

    #[test]
    fn test_json_success() {
        let result = classify(StatusCode::OK, true, r#"{"results":[]}"#.to_string()).unwrap();
        assert_eq!(result, ApiResponse::Json(json!({"results": []})));
    }

    #[test]
    fn test_malformed_json() {
        let err = classify(StatusCode::OK, true, "{oops".to_string()).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[test]
    fn test_text_and_empty_bodies() {
        assert_eq!(
            classify(StatusCode::OK, false, "plain".to_string()).unwrap(),
            ApiResponse::Text("plain".to_string())
        );
        assert_eq!(
            classify(StatusCode::CREATED, true, String::new()).unwrap(),
            ApiResponse::Text(String::new())
        );
    }

    #[test]
    fn test_failure_statuses() {
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, true, "{}".to_string()),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            classify(StatusCode::CONFLICT, false, "stale version".to_string()),
            Err(ApiError::RequestFailed { status: 409, ref message }) if message == "stale version"
        ));
    }

    #[test]
    fn test_json_rejects_other_shapes() {
        assert!(matches!(
            ApiResponse::NoContent.json::<Value>(),
            Err(ApiError::MalformedResponse(_))
        ));
        assert!(matches!(
            ApiResponse::Text("hi".to_string()).json::<Value>(),
            Err(ApiError::MalformedResponse(_))
        ));
        assert_eq!(ApiResponse::Json(json!(3)).json::<u32>().unwrap(), 3);
    }
}
