//! HTTP client for the captured-mail API.

use serde::Deserialize;
use thiserror::Error;

use super::types::{MessageDetail, SearchRequest, SearchResponse};

/// Failures surfaced by the API. Both variants end up as a textual error on
/// the owning view; neither is fatal to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or protocol failure before a well-formed response arrived.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Well-formed response signaling failure (HTTP error body, missing
    /// expected field).
    #[error("{0}")]
    Application(String),
}

/// Response of the re-delivery endpoint. `Success` may be absent entirely,
/// which counts as "nothing happened", not as success.
#[derive(Debug, Deserialize)]
struct MailResult {
    #[serde(rename = "Success", default)]
    success: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Unfiltered list of stored messages: `POST /list` with an empty body.
    pub async fn list(&self) -> Result<SearchResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}/list", self.base_url))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Field-scoped, date-bounded search: `POST /search`.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(request)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Fetch one message by id: `GET /search/{id}`. The server answers with
    /// a singleton `Emails` array; only the first element is used.
    pub async fn message(&self, id: u64) -> Result<MessageDetail, ApiError> {
        let response = self
            .client
            .get(format!("{}/search/{}", self.base_url, id))
            .send()
            .await?;
        let body: SearchResponse = check(response).await?.json().await?;
        body.emails
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| ApiError::Application(format!("message {} not found", id)))
    }

    /// Trigger re-delivery of a stored message: `GET /mail/{id}`. Returns
    /// whether the server confirmed delivery.
    pub async fn redeliver(&self, id: u64) -> Result<bool, ApiError> {
        let response = self
            .client
            .get(format!("{}/mail/{}", self.base_url, id))
            .send()
            .await?;
        let result: MailResult = check(response).await?.json().await?;
        Ok(result.success == Some(true))
    }
}

/// Turn HTTP error statuses into application errors carrying the server's
/// error text, the way the server reports them.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    let detail = detail.trim();
    if detail.is_empty() {
        Err(ApiError::Application(format!("server returned {}", status)))
    } else {
        Err(ApiError::Application(format!("{} ({})", detail, status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://127.0.0.1:8080/api/");
        assert_eq!(client.base_url(), "http://127.0.0.1:8080/api");
    }

    #[test]
    fn test_mail_result_absent_success_is_not_success() {
        let result: MailResult = serde_json::from_str("{}").unwrap();
        assert_ne!(result.success, Some(true));

        let result: MailResult = serde_json::from_str(r#"{"Success":true}"#).unwrap();
        assert_eq!(result.success, Some(true));

        let result: MailResult = serde_json::from_str(r#"{"Success":false}"#).unwrap();
        assert_eq!(result.success, Some(false));
    }
}
