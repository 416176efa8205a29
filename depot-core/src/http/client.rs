use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ClientError;

/// Header carrying the credential on every authenticated call
pub const API_KEY_HEADER: &str = "X-API-Key";

pub const DEFAULT_API_PREFIX: &str = "/api";

/// Helper function to normalize URLs by handling trailing slashes
pub fn normalize_url(base_url: &str, path: &str) -> String {
    let mut normalized_base = base_url.trim_end_matches('/').to_string();
    let normalized_path = path.trim_start_matches('/');

    normalized_base.push('/');
    normalized_base.push_str(normalized_path);
    normalized_base
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    server: String,
    api_prefix: String,
    timeout: Option<Duration>,
}

pub struct HttpClientBuilder {
    server: String,
    api_prefix: String,
    timeout: Option<Duration>,
}

impl HttpClientBuilder {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: None,
        }
    }

    pub fn with_api_prefix(mut self, api_prefix: impl Into<String>) -> Self {
        self.api_prefix = api_prefix.into();
        self
    }

    /// Requests never time out unless a timeout is set here
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpClient, ClientError> {
        let mut client_builder = reqwest::Client::builder();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(HttpClient {
            client,
            server: self.server.trim_end_matches('/').to_string(),
            api_prefix: self.api_prefix,
            timeout: self.timeout,
        })
    }
}

impl HttpClient {
    pub fn builder(server: impl Into<String>) -> HttpClientBuilder {
        HttpClientBuilder::new(server)
    }

    /// `{server}{api_prefix}/{path}`
    pub fn api_url(&self, path: &str) -> String {
        normalize_url(&normalize_url(&self.server, &self.api_prefix), path)
    }

    /// URL outside the API prefix, e.g. the public `/file/{name}` route
    pub fn public_url(&self, path: &str) -> String {
        normalize_url(&self.server, path)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.api_url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.api_url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.api_url(path))
    }

    /// Attach the credential header
    pub fn authorized(request: RequestBuilder, api_key: &SecretString) -> RequestBuilder {
        request.header(API_KEY_HEADER, api_key.expose_secret())
    }

    /// Send a request; only transport failures are errors here
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let request = request.build()?;
        info!("{} request to {}", request.method(), request.url());
        Ok(self.client.execute(request).await?)
    }

    /// Send a request and turn any non-2xx response into a classified error
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = Self::extract_error_message(response).await;
        debug!("Request failed with {}: {}", status, message);
        Err(ClientError::from_status(status.as_u16(), message))
    }

    pub async fn send_json<T>(&self, request: RequestBuilder) -> Result<T, ClientError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.send(request).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Helper function to extract error message from response body
    pub(crate) async fn extract_error_message(response: Response) -> String {
        let status = response.status();

        match response.text().await {
            Ok(body) => {
                if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
                    for field in ["error", "message"] {
                        if let Some(message) = json.get(field).and_then(|m| m.as_str()) {
                            return message.to_string();
                        }
                    }
                }
                let body = body.trim_end();
                if !body.is_empty() {
                    return body.to_string();
                }
                Self::status_text(status)
            }
            Err(_) => Self::status_text(status),
        }
    }

    fn status_text(status: reqwest::StatusCode) -> String {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error: {}", status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[test]
    fn test_url_normalization_with_trailing_slash() {
        assert_eq!(
            normalize_url("https://depot/", "api/list"),
            "https://depot/api/list"
        );
        assert_eq!(
            normalize_url("https://depot", "/api/list"),
            "https://depot/api/list"
        );
        assert_eq!(
            normalize_url("https://depot///", "///api/list"),
            "https://depot/api/list"
        );
    }

    #[test]
    fn test_api_and_public_urls() {
        let client = HttpClient::builder("https://depot.example.com/")
            .build()
            .unwrap();
        assert_eq!(client.api_url("list"), "https://depot.example.com/api/list");
        assert_eq!(
            client.public_url("file/1.txt"),
            "https://depot.example.com/file/1.txt"
        );
        assert_eq!(client.timeout(), None);
    }

    #[test]
    fn test_custom_api_prefix() {
        let client = HttpClient::builder("http://localhost:8080")
            .with_api_prefix("/storage/api/")
            .build()
            .unwrap();
        assert_eq!(
            client.api_url("/upload"),
            "http://localhost:8080/storage/api/upload"
        );
    }

    #[tokio::test]
    async fn test_send_extracts_json_error_field() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/list"))
            .and(header(API_KEY_HEADER, "secret"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "disk full"})),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::builder(mock_server.uri()).build().unwrap();
        let key = SecretString::from("secret".to_string());
        let err = client
            .send(HttpClient::authorized(client.get("list"), &key))
            .await
            .unwrap_err();

        assert!(err.is_server_error());
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.user_message(), "disk full");
    }

    #[tokio::test]
    async fn test_send_uses_plain_text_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/list"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string("Access denied. Invalid or missing API Key.\n"),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::builder(mock_server.uri()).build().unwrap();
        let err = client.send(client.get("list")).await.unwrap_err();

        assert!(err.is_auth_error());
        assert_eq!(
            err.user_message(),
            "Access denied. Invalid or missing API Key."
        );
    }

    #[tokio::test]
    async fn test_send_keeps_long_plain_text_body() {
        let mock_server = MockServer::start().await;
        let detail = format!("Failed to store upload: {}", "quota exceeded; ".repeat(40));
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(500).set_body_string(format!("{detail}\n")))
            .mount(&mock_server)
            .await;

        let client = HttpClient::builder(mock_server.uri()).build().unwrap();
        let err = client.send(client.post("upload")).await.unwrap_err();

        assert!(detail.len() > 600);
        assert_eq!(err.user_message(), detail.trim_end());
    }

    #[tokio::test]
    async fn test_send_falls_back_to_status_text() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/list"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = HttpClient::builder(mock_server.uri()).build().unwrap();
        let err = client.send(client.get("list")).await.unwrap_err();

        assert_eq!(err.user_message(), "Not Found");
    }
}
