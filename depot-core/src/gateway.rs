//! REST calls against the storage backend.
//!
//! [`CrudGateway`] is the seam between the controller and the network; the
//! production implementation is [`RestGateway`]. Every call except `login`
//! and the public file URLs carries the credential in the `X-API-Key` header.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use tracing::{error, info};

use crate::error::ClientError;
use crate::http::HttpClient;
use crate::record::{DeleteRequest, FileRecord, LoginRequest, LoginResponse, UploadReceipt};

/// Shown for a rejected login when the server did not say why
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Login failed. Please check your credentials.";

pub const NO_FILE_SELECTED_MESSAGE: &str = "Please choose a file first!";

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ClientError::validation(format!("{} is not a file", path.display()))
            })?
            .to_string();
        let content = tokio::fs::read(path).await?;
        Ok(Self { file_name, content })
    }
}

/// Reject an upload with no file before touching the network
pub fn require_file(file: Option<UploadFile>) -> Result<UploadFile, ClientError> {
    file.ok_or_else(|| ClientError::validation(NO_FILE_SELECTED_MESSAGE))
}

#[async_trait]
pub trait CrudGateway: Send + Sync {
    /// Exchange username/password for an API key
    async fn login(&self, username: &str, password: &SecretString)
        -> Result<SecretString, ClientError>;

    async fn list(&self, api_key: &SecretString) -> Result<Vec<FileRecord>, ClientError>;

    async fn upload(
        &self,
        api_key: &SecretString,
        file: &UploadFile,
    ) -> Result<UploadReceipt, ClientError>;

    /// Fetch file contents with the credential attached
    async fn download(
        &self,
        api_key: &SecretString,
        stored_name: &str,
    ) -> Result<Vec<u8>, ClientError>;

    /// Returns the server's confirmation text
    async fn delete(&self, api_key: &SecretString, stored_name: &str)
        -> Result<String, ClientError>;

    /// Unauthenticated URL of a stored file
    fn public_file_url(&self, stored_name: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct RestGateway {
    http: HttpClient,
}

impl RestGateway {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CrudGateway for RestGateway {
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, ClientError> {
        let request = self.http.post("login").json(&LoginRequest {
            username,
            password: password.expose_secret(),
        });

        let response = self.http.execute(request).await.inspect_err(|e| {
            error!("Login error: {}", e);
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|json| {
                    json.get("error")
                        .and_then(|e| e.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| INVALID_CREDENTIALS_MESSAGE.to_string());
            error!("Login rejected with {}: {}", status, message);
            return Err(ClientError::from_status(status.as_u16(), message));
        }

        let body = response.bytes().await?;
        let login: LoginResponse =
            serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))?;
        info!("Logged in as {}", username);
        Ok(SecretString::from(login.api_key))
    }

    async fn list(&self, api_key: &SecretString) -> Result<Vec<FileRecord>, ClientError> {
        let request = HttpClient::authorized(self.http.get("list"), api_key);
        self.http.send_json(request).await
    }

    async fn upload(
        &self,
        api_key: &SecretString,
        file: &UploadFile,
    ) -> Result<UploadReceipt, ClientError> {
        let part = Part::bytes(file.content.clone()).file_name(file.file_name.clone());
        let form = Form::new().part("file", part);
        let request = HttpClient::authorized(self.http.post("upload"), api_key).multipart(form);
        self.http.send_json(request).await
    }

    async fn download(
        &self,
        api_key: &SecretString,
        stored_name: &str,
    ) -> Result<Vec<u8>, ClientError> {
        let request = HttpClient::authorized(self.http.get("download"), api_key)
            .query(&[("name", stored_name)]);
        let response = self.http.send(request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn delete(
        &self,
        api_key: &SecretString,
        stored_name: &str,
    ) -> Result<String, ClientError> {
        let request = HttpClient::authorized(self.http.delete("delete"), api_key).json(
            &DeleteRequest {
                filename: stored_name,
            },
        );
        let response = self.http.send(request).await?;
        Ok(response.text().await?)
    }

    fn public_file_url(&self, stored_name: &str) -> String {
        self.http
            .public_url(&format!("file/{}", urlencoding::encode(stored_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::API_KEY_HEADER;
    use wiremock::{
        matchers::{body_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn gateway(server: &MockServer) -> RestGateway {
        RestGateway::new(HttpClient::builder(server.uri()).build().unwrap())
    }

    fn key() -> SecretString {
        SecretString::from("RahasiaAPIKey123".to_string())
    }

    #[tokio::test]
    async fn test_login_returns_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .and(body_json(serde_json::json!({"username": "admin", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"status": "success", "api_key": "RahasiaAPIKey123"}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let api_key = gateway(&server)
            .login("admin", &SecretString::from("pw".to_string()))
            .await
            .unwrap();
        assert_eq!(api_key.expose_secret(), "RahasiaAPIKey123");
    }

    #[tokio::test]
    async fn test_login_uses_server_error_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "bad password"})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server)
            .login("admin", &SecretString::from("nope".to_string()))
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
        assert_eq!(err.user_message(), "bad password");
    }

    #[tokio::test]
    async fn test_login_without_error_text_is_generic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid credentials\n"))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .login("admin", &SecretString::from("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), INVALID_CREDENTIALS_MESSAGE);
    }

    #[tokio::test]
    async fn test_list_sends_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/list"))
            .and(header(API_KEY_HEADER, "RahasiaAPIKey123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 2, "original_name": "b.txt", "stored_name": "2.txt", "upload_time": "2024-05-02T00:00:00Z", "file_size": 3},
                {"id": 1, "original_name": "a.txt", "stored_name": "1.txt", "upload_time": "2024-05-01T00:00:00Z", "file_size": 1}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let records = gateway(&server).list(&key()).await.unwrap();
        let names: Vec<_> = records.iter().map(|r| r.stored_name.as_str()).collect();
        assert_eq!(names, vec!["2.txt", "1.txt"]);
    }

    #[tokio::test]
    async fn test_download_sends_name_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/download"))
            .and(query_param("name", "my file.txt"))
            .and(header(API_KEY_HEADER, "RahasiaAPIKey123"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
            .mount(&server)
            .await;

        let bytes = gateway(&server)
            .download(&key(), "my file.txt")
            .await
            .unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_delete_sends_filename_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/delete"))
            .and(header(API_KEY_HEADER, "RahasiaAPIKey123"))
            .and(body_json(serde_json::json!({"filename": "1.txt"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("File '1.txt' successfully deleted."),
            )
            .mount(&server)
            .await;

        let text = gateway(&server).delete(&key(), "1.txt").await.unwrap();
        assert_eq!(text, "File '1.txt' successfully deleted.");
    }

    #[tokio::test]
    async fn test_delete_failure_text_is_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/delete"))
            .respond_with(ResponseTemplate::new(404).set_body_string("File not found\n"))
            .mount(&server)
            .await;

        let err = gateway(&server).delete(&key(), "9.txt").await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.user_message(), "File not found");
    }

    #[tokio::test]
    async fn test_upload_returns_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .and(header(API_KEY_HEADER, "RahasiaAPIKey123"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "message": "File '1714557600.txt' successfully uploaded.",
                "filename": "1714557600.txt",
                "url": "https://depot/file/1714557600.txt"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = gateway(&server)
            .upload(&key(), &UploadFile::new("notes.txt", b"hi".to_vec()))
            .await
            .unwrap();
        assert_eq!(receipt.filename.as_deref(), Some("1714557600.txt"));

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"file\""));
        assert!(body.contains("filename=\"notes.txt\""));
    }

    #[test]
    fn test_public_file_url_strips_api_prefix() {
        let gateway = RestGateway::new(
            HttpClient::builder("https://depot.example.com")
                .build()
                .unwrap(),
        );
        assert_eq!(
            gateway.public_file_url("my report.pdf"),
            "https://depot.example.com/file/my%20report.pdf"
        );
    }

    #[test]
    fn test_require_file() {
        let err = require_file(None).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.user_message(), NO_FILE_SELECTED_MESSAGE);

        let file = UploadFile::new("a.txt", vec![1]);
        assert_eq!(require_file(Some(file.clone())).unwrap(), file);
    }
}
