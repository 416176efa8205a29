use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata of one stored file as reported by `GET /api/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub original_name: String,
    /// Server-assigned unique name, the key for every per-file call
    pub stored_name: String,
    pub file_size: u64,
    pub upload_time: DateTime<Utc>,
    #[serde(default)]
    pub upload_addr: Option<String>,
}

/// Body of a successful `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub message: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteRequest<'a> {
    pub filename: &'a str,
}
