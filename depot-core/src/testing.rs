//! In-memory gateway for unit tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Mutex;

use crate::error::ClientError;
use crate::gateway::{CrudGateway, UploadFile};
use crate::record::{FileRecord, UploadReceipt};

pub(crate) const VALID_PASSWORD: &str = "pw";
pub(crate) const ISSUED_KEY: &str = "issued-key";

pub(crate) fn record(n: usize) -> FileRecord {
    FileRecord {
        id: Some(n as i64),
        original_name: format!("file-{n}.txt"),
        stored_name: format!("{n}.txt"),
        file_size: n as u64 * 100,
        upload_time: Utc.timestamp_opt(1_714_557_600 + n as i64, 0).unwrap(),
        upload_addr: None,
    }
}

pub(crate) fn records(n: usize) -> Vec<FileRecord> {
    (1..=n).map(record).collect()
}

#[derive(Default)]
pub(crate) struct FakeGateway {
    pub files: Mutex<Vec<FileRecord>>,
    /// When set, `list` fails with this status and message
    pub list_failure: Mutex<Option<(u16, String)>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn with_files(files: Vec<FileRecord>) -> Self {
        Self {
            files: Mutex::new(files),
            ..Default::default()
        }
    }

    pub fn fail_list(&self, status: u16, message: &str) {
        *self.list_failure.lock().unwrap() = Some((status, message.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn check_key(api_key: &SecretString) -> Result<(), ClientError> {
        if api_key.expose_secret() == ISSUED_KEY {
            Ok(())
        } else {
            Err(ClientError::from_status(
                401,
                "Access denied. Invalid or missing API Key.",
            ))
        }
    }
}

#[async_trait]
impl CrudGateway for FakeGateway {
    async fn login(
        &self,
        _username: &str,
        password: &SecretString,
    ) -> Result<SecretString, ClientError> {
        self.record_call("login");
        if password.expose_secret() == VALID_PASSWORD {
            Ok(SecretString::from(ISSUED_KEY.to_string()))
        } else {
            Err(ClientError::from_status(401, "bad password"))
        }
    }

    async fn list(&self, api_key: &SecretString) -> Result<Vec<FileRecord>, ClientError> {
        self.record_call("list");
        Self::check_key(api_key)?;
        if let Some((status, message)) = self.list_failure.lock().unwrap().clone() {
            return Err(ClientError::from_status(status, message));
        }
        Ok(self.files.lock().unwrap().clone())
    }

    async fn upload(
        &self,
        api_key: &SecretString,
        file: &UploadFile,
    ) -> Result<UploadReceipt, ClientError> {
        self.record_call("upload");
        Self::check_key(api_key)?;
        let mut files = self.files.lock().unwrap();
        let mut new_record = record(files.len() + 1);
        new_record.original_name = file.file_name.clone();
        new_record.file_size = file.content.len() as u64;
        let stored_name = new_record.stored_name.clone();
        files.push(new_record);
        Ok(UploadReceipt {
            message: format!("File '{stored_name}' successfully uploaded."),
            filename: Some(stored_name.clone()),
            url: Some(self.public_file_url(&stored_name)),
        })
    }

    async fn download(
        &self,
        api_key: &SecretString,
        stored_name: &str,
    ) -> Result<Vec<u8>, ClientError> {
        self.record_call("download");
        Self::check_key(api_key)?;
        let files = self.files.lock().unwrap();
        if files.iter().any(|f| f.stored_name == stored_name) {
            Ok(format!("content of {stored_name}").into_bytes())
        } else {
            Err(ClientError::from_status(404, "File not found"))
        }
    }

    async fn delete(
        &self,
        api_key: &SecretString,
        stored_name: &str,
    ) -> Result<String, ClientError> {
        self.record_call("delete");
        Self::check_key(api_key)?;
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.stored_name != stored_name);
        if files.len() == before {
            return Err(ClientError::from_status(404, "File not found"));
        }
        Ok(format!("File '{stored_name}' successfully deleted."))
    }

    fn public_file_url(&self, stored_name: &str) -> String {
        format!("http://depot.test/file/{}", urlencoding::encode(stored_name))
    }
}
