use depot_core::controller::{FileController, ListStatus, View, UPLOAD_NETWORK_MESSAGE};
use depot_core::error::CONNECTION_FAILED_MESSAGE;
use depot_core::gateway::{RestGateway, UploadFile};
use depot_core::http::HttpClient;
use depot_core::notifier::ToastKind;
use depot_core::session::{CredentialStore, FileCredentialStore, API_KEY_STORAGE_KEY};
use secrecy::SecretString;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn controller(server_uri: &str, config_dir: &TempDir) -> FileController {
    let http = HttpClient::builder(server_uri).build().unwrap();
    FileController::new(
        Arc::new(RestGateway::new(http)),
        Arc::new(FileCredentialStore::new(config_dir.path())),
        10,
    )
    .unwrap()
}

fn listing() -> serde_json::Value {
    serde_json::json!([
        {
            "id": 2,
            "original_name": "b.txt",
            "stored_name": "1714557700_b.txt",
            "upload_time": "2024-05-01T10:01:40Z",
            "file_size": 12,
            "upload_addr": "127.0.0.1:50001"
        },
        {
            "id": 1,
            "original_name": "a.txt",
            "stored_name": "1714557600_a.txt",
            "upload_time": "2024-05-01T10:00:00Z",
            "file_size": 0,
            "upload_addr": "127.0.0.1:50000"
        }
    ])
}

#[tokio::test]
async fn test_login_logout_restore_cycle() {
    let server = MockServer::start().await;
    let config_dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Login successful",
            "api_key": "RahasiaAPIKey123"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/list"))
        .and(header("X-API-Key", "RahasiaAPIKey123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
        .mount(&server)
        .await;

    let mut first = controller(&server.uri(), &config_dir);
    assert_eq!(first.start().await, View::Login);

    let password = SecretString::from("rahasia".to_string());
    first.login("admin", &password).await.unwrap();
    let snapshot = first.registry().snapshot().to_vec();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].stored_name, "1714557700_b.txt");

    first.logout();
    assert_eq!(first.current_view(), View::Login);
    assert!(first.view().items.is_empty());

    // a credential persisted by another run is picked up on start
    FileCredentialStore::new(config_dir.path())
        .save(API_KEY_STORAGE_KEY, "RahasiaAPIKey123")
        .unwrap();
    let mut second = controller(&server.uri(), &config_dir);
    assert_eq!(second.start().await, View::Files);
    assert_eq!(second.registry().snapshot(), snapshot.as_slice());
}

#[tokio::test]
async fn test_list_is_sent_with_stale_key_and_keeps_session() {
    let server = MockServer::start().await;
    let config_dir = TempDir::new().unwrap();
    FileCredentialStore::new(config_dir.path())
        .save(API_KEY_STORAGE_KEY, "expired")
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/list"))
        .and(header("X-API-Key", "expired"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string("Access denied. Invalid or missing API Key.\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = controller(&server.uri(), &config_dir);
    assert_eq!(controller.start().await, View::Files);
    assert!(matches!(controller.list_status(), ListStatus::Failed(_)));
    assert!(controller.session().is_authenticated());
}

#[tokio::test]
async fn test_unreachable_server() {
    let config_dir = TempDir::new().unwrap();
    FileCredentialStore::new(config_dir.path())
        .save(API_KEY_STORAGE_KEY, "key")
        .unwrap();

    // nothing listens on the discard port
    let mut controller = controller("http://127.0.0.1:9", &config_dir);

    assert!(controller.refresh().await.unwrap_err().is_transport());
    assert_eq!(
        controller.list_status(),
        ListStatus::Failed(CONNECTION_FAILED_MESSAGE.to_string())
    );

    let file = UploadFile::new("a.txt", b"a".to_vec());
    assert!(controller.upload(Some(file)).await.is_err());
    let toast = controller.notifier().current().unwrap();
    assert_eq!(toast.message, UPLOAD_NETWORK_MESSAGE);
    assert_eq!(toast.kind, ToastKind::Error);
}
