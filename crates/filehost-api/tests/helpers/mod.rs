//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p filehost-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use filehost_api::setup::routes;
use filehost_api::AppState;
use filehost_core::{FilehostConfig, SharedConfig, TokenService};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub const TEST_SECRET: &str = "integration-secret-with-enough-bytes-123";
pub const MOUNT: &str = "/upload";

/// Test application: server, shared config, and owned upload directory.
pub struct TestApp {
    pub server: TestServer,
    pub config: SharedConfig,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.config.snapshot().storage_path.clone()
    }

    /// Issue a credential signed with the app's secret.
    pub fn token_for(&self, identity: &str) -> String {
        let tokens = TokenService::from_config(&self.config.snapshot()).unwrap();
        tokens.issue(identity, Duration::from_secs(600)).unwrap()
    }

    pub fn bearer(&self, identity: &str) -> String {
        format!("Bearer {}", self.token_for(identity))
    }

    /// Files in the upload directory, excluding the partial-upload area.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn partial_files(&self) -> usize {
        std::fs::read_dir(
            self.upload_dir()
                .join(filehost_core::constants::PARTIAL_DIR),
        )
        .map(|entries| entries.count())
        .unwrap_or(0)
    }
}

pub fn test_config(dir: &TempDir, overrides: &[(&str, &str)]) -> FilehostConfig {
    let upload_path = dir.path().join("uploads");
    let mut vars: HashMap<String, String> = HashMap::from([
        (
            "FILEHOST_UPLOAD_PATH".to_string(),
            upload_path.to_string_lossy().into_owned(),
        ),
        ("FILEHOST_HOSTNAME".to_string(), "files.test".to_string()),
        ("FILEHOST_URI".to_string(), MOUNT.to_string()),
        ("FILEHOST_TOKEN_SECRET".to_string(), TEST_SECRET.to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    FilehostConfig::from_source(|key| vars.get(key).cloned()).unwrap()
}

/// Setup test app with an isolated upload directory.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

pub async fn setup_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp_dir, overrides);

    filehost_api::setup::storage::setup_storage(&config)
        .await
        .expect("Failed to create upload directory");

    let shared = SharedConfig::new(config.clone());
    let app = routes::setup_routes(&config, AppState::new(shared.clone()));
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        config: shared,
        _temp_dir: temp_dir,
    }
}

/// Public URL prefix of stored files.
pub fn file_url_prefix() -> &'static str {
    "https://files.test/upload/"
}
