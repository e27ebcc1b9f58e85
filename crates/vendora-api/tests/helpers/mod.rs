//! Test helpers: build the router on an in-memory catalog store and a scratch upload root.
//!
//! Run from workspace root: `cargo test -p vendora-api`.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use std::path::PathBuf;
use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;
use vendora_api::setup;
use vendora_core::constants::VENDOR_API_PREFIX;
use vendora_core::Config;
use vendora_db::InMemoryCatalogStore;

/// Vendor API path for tests (e.g. `/api/v1/vendor/products`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", VENDOR_API_PREFIX, path)
}

/// Test application: server, backing store and owned upload root.
pub struct TestApp {
    pub server: TestServer,
    pub store: InMemoryCatalogStore,
    pub config: Config,
    pub _upload_root: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn image_dir(&self) -> PathBuf {
        self.config.product_image_dir()
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.config.staging_dir()
    }

    /// Files currently stored in a directory, sorted.
    pub fn files_in(&self, dir: PathBuf) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .expect("Failed to read directory")
            .map(|entry| entry.expect("Failed to read entry").path())
            .collect();
        files.sort();
        files
    }
}

pub fn create_test_config(upload_root: PathBuf) -> Config {
    Config {
        jwt_secret: auth::TEST_JWT_SECRET.to_string(),
        upload_root,
        ..Config::default()
    }
}

/// Setup test app with an in-memory store and a temporary upload root.
pub async fn setup_test_app() -> TestApp {
    let upload_root = tempfile::tempdir().expect("Failed to create temp directory");
    let config = create_test_config(upload_root.path().to_path_buf());
    let store = InMemoryCatalogStore::new();

    let (_state, router) = setup::build_app(config.clone(), Arc::new(store.clone()))
        .await
        .expect("Failed to build app");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        store,
        config,
        _upload_root: upload_root,
    }
}
