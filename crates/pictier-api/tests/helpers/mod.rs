//! Test helpers: build the application around in-memory repositories and a
//! temporary media root. No database is needed.
//!
//! Seeded accounts:
//! - `alice`: Enterprise (original links, expiring links for 300 s, `small` and `large`)
//! - `bob`: Basic (no original links, no expiring links, `small`)
//! - `carol`: no tier

#![allow(dead_code)]

pub mod fixtures;

use std::collections::HashMap;
use std::sync::Arc;

use axum_test::TestServer;
use chrono::{DateTime, Utc};
use pictier_api::setup::routes;
use pictier_api::AppState;
use pictier_core::{Config, Photo, User};
use pictier_db::{InMemoryPhotoCatalog, InMemoryTierRegistry, InMemoryUserDirectory};
use pictier_storage::{LocalStorage, Storage};
use tempfile::TempDir;
use uuid::Uuid;

pub const ALICE_KEY: &str = "alice-test-api-key";
pub const BOB_KEY: &str = "bob-test-api-key";
pub const CAROL_KEY: &str = "carol-test-api-key";

pub const MEDIA_BASE_URL: &str = "http://media.test/media";
pub const PUBLIC_BASE_URL: &str = "http://api.test";
/// 32 bytes of 0x01, base64.
pub const LINK_TOKEN_KEY: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=";

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub storage: Arc<LocalStorage>,
    pub photos: Arc<InMemoryPhotoCatalog>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Store `data` as the source of a photo named `name` owned by `owner`.
    pub async fn seed_photo(&self, owner: &str, name: &str, data: Vec<u8>) -> Photo {
        self.seed_photo_at(owner, name, data, Utc::now()).await
    }

    pub async fn seed_photo_at(
        &self,
        owner: &str,
        name: &str,
        data: Vec<u8>,
        created_at: DateTime<Utc>,
    ) -> Photo {
        let storage_path = format!("user_{}/{}.png", owner, name);
        self.storage
            .put(&storage_path, data)
            .await
            .expect("store seeded photo");
        let photo = Photo {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner: owner.to_string(),
            storage_path,
            created_at,
        };
        self.photos.insert(photo.clone()).await;
        photo
    }
}

pub fn bearer(key: &str) -> String {
    format!("Bearer {}", key)
}

pub fn test_config(media_root: &std::path::Path) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DATABASE_URL", "postgresql://unused/pictier".to_string()),
        ("LINK_TOKEN_KEY", LINK_TOKEN_KEY.to_string()),
        ("MEDIA_ROOT", media_root.display().to_string()),
        ("MEDIA_BASE_URL", MEDIA_BASE_URL.to_string()),
        ("PUBLIC_BASE_URL", PUBLIC_BASE_URL.to_string()),
        ("MAX_FILE_SIZE_MB", "1".to_string()),
        ("GENERATION_TIMEOUT_SECS", "10".to_string()),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
}

pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("create media root");
    let config = test_config(temp_dir.path());

    let storage = Arc::new(
        LocalStorage::new(temp_dir.path(), config.media_base_url.clone())
            .await
            .expect("local storage"),
    );

    let tiers = Arc::new(InMemoryTierRegistry::new());
    let enterprise = fixtures::tier("Enterprise", true, true, Some(300));
    let basic = fixtures::tier("Basic", false, false, None);
    tiers
        .upsert_tier(
            enterprise.clone(),
            vec![
                fixtures::spec(&enterprise, "small", 200, 200),
                fixtures::spec(&enterprise, "large", 400, 400),
            ],
        )
        .await
        .expect("seed enterprise tier");
    tiers
        .upsert_tier(basic.clone(), vec![fixtures::spec(&basic, "small", 200, 200)])
        .await
        .expect("seed basic tier");

    let users = Arc::new(InMemoryUserDirectory::new());
    for (key, username, tier_id) in [
        (ALICE_KEY, "alice", Some(enterprise.id)),
        (BOB_KEY, "bob", Some(basic.id)),
        (CAROL_KEY, "carol", None),
    ] {
        users
            .add_user(
                key,
                User {
                    id: Uuid::new_v4(),
                    username: username.to_string(),
                    tier_id,
                },
            )
            .await;
    }

    let photos = Arc::new(InMemoryPhotoCatalog::new());

    let state = Arc::new(
        AppState::new(
            config.clone(),
            tiers,
            photos.clone(),
            users,
            storage.clone(),
        )
        .expect("app state"),
    );
    let router = routes::setup_routes(&config, state.clone()).expect("router");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        state,
        storage,
        photos,
        _temp_dir: temp_dir,
    }
}
