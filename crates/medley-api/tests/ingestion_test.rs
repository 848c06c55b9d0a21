//! Ingestion pipeline tests covering admission and storage placement.
//!
//! These use a lazy (never-connected) database pool: a batch in which every
//! file fails admission must be rejected per file without touching storage or
//! the database at all.

use std::sync::Arc;

use medley_api::auth::jwt::JwtService;
use medley_api::extract::MultipartFile;
use medley_api::services::ingestion::IngestionService;
use medley_api::state::AppState;
use medley_core::Config;
use medley_db::{MediaRepository, TagRepository, UserRepository};
use medley_storage::{LocalStorage, Storage};

const MIB: usize = 1024 * 1024;

fn test_config(storage_path: &str) -> Config {
    Config {
        server_port: 0,
        database_url: "postgres://postgres@localhost/medley_test".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 1,
        jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
        jwt_expiry_hours: 1,
        bcrypt_cost: 4,
        cors_origins: vec![],
        storage_path: storage_path.to_string(),
        storage_base_url: "http://localhost:4000/uploads".to_string(),
        max_body_bytes: 128 * MIB,
        environment: "test".to_string(),
    }
}

async fn test_state(dir: &tempfile::TempDir) -> Arc<AppState> {
    let config = test_config(dir.path().to_str().unwrap());
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool");
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(dir.path(), config.storage_base_url.clone())
            .await
            .expect("storage"),
    );
    let jwt = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_expiry_hours));

    Arc::new(AppState {
        config,
        pool: pool.clone(),
        users: UserRepository::new(pool.clone()),
        tags: TagRepository::new(pool.clone()),
        media: MediaRepository::new(pool),
        storage,
        jwt,
    })
}

fn stored_object_count(dir: &tempfile::TempDir) -> usize {
    fn walk(path: &std::path::Path, count: &mut usize) {
        if let Ok(entries) = std::fs::read_dir(path) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, count);
                } else {
                    *count += 1;
                }
            }
        }
    }
    let mut count = 0;
    walk(dir.path(), &mut count);
    count
}

#[tokio::test]
async fn test_fully_rejected_batch_commits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let service = IngestionService::new(&state);

    let files = vec![
        // Disallowed extension despite a valid declared MIME type.
        MultipartFile {
            original_name: "payload.exe".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0u8; 128],
        },
        // Unsupported content type.
        MultipartFile {
            original_name: "archive.zip".to_string(),
            content_type: "application/zip".to_string(),
            data: vec![0u8; 128],
        },
        // One byte over the video ceiling.
        MultipartFile {
            original_name: "movie.mp4".to_string(),
            content_type: "video/mp4".to_string(),
            data: vec![0u8; 50 * MIB + 1],
        },
    ];

    let outcome = service
        .ingest_batch(7, files, &[])
        .await
        .expect("admission rejections are not fatal");

    assert!(outcome.created.is_empty());
    assert_eq!(outcome.rejected.len(), 3);
    assert_eq!(outcome.rejected[0].original_name, "payload.exe");
    assert!(outcome.rejected[0].message.contains("exe"));
    assert!(outcome.rejected[1].message.contains("application/zip"));
    assert!(outcome.rejected[2].message.contains("50MB"));

    // Nothing was admitted, so nothing may have reached storage.
    assert_eq!(stored_object_count(&dir), 0);

    let details = outcome.failure_details();
    assert_eq!(details.len(), 3);
    assert!(details[0].starts_with("payload.exe: "));
}

#[tokio::test]
async fn test_rejected_replacement_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let service = IngestionService::new(&state);

    let result = service
        .prepare_replacement(MultipartFile {
            original_name: "huge.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![0u8; 5 * MIB + 1],
        })
        .await;

    assert!(result.is_err());
    assert_eq!(stored_object_count(&dir), 0);
}
