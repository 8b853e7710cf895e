//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p gymhub-db --features test-utils --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `gymhub_test`)
//!   `TEST_DB_PASSWORD` (default: `gymhub_test`)
//!   `TEST_DB_NAME` (default: `gymhub_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use gymhub_db::{
    entities::{gym_request::GymRequestStatus, profile},
    repositories::{GymRequestRepository, ProfileRepository},
    test_utils::{TestDatabase, TestDbConfig},
};
use sea_orm::Set;

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_scratch_database_lifecycle() {
    let db = TestDatabase::create_unique().await.unwrap();
    assert!(db.connection().ping().await.is_ok());
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_apply_and_profile_round_trips() {
    let db = TestDatabase::create_unique().await.unwrap();
    db.migrate().await.unwrap();

    let conn = Arc::new(db.connection().clone());
    let profiles = ProfileRepository::new(Arc::clone(&conn));

    profiles
        .create(profile::ActiveModel {
            id: Set("user1".to_string()),
            full_name: Set("Janja Garnbret".to_string()),
            email: Set("janja@gymhub.test".to_string()),
            token: Set(Some("tok".to_string())),
            is_admin: Set(true),
            is_banned: Set(false),
            created_at: Set(Utc::now().into()),
            last_active_at: Set(None),
        })
        .await
        .unwrap();

    let found = profiles.find_by_token("tok").await.unwrap().unwrap();
    assert!(found.is_admin);

    let requests = GymRequestRepository::new(conn);
    assert!(
        requests
            .list(Some(GymRequestStatus::Pending))
            .await
            .unwrap()
            .is_empty()
    );

    db.drop_database().await.unwrap();
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("testdb"));
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    assert!(config.postgres_url().ends_with("/postgres"));
}
