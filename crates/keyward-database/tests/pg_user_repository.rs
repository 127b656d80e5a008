//! PostgreSQL user repository tests.
//!
//! These need a reachable database: set `DATABASE_URL` and run with
//! `--ignored`. Every test works on fresh, uniquely named users so runs
//! can share one database.

use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use keyward_core::error::ErrorKind;
use keyward_database::migration::run_migrations;
use keyward_database::{PgUserRepository, UserRepository};
use keyward_entity::user::CreateUser;

async fn repository() -> PgUserRepository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    run_migrations(&pool).await.expect("Failed to run migrations");
    PgUserRepository::new(pool)
}

async fn new_user(repo: &PgUserRepository) -> String {
    let email = format!("{}@keyward.test", Uuid::new_v4());
    repo.create(&CreateUser {
        email: email.clone(),
        name: "Test User".to_string(),
        password_hash: "digest".to_string(),
    })
    .await
    .expect("Failed to create test user");
    email
}

async fn tokens(repo: &PgUserRepository, email: &str) -> Vec<String> {
    repo.find_by_email(email)
        .await
        .unwrap()
        .expect("user exists")
        .refresh_tokens
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_starts_with_empty_token_set() {
    let repo = repository().await;
    let email = new_user(&repo).await;

    let user = repo.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(user.name, "Test User");
    assert!(user.refresh_tokens.is_empty());
    assert!(repo.list_emails().await.unwrap().contains(&email));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_create_is_conflict() {
    let repo = repository().await;
    let email = new_user(&repo).await;

    let err = repo
        .create(&CreateUser {
            email: email.clone(),
            name: "Second".to_string(),
            password_hash: "other".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
    let kept = repo.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(kept.name, "Test User");
    assert_eq!(kept.password_hash, "digest");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_add_is_deduplicated() {
    let repo = repository().await;
    let email = new_user(&repo).await;

    assert!(repo.add_refresh_token(&email, "t1").await.unwrap());
    assert!(repo.add_refresh_token(&email, "t1").await.unwrap());
    assert!(repo.add_refresh_token(&email, "t2").await.unwrap());

    assert_eq!(tokens(&repo, &email).await, vec!["t1", "t2"]);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_missing_user_reports_false() {
    let repo = repository().await;
    let ghost = format!("{}@keyward.test", Uuid::new_v4());

    assert!(!repo.add_refresh_token(&ghost, "t1").await.unwrap());
    assert!(!repo.remove_refresh_token(&ghost, "t1").await.unwrap());
    assert!(!repo.replace_refresh_token(&ghost, "t1", "t2").await.unwrap());
    assert!(!repo.remove_refresh_tokens(&ghost, &["t1".to_string()]).await.unwrap());
    assert!(repo.find_by_email(&ghost).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_remove_is_idempotent() {
    let repo = repository().await;
    let email = new_user(&repo).await;
    repo.add_refresh_token(&email, "t1").await.unwrap();

    assert!(repo.remove_refresh_token(&email, "t1").await.unwrap());
    assert!(repo.remove_refresh_token(&email, "t1").await.unwrap());
    assert!(tokens(&repo, &email).await.is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_replace_only_when_old_present() {
    let repo = repository().await;
    let email = new_user(&repo).await;
    repo.add_refresh_token(&email, "old").await.unwrap();

    assert!(repo.replace_refresh_token(&email, "old", "new").await.unwrap());
    assert_eq!(tokens(&repo, &email).await, vec!["new"]);

    // The old token is gone, so a replay must not store anything.
    assert!(!repo.replace_refresh_token(&email, "old", "newer").await.unwrap());
    assert_eq!(tokens(&repo, &email).await, vec!["new"]);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_bulk_remove_keeps_the_rest() {
    let repo = repository().await;
    let email = new_user(&repo).await;
    for token in ["a", "b", "c", "d"] {
        repo.add_refresh_token(&email, token).await.unwrap();
    }

    let stale = vec!["b".to_string(), "d".to_string(), "absent".to_string()];
    assert!(repo.remove_refresh_tokens(&email, &stale).await.unwrap());

    let mut left = tokens(&repo, &email).await;
    left.sort();
    assert_eq!(left, vec!["a", "c"]);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_adds_are_all_kept() {
    let repo = repository().await;
    let email = new_user(&repo).await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let repo = repo.clone();
            let email = email.clone();
            tokio::spawn(async move { repo.add_refresh_token(&email, &format!("t{i}")).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }

    assert_eq!(tokens(&repo, &email).await.len(), 16);
}
