//! Account and password-reset tests over the in-memory embedded store.

#![allow(clippy::unwrap_used)]

mod common;

use chrono::{Duration, Utc};
use secrecy::SecretString;

use oroshi_core::format_timestamp;
use oroshi_server::config::AdminSeedConfig;
use oroshi_server::db::admins::AdminRepository;
use oroshi_server::db::reset_tokens::ResetTokenRepository;
use oroshi_server::db::schema;
use oroshi_server::db::users::UserRepository;
use oroshi_server::services::password::verify_password;

use common::{create_user, test_db};

#[tokio::test]
async fn reset_tokens_rotate_and_are_single_use() {
    let db = test_db().await;
    let user_id = create_user(&db, "buyer@example.com").await;
    let tokens = ResetTokenRepository::new(&db);

    let expires_at = format_timestamp(Utc::now() + Duration::hours(1));
    tokens
        .replace_for_user(user_id, "first-token", &expires_at)
        .await
        .unwrap();
    tokens
        .replace_for_user(user_id, "second-token", &expires_at)
        .await
        .unwrap();

    // Issuing a new token invalidates the previous one.
    assert!(tokens.get("first-token").await.unwrap().is_none());
    let live = tokens.get("second-token").await.unwrap().unwrap();
    assert_eq!(live.user_id, user_id);
    assert!(!live.is_expired());

    // Consumed tokens are gone.
    tokens.delete("second-token").await.unwrap();
    assert!(tokens.get("second-token").await.unwrap().is_none());
}

#[tokio::test]
async fn expired_tokens_report_expired() {
    let db = test_db().await;
    let user_id = create_user(&db, "buyer@example.com").await;
    let tokens = ResetTokenRepository::new(&db);

    let expired_at = format_timestamp(Utc::now() - Duration::hours(2));
    tokens
        .replace_for_user(user_id, "stale-token", &expired_at)
        .await
        .unwrap();

    let token = tokens.get("stale-token").await.unwrap().unwrap();
    assert!(token.is_expired());
}

#[tokio::test]
async fn seeding_is_idempotent_and_admin_can_authenticate() {
    let db = test_db().await;
    let seed = AdminSeedConfig {
        username: "admin".to_owned(),
        password: SecretString::from("super-secret-99"),
    };

    schema::seed(&db, &seed).await.unwrap();
    schema::seed(&db, &seed).await.unwrap();

    let admins = db
        .fetch_optional("SELECT COUNT(*) AS n FROM admin_users", &[])
        .await
        .unwrap()
        .unwrap()
        .i64("n")
        .unwrap();
    assert_eq!(admins, 1);

    let products = db
        .fetch_optional("SELECT COUNT(*) AS n FROM products", &[])
        .await
        .unwrap()
        .unwrap()
        .i64("n")
        .unwrap();
    assert_eq!(products, 1);

    let (_, hash) = AdminRepository::new(&db)
        .get_password_hash("admin")
        .await
        .unwrap()
        .unwrap();
    assert!(verify_password("super-secret-99", &hash).unwrap());
    assert!(!verify_password("wrong", &hash).unwrap());
}

#[tokio::test]
async fn duplicate_emails_conflict() {
    let db = test_db().await;
    create_user(&db, "buyer@example.com").await;

    let users = UserRepository::new(&db);
    let result = users
        .create(oroshi_server::db::users::NewUser {
            email: oroshi_core::Email::parse("buyer@example.com").unwrap(),
            password_hash: "unused-hash".to_owned(),
            company_name: "Other Co".to_owned(),
            last_name: "Ito".to_owned(),
            first_name: "Ken".to_owned(),
            phone: "0900000000".to_owned(),
            postal_code: None,
            address: None,
        })
        .await;
    assert!(matches!(
        result,
        Err(oroshi_server::db::RepositoryError::Conflict(_))
    ));
}
