//! Password reset flow: request, consume, single-use enforcement.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use oroshi_integration_tests::TestApp;

async fn register(app: &TestApp, email: &str, password: &str) {
    let res = app
        .request(
            "POST",
            "/api/register",
            None,
            Some(json!({
                "email": email,
                "password": password,
                "company_name": "Acme Trading",
                "last_name": "Sato",
                "first_name": "Yui",
                "phone": "08012345678",
            })),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text());
}

/// The reset link never leaves the server in tests (mail is disabled), so
/// the token is read straight from the store.
async fn stored_token(app: &TestApp) -> String {
    app.db
        .fetch_optional("SELECT token FROM password_reset_tokens", &[])
        .await
        .unwrap()
        .expect("a live reset token")
        .text("token")
        .unwrap()
}

#[tokio::test]
async fn reset_flow_updates_the_password_once() {
    let app = TestApp::spawn().await;
    register(&app, "buyer@example.com", "original-pw-123").await;

    // Request a reset; the endpoint succeeds whether or not the address
    // exists, so probing gives nothing away.
    let res = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "buyer@example.com" })),
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["success"], true);

    let res = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["success"], true);

    let token = stored_token(&app).await;

    // Consume the token.
    let res = app
        .request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({ "token": token, "password": "brand-new-pw-456" })),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text());

    // Old password is dead, new one works.
    let res = app
        .request(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "buyer@example.com", "password": "original-pw-123" })),
        )
        .await;
    assert_eq!(res.status, 401);

    let res = app
        .request(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "buyer@example.com", "password": "brand-new-pw-456" })),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text());

    // Single use: the same token is rejected the second time.
    let res = app
        .request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({ "token": token, "password": "another-pw-789" })),
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn expired_tokens_are_rejected() {
    let app = TestApp::spawn().await;
    register(&app, "buyer@example.com", "original-pw-123").await;

    let res = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "buyer@example.com" })),
        )
        .await;
    assert_eq!(res.status, 200);

    let token = stored_token(&app).await;

    // Age the token past its expiry.
    app.db
        .execute(
            "UPDATE password_reset_tokens SET expires_at = '2020-01-01 00:00:00'",
            &[],
        )
        .await
        .unwrap();

    let res = app
        .request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({ "token": token, "password": "brand-new-pw-456" })),
        )
        .await;
    assert_eq!(res.status, 400);
    assert!(res.json()["error"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn requesting_again_rotates_the_token() {
    let app = TestApp::spawn().await;
    register(&app, "buyer@example.com", "original-pw-123").await;

    for _ in 0..2 {
        let res = app
            .request(
                "POST",
                "/api/auth/forgot-password",
                None,
                Some(json!({ "email": "buyer@example.com" })),
            )
            .await;
        assert_eq!(res.status, 200);
    }

    // Only one live token remains after the second request.
    let count = app
        .db
        .fetch_optional("SELECT COUNT(*) AS n FROM password_reset_tokens", &[])
        .await
        .unwrap()
        .unwrap()
        .i64("n")
        .unwrap();
    assert_eq!(count, 1);
}
