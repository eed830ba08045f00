//! End-to-end portal flow: register, order, admin fulfillment, dashboard.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use oroshi_core::MonthKey;
use oroshi_integration_tests::{ADMIN_PASSWORD, TestApp};

fn register_body(email: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": "orange-crate-99",
        "company_name": "Acme Trading",
        "last_name": "Sato",
        "first_name": "Yui",
        "phone": "08012345678",
    })
}

async fn register(app: &TestApp, email: &str) -> String {
    let res = app
        .request("POST", "/api/register", None, Some(register_body(email)))
        .await;
    assert_eq!(res.status, 200, "{}", res.text());
    assert_eq!(res.json()["success"], true);
    res.cookie.expect("session cookie")
}

async fn add_address(app: &TestApp, cookie: &str) -> i64 {
    let res = app
        .request(
            "POST",
            "/api/shipping-addresses",
            Some(cookie),
            Some(json!({
                "label": "Head office",
                "postal_code": "100-0001",
                "address": "1-1 Chiyoda, Tokyo",
                "phone": "0311112222",
                "is_default": true,
            })),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text());
    res.json()["addressId"].as_i64().unwrap()
}

async fn admin_login(app: &TestApp) -> String {
    let res = app
        .request(
            "POST",
            "/api/admin/login",
            None,
            Some(json!({ "username": "admin", "password": ADMIN_PASSWORD })),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text());
    res.cookie.expect("admin session cookie")
}

#[tokio::test]
async fn register_order_fulfill_and_report() {
    let app = TestApp::spawn().await;
    let cookie = register(&app, "buyer@example.com").await;

    // The session works: /api/me returns the profile without credentials.
    let me = app.request("GET", "/api/me", Some(&cookie), None).await;
    assert_eq!(me.status, 200);
    let me = me.json();
    assert_eq!(me["company_name"], "Acme Trading");
    assert!(me.get("password_hash").is_none());

    let address_id = add_address(&app, &cookie).await;

    // Order 20 units of the seeded product (1500 each, min 10, step 10).
    let res = app
        .request(
            "POST",
            "/api/orders",
            Some(&cookie),
            Some(json!({ "shipping_address_id": address_id, "quantity": 20 })),
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text());
    let order_id = res.json()["orderId"].as_i64().unwrap();

    // The order detail carries the snapshot math and initial state.
    let res = app
        .request("GET", &format!("/api/orders/{order_id}"), Some(&cookie), None)
        .await;
    assert_eq!(res.status, 200);
    let order = res.json();
    assert_eq!(order["quantity"], 20);
    assert_eq!(order["unit_price"], 1500);
    assert_eq!(order["total_price"], 30000);
    assert_eq!(order["status"], "received");
    assert_eq!(order["display_status"], "received");
    assert_eq!(order["payment_confirmed"], false);
    assert_eq!(order["shipping_address"]["label"], "Head office");

    // Admin sees the order with the joined customer data.
    let admin_cookie = admin_login(&app).await;
    let res = app
        .request("GET", "/api/admin/orders", Some(&admin_cookie), None)
        .await;
    assert_eq!(res.status, 200);
    let orders = res.json();
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["company_name"], "Acme Trading");
    assert_eq!(orders[0]["product_name"], "BASE (Cocoa)");

    // Ship it, then confirm payment; the two axes stay independent.
    let res = app
        .request(
            "PUT",
            &format!("/api/admin/orders/{order_id}"),
            Some(&admin_cookie),
            Some(json!({ "status": "shipped" })),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text());

    let res = app
        .request(
            "PUT",
            &format!("/api/admin/orders/{order_id}/payment"),
            Some(&admin_cookie),
            Some(json!({ "payment_confirmed": true, "payment_date": "2025-06-15" })),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text());

    let res = app
        .request("GET", &format!("/api/orders/{order_id}"), Some(&cookie), None)
        .await;
    let order = res.json();
    assert_eq!(order["status"], "shipped");
    assert_eq!(order["payment_confirmed"], true);
    assert_eq!(order["payment_date"], "2025-06-15 00:00:00");

    // Dashboard for the current month reflects the order.
    let month = MonthKey::current().label();
    let res = app
        .request(
            "GET",
            &format!("/api/admin/dashboard?month={month}"),
            Some(&admin_cookie),
            None,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text());
    let dashboard = res.json();
    assert_eq!(dashboard["targetMonth"], month);
    assert_eq!(dashboard["summary"]["currentMonthSales"], 30000);
    assert_eq!(dashboard["summary"]["currentMonthOrders"], 1);
    assert_eq!(dashboard["summary"]["currentMonthQuantity"], 20);
    assert_eq!(dashboard["summary"]["growthRate"], 100.0);
    assert_eq!(dashboard["summary"]["totalOrders"], 1);
    assert_eq!(dashboard["summary"]["activeProducts"], 1);
    let trend = dashboard["salesTrend"].as_array().unwrap();
    assert_eq!(trend.len(), 6);
    assert_eq!(trend[5]["month"], month);
    assert_eq!(trend[5]["sales"], 30000);
    assert_eq!(dashboard["productRanking"][0]["name"], "BASE");
    assert_eq!(dashboard["productRanking"][0]["total_sales"], 30000);

    // Documents stream as attachments for both surfaces.
    let res = app
        .request(
            "GET",
            &format!("/api/admin/orders/{order_id}/invoice"),
            Some(&admin_cookie),
            None,
        )
        .await;
    assert_eq!(res.status, 200);
    assert!(res.content_disposition.as_ref().unwrap().contains("invoice_"));
    assert!(res.text().contains("INVOICE"));
    assert!(res.text().contains("30,000"));

    let res = app
        .request(
            "GET",
            &format!("/api/orders/{order_id}/receipt"),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(res.status, 200);
    assert!(res.text().contains("RECEIPT"));
    assert!(res.text().contains("Payment received"));
}

#[tokio::test]
async fn quantity_rule_violations_are_rejected_with_a_message() {
    let app = TestApp::spawn().await;
    let cookie = register(&app, "buyer@example.com").await;
    let address_id = add_address(&app, &cookie).await;

    for (quantity, expected) in [(5, 400), (15, 400), (20, 201)] {
        let res = app
            .request(
                "POST",
                "/api/orders",
                Some(&cookie),
                Some(json!({ "shipping_address_id": address_id, "quantity": quantity })),
            )
            .await;
        assert_eq!(res.status, expected, "quantity {quantity}: {}", res.text());
        if expected == 400 {
            assert!(res.json()["error"].is_string());
        }
    }
}

#[tokio::test]
async fn session_scopes_are_independent() {
    let app = TestApp::spawn().await;
    let cookie = register(&app, "buyer@example.com").await;

    // Customer session does not grant admin access.
    let res = app
        .request("GET", "/api/admin/orders", Some(&cookie), None)
        .await;
    assert_eq!(res.status, 401);

    // No session at all: both scopes reject.
    assert_eq!(app.request("GET", "/api/orders", None, None).await.status, 401);
    assert_eq!(
        app.request("GET", "/api/admin/dashboard", None, None)
            .await
            .status,
        401
    );

    // Admin session does not grant customer access.
    let admin_cookie = admin_login(&app).await;
    let res = app.request("GET", "/api/me", Some(&admin_cookie), None).await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn customers_cannot_see_each_others_orders() {
    let app = TestApp::spawn().await;
    let first = register(&app, "first@example.com").await;
    let address_id = add_address(&app, &first).await;
    let res = app
        .request(
            "POST",
            "/api/orders",
            Some(&first),
            Some(json!({ "shipping_address_id": address_id, "quantity": 10 })),
        )
        .await;
    let order_id = res.json()["orderId"].as_i64().unwrap();

    let second = register(&app, "second@example.com").await;
    let res = app
        .request("GET", &format!("/api/orders/{order_id}"), Some(&second), None)
        .await;
    assert_eq!(res.status, 404);

    // And a foreign shipping address cannot be ordered against.
    let res = app
        .request(
            "POST",
            "/api/orders",
            Some(&second),
            Some(json!({ "shipping_address_id": address_id, "quantity": 10 })),
        )
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = TestApp::spawn().await;
    register(&app, "buyer@example.com").await;

    let res = app
        .request(
            "POST",
            "/api/register",
            None,
            Some(register_body("buyer@example.com")),
        )
        .await;
    assert_eq!(res.status, 400);
    assert!(
        res.json()["error"]
            .as_str()
            .unwrap()
            .contains("already registered")
    );
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = TestApp::spawn().await;
    let res = app.request("GET", "/health", None, None).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.text(), "ok");

    let res = app.request("GET", "/health/ready", None, None).await;
    assert_eq!(res.status, 200);
}
