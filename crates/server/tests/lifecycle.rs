//! Order lifecycle engine tests over the in-memory embedded store.

#![allow(clippy::unwrap_used)]

mod common;

use oroshi_core::{Money, OrderStatus};
use oroshi_server::db::addresses::AddressRepository;
use oroshi_server::db::orders::OrderRepository;
use oroshi_server::db::products::{ProductRepository, ProductUpdate};
use oroshi_server::error::AppError;
use oroshi_server::params;
use oroshi_server::services::mailer::Mailer;
use oroshi_server::services::orders::{CreateOrder, OrderService};

use common::{create_address, create_product, create_user, test_db};

#[tokio::test]
async fn order_creation_snapshots_price_and_computes_total() {
    let db = test_db().await;
    let mailer = Mailer::disabled();
    let user_id = create_user(&db, "buyer@example.com").await;
    let address_id = create_address(&db, user_id, true).await;
    let product_id = create_product(&db, 1500, 10, 10).await;

    let service = OrderService::new(&db, &mailer, None);
    let order_id = service
        .create(
            user_id,
            CreateOrder {
                product_id: Some(product_id),
                shipping_address_id: address_id,
                quantity: 20,
            },
        )
        .await
        .unwrap();

    let order = OrderRepository::new(&db)
        .get(order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.quantity, 20);
    assert_eq!(order.unit_price, Some(Money::new(1500)));
    assert_eq!(order.total_price, Money::new(30000));
    assert_eq!(order.status, OrderStatus::Received);
    assert!(!order.payment_confirmed);

    // Changing the catalog price later must not rewrite the snapshot.
    ProductRepository::new(&db)
        .update(
            product_id,
            ProductUpdate {
                name: "BASE".to_owned(),
                flavor: Some("Cocoa".to_owned()),
                price: Money::new(9999),
                image_url: None,
                description: None,
                catch_copy: None,
                min_quantity: 10,
                quantity_step: 10,
                is_active: true,
            },
        )
        .await
        .unwrap();

    let order = OrderRepository::new(&db)
        .get(order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.unit_price, Some(Money::new(1500)));
    assert_eq!(order.total_price, Money::new(30000));
}

#[tokio::test]
async fn invalid_quantities_are_rejected_and_create_no_row() {
    let db = test_db().await;
    let mailer = Mailer::disabled();
    let user_id = create_user(&db, "buyer@example.com").await;
    let address_id = create_address(&db, user_id, true).await;
    let product_id = create_product(&db, 1500, 10, 10).await;

    let service = OrderService::new(&db, &mailer, None);
    for quantity in [0, 5, 15, -10] {
        let result = service
            .create(
                user_id,
                CreateOrder {
                    product_id: Some(product_id),
                    shipping_address_id: address_id,
                    quantity,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))), "quantity {quantity}");
    }

    let count = db
        .fetch_optional("SELECT COUNT(*) AS n FROM orders", &[])
        .await
        .unwrap()
        .unwrap()
        .i64("n")
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn order_requires_an_owned_shipping_address() {
    let db = test_db().await;
    let mailer = Mailer::disabled();
    let buyer = create_user(&db, "buyer@example.com").await;
    let other = create_user(&db, "other@example.com").await;
    let foreign_address = create_address(&db, other, true).await;
    let product_id = create_product(&db, 1500, 10, 10).await;

    let result = OrderService::new(&db, &mailer, None)
        .create(
            buyer,
            CreateOrder {
                product_id: Some(product_id),
                shipping_address_id: foreign_address,
                quantity: 20,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn order_defaults_to_first_active_product() {
    let db = test_db().await;
    let mailer = Mailer::disabled();
    let user_id = create_user(&db, "buyer@example.com").await;
    let address_id = create_address(&db, user_id, true).await;
    let first_product = create_product(&db, 1200, 10, 10).await;
    create_product(&db, 5000, 10, 10).await;

    let order_id = OrderService::new(&db, &mailer, None)
        .create(
            user_id,
            CreateOrder {
                product_id: None,
                shipping_address_id: address_id,
                quantity: 10,
            },
        )
        .await
        .unwrap();

    let order = OrderRepository::new(&db)
        .get(order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.product_id, Some(first_product));
    assert_eq!(order.unit_price, Some(Money::new(1200)));
}

#[tokio::test]
async fn status_updates_are_unconstrained_within_the_known_set() {
    let db = test_db().await;
    let mailer = Mailer::disabled();
    let user_id = create_user(&db, "buyer@example.com").await;
    let address_id = create_address(&db, user_id, true).await;
    let product_id = create_product(&db, 1500, 10, 10).await;

    let service = OrderService::new(&db, &mailer, None);
    let order_id = service
        .create(
            user_id,
            CreateOrder {
                product_id: Some(product_id),
                shipping_address_id: address_id,
                quantity: 10,
            },
        )
        .await
        .unwrap();

    // Any known status is reachable from any other, side effects included.
    for status in [
        OrderStatus::Shipped,
        OrderStatus::Preparing,
        OrderStatus::Cancelled,
        OrderStatus::Arrived,
        OrderStatus::Received,
    ] {
        service.update_status(order_id, status).await.unwrap();
        let order = OrderRepository::new(&db)
            .get(order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, status);
    }
}

#[tokio::test]
async fn payment_confirmation_is_orthogonal_to_status() {
    let db = test_db().await;
    let mailer = Mailer::disabled();
    let user_id = create_user(&db, "buyer@example.com").await;
    let address_id = create_address(&db, user_id, true).await;
    let product_id = create_product(&db, 1500, 10, 10).await;

    let service = OrderService::new(&db, &mailer, None);
    let order_id = service
        .create(
            user_id,
            CreateOrder {
                product_id: Some(product_id),
                shipping_address_id: address_id,
                quantity: 10,
            },
        )
        .await
        .unwrap();

    service
        .confirm_payment(order_id, true, Some("2025-06-15".to_owned()))
        .await
        .unwrap();

    let order = OrderRepository::new(&db)
        .get(order_id)
        .await
        .unwrap()
        .unwrap();
    assert!(order.payment_confirmed);
    assert_eq!(order.payment_date.as_deref(), Some("2025-06-15 00:00:00"));
    // Fulfillment status is untouched by payment confirmation.
    assert_eq!(order.status, OrderStatus::Received);

    // Un-confirming clears the date.
    service.confirm_payment(order_id, false, None).await.unwrap();
    let order = OrderRepository::new(&db)
        .get(order_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!order.payment_confirmed);
    assert_eq!(order.payment_date, None);
}

#[tokio::test]
async fn unknown_order_ids_are_not_found() {
    let db = test_db().await;
    let mailer = Mailer::disabled();
    let service = OrderService::new(&db, &mailer, None);

    let result = service
        .update_status(oroshi_core::OrderId::new(999), OrderStatus::Shipped)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = service
        .confirm_payment(oroshi_core::OrderId::new(999), true, None)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn concurrent_orders_get_distinct_ids_without_lost_writes() {
    let db = test_db().await;
    let mailer = Mailer::disabled();
    let user_id = create_user(&db, "buyer@example.com").await;
    let address_id = create_address(&db, user_id, true).await;
    let product_id = create_product(&db, 1500, 10, 10).await;

    let spawn_order = |db: oroshi_server::db::Database, mailer: Mailer| {
        tokio::spawn(async move {
            OrderService::new(&db, &mailer, None)
                .create(
                    user_id,
                    CreateOrder {
                        product_id: Some(product_id),
                        shipping_address_id: address_id,
                        quantity: 10,
                    },
                )
                .await
                .unwrap()
        })
    };

    let first = spawn_order(db.clone(), mailer.clone());
    let second = spawn_order(db.clone(), mailer.clone());
    let (first, second) = (first.await.unwrap(), second.await.unwrap());

    assert_ne!(first, second);

    let count = db
        .fetch_optional("SELECT COUNT(*) AS n FROM orders", &[])
        .await
        .unwrap()
        .unwrap()
        .i64("n")
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn default_address_invariant_holds_across_updates() {
    let db = test_db().await;
    let user_id = create_user(&db, "buyer@example.com").await;
    let addresses = AddressRepository::new(&db);

    create_address(&db, user_id, true).await;
    create_address(&db, user_id, true).await;
    let third = create_address(&db, user_id, true).await;

    let listed = addresses.list_for_user(user_id).await.unwrap();
    assert_eq!(listed.len(), 3);
    let defaults: Vec<_> = listed.iter().filter(|a| a.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, third);
    // Default sorts first.
    assert_eq!(listed[0].id, third);
}

#[tokio::test]
async fn order_listing_is_newest_first() {
    let db = test_db().await;
    let user_id = create_user(&db, "buyer@example.com").await;
    let address_id = create_address(&db, user_id, true).await;
    let product_id = create_product(&db, 1500, 10, 10).await;

    // Seed directly so each order carries a distinct, known timestamp.
    for (quantity, created_at) in [
        (10, "2025-04-10 09:00:00"),
        (30, "2025-06-20 09:00:00"),
        (20, "2025-05-15 09:00:00"),
    ] {
        db.insert(
            "INSERT INTO orders (user_id, product_id, shipping_address_id, quantity, \
             unit_price, total_price, status, payment_confirmed, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
            &params![
                user_id,
                product_id,
                address_id,
                quantity,
                1500i64,
                1500 * quantity,
                OrderStatus::Received,
                created_at,
            ],
        )
        .await
        .unwrap();
    }

    let orders = OrderRepository::new(&db)
        .list_for_user(user_id)
        .await
        .unwrap();
    let quantities: Vec<i64> = orders.iter().map(|o| o.quantity).collect();
    assert_eq!(quantities, [30, 20, 10]);
}

#[tokio::test]
async fn legacy_processing_rows_normalize_for_display_only() {
    let db = test_db().await;
    let user_id = create_user(&db, "buyer@example.com").await;
    let address_id = create_address(&db, user_id, true).await;

    db.insert(
        "INSERT INTO orders (user_id, product_id, shipping_address_id, quantity, \
         unit_price, total_price, status, payment_confirmed, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, 'processing', 0, ?)",
        &params![
            user_id,
            Option::<i64>::None,
            address_id,
            10i64,
            Option::<i64>::None,
            15000i64,
            "2024-12-01 09:00:00",
        ],
    )
    .await
    .unwrap();

    let order = OrderRepository::new(&db)
        .list_for_user(user_id)
        .await
        .unwrap()
        .remove(0);
    // The stored value is preserved; only the view folds the alias.
    assert_eq!(order.status, OrderStatus::Processing);
    let view = oroshi_server::models::OrderView::new(order);
    assert_eq!(view.display_status, OrderStatus::Received);
    assert_eq!(view.order.status, OrderStatus::Processing);
}

#[tokio::test]
async fn admin_listing_joins_customer_product_and_address() {
    let db = test_db().await;
    let mailer = Mailer::disabled();
    let user_id = create_user(&db, "buyer@example.com").await;
    let address_id = create_address(&db, user_id, true).await;
    let product_id = create_product(&db, 1500, 10, 10).await;

    OrderService::new(&db, &mailer, None)
        .create(
            user_id,
            CreateOrder {
                product_id: Some(product_id),
                shipping_address_id: address_id,
                quantity: 10,
            },
        )
        .await
        .unwrap();

    let details = OrderRepository::new(&db).list_all_detailed().await.unwrap();
    assert_eq!(details.len(), 1);
    let entry = &details[0];
    assert_eq!(entry.company_name, "Acme Trading");
    assert_eq!(entry.user_name, "Sato Yui");
    assert_eq!(entry.product_name, "BASE (Cocoa)");
    let address = entry.shipping_address.as_ref().unwrap();
    assert_eq!(address.label, "Head office");

    // Legacy rows without a product degrade to a placeholder.
    db.insert(
        "INSERT INTO orders (user_id, product_id, shipping_address_id, quantity, \
         unit_price, total_price, status, payment_confirmed, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, 'received', 0, ?)",
        &params![
            user_id,
            Option::<i64>::None,
            address_id,
            10i64,
            Option::<i64>::None,
            15000i64,
            "2025-07-01 09:00:00",
        ],
    )
    .await
    .unwrap();

    let details = OrderRepository::new(&db).list_all_detailed().await.unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].product_name, "unknown");
}
