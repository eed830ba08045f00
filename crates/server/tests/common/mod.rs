//! Shared fixtures for server tests: an in-memory embedded store with the
//! schema applied, plus entity factories.

#![allow(clippy::unwrap_used)]
#![allow(dead_code)]

use oroshi_core::{AddressId, Email, Money, ProductId, UserId};
use oroshi_server::db::addresses::{AddressFields, AddressRepository};
use oroshi_server::db::products::{NewProduct, ProductRepository};
use oroshi_server::db::users::{NewUser, UserRepository};
use oroshi_server::db::{Database, schema};

pub async fn test_db() -> Database {
    let db = Database::connect_sqlite_memory()
        .await
        .expect("in-memory store");
    schema::init(&db).await.expect("schema init");
    db
}

pub async fn create_user(db: &Database, email: &str) -> UserId {
    UserRepository::new(db)
        .create(NewUser {
            email: Email::parse(email).unwrap(),
            password_hash: "unused-hash".to_owned(),
            company_name: "Acme Trading".to_owned(),
            last_name: "Sato".to_owned(),
            first_name: "Yui".to_owned(),
            phone: "08012345678".to_owned(),
            postal_code: None,
            address: None,
        })
        .await
        .unwrap()
}

pub async fn create_address(db: &Database, user_id: UserId, is_default: bool) -> AddressId {
    AddressRepository::new(db)
        .create(
            user_id,
            AddressFields {
                label: "Head office".to_owned(),
                postal_code: "100-0001".to_owned(),
                address: "1-1 Chiyoda, Tokyo".to_owned(),
                phone: "0311112222".to_owned(),
                is_default,
            },
        )
        .await
        .unwrap()
}

pub async fn create_product(
    db: &Database,
    price: i64,
    min_quantity: i64,
    quantity_step: i64,
) -> ProductId {
    ProductRepository::new(db)
        .create(NewProduct {
            name: "BASE".to_owned(),
            flavor: Some("Cocoa".to_owned()),
            price: Money::new(price),
            image_url: None,
            description: None,
            catch_copy: None,
            min_quantity,
            quantity_step,
            is_active: true,
        })
        .await
        .unwrap()
}
