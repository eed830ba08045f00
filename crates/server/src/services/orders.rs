//! The order lifecycle engine.
//!
//! Owns order creation (validation, price snapshotting), admin status
//! transitions, and payment confirmation, plus the notification side
//! effects each of those triggers. Side effects are dispatched
//! fire-and-forget and their failures never disturb the primary operation.

use chrono::{NaiveDate, NaiveDateTime};

use oroshi_core::{AddressId, OrderId, OrderStatus, ProductId, UserId, now_timestamp};

use crate::db::addresses::AddressRepository;
use crate::db::orders::{NewOrder, OrderRepository};
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::db::{Database, RepositoryError};
use crate::error::AppError;
use crate::models::Order;
use crate::services::mailer::Mailer;
use crate::services::notify;

/// Inputs for creating an order.
#[derive(Debug)]
pub struct CreateOrder {
    /// Product to order; the first active catalog product when absent.
    pub product_id: Option<ProductId>,
    /// Must belong to the ordering user.
    pub shipping_address_id: AddressId,
    pub quantity: i64,
}

/// The order lifecycle engine.
pub struct OrderService<'a> {
    db: &'a Database,
    mailer: &'a Mailer,
    payment_instructions: Option<&'a str>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(
        db: &'a Database,
        mailer: &'a Mailer,
        payment_instructions: Option<&'a str>,
    ) -> Self {
        Self {
            db,
            mailer,
            payment_instructions,
        }
    }

    /// Create an order for a user.
    ///
    /// Snapshots the product's current price as `unit_price`, computes
    /// `total_price = quantity * unit_price`, and stores the order as
    /// `received`. Confirmation mails to the customer and the administrator
    /// are dispatched without being awaited.
    ///
    /// # Errors
    ///
    /// - `AppError::NotFound` if the shipping address does not belong to
    ///   the user
    /// - `AppError::Validation` if no product is available or the quantity
    ///   violates the product's ordering rule
    /// - `AppError::Database` if a query fails
    pub async fn create(&self, user_id: UserId, input: CreateOrder) -> Result<OrderId, AppError> {
        let address = AddressRepository::new(self.db)
            .get_owned(input.shipping_address_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Shipping address not found"))?;

        let products = ProductRepository::new(self.db);
        let product = match input.product_id {
            Some(id) => products.get(id).await?,
            None => products.first_active().await?,
        }
        .ok_or_else(|| AppError::validation("No valid product found"))?;

        product.quantity_rule().validate(input.quantity)?;

        let unit_price = product.price;
        let total_price = unit_price
            .checked_mul(input.quantity)
            .ok_or_else(|| AppError::validation("Quantity is too large"))?;

        let order_id = OrderRepository::new(self.db)
            .create(NewOrder {
                user_id,
                product_id: product.id,
                shipping_address_id: address.id,
                quantity: input.quantity,
                unit_price,
                total_price,
                status: OrderStatus::Received,
            })
            .await?;

        // Confirmation mails are assembled from already-loaded data and
        // dispatched fire-and-forget; a failure here must not fail the order.
        match UserRepository::new(self.db).get_by_id(user_id).await {
            Ok(Some(user)) => {
                notify::dispatch(
                    self.mailer,
                    user.email.as_str().to_owned(),
                    notify::order_confirmation_subject(order_id),
                    notify::order_confirmation_body(
                        &user,
                        order_id,
                        &product,
                        input.quantity,
                        total_price,
                        &address,
                        self.payment_instructions,
                    ),
                );
                notify::dispatch(
                    self.mailer,
                    self.mailer.admin_email().to_owned(),
                    notify::admin_order_alert_subject(order_id, &user),
                    notify::admin_order_alert_body(
                        &user,
                        order_id,
                        &product,
                        input.quantity,
                        unit_price,
                        total_price,
                        &address,
                    ),
                );
            }
            Ok(None) => {
                tracing::warn!(%order_id, %user_id, "order placed by unknown user; no mail sent");
            }
            Err(e) => {
                tracing::warn!(%order_id, error = %e, "could not load user for order mail");
            }
        }

        Ok(order_id)
    }

    /// Set an order's fulfillment status (admin operation).
    ///
    /// Any status in the known set may be set from any other; there is no
    /// transition graph. `shipped` dispatches a shipment notice and
    /// `cancelled` a cancellation notice; notification failures are logged
    /// and the status change stands.
    ///
    /// # Errors
    ///
    /// - `AppError::NotFound` if the order does not exist
    /// - `AppError::Database` if the update fails
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), AppError> {
        let orders = OrderRepository::new(self.db);
        let order = orders
            .get(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order not found"))?;

        orders.update_status(order_id, status).await?;

        // The status change is committed; mail assembly reads below must
        // not undo it.
        if matches!(status, OrderStatus::Shipped | OrderStatus::Cancelled) {
            if let Err(e) = self.dispatch_status_mail(&order, status).await {
                tracing::warn!(%order_id, error = %e, "status notification not sent");
            }
        }

        Ok(())
    }

    async fn dispatch_status_mail(
        &self,
        order: &Order,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let Some(user) = UserRepository::new(self.db).get_by_id(order.user_id).await? else {
            return Ok(());
        };

        match status {
            OrderStatus::Shipped => {
                let address = AddressRepository::new(self.db)
                    .get(order.shipping_address_id)
                    .await?;
                notify::dispatch(
                    self.mailer,
                    user.email.as_str().to_owned(),
                    notify::order_shipped_subject(order.id),
                    notify::order_shipped_body(&user, order, address.as_ref()),
                );
            }
            OrderStatus::Cancelled => {
                notify::dispatch(
                    self.mailer,
                    user.email.as_str().to_owned(),
                    notify::order_cancelled_subject(order.id),
                    notify::order_cancelled_body(&user, order),
                );
            }
            _ => {}
        }
        Ok(())
    }

    /// Record payment confirmation (admin operation).
    ///
    /// Payment is orthogonal to fulfillment status. Confirming without a
    /// date stamps the current instant; un-confirming clears the date.
    ///
    /// # Errors
    ///
    /// - `AppError::Validation` if the supplied date is unparseable
    /// - `AppError::NotFound` if the order does not exist
    /// - `AppError::Database` if the update fails
    pub async fn confirm_payment(
        &self,
        order_id: OrderId,
        confirmed: bool,
        payment_date: Option<String>,
    ) -> Result<(), AppError> {
        let stored_date = if confirmed {
            Some(match payment_date {
                Some(date) => normalize_payment_date(&date)
                    .ok_or_else(|| AppError::validation("Invalid payment date"))?,
                None => now_timestamp(),
            })
        } else {
            None
        };

        let updated = OrderRepository::new(self.db)
            .update_payment(order_id, confirmed, stored_date)
            .await?;
        if !updated {
            return Err(AppError::not_found("Order not found"));
        }
        Ok(())
    }
}

/// Normalize a client-supplied payment date to the canonical stored form.
///
/// Accepts a bare date, the stored `YYYY-MM-DD HH:MM:SS` form, or an ISO
/// `T`-separated datetime. Anything else is rejected rather than stored
/// ambiguously.
fn normalize_payment_date(input: &str) -> Option<String> {
    let input = input.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(format!("{} 00:00:00", date.format("%Y-%m-%d")));
    }
    None
}
