//! Order repository.

use oroshi_core::{AddressId, Money, OrderId, OrderStatus, ProductId, UserId, now_timestamp};

use crate::db::{Database, RepositoryError};
use crate::models::{Order, OrderDetails};
use crate::params;

/// Fields for a new order row. Prices are snapshotted by the lifecycle
/// engine before this struct is built.
#[derive(Debug)]
pub struct NewOrder {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub shipping_address_id: AddressId,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub status: OrderStatus,
}

/// Joined admin listing projection: explicit columns so the aliased user,
/// product, and address fields never collide with the order's own.
const DETAILED_SELECT: &str = "SELECT \
    o.id, o.user_id, o.product_id, o.shipping_address_id, o.quantity, \
    o.unit_price, o.total_price, o.status, o.payment_confirmed, \
    o.payment_date, o.created_at, \
    u.company_name, u.last_name, u.first_name, \
    p.name AS product_name, p.flavor AS product_flavor, \
    s.id AS sa_id, s.user_id AS sa_user_id, s.label AS sa_label, \
    s.postal_code AS sa_postal_code, s.address AS sa_address, \
    s.phone AS sa_phone, s.is_default AS sa_is_default \
    FROM orders o \
    JOIN users u ON o.user_id = u.id \
    LEFT JOIN products p ON o.product_id = p.id \
    LEFT JOIN shipping_addresses s ON o.shipping_address_id = s.id";

/// Repository for orders.
pub struct OrderRepository<'a> {
    db: &'a Database,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert an order row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn create(&self, order: NewOrder) -> Result<OrderId, RepositoryError> {
        let id = self
            .db
            .insert(
                "INSERT INTO orders \
                 (user_id, product_id, shipping_address_id, quantity, unit_price, \
                  total_price, status, payment_confirmed, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
                &params![
                    order.user_id,
                    order.product_id,
                    order.shipping_address_id,
                    order.quantity,
                    order.unit_price,
                    order.total_price,
                    order.status,
                    now_timestamp(),
                ],
            )
            .await?;
        Ok(OrderId::new(id))
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.db
            .fetch_optional("SELECT * FROM orders WHERE id = ?", &params![id])
            .await?
            .map(|row| Order::from_row(&row))
            .transpose()
    }

    /// Get an order only if it belongs to the given user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get_owned(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        self.db
            .fetch_optional(
                "SELECT * FROM orders WHERE id = ? AND user_id = ?",
                &params![id, user_id],
            )
            .await?
            .map(|row| Order::from_row(&row))
            .transpose()
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is malformed.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        self.db
            .fetch_all(
                "SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC",
                &params![user_id],
            )
            .await?
            .iter()
            .map(Order::from_row)
            .collect()
    }

    /// Every order joined with orderer, product, and shipping address,
    /// newest first (admin listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is malformed.
    pub async fn list_all_detailed(&self) -> Result<Vec<OrderDetails>, RepositoryError> {
        let sql = format!("{DETAILED_SELECT} ORDER BY o.created_at DESC, o.id DESC");
        self.db
            .fetch_all(&sql, &[])
            .await?
            .iter()
            .map(OrderDetails::from_joined_row)
            .collect()
    }

    /// Set the fulfillment status. Returns whether a row was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let affected = self
            .db
            .execute(
                "UPDATE orders SET status = ? WHERE id = ?",
                &params![status, id],
            )
            .await?;
        Ok(affected > 0)
    }

    /// Set the payment-confirmation flag and date. Returns whether a row
    /// was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn update_payment(
        &self,
        id: OrderId,
        confirmed: bool,
        payment_date: Option<String>,
    ) -> Result<bool, RepositoryError> {
        let affected = self
            .db
            .execute(
                "UPDATE orders SET payment_confirmed = ?, payment_date = ? WHERE id = ?",
                &params![confirmed, payment_date, id],
            )
            .await?;
        Ok(affected > 0)
    }
}
