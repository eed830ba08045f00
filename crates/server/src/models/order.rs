//! Orders and their presentation shapes.

use serde::Serialize;

use oroshi_core::{AddressId, Money, OrderId, OrderStatus, ProductId, UserId};

use crate::db::{RepositoryError, Row};
use crate::models::ShippingAddress;

/// A placed order.
///
/// `unit_price` is the product price at creation time and never changes;
/// `total_price` equals `quantity * unit_price`. Rows that predate price
/// snapshotting carry NULL `unit_price` and `product_id`.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_id: Option<ProductId>,
    pub shipping_address_id: AddressId,
    pub quantity: i64,
    pub unit_price: Option<Money>,
    pub total_price: Money,
    pub status: OrderStatus,
    pub payment_confirmed: bool,
    pub payment_date: Option<String>,
    pub created_at: String,
}

impl Order {
    /// Build an `Order` from an adapter row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` on missing columns or an
    /// unknown stored status.
    pub fn from_row(row: &Row) -> Result<Self, RepositoryError> {
        let status: OrderStatus = row.text("status")?.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;
        Ok(Self {
            id: OrderId::new(row.i64("id")?),
            user_id: UserId::new(row.i64("user_id")?),
            product_id: row.opt_i64("product_id")?.map(ProductId::new),
            shipping_address_id: AddressId::new(row.i64("shipping_address_id")?),
            quantity: row.i64("quantity")?,
            unit_price: row.opt_i64("unit_price")?.map(Money::new),
            total_price: Money::new(row.i64("total_price")?),
            status,
            payment_confirmed: row.flag("payment_confirmed")?,
            payment_date: row.opt_text("payment_date")?,
            created_at: row.text("created_at")?,
        })
    }
}

/// Customer-facing order payload.
///
/// Adds `display_status` with the legacy alias folded away; the stored
/// `status` is reported untouched.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub display_status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
}

impl OrderView {
    /// Wrap an order for presentation.
    #[must_use]
    pub fn new(order: Order) -> Self {
        let display_status = order.status.normalized();
        Self {
            order,
            display_status,
            shipping_address: None,
        }
    }

    /// Attach the resolved shipping address.
    #[must_use]
    pub fn with_shipping_address(mut self, address: ShippingAddress) -> Self {
        self.shipping_address = Some(address);
        self
    }
}

/// Admin order listing entry: the order joined with orderer and catalog data.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub display_status: OrderStatus,
    pub company_name: String,
    pub user_name: String,
    pub product_name: String,
    pub shipping_address: Option<ShippingAddress>,
}

impl OrderDetails {
    /// Build an `OrderDetails` from a joined adapter row.
    ///
    /// Joined columns are prefixed: user fields as-is, product fields as
    /// `product_name`/`product_flavor`, address fields as `sa_*`. Rows whose
    /// product or address was deleted degrade to placeholders instead of
    /// failing the whole listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` on missing order columns.
    pub fn from_joined_row(row: &Row) -> Result<Self, RepositoryError> {
        let order = Order::from_row(row)?;
        let display_status = order.status.normalized();

        let company_name = row
            .opt_text("company_name")?
            .unwrap_or_else(|| "unknown".to_owned());
        let user_name = match (row.opt_text("last_name")?, row.opt_text("first_name")?) {
            (Some(last), Some(first)) => format!("{last} {first}"),
            _ => "unknown".to_owned(),
        };
        let product_name = match (row.opt_text("product_name")?, row.opt_text("product_flavor")?) {
            (Some(name), Some(flavor)) => format!("{name} ({flavor})"),
            (Some(name), None) => name,
            _ => "unknown".to_owned(),
        };

        let shipping_address = match row.opt_i64("sa_id")? {
            Some(id) => Some(ShippingAddress {
                id: AddressId::new(id),
                user_id: UserId::new(row.i64("sa_user_id")?),
                label: row.text("sa_label")?,
                postal_code: row.text("sa_postal_code")?,
                address: row.text("sa_address")?,
                phone: row.text("sa_phone")?,
                is_default: row.flag("sa_is_default")?,
            }),
            None => None,
        };

        Ok(Self {
            order,
            display_status,
            company_name,
            user_name,
            product_name,
            shipping_address,
        })
    }
}
