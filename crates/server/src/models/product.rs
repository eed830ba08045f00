//! Catalog product.

use serde::Serialize;

use oroshi_core::{Money, ProductId, QuantityRule};

use crate::db::{RepositoryError, Row};

/// A catalog entry.
///
/// `price` is in the smallest currency unit, tax inclusive; it is
/// snapshotted onto orders at creation time, so editing it never rewrites
/// history.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub flavor: Option<String>,
    pub price: Money,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub catch_copy: Option<String>,
    pub min_quantity: i64,
    pub quantity_step: i64,
    pub is_active: bool,
    pub created_at: String,
}

impl Product {
    /// Build a `Product` from an adapter row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` on missing columns.
    pub fn from_row(row: &Row) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: ProductId::new(row.i64("id")?),
            name: row.text("name")?,
            flavor: row.opt_text("flavor")?,
            price: Money::new(row.i64("price")?),
            image_url: row.opt_text("image_url")?,
            description: row.opt_text("description")?,
            catch_copy: row.opt_text("catch_copy")?,
            min_quantity: row.i64("min_quantity")?,
            quantity_step: row.i64("quantity_step")?,
            is_active: row.flag("is_active")?,
            created_at: row.text("created_at")?,
        })
    }

    /// The bulk-ordering rule for this product.
    #[must_use]
    pub const fn quantity_rule(&self) -> QuantityRule {
        QuantityRule::new(self.min_quantity, self.quantity_step)
    }

    /// Display name including the flavor when present, e.g. `BASE (Cocoa)`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.flavor {
            Some(flavor) => format!("{} ({flavor})", self.name),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(flavor: Option<&str>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "BASE".to_owned(),
            flavor: flavor.map(str::to_owned),
            price: Money::new(1500),
            image_url: None,
            description: None,
            catch_copy: None,
            min_quantity: 10,
            quantity_step: 10,
            is_active: true,
            created_at: "2025-01-01 00:00:00".to_owned(),
        }
    }

    #[test]
    fn test_display_name_with_flavor() {
        assert_eq!(product(Some("Cocoa")).display_name(), "BASE (Cocoa)");
        assert_eq!(product(None).display_name(), "BASE");
    }

    #[test]
    fn test_quantity_rule_comes_from_catalog_fields() {
        let rule = product(None).quantity_rule();
        assert!(rule.validate(20).is_ok());
        assert!(rule.validate(15).is_err());
    }
}
