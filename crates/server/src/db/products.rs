//! Product catalog repository.

use oroshi_core::{Money, ProductId, now_timestamp};

use crate::db::{Database, RepositoryError, SqlValue};
use crate::models::Product;
use crate::params;

/// Fields for a new catalog product.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub flavor: Option<String>,
    pub price: Money,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub catch_copy: Option<String>,
    pub min_quantity: i64,
    pub quantity_step: i64,
    pub is_active: bool,
}

/// Fields for updating a product. `image_url` is only written when present,
/// so edits without a new image keep the existing reference.
#[derive(Debug)]
pub struct ProductUpdate {
    pub name: String,
    pub flavor: Option<String>,
    pub price: Money,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub catch_copy: Option<String>,
    pub min_quantity: i64,
    pub quantity_step: i64,
    pub is_active: bool,
}

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    db: &'a Database,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Active catalog, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is malformed.
    pub async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        self.db
            .fetch_all(
                "SELECT * FROM products WHERE is_active = 1 ORDER BY id ASC",
                &[],
            )
            .await?
            .iter()
            .map(Product::from_row)
            .collect()
    }

    /// Entire catalog including inactive products (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is malformed.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.db
            .fetch_all("SELECT * FROM products ORDER BY id ASC", &[])
            .await?
            .iter()
            .map(Product::from_row)
            .collect()
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.db
            .fetch_optional("SELECT * FROM products WHERE id = ?", &params![id])
            .await?
            .map(|row| Product::from_row(&row))
            .transpose()
    }

    /// The first active product, used when an order names no product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is malformed.
    pub async fn first_active(&self) -> Result<Option<Product>, RepositoryError> {
        self.db
            .fetch_optional(
                "SELECT * FROM products WHERE is_active = 1 ORDER BY id ASC LIMIT 1",
                &[],
            )
            .await?
            .map(|row| Product::from_row(&row))
            .transpose()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn create(&self, product: NewProduct) -> Result<ProductId, RepositoryError> {
        let id = self
            .db
            .insert(
                "INSERT INTO products \
                 (name, flavor, price, image_url, description, catch_copy, min_quantity, \
                  quantity_step, is_active, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &params![
                    product.name,
                    product.flavor,
                    product.price,
                    product.image_url.unwrap_or_default(),
                    product.description.unwrap_or_default(),
                    product.catch_copy.unwrap_or_default(),
                    product.min_quantity,
                    product.quantity_step,
                    product.is_active,
                    now_timestamp(),
                ],
            )
            .await?;
        Ok(ProductId::new(id))
    }

    /// Update a product. Returns whether a row was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn update(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<bool, RepositoryError> {
        let mut sql = "UPDATE products SET name = ?, flavor = ?, price = ?, \
                       description = ?, catch_copy = ?, min_quantity = ?, \
                       quantity_step = ?, is_active = ?"
            .to_owned();
        let mut values = params![
            update.name,
            update.flavor,
            update.price,
            update.description.unwrap_or_default(),
            update.catch_copy.unwrap_or_default(),
            update.min_quantity,
            update.quantity_step,
            update.is_active,
        ];
        if let Some(image_url) = update.image_url {
            sql.push_str(", image_url = ?");
            values.push(SqlValue::from(image_url));
        }
        sql.push_str(" WHERE id = ?");
        values.push(SqlValue::from(id));

        let affected = self.db.execute(&sql, &values).await?;
        Ok(affected > 0)
    }
}
