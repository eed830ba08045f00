//! Bulk-order quantity rules.

use serde::{Deserialize, Serialize};

/// The requested quantity violates the product's ordering rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    /// Quantity must be positive.
    #[error("quantity must be greater than zero")]
    NotPositive,
    /// Quantity is below the product's minimum order quantity.
    #[error("quantity must be at least {min}")]
    BelowMinimum {
        /// The product's minimum order quantity.
        min: i64,
    },
    /// Quantity is not a multiple of the product's step.
    #[error("quantity must be a multiple of {step}")]
    NotAMultiple {
        /// The product's quantity step.
        step: i64,
    },
}

/// Per-product bulk ordering rule: a minimum quantity and a step size.
///
/// A valid order quantity is `>= min_quantity` and a multiple of
/// `quantity_step`. A step of zero or less disables the multiple check
/// (defensive: rules come from catalog rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityRule {
    pub min_quantity: i64,
    pub quantity_step: i64,
}

impl QuantityRule {
    /// Create a rule.
    #[must_use]
    pub const fn new(min_quantity: i64, quantity_step: i64) -> Self {
        Self {
            min_quantity,
            quantity_step,
        }
    }

    /// Validate an order quantity against this rule.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint: positivity, then minimum,
    /// then step multiple.
    pub const fn validate(&self, quantity: i64) -> Result<(), QuantityError> {
        if quantity <= 0 {
            return Err(QuantityError::NotPositive);
        }
        if quantity < self.min_quantity {
            return Err(QuantityError::BelowMinimum {
                min: self.min_quantity,
            });
        }
        if self.quantity_step > 0 && quantity % self.quantity_step != 0 {
            return Err(QuantityError::NotAMultiple {
                step: self.quantity_step,
            });
        }
        Ok(())
    }
}
