//! Invoice and receipt documents.
//!
//! The core's responsibility ends at assembling a fully-resolved
//! [`DocumentData`] and handing it to a [`DocumentRenderer`]; layout is a
//! collaborator concern behind that trait. The bundled renderer produces a
//! plain-text document so the endpoints work without a layout engine.

use std::io::{self, Write};

use oroshi_core::{Money, OrderId, now_timestamp};

use crate::models::Order;

/// Which document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Invoice,
    Receipt,
}

impl DocumentKind {
    /// Document heading.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Invoice => "INVOICE",
            Self::Receipt => "RECEIPT",
        }
    }

    /// Attachment filename for an order.
    #[must_use]
    pub fn filename(&self, order_id: OrderId) -> String {
        match self {
            Self::Invoice => format!("invoice_{order_id}.txt"),
            Self::Receipt => format!("receipt_{order_id}.txt"),
        }
    }
}

/// One line item of a document.
#[derive(Debug, Clone)]
pub struct DocumentLine {
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl DocumentLine {
    /// Line amount (`unit_price * quantity`), saturating on overflow.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.unit_price
            .checked_mul(self.quantity)
            .unwrap_or(Money::new(i64::MAX))
    }
}

/// Everything a renderer needs, fully resolved; renderers never touch the
/// database.
#[derive(Debug, Clone)]
pub struct DocumentData {
    pub order_id: OrderId,
    pub issued_at: String,
    pub customer_name: String,
    pub total_price: Money,
    pub payment_confirmed: bool,
    pub lines: Vec<DocumentLine>,
}

impl DocumentData {
    /// Assemble document data from an order and its resolved references.
    ///
    /// The line's unit price is the order's snapshot; rows that predate
    /// snapshotting fall back to the current catalog price. When the
    /// order's total exceeds the item subtotal, the difference appears as
    /// a shipping and handling line so the document always adds up to the
    /// charged total.
    #[must_use]
    pub fn assemble(
        order: &Order,
        company_name: Option<&str>,
        product_name: Option<String>,
        catalog_price: Option<Money>,
    ) -> Self {
        let unit_price = order.unit_price.or(catalog_price).unwrap_or(Money::ZERO);

        let mut lines = vec![DocumentLine {
            name: product_name.unwrap_or_else(|| "Product".to_owned()),
            unit_price,
            quantity: order.quantity,
        }];

        let items_total = lines[0].amount();
        let difference = order.total_price.amount() - items_total.amount();
        if difference > 0 {
            lines.push(DocumentLine {
                name: "Shipping & handling".to_owned(),
                unit_price: Money::new(difference),
                quantity: 1,
            });
        }

        Self {
            order_id: order.id,
            issued_at: now_timestamp(),
            customer_name: company_name.unwrap_or("Customer").to_owned(),
            total_price: order.total_price,
            payment_confirmed: order.payment_confirmed,
            lines,
        }
    }
}

/// Renders a document into an output stream.
pub trait DocumentRenderer {
    /// Write the document.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the output fails.
    fn render(&self, kind: DocumentKind, doc: &DocumentData, out: &mut dyn Write)
    -> io::Result<()>;
}

/// Plain-text renderer; the default document collaborator.
pub struct PlainTextRenderer;

impl DocumentRenderer for PlainTextRenderer {
    fn render(
        &self,
        kind: DocumentKind,
        doc: &DocumentData,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        writeln!(out, "{:=^60}", format!(" {} ", kind.title()))?;
        writeln!(out)?;
        writeln!(out, "Order number: #{}", doc.order_id)?;
        writeln!(out, "Issued:       {}", doc.issued_at)?;
        writeln!(out, "Billed to:    {}", doc.customer_name)?;
        writeln!(out)?;
        writeln!(out, "{:-<60}", "")?;
        writeln!(out, "{:<30} {:>10} {:>6} {:>10}", "Item", "Unit", "Qty", "Amount")?;
        writeln!(out, "{:-<60}", "")?;
        for line in &doc.lines {
            writeln!(
                out,
                "{:<30} {:>10} {:>6} {:>10}",
                line.name,
                line.unit_price.grouped(),
                line.quantity,
                line.amount().grouped(),
            )?;
        }
        writeln!(out, "{:-<60}", "")?;
        writeln!(out, "{:<48} {:>10}", "Total (tax incl.)", doc.total_price.grouped())?;
        writeln!(out)?;
        if doc.payment_confirmed {
            writeln!(out, "Payment received. Thank you.")?;
        } else {
            writeln!(out, "Payment pending.")?;
        }
        Ok(())
    }
}
