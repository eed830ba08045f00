//! Shared document endpoint plumbing.
//!
//! Both the customer receipt endpoint and the admin invoice/receipt
//! endpoints resolve the same data and stream the same renderer output;
//! this module owns that path.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::Order;
use crate::services::documents::{
    DocumentData, DocumentKind, DocumentRenderer, PlainTextRenderer,
};

/// Resolve everything the renderer needs for an order.
pub(crate) async fn assemble(db: &Database, order: &Order) -> Result<DocumentData> {
    let user = UserRepository::new(db).get_by_id(order.user_id).await?;
    let product = match order.product_id {
        Some(id) => ProductRepository::new(db).get(id).await?,
        None => None,
    };

    Ok(DocumentData::assemble(
        order,
        user.as_ref().map(|u| u.company_name.as_str()),
        product.as_ref().map(crate::models::Product::display_name),
        product.as_ref().map(|p| p.price),
    ))
}

/// Render a document and wrap it as an attachment response.
pub(crate) fn respond(kind: DocumentKind, doc: &DocumentData) -> Result<Response> {
    let mut body = Vec::new();
    PlainTextRenderer
        .render(kind, doc, &mut body)
        .map_err(|e| AppError::Internal(format!("document rendering failed: {e}")))?;

    let disposition = format!("attachment; filename=\"{}\"", kind.filename(doc.order_id));
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
