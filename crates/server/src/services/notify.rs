//! Notification dispatch and mail bodies.
//!
//! Bodies are assembled here from fully-resolved data; the sender never
//! touches the database. Dispatch is fire-and-forget: the mail task is
//! spawned and the calling operation returns without awaiting it, so
//! delivery is unordered relative to the client seeing success.

use oroshi_core::{Money, OrderId};

use crate::models::{Order, Product, ShippingAddress, User};
use crate::services::mailer::Mailer;

/// Spawn a mail send without awaiting it.
///
/// The spawned task owns a sender clone; failures are logged inside
/// [`Mailer::send`] and go nowhere else.
pub fn dispatch(mailer: &Mailer, to: String, subject: String, html: String) {
    let mailer = mailer.clone();
    tokio::spawn(async move {
        mailer.send(&to, &subject, &html).await;
    });
}

fn address_block(address: &ShippingAddress) -> String {
    format!(
        "<div style=\"margin: 20px 0;\">\
         <h3>Shipping address</h3>\
         <p style=\"margin: 5px 0;\"><strong>{}</strong></p>\
         <p style=\"margin: 5px 0;\">{}</p>\
         <p style=\"margin: 5px 0;\">{}</p>\
         <p style=\"margin: 5px 0;\">TEL: {}</p>\
         </div>",
        address.label, address.postal_code, address.address, address.phone
    )
}

/// Subject of the order confirmation sent to the customer.
#[must_use]
pub fn order_confirmation_subject(order_id: OrderId) -> String {
    format!("[Oroshi] Thank you for your order (#{order_id})")
}

/// Order confirmation mail sent to the customer.
#[must_use]
pub fn order_confirmation_body(
    user: &User,
    order_id: OrderId,
    product: &Product,
    quantity: i64,
    total_price: Money,
    address: &ShippingAddress,
    payment_instructions: Option<&str>,
) -> String {
    let payment_block = payment_instructions.map_or_else(String::new, |instructions| {
        format!(
            "<div style=\"background-color: #fef3c7; padding: 20px; border-radius: 8px; \
             margin: 20px 0;\">\
             <h3 style=\"margin-top: 0;\">Payment</h3>\
             <p style=\"margin: 10px 0;\">{instructions}</p>\
             </div>"
        )
    });

    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: #2563eb;\">Thank you for your order</h2>\
         <p>{company},</p>\
         <p>We have received the following order.</p>\
         <div style=\"background-color: #f3f4f6; padding: 20px; border-radius: 8px; \
         margin: 20px 0;\">\
         <h3 style=\"margin-top: 0;\">Order details</h3>\
         <table style=\"width: 100%; border-collapse: collapse;\">\
         <tr><td>Order number:</td><td><strong>#{order_id}</strong></td></tr>\
         <tr><td>Product:</td><td>{product}</td></tr>\
         <tr><td>Quantity:</td><td>{quantity} units</td></tr>\
         <tr><td>Total:</td><td><strong>{total}</strong></td></tr>\
         </table>\
         </div>\
         {payment_block}\
         {address_block}\
         <p style=\"color: #6b7280; font-size: 14px; margin-top: 30px;\">\
         Please contact us with any questions. Thank you for ordering with us.</p>\
         </div>",
        company = user.company_name,
        product = product.display_name(),
        total = total_price.grouped(),
        address_block = address_block(address),
    )
}

/// Subject of the new-order alert sent to the administrator.
#[must_use]
pub fn admin_order_alert_subject(order_id: OrderId, user: &User) -> String {
    format!("[Oroshi] New order #{order_id} - {}", user.company_name)
}

/// New-order alert mail sent to the administrator.
#[must_use]
pub fn admin_order_alert_body(
    user: &User,
    order_id: OrderId,
    product: &Product,
    quantity: i64,
    unit_price: Money,
    total_price: Money,
    address: &ShippingAddress,
) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: #dc2626;\">A new order has arrived</h2>\
         <div style=\"background-color: #f3f4f6; padding: 20px; border-radius: 8px; \
         margin: 20px 0;\">\
         <h3 style=\"margin-top: 0;\">Customer</h3>\
         <table style=\"width: 100%; border-collapse: collapse;\">\
         <tr><td>Order number:</td><td><strong>#{order_id}</strong></td></tr>\
         <tr><td>Company:</td><td><strong>{company}</strong></td></tr>\
         <tr><td>Contact:</td><td>{contact}</td></tr>\
         <tr><td>Email:</td><td>{email}</td></tr>\
         <tr><td>Phone:</td><td>{phone}</td></tr>\
         </table>\
         </div>\
         <div style=\"background-color: #dbeafe; padding: 20px; border-radius: 8px; \
         margin: 20px 0;\">\
         <h3 style=\"margin-top: 0;\">Order details</h3>\
         <table style=\"width: 100%; border-collapse: collapse;\">\
         <tr><td>Product:</td><td>{product}</td></tr>\
         <tr><td>Quantity:</td><td><strong>{quantity} units</strong></td></tr>\
         <tr><td>Unit price:</td><td>{unit}</td></tr>\
         <tr><td>Total:</td><td><strong>{total}</strong></td></tr>\
         </table>\
         </div>\
         {address_block}\
         <p style=\"color: #6b7280; font-size: 14px; margin-top: 30px;\">\
         Review the order in the admin dashboard and update its status.</p>\
         </div>",
        company = user.company_name,
        contact = user.contact_name(),
        email = user.email,
        phone = user.phone,
        product = product.display_name(),
        unit = unit_price.grouped(),
        total = total_price.grouped(),
        address_block = address_block(address),
    )
}

/// Subject of the shipment notice.
#[must_use]
pub fn order_shipped_subject(order_id: OrderId) -> String {
    format!("[Oroshi] Your order has shipped (#{order_id})")
}

/// Shipment notice sent when an order moves to `shipped`.
#[must_use]
pub fn order_shipped_body(user: &User, order: &Order, address: Option<&ShippingAddress>) -> String {
    let address_block = address.map(address_block).unwrap_or_default();
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: #16a34a;\">Your order has shipped</h2>\
         <p>{company},</p>\
         <p>The items below are on their way.</p>\
         <div style=\"background-color: #f3f4f6; padding: 20px; border-radius: 8px; \
         margin: 20px 0;\">\
         <table style=\"width: 100%; border-collapse: collapse;\">\
         <tr><td>Order number:</td><td><strong>#{order_id}</strong></td></tr>\
         <tr><td>Quantity:</td><td>{quantity} units</td></tr>\
         </table>\
         </div>\
         {address_block}\
         <p style=\"color: #6b7280; font-size: 14px; margin-top: 30px;\">\
         Please allow a few days for delivery.</p>\
         </div>",
        company = user.company_name,
        order_id = order.id,
        quantity = order.quantity,
    )
}

/// Subject of the cancellation notice.
#[must_use]
pub fn order_cancelled_subject(order_id: OrderId) -> String {
    format!("[Oroshi] Your order has been cancelled (#{order_id})")
}

/// Cancellation notice sent when an order moves to `cancelled`.
///
/// The refund wording is informational only; no refund is performed here.
#[must_use]
pub fn order_cancelled_body(user: &User, order: &Order) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: #dc2626;\">Your order has been cancelled</h2>\
         <p>{company},</p>\
         <p>The following order was cancelled.</p>\
         <div style=\"background-color: #f3f4f6; padding: 20px; border-radius: 8px; \
         margin: 20px 0;\">\
         <table style=\"width: 100%; border-collapse: collapse;\">\
         <tr><td>Order number:</td><td><strong>#{order_id}</strong></td></tr>\
         <tr><td>Quantity:</td><td>{quantity} units</td></tr>\
         <tr><td>Amount:</td><td>{total}</td></tr>\
         </table>\
         </div>\
         <div style=\"background-color: #fee2e2; padding: 15px; border-radius: 8px; \
         margin: 20px 0;\">\
         <p style=\"margin: 0;\">If you have already paid, we will arrange a refund.</p>\
         </div>\
         <p style=\"color: #6b7280; font-size: 14px; margin-top: 30px;\">\
         Please contact us with any questions.</p>\
         </div>",
        company = user.company_name,
        order_id = order.id,
        quantity = order.quantity,
        total = order.total_price.grouped(),
    )
}

/// Subject of the password-reset mail.
#[must_use]
pub fn password_reset_subject() -> String {
    "[Oroshi] Password reset".to_owned()
}

/// Password-reset mail with a link valid for one hour.
#[must_use]
pub fn password_reset_body(company_name: &str, reset_link: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: #2563eb;\">Password reset</h2>\
         <p>{company_name},</p>\
         <p>We received a request to reset your password. Use the link below to choose \
         a new one.</p>\
         <div style=\"margin: 30px 0; text-align: center;\">\
         <a href=\"{reset_link}\" style=\"background-color: #2563eb; color: white; \
         padding: 12px 24px; text-decoration: none; border-radius: 4px; \
         font-weight: bold;\">Reset password</a>\
         </div>\
         <p>The link is valid for one hour.</p>\
         <p style=\"color: #6b7280; font-size: 14px;\">If you did not request this, \
         you can ignore this mail.</p>\
         </div>"
    )
}

#[cfg(test)]
mod tests {
    use oroshi_core::{AddressId, Email, ProductId, UserId};

    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("buyer@example.com").unwrap(),
            company_name: "Acme Trading".to_owned(),
            last_name: "Sato".to_owned(),
            first_name: "Yui".to_owned(),
            phone: "08012345678".to_owned(),
            postal_code: None,
            address: None,
            created_at: "2025-01-01 00:00:00".to_owned(),
        }
    }

    fn sample_product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "BASE".to_owned(),
            flavor: Some("Cocoa".to_owned()),
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

    fn sample_address() -> ShippingAddress {
        ShippingAddress {
            id: AddressId::new(1),
            user_id: UserId::new(1),
            label: "Head office".to_owned(),
            postal_code: "100-0001".to_owned(),
            address: "1-1 Chiyoda, Tokyo".to_owned(),
            phone: "0311112222".to_owned(),
            is_default: true,
        }
    }

    #[test]
    fn test_confirmation_body_contains_resolved_data() {
        let body = order_confirmation_body(
            &sample_user(),
            OrderId::new(7),
            &sample_product(),
            20,
            Money::new(30000),
            &sample_address(),
            Some("Transfer to account 0000000 at Example Bank."),
        );
        assert!(body.contains("#7"));
        assert!(body.contains("BASE (Cocoa)"));
        assert!(body.contains("20 units"));
        assert!(body.contains("30,000"));
        assert!(body.contains("Head office"));
        assert!(body.contains("Example Bank"));
    }

    #[test]
    fn test_confirmation_body_without_payment_instructions() {
        let body = order_confirmation_body(
            &sample_user(),
            OrderId::new(7),
            &sample_product(),
            20,
            Money::new(30000),
            &sample_address(),
            None,
        );
        assert!(!body.contains("Payment"));
    }

    #[test]
    fn test_admin_alert_names_the_orderer() {
        let body = admin_order_alert_body(
            &sample_user(),
            OrderId::new(7),
            &sample_product(),
            20,
            Money::new(1500),
            Money::new(30000),
            &sample_address(),
        );
        assert!(body.contains("Acme Trading"));
        assert!(body.contains("Sato Yui"));
        assert!(body.contains("buyer@example.com"));
        assert!(body.contains("1,500"));
    }

    #[test]
    fn test_reset_body_carries_the_link() {
        let body = password_reset_body("Acme Trading", "https://example.com/reset?token=abc");
        assert!(body.contains("https://example.com/reset?token=abc"));
    }
}
