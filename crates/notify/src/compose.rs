//! Message composition for the storefront's transactional sends.
//!
//! Plain string templates; amounts are rendered with two decimals in EGP.

use nilecart_auth::User;
use nilecart_orders::Order;

/// Subject + HTML body pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

/// Admin notification for a freshly placed order.
pub fn admin_order_email(order: &Order, buyer: &User) -> EmailContent {
    let items = order
        .line_items
        .iter()
        .map(|item| {
            format!(
                "<li>{} x{} — {:.2} EGP</li>",
                item.name, item.qty, item.price
            )
        })
        .collect::<String>();

    let html = format!(
        "<div style=\"font-family: sans-serif; padding: 20px;\">\
         <h2>New Order Received</h2>\
         <p>Customer <strong>{name}</strong> (<a href=\"mailto:{email}\">{email}</a>) placed an order.</p>\
         <p><strong>Order ID:</strong> #{id}</p>\
         <ul>{items}</ul>\
         <p><strong>Shipping:</strong> {shipping:.2} EGP ({gov})</p>\
         <p><strong>Total:</strong> {total:.2} EGP</p>\
         </div>",
        name = buyer.full_name(),
        email = buyer.email,
        id = order.id,
        items = items,
        shipping = order.shipping_price,
        gov = order.shipping_address.state,
        total = order.total_price,
    );

    EmailContent { subject: format!("New Order Received #{}", order.id), html }
}

/// Admin notification for a customer cancellation request.
pub fn cancellation_request_email(order: &Order, buyer: &User) -> EmailContent {
    let html = format!(
        "<div style=\"font-family: sans-serif; padding: 20px;\">\
         <h2 style=\"color: #e74c3c;\">Order Cancellation Request</h2>\
         <p>Customer <strong>{name}</strong> (<a href=\"mailto:{email}\">{email}</a>) \
         has requested to cancel their order.</p>\
         <div style=\"background: #f9f9f9; padding: 15px; border-radius: 5px; margin: 20px 0;\">\
         <p><strong>Order ID:</strong> #{id}</p>\
         <p><strong>Total Amount:</strong> {total:.2} EGP</p>\
         <p><strong>Current Status:</strong> {status}</p>\
         </div>\
         <p>Please review this request in the admin panel.</p>\
         </div>",
        name = buyer.full_name(),
        email = buyer.email,
        id = order.id,
        total = order.total_price,
        status = order.status,
    );

    EmailContent { subject: format!("Cancellation Request for Order #{}", order.id), html }
}

/// WhatsApp receipt sent when an order is confirmed.
pub fn whatsapp_receipt(order: &Order, buyer: &User) -> String {
    let items = order
        .line_items
        .iter()
        .map(|item| format!("- {} x{}: {:.2} EGP", item.name, item.qty, item.price))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Hello {first},\n\
         Your order #{id} has been confirmed!\n\n\
         *Receipt:*\n{items}\n\n\
         *Breakdown:*\n\
         Items Total: {items_price:.2} EGP\n\
         Tax: {tax:.2} EGP\n\
         Shipping: {shipping:.2} EGP\n\
         ----------------\n\
         *Total: {total:.2} EGP*\n\n\
         Estimated Arrival: 3-5 business days.\n\n\
         Thank you for shopping with us!",
        first = buyer.first_name,
        id = order.id,
        items = items,
        items_price = order.items_price,
        tax = order.tax_price,
        shipping = order.shipping_price,
        total = order.total_price,
    )
}

/// WhatsApp notice sent when an order is canceled.
pub fn whatsapp_cancellation(order: &Order, buyer: &User) -> String {
    format!(
        "Hello {first},\n\
         Per your request, your order #{id} has been canceled.\n\n\
         If you have any questions or did not request this cancellation, \
         please contact us immediately.\n\n\
         Thank you.",
        first = buyer.first_name,
        id = order.id,
    )
}
