//! Order domain types.
//!
//! Order items are a snapshot copied verbatim from the checkout request:
//! later changes to product prices or names must not alter historical
//! orders. Status changes go through [`OrderStatus::can_transition_to`]
//! rather than writing fields freely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use threadline_core::{Money, OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

/// Errors from order operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The requested status change is not a valid transition.
    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// One line of an order: an immutable snapshot of what was bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: ProductId,
    pub name: String,
    pub image_src: String,
    pub price: Money,
    pub quantity: u32,
    pub size: String,
    pub color: String,
}

/// A shipping or billing address frozen into the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// A placed order (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub shipping_address: OrderAddress,
    pub billing_address: OrderAddress,
    /// Display label of the payment method used, e.g. "visa-4242".
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    #[serde(rename = "trackingURL")]
    pub tracking_url: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
    pub date: DateTime<Utc>,
}

impl Order {
    /// Move the order to `next`, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] if the status machine does
    /// not allow the change.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Cancel the order, if it has not already shipped out of reach.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] for delivered or already
    /// cancelled orders.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Cancelled)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::new(s.parse().unwrap())
    }

    fn test_address() -> OrderAddress {
        OrderAddress {
            name: "Home".to_owned(),
            street_address: "1 Main St".to_owned(),
            city: "Springfield".to_owned(),
            state: "IL".to_owned(),
            postal_code: "62701".to_owned(),
            country: "US".to_owned(),
        }
    }

    fn test_order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(1),
            user: UserId::new(1),
            items: vec![OrderItem {
                product: ProductId::new(7),
                name: "Slim Fit Tee".to_owned(),
                image_src: "/img/tee.jpg".to_owned(),
                price: money("19.99"),
                quantity: 2,
                size: "M".to_owned(),
                color: "Red".to_owned(),
            }],
            subtotal: money("39.98"),
            shipping_cost: money("5.00"),
            discount: Money::ZERO,
            tax: money("3.20"),
            total: money("48.18"),
            shipping_address: test_address(),
            billing_address: test_address(),
            payment_method: "visa-4242".to_owned(),
            payment_status: PaymentStatus::Paid,
            status,
            tracking_number: None,
            tracking_url: None,
            estimated_delivery: None,
            delivered_date: None,
            date: Utc::now(),
        }
    }

    #[test]
    fn test_cancel_processing_order() {
        let mut order = test_order(OrderStatus::Processing);
        order.cancel().unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_cannot_cancel_delivered_order() {
        let mut order = test_order(OrderStatus::Delivered);
        let err = order.cancel().unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Cancelled,
            }
        );
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[test]
    fn test_fulfillment_path() {
        let mut order = test_order(OrderStatus::Processing);
        order.transition_to(OrderStatus::Shipped).unwrap();
        order.transition_to(OrderStatus::Delivered).unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);

        // Terminal: no further moves
        assert!(order.transition_to(OrderStatus::Shipped).is_err());
    }

    #[test]
    fn test_skipping_transition_rejected() {
        let mut order = test_order(OrderStatus::Processing);
        assert!(order.transition_to(OrderStatus::Delivered).is_err());
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[test]
    fn test_tracking_url_wire_name() {
        let mut order = test_order(OrderStatus::Shipped);
        order.tracking_url = Some("https://track.example/1".to_owned());
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("trackingURL").is_some());
        assert!(json.get("trackingUrl").is_none());
    }
}
