use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::{Cart, CartLine};
use super::errors::DomainError;

/// The status checkout stamps on every order it creates. Nothing else in
/// this service creates or transitions orders, so it is also the only
/// status the service ever produces.
pub const ORDER_STATUS_SUCCESS: &str = "success";

/// An immutable point-in-time snapshot of a cart. Once created it is never
/// re-derived from the cart and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lines: Vec<CartLine>,
    pub total_price: BigDecimal,
    pub status: String,
    pub ordered_at: DateTime<Utc>,
}

impl Order {
    /// Builds the checkout snapshot: the cart's lines and total are copied
    /// by value. Fails if the cart has no lines; checkout never fires on an
    /// empty cart.
    pub fn from_cart(cart: &Cart, ordered_at: DateTime<Utc>) -> Result<Order, DomainError> {
        if cart.is_empty() {
            return Err(DomainError::EmptyCart("No items to checkout"));
        }
        Ok(Order {
            id: Uuid::new_v4(),
            user_id: cart.user_id,
            lines: cart.lines.clone(),
            total_price: cart.total_price.clone(),
            status: ORDER_STATUS_SUCCESS.to_string(),
            ordered_at,
        })
    }
}
