use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::cart::{Cart, CartOp};
use super::errors::DomainError;
use super::order::Order;

/// Catalog lookup as seen by the cart engine: just enough to resolve a
/// product id to its name and current unit price.
#[derive(Debug, Clone)]
pub struct ProductRef {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}

pub trait ProductCatalog: Send + Sync + 'static {
    fn find_product(&self, id: Uuid) -> Result<Option<ProductRef>, DomainError>;
}

/// Persistence for carts, keyed by user id.
///
/// `apply` runs the whole read-modify-write cycle inside the store's
/// per-user critical section (a row lock in the Postgres implementation),
/// so two concurrent mutations of the same cart cannot lose an update.
pub trait CartStore: Send + Sync + 'static {
    fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, DomainError>;

    /// Loads the user's cart, applies `op`, persists, and returns the
    /// updated cart. Creates the cart first when `op.creates_cart()` and
    /// none exists; otherwise a missing cart is `NotFound`.
    fn apply(&self, user_id: Uuid, op: CartOp) -> Result<Cart, DomainError>;
}

/// Persistence for orders. `checkout` owns the cart-to-order transition:
/// reading the cart, snapshotting it into an order, and emptying the cart
/// are one logical transaction.
pub trait OrderStore: Send + Sync + 'static {
    fn checkout(&self, user_id: Uuid) -> Result<Order, DomainError>;
    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError>;
    fn list_all(&self) -> Result<Vec<Order>, DomainError>;
}
