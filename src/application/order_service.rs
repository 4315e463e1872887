use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::OrderStore;

/// The order engine: converts a user's cart into an immutable order and
/// exposes order history. The cart-to-order transition itself lives in the
/// store so it can share one database transaction with the cart clear.
pub struct OrderService<S> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn checkout(&self, user_id: Uuid) -> Result<Order, DomainError> {
        self.store.checkout(user_id)
    }

    /// The caller's order history; `NotFound` when they have never ordered.
    pub fn my_orders(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let orders = self.store.list_for_user(user_id)?;
        if orders.is_empty() {
            return Err(DomainError::NotFound("Orders for this user"));
        }
        Ok(orders)
    }

    pub fn all_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.store.list_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cart_service::CartService;
    use crate::application::memory::{InMemoryCartStore, InMemoryOrderStore, StaticCatalog};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    struct Fixture {
        carts: CartService<InMemoryCartStore, StaticCatalog>,
        orders: OrderService<InMemoryOrderStore>,
        burger: Uuid,
    }

    fn fixture() -> Fixture {
        let burger = Uuid::new_v4();
        let cart_store = InMemoryCartStore::default();
        Fixture {
            carts: CartService::new(
                cart_store.clone(),
                StaticCatalog::new(vec![(burger, "Burger", "5.00")]),
            ),
            orders: OrderService::new(InMemoryOrderStore::with_carts(cart_store)),
            burger,
        }
    }

    #[test]
    fn checkout_without_a_cart_is_not_found() {
        let f = fixture();
        let err = f.orders.checkout(Uuid::new_v4()).unwrap_err();
        assert_eq!(err, DomainError::cart_not_found());
    }

    #[test]
    fn checkout_on_an_empty_cart_fails_and_writes_nothing() {
        let f = fixture();
        let user = Uuid::new_v4();
        f.carts.add_item(user, f.burger, "Burger", 1).unwrap();
        f.carts.clear_cart(user).unwrap();

        let err = f.orders.checkout(user).unwrap_err();

        assert!(matches!(err, DomainError::EmptyCart(_)));
        assert!(f.orders.all_orders().unwrap().is_empty());
    }

    #[test]
    fn checkout_snapshots_the_cart_and_empties_it() {
        let f = fixture();
        let user = Uuid::new_v4();
        f.carts.add_item(user, f.burger, "Burger", 2).unwrap();
        f.carts.add_item(user, f.burger, "Burger", 1).unwrap();
        let before = f.carts.get_cart(user).unwrap();

        let order = f.orders.checkout(user).unwrap();

        assert_eq!(order.user_id, user);
        assert_eq!(order.lines, before.lines);
        assert_eq!(order.total_price, BigDecimal::from_str("15.00").unwrap());
        assert_eq!(order.status, "success");

        // The cart survives checkout but is empty.
        let after = f.carts.get_cart(user).unwrap();
        assert!(after.is_empty());
        assert_eq!(after.total_price, BigDecimal::from(0));
    }

    #[test]
    fn a_second_checkout_needs_a_refilled_cart() {
        let f = fixture();
        let user = Uuid::new_v4();
        f.carts.add_item(user, f.burger, "Burger", 1).unwrap();
        f.orders.checkout(user).unwrap();

        let err = f.orders.checkout(user).unwrap_err();
        assert!(matches!(err, DomainError::EmptyCart(_)));

        f.carts.add_item(user, f.burger, "Burger", 2).unwrap();
        f.orders.checkout(user).unwrap();
        assert_eq!(f.orders.my_orders(user).unwrap().len(), 2);
    }

    #[test]
    fn my_orders_is_not_found_for_a_user_with_no_orders() {
        let f = fixture();
        let err = f.orders.my_orders(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn all_orders_spans_users() {
        let f = fixture();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        f.carts.add_item(alice, f.burger, "Burger", 1).unwrap();
        f.orders.checkout(alice).unwrap();
        f.carts.add_item(bob, f.burger, "Burger", 2).unwrap();
        f.orders.checkout(bob).unwrap();

        assert_eq!(f.orders.all_orders().unwrap().len(), 2);
        assert_eq!(f.orders.my_orders(alice).unwrap().len(), 1);
    }
}
