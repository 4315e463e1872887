//! In-memory implementations of the persistence ports, used by the service
//! unit tests in place of Postgres.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartOp};
use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::{CartStore, OrderStore, ProductCatalog, ProductRef};

#[derive(Clone)]
pub struct StaticCatalog {
    products: Vec<ProductRef>,
}

impl StaticCatalog {
    pub fn new(products: Vec<(Uuid, &str, &str)>) -> Self {
        StaticCatalog {
            products: products
                .into_iter()
                .map(|(id, name, price)| ProductRef {
                    id,
                    name: name.to_string(),
                    price: BigDecimal::from_str(price).unwrap(),
                })
                .collect(),
        }
    }
}

impl ProductCatalog for StaticCatalog {
    fn find_product(&self, id: Uuid) -> Result<Option<ProductRef>, DomainError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<Mutex<HashMap<Uuid, Cart>>>,
}

impl CartStore for InMemoryCartStore {
    fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, DomainError> {
        Ok(self.carts.lock().unwrap().get(&user_id).cloned())
    }

    fn apply(&self, user_id: Uuid, op: CartOp) -> Result<Cart, DomainError> {
        let mut carts = self.carts.lock().unwrap();
        if !carts.contains_key(&user_id) {
            if !op.creates_cart() {
                return Err(DomainError::cart_not_found());
            }
            carts.insert(user_id, Cart::empty(user_id));
        }
        let cart = carts.get_mut(&user_id).unwrap();
        cart.apply(&op)?;
        Ok(cart.clone())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    carts: InMemoryCartStore,
    orders: Arc<Mutex<Vec<Order>>>,
}

impl InMemoryOrderStore {
    /// Shares cart state with the returned store so checkout sees the same
    /// carts the cart service mutates.
    pub fn with_carts(carts: InMemoryCartStore) -> Self {
        InMemoryOrderStore {
            carts,
            orders: Arc::default(),
        }
    }
}

impl OrderStore for InMemoryOrderStore {
    fn checkout(&self, user_id: Uuid) -> Result<Order, DomainError> {
        let mut carts = self.carts.carts.lock().unwrap();
        let cart = carts
            .get_mut(&user_id)
            .ok_or_else(DomainError::cart_not_found)?;
        let order = Order::from_cart(cart, Utc::now())?;
        self.orders.lock().unwrap().push(order.clone());
        cart.lines.clear();
        cart.total_price = BigDecimal::from(0);
        Ok(order)
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.lock().unwrap().clone())
    }
}
