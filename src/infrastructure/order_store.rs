use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::CartLine;
use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::OrderStore;
use crate::schema::{order_items, orders};

use super::cart_store::{lock_cart, persist_cart};
use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

pub struct DieselOrderStore {
    pool: DbPool,
}

impl DieselOrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderStore for DieselOrderStore {
    /// The cart-to-order transition. Order insert and cart clear share one
    /// transaction, and the cart row is locked `FOR UPDATE` throughout, so
    /// there is no window where the order exists while the cart is still
    /// populated, and no concurrent add can slip between snapshot and clear.
    fn checkout(&self, user_id: Uuid) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut cart = lock_cart(conn, user_id)?.ok_or_else(DomainError::cart_not_found)?;

            let order = Order::from_cart(&cart, Utc::now())?;

            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order.id,
                    user_id: order.user_id,
                    total_price: order.total_price.clone(),
                    status: order.status.clone(),
                    ordered_at: order.ordered_at,
                })
                .execute(conn)?;

            let item_rows: Vec<NewOrderItemRow> = order
                .lines
                .iter()
                .enumerate()
                .map(|(i, line)| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    quantity: line.quantity,
                    subtotal: line.subtotal.clone(),
                    position: i as i32,
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&item_rows)
                .execute(conn)?;

            // The cart survives checkout, emptied.
            cart.lines.clear();
            cart.total_price = 0.into();
            persist_cart(conn, &cart)?;

            Ok(order)
        })
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::ordered_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;

        load_with_items(&mut conn, rows)
    }

    fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .order(orders::ordered_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;

        load_with_items(&mut conn, rows)
    }
}

fn load_with_items(
    conn: &mut PgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, DomainError> {
    let order_ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();

    let items = order_items::table
        .filter(order_items::order_id.eq_any(&order_ids))
        .order(order_items::position.asc())
        .select(OrderItemRow::as_select())
        .load(conn)?;

    let mut by_order: HashMap<Uuid, Vec<CartLine>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(CartLine {
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            subtotal: item.subtotal,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let lines = by_order.remove(&row.id).unwrap_or_default();
            Order {
                id: row.id,
                user_id: row.user_id,
                lines,
                total_price: row.total_price,
                status: row.status,
                ordered_at: row.ordered_at,
            }
        })
        .collect())
}
