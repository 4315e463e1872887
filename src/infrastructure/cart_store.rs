use diesel::prelude::*;
use diesel::PgConnection;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{Cart, CartLine, CartOp};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartStore;
use crate::schema::{cart_items, carts};

use super::models::{CartItemRow, CartRow, NewCartItemRow, NewCartRow};

pub struct DieselCartStore {
    pool: DbPool,
}

impl DieselCartStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Loads the user's cart row with `FOR UPDATE`, serializing concurrent
/// read-modify-write cycles on the same cart for the rest of the
/// transaction.
pub(super) fn lock_cart(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Option<Cart>, DomainError> {
    let row = carts::table
        .find(user_id)
        .for_update()
        .select(CartRow::as_select())
        .first(conn)
        .optional()?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items = cart_items::table
        .filter(cart_items::user_id.eq(user_id))
        .order(cart_items::position.asc())
        .select(CartItemRow::as_select())
        .load(conn)?;

    Ok(Some(to_domain(row, items)))
}

/// Rewrites the cart's line rows and stored total from the domain cart.
/// Runs under the row lock taken by `lock_cart`, so the full replace is
/// race-free.
pub(super) fn persist_cart(conn: &mut PgConnection, cart: &Cart) -> Result<(), DomainError> {
    diesel::delete(cart_items::table.filter(cart_items::user_id.eq(cart.user_id)))
        .execute(conn)?;

    let rows: Vec<NewCartItemRow> = cart
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| NewCartItemRow {
            id: Uuid::new_v4(),
            user_id: cart.user_id,
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            subtotal: line.subtotal.clone(),
            position: i as i32,
        })
        .collect();
    diesel::insert_into(cart_items::table)
        .values(&rows)
        .execute(conn)?;

    diesel::update(carts::table.find(cart.user_id))
        .set((
            carts::total_price.eq(&cart.total_price),
            carts::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)?;

    Ok(())
}

fn to_domain(row: CartRow, items: Vec<CartItemRow>) -> Cart {
    Cart {
        user_id: row.user_id,
        lines: items
            .into_iter()
            .map(|i| CartLine {
                product_id: i.product_id,
                product_name: i.product_name,
                quantity: i.quantity,
                subtotal: i.subtotal,
            })
            .collect(),
        total_price: row.total_price,
    }
}

impl CartStore for DieselCartStore {
    fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = carts::table
            .find(user_id)
            .select(CartRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .order(cart_items::position.asc())
            .select(CartItemRow::as_select())
            .load(&mut conn)?;

        Ok(Some(to_domain(row, items)))
    }

    fn apply(&self, user_id: Uuid, op: CartOp) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            if op.creates_cart() {
                // Racing first-adds both land here; ON CONFLICT makes the
                // loser fall through to the lock instead of erroring.
                diesel::insert_into(carts::table)
                    .values(&NewCartRow { user_id })
                    .on_conflict(carts::user_id)
                    .do_nothing()
                    .execute(conn)?;
            }

            let mut cart = lock_cart(conn, user_id)?.ok_or_else(DomainError::cart_not_found)?;
            cart.apply(&op)?;
            persist_cart(conn, &cart)?;
            Ok(cart)
        })
    }
}
