use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;

/// One entry in a cart: a product, a quantity, and the subtotal captured at
/// the time of the write that created or last updated the line.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: BigDecimal,
}

/// A user's mutable cart. At most one exists per user; it is created lazily
/// on the first add and emptied (not deleted) by checkout.
///
/// Invariant: `total_price` always equals the sum of the line subtotals.
/// Every mutation recomputes it from the line list rather than adjusting it
/// incrementally, so it cannot drift.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub user_id: Uuid,
    pub lines: Vec<CartLine>,
    pub total_price: BigDecimal,
}

/// A mutation applied to a cart inside the store's per-user critical section.
#[derive(Debug, Clone)]
pub enum CartOp {
    /// Merge-add: an existing line for the product gains quantity and
    /// subtotal; otherwise a new line is appended.
    Add {
        product_id: Uuid,
        product_name: String,
        quantity: i32,
        unit_price: BigDecimal,
    },
    /// Overwrite: the line is set to exactly `quantity` at `unit_price`
    /// (the current catalog price, so the line is re-priced). Appends a
    /// line if the product is not in the cart yet.
    SetQuantity {
        product_id: Uuid,
        product_name: String,
        quantity: i32,
        unit_price: BigDecimal,
    },
    Remove { product_id: Uuid },
    Clear,
}

impl CartOp {
    /// Only add-to-cart creates the cart record when the user has none;
    /// every other op requires an existing cart.
    pub fn creates_cart(&self) -> bool {
        matches!(self, CartOp::Add { .. })
    }
}

impl Cart {
    pub fn empty(user_id: Uuid) -> Self {
        Cart {
            user_id,
            lines: Vec::new(),
            total_price: BigDecimal::from(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn apply(&mut self, op: &CartOp) -> Result<(), DomainError> {
        match op {
            CartOp::Add {
                product_id,
                product_name,
                quantity,
                unit_price,
            } => self.merge_add(*product_id, product_name, *quantity, unit_price),
            CartOp::SetQuantity {
                product_id,
                product_name,
                quantity,
                unit_price,
            } => self.set_quantity(*product_id, product_name, *quantity, unit_price),
            CartOp::Remove { product_id } => self.remove_line(*product_id)?,
            CartOp::Clear => self.clear()?,
        }
        self.recompute_total();
        Ok(())
    }

    fn merge_add(
        &mut self,
        product_id: Uuid,
        product_name: &str,
        quantity: i32,
        unit_price: &BigDecimal,
    ) {
        let subtotal = BigDecimal::from(quantity) * unit_price;
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity += quantity;
                line.subtotal += subtotal;
            }
            None => self.lines.push(CartLine {
                product_id,
                product_name: product_name.to_string(),
                quantity,
                subtotal,
            }),
        }
    }

    fn set_quantity(
        &mut self,
        product_id: Uuid,
        product_name: &str,
        quantity: i32,
        unit_price: &BigDecimal,
    ) {
        let subtotal = BigDecimal::from(quantity) * unit_price;
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                line.subtotal = subtotal;
            }
            None => self.lines.push(CartLine {
                product_id,
                product_name: product_name.to_string(),
                quantity,
                subtotal,
            }),
        }
    }

    fn remove_line(&mut self, product_id: Uuid) -> Result<(), DomainError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.product_id == product_id)
            .ok_or_else(DomainError::cart_item_not_found)?;
        self.lines.remove(index);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DomainError> {
        if self.lines.is_empty() {
            return Err(DomainError::EmptyCart("No items in the cart to clear"));
        }
        self.lines.clear();
        Ok(())
    }

    fn recompute_total(&mut self) {
        self.total_price = self
            .lines
            .iter()
            .fold(BigDecimal::from(0), |acc, l| acc + &l.subtotal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn price(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn add(product_id: Uuid, name: &str, quantity: i32, unit_price: &str) -> CartOp {
        CartOp::Add {
            product_id,
            product_name: name.to_string(),
            quantity,
            unit_price: price(unit_price),
        }
    }

    #[test]
    fn add_appends_a_line_with_captured_subtotal() {
        let burger = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());

        cart.apply(&add(burger, "Burger", 2, "5.00")).unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.lines[0].subtotal, price("10.00"));
        assert_eq!(cart.total_price, price("10.00"));
    }

    #[test]
    fn add_merges_into_an_existing_line() {
        let burger = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());

        cart.apply(&add(burger, "Burger", 2, "5.00")).unwrap();
        cart.apply(&add(burger, "Burger", 1, "5.00")).unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 3);
        assert_eq!(cart.lines[0].subtotal, price("15.00"));
        assert_eq!(cart.total_price, price("15.00"));
    }

    #[test]
    fn set_quantity_overwrites_regardless_of_prior_quantity() {
        let fries = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());
        cart.apply(&add(fries, "Fries", 5, "2.50")).unwrap();

        cart.apply(&CartOp::SetQuantity {
            product_id: fries,
            product_name: "Fries".to_string(),
            quantity: 2,
            unit_price: price("2.50"),
        })
        .unwrap();

        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.lines[0].subtotal, price("5.00"));
        assert_eq!(cart.total_price, price("5.00"));
    }

    #[test]
    fn set_quantity_reprices_at_the_given_unit_price() {
        let fries = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());
        cart.apply(&add(fries, "Fries", 1, "2.50")).unwrap();

        // Catalog price changed between add and update.
        cart.apply(&CartOp::SetQuantity {
            product_id: fries,
            product_name: "Fries".to_string(),
            quantity: 3,
            unit_price: price("3.00"),
        })
        .unwrap();

        assert_eq!(cart.lines[0].subtotal, price("9.00"));
        assert_eq!(cart.total_price, price("9.00"));
    }

    #[test]
    fn set_quantity_appends_when_the_line_is_missing() {
        let burger = Uuid::new_v4();
        let soda = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());
        cart.apply(&add(burger, "Burger", 1, "5.00")).unwrap();

        cart.apply(&CartOp::SetQuantity {
            product_id: soda,
            product_name: "Soda".to_string(),
            quantity: 2,
            unit_price: price("1.25"),
        })
        .unwrap();

        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.lines[1].subtotal, price("2.50"));
        assert_eq!(cart.total_price, price("7.50"));
    }

    #[test]
    fn remove_missing_line_fails_and_leaves_cart_unchanged() {
        let burger = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());
        cart.apply(&add(burger, "Burger", 2, "5.00")).unwrap();
        let before = cart.clone();

        let err = cart
            .apply(&CartOp::Remove {
                product_id: Uuid::new_v4(),
            })
            .unwrap_err();

        assert_eq!(err, DomainError::cart_item_not_found());
        assert_eq!(cart, before);
    }

    #[test]
    fn removing_the_last_line_zeroes_the_total() {
        let burger = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());
        cart.apply(&add(burger, "Burger", 2, "5.00")).unwrap();

        cart.apply(&CartOp::Remove { product_id: burger }).unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total_price, BigDecimal::from(0));
    }

    #[test]
    fn clear_empties_lines_and_total() {
        let burger = Uuid::new_v4();
        let fries = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());
        cart.apply(&add(burger, "Burger", 2, "5.00")).unwrap();
        cart.apply(&add(fries, "Fries", 1, "2.50")).unwrap();

        cart.apply(&CartOp::Clear).unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total_price, BigDecimal::from(0));
    }

    #[test]
    fn clear_on_empty_cart_is_rejected() {
        let mut cart = Cart::empty(Uuid::new_v4());
        let err = cart.apply(&CartOp::Clear).unwrap_err();
        assert!(matches!(err, DomainError::EmptyCart(_)));
    }

    #[test]
    fn total_equals_sum_of_subtotals_after_any_sequence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let mut cart = Cart::empty(Uuid::new_v4());

        cart.apply(&add(a, "Burger", 2, "5.00")).unwrap();
        cart.apply(&add(b, "Fries", 3, "2.50")).unwrap();
        cart.apply(&add(c, "Soda", 1, "1.25")).unwrap();
        cart.apply(&CartOp::SetQuantity {
            product_id: b,
            product_name: "Fries".to_string(),
            quantity: 1,
            unit_price: price("2.50"),
        })
        .unwrap();
        cart.apply(&CartOp::Remove { product_id: a }).unwrap();
        cart.apply(&add(c, "Soda", 4, "1.25")).unwrap();

        let sum = cart
            .lines
            .iter()
            .fold(BigDecimal::from(0), |acc, l| acc + &l.subtotal);
        assert_eq!(cart.total_price, sum);
        assert_eq!(cart.total_price, price("8.75"));
    }
}
