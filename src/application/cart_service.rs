use uuid::Uuid;

use crate::domain::cart::{Cart, CartOp};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartStore, ProductCatalog};

/// The cart engine: validates input, resolves products against the catalog,
/// and hands the mutation to the store, which applies it under the per-user
/// lock. All pricing is captured here, at write time.
pub struct CartService<S, C> {
    store: S,
    catalog: C,
}

impl<S: CartStore, C: ProductCatalog> CartService<S, C> {
    pub fn new(store: S, catalog: C) -> Self {
        Self { store, catalog }
    }

    pub fn get_cart(&self, user_id: Uuid) -> Result<Cart, DomainError> {
        self.store
            .find_by_user(user_id)?
            .ok_or_else(DomainError::cart_not_found)
    }

    /// Merge-add `quantity` of a product, creating the cart if the user has
    /// none yet. The subtotal is `quantity` times the current catalog price.
    pub fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        product_name: &str,
        quantity: i32,
    ) -> Result<Cart, DomainError> {
        require_positive(quantity)?;
        if product_name.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "Product name is required".to_string(),
            ));
        }
        let product = self
            .catalog
            .find_product(product_id)?
            .ok_or_else(DomainError::product_not_found)?;

        self.store.apply(
            user_id,
            CartOp::Add {
                product_id,
                product_name: product_name.to_string(),
                quantity,
                unit_price: product.price,
            },
        )
    }

    /// Overwrite the line's quantity. The unit price is re-read from the
    /// catalog, so a line updated after a price change is re-priced.
    pub fn update_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, DomainError> {
        require_positive(quantity)?;
        let product = self
            .catalog
            .find_product(product_id)?
            .ok_or_else(DomainError::product_not_found)?;

        self.store.apply(
            user_id,
            CartOp::SetQuantity {
                product_id,
                product_name: product.name,
                quantity,
                unit_price: product.price,
            },
        )
    }

    pub fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<Cart, DomainError> {
        self.store.apply(user_id, CartOp::Remove { product_id })
    }

    pub fn clear_cart(&self, user_id: Uuid) -> Result<Cart, DomainError> {
        self.store.apply(user_id, CartOp::Clear)
    }
}

fn require_positive(quantity: i32) -> Result<(), DomainError> {
    if quantity <= 0 {
        return Err(DomainError::InvalidInput(
            "Quantity must be a positive integer".to_string(),
        ));
    }
    Ok(())
}
