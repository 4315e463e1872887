use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    EmptyCart(&'static str),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn cart_not_found() -> Self {
        DomainError::NotFound("Cart")
    }

    pub fn product_not_found() -> Self {
        DomainError::NotFound("Product")
    }

    pub fn cart_item_not_found() -> Self {
        DomainError::NotFound("Item in cart")
    }
}
