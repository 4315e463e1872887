pub mod cart_store;
pub mod catalog;
pub mod models;
pub mod order_store;

use crate::domain::errors::DomainError;

// Error conversions (infrastructure concern only)

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}
