pub mod cart_service;
pub mod order_service;

#[cfg(test)]
pub(crate) mod memory;
