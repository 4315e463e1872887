use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartLine};
use crate::errors::AppError;
use crate::identity::Identity;
use crate::Carts;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    /// Decimal amount as a string, e.g. "9.99"
    pub subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub user_id: Uuid,
    pub items: Vec<CartItemResponse>,
    pub total_price: String,
}

impl From<CartLine> for CartItemResponse {
    fn from(line: CartLine) -> Self {
        CartItemResponse {
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            subtotal: line.subtotal.to_string(),
        }
    }
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        CartResponse {
            user_id: cart.user_id,
            total_price: cart.total_price.to_string(),
            items: cart.lines.into_iter().map(CartItemResponse::from).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "The caller's cart", body = CartResponse),
        (status = 404, description = "The caller has no cart yet"),
        (status = 401, description = "Missing or malformed identity headers"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    identity: Identity,
    carts: web::Data<Carts>,
) -> Result<HttpResponse, AppError> {
    let cart = web::block(move || carts.get_cart(identity.user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// POST /cart/items
///
/// Merge-add: repeating a product grows its line rather than duplicating it.
/// The cart is created on the caller's first add.
#[utoipa::path(
    post,
    path = "/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Non-positive quantity or missing product name"),
        (status = 404, description = "Product not found"),
        (status = 401, description = "Missing or malformed identity headers"),
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    identity: Identity,
    carts: web::Data<Carts>,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let cart = web::block(move || {
        carts.add_item(
            identity.user_id,
            body.product_id,
            &body.product_name,
            body.quantity,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// PUT /cart/items/{product_id}
///
/// Overwrites the line's quantity at the current catalog price.
#[utoipa::path(
    put,
    path = "/cart/items/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Non-positive quantity"),
        (status = 404, description = "Cart or product not found"),
        (status = 401, description = "Missing or malformed identity headers"),
    ),
    tag = "cart"
)]
pub async fn update_cart_quantity(
    identity: Identity,
    carts: web::Data<Carts>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateQuantityRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let quantity = body.into_inner().quantity;
    let cart = web::block(move || carts.update_quantity(identity.user_id, product_id, quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// DELETE /cart/items/{product_id}
#[utoipa::path(
    delete,
    path = "/cart/items/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 404, description = "Cart or item not found"),
        (status = 401, description = "Missing or malformed identity headers"),
    ),
    tag = "cart"
)]
pub async fn remove_from_cart(
    identity: Identity,
    carts: web::Data<Carts>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let cart = web::block(move || carts.remove_item(identity.user_id, product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// DELETE /cart
///
/// Empties the cart. Clearing an already-empty cart is rejected so a no-op
/// cannot masquerade as success.
#[utoipa::path(
    delete,
    path = "/cart",
    responses(
        (status = 200, description = "Emptied cart", body = CartResponse),
        (status = 400, description = "Cart is already empty"),
        (status = 404, description = "The caller has no cart"),
        (status = 401, description = "Missing or malformed identity headers"),
    ),
    tag = "cart"
)]
pub async fn clear_cart(
    identity: Identity,
    carts: web::Data<Carts>,
) -> Result<HttpResponse, AppError> {
    let cart = web::block(move || carts.clear_cart(identity.user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}
