use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::Order;
use crate::errors::AppError;
use crate::handlers::cart::CartItemResponse;
use crate::identity::{AdminIdentity, Identity};
use crate::Orders;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItemResponse>,
    pub total_price: String,
    pub status: String,
    pub ordered_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            total_price: order.total_price.to_string(),
            status: order.status,
            ordered_at: order.ordered_at.to_rfc3339(),
            items: order.lines.into_iter().map(CartItemResponse::from).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders/checkout
///
/// Converts the caller's cart into an immutable order and empties the cart.
/// The order insert and the cart clear happen in one database transaction.
#[utoipa::path(
    post,
    path = "/orders/checkout",
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Cart is empty"),
        (status = 404, description = "The caller has no cart"),
        (status = 401, description = "Missing or malformed identity headers"),
    ),
    tag = "orders"
)]
pub async fn checkout(
    identity: Identity,
    orders: web::Data<Orders>,
) -> Result<HttpResponse, AppError> {
    let order = web::block(move || orders.checkout(identity.user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/mine
#[utoipa::path(
    get,
    path = "/orders/mine",
    responses(
        (status = 200, description = "The caller's orders, newest first", body = [OrderResponse]),
        (status = 404, description = "The caller has no orders"),
        (status = 401, description = "Missing or malformed identity headers"),
    ),
    tag = "orders"
)]
pub async fn my_orders(
    identity: Identity,
    orders: web::Data<Orders>,
) -> Result<HttpResponse, AppError> {
    let found = web::block(move || orders.my_orders(identity.user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(found.into_iter().map(OrderResponse::from).collect::<Vec<_>>()))
}

/// GET /orders
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders, newest first", body = [OrderResponse]),
        (status = 403, description = "Admin access required"),
        (status = 401, description = "Missing or malformed identity headers"),
    ),
    tag = "orders"
)]
pub async fn all_orders(
    _admin: AdminIdentity,
    orders: web::Data<Orders>,
) -> Result<HttpResponse, AppError> {
    let found = web::block(move || orders.all_orders())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(found.into_iter().map(OrderResponse::from).collect::<Vec<_>>()))
}
