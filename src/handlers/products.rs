use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::identity::AdminIdentity;
use crate::infrastructure::models::{NewProductRow, ProductRow};
use crate::schema::products;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchProductsParams {
    /// Case-insensitive substring match on the product name.
    pub name: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: String,
    pub is_active: bool,
    pub image_url: String,
    pub created_at: String,
}

impl From<ProductRow> for ProductResponse {
    fn from(p: ProductRow) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            is_active: p.is_active,
            image_url: p.image_url,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = products)]
struct ProductChangeset {
    name: Option<String>,
    description: Option<String>,
    price: Option<BigDecimal>,
    is_active: Option<bool>,
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw)
        .map_err(|e| AppError::BadRequest(format!("Invalid price '{}': {}", raw, e)))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing field, invalid price, or duplicate name"),
        (status = 403, description = "Admin access required"),
    ),
    tag = "products"
)]
pub async fn create_product(
    _admin: AdminIdentity,
    pool: web::Data<DbPool>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.name.trim().is_empty() || body.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please provide all required fields".to_string(),
        ));
    }
    let price = parse_price(&body.price)?;

    let created = web::block(move || {
        let mut conn = pool.get()?;

        let duplicate = products::table
            .filter(products::name.eq(&body.name))
            .select(products::id)
            .first::<Uuid>(&mut conn)
            .optional()?;
        if duplicate.is_some() {
            return Err(AppError::BadRequest(
                "Product with this name already exists".to_string(),
            ));
        }

        let row: ProductRow = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: body.name,
                description: body.description,
                price,
                image_url: body.image_url,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;

        Ok(row)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products", body = [ProductResponse]),
        (status = 403, description = "Admin access required"),
    ),
    tag = "products"
)]
pub async fn list_products(
    _admin: AdminIdentity,
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        let rows = products::table
            .order(products::created_at.desc())
            .select(ProductRow::as_select())
            .load(&mut conn)?;
        Ok::<_, AppError>(rows)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(rows.into_iter().map(ProductResponse::from).collect::<Vec<_>>()))
}

/// GET /products/active
#[utoipa::path(
    get,
    path = "/products/active",
    responses(
        (status = 200, description = "Active products", body = [ProductResponse]),
    ),
    tag = "products"
)]
pub async fn list_active_products(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        let rows = products::table
            .filter(products::is_active.eq(true))
            .order(products::created_at.desc())
            .select(ProductRow::as_select())
            .load(&mut conn)?;
        Ok::<_, AppError>(rows)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(rows.into_iter().map(ProductResponse::from).collect::<Vec<_>>()))
}

/// GET /products/search
///
/// Searches active products by name substring and/or price range, sorted by
/// name.
#[utoipa::path(
    get,
    path = "/products/search",
    params(
        ("name" = Option<String>, Query, description = "Name substring, case-insensitive"),
        ("min_price" = Option<String>, Query, description = "Inclusive lower price bound"),
        ("max_price" = Option<String>, Query, description = "Inclusive upper price bound"),
    ),
    responses(
        (status = 200, description = "Matching active products", body = [ProductResponse]),
        (status = 404, description = "No active products matched"),
    ),
    tag = "products"
)]
pub async fn search_products(
    pool: web::Data<DbPool>,
    query: web::Query<SearchProductsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let min_price = params.min_price.as_deref().map(parse_price).transpose()?;
    let max_price = params.max_price.as_deref().map(parse_price).transpose()?;

    let rows = web::block(move || {
        let mut conn = pool.get()?;

        let mut query = products::table
            .filter(products::is_active.eq(true))
            .order(products::name.asc())
            .select(ProductRow::as_select())
            .into_boxed();

        if let Some(name) = params.name.filter(|n| !n.trim().is_empty()) {
            query = query.filter(products::name.ilike(format!("%{}%", name)));
        }
        if let Some(min) = min_price {
            query = query.filter(products::price.ge(min));
        }
        if let Some(max) = max_price {
            query = query.filter(products::price.le(max));
        }

        Ok::<_, AppError>(query.load(&mut conn)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if rows.is_empty() {
        return Err(AppError::NotFound(
            "No active products matched the search".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(rows.into_iter().map(ProductResponse::from).collect::<Vec<_>>()))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let row = web::block(move || {
        let mut conn = pool.get()?;
        let row = products::table
            .find(product_id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok::<_, AppError>(row)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match row {
        Some(p) => Ok(HttpResponse::Ok().json(ProductResponse::from(p))),
        None => Err(AppError::NotFound("Product not found".to_string())),
    }
}

/// PUT /products/{id}
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Admin access required"),
    ),
    tag = "products"
)]
pub async fn update_product(
    _admin: AdminIdentity,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let body = body.into_inner();
    if body.name.is_none()
        && body.description.is_none()
        && body.price.is_none()
        && body.is_active.is_none()
    {
        return Err(AppError::BadRequest(
            "Provide at least one field to update".to_string(),
        ));
    }
    let changes = ProductChangeset {
        name: body.name,
        description: body.description,
        price: body.price.as_deref().map(parse_price).transpose()?,
        is_active: body.is_active,
    };

    set_product(pool, product_id, changes).await
}

/// POST /products/{id}/archive
#[utoipa::path(
    post,
    path = "/products/{id}/archive",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product archived", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Admin access required"),
    ),
    tag = "products"
)]
pub async fn archive_product(
    _admin: AdminIdentity,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    set_active(pool, path.into_inner(), false).await
}

/// POST /products/{id}/activate
#[utoipa::path(
    post,
    path = "/products/{id}/activate",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product activated", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Admin access required"),
    ),
    tag = "products"
)]
pub async fn activate_product(
    _admin: AdminIdentity,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    set_active(pool, path.into_inner(), true).await
}

async fn set_active(
    pool: web::Data<DbPool>,
    product_id: Uuid,
    is_active: bool,
) -> Result<HttpResponse, AppError> {
    set_product(
        pool,
        product_id,
        ProductChangeset {
            name: None,
            description: None,
            price: None,
            is_active: Some(is_active),
        },
    )
    .await
}

async fn set_product(
    pool: web::Data<DbPool>,
    product_id: Uuid,
    changes: ProductChangeset,
) -> Result<HttpResponse, AppError> {
    let row = web::block(move || {
        let mut conn = pool.get()?;
        let row: Option<ProductRow> = diesel::update(products::table.find(product_id))
            .set(&changes)
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok::<_, AppError>(row)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match row {
        Some(p) => Ok(HttpResponse::Ok().json(ProductResponse::from(p))),
        None => Err(AppError::NotFound("Product not found".to_string())),
    }
}
