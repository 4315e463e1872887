pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::cart_service::CartService;
use application::order_service::OrderService;
use infrastructure::cart_store::DieselCartStore;
use infrastructure::catalog::DieselProductCatalog;
use infrastructure::order_store::DieselOrderStore;

pub use db::{create_pool, DbPool};

/// The cart engine wired to Postgres.
pub type Carts = CartService<DieselCartStore, DieselProductCatalog>;
/// The order engine wired to Postgres.
pub type Orders = OrderService<DieselOrderStore>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::list_active_products,
        handlers::products::search_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::archive_product,
        handlers::products::activate_product,
        handlers::cart::get_cart,
        handlers::cart::add_to_cart,
        handlers::cart::update_cart_quantity,
        handlers::cart::remove_from_cart,
        handlers::cart::clear_cart,
        handlers::orders::checkout,
        handlers::orders::my_orders,
        handlers::orders::all_orders,
    ),
    components(schemas(
        handlers::products::CreateProductRequest,
        handlers::products::UpdateProductRequest,
        handlers::products::ProductResponse,
        handlers::cart::AddToCartRequest,
        handlers::cart::UpdateQuantityRequest,
        handlers::cart::CartItemResponse,
        handlers::cart::CartResponse,
        handlers::orders::OrderResponse,
    ))
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let carts = web::Data::new(CartService::new(
        DieselCartStore::new(pool.clone()),
        DieselProductCatalog::new(pool.clone()),
    ));
    let orders = web::Data::new(OrderService::new(DieselOrderStore::new(pool.clone())));

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(carts.clone())
            .app_data(orders.clone())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .service(
                web::scope("/products")
                    // Fixed segments must register before the `{id}` matcher.
                    .route("/active", web::get().to(handlers::products::list_active_products))
                    .route("/search", web::get().to(handlers::products::search_products))
                    .route("", web::post().to(handlers::products::create_product))
                    .route("", web::get().to(handlers::products::list_products))
                    .route("/{id}", web::get().to(handlers::products::get_product))
                    .route("/{id}", web::put().to(handlers::products::update_product))
                    .route("/{id}/archive", web::post().to(handlers::products::archive_product))
                    .route("/{id}/activate", web::post().to(handlers::products::activate_product)),
            )
            .service(
                web::scope("/cart")
                    .route("", web::get().to(handlers::cart::get_cart))
                    .route("", web::delete().to(handlers::cart::clear_cart))
                    .route("/items", web::post().to(handlers::cart::add_to_cart))
                    .route("/items/{product_id}", web::put().to(handlers::cart::update_cart_quantity))
                    .route("/items/{product_id}", web::delete().to(handlers::cart::remove_from_cart)),
            )
            .service(
                web::scope("/orders")
                    .route("/checkout", web::post().to(handlers::orders::checkout))
                    .route("/mine", web::get().to(handlers::orders::my_orders))
                    .route("", web::get().to(handlers::orders::all_orders)),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
