pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;

#[cfg(test)]
mod test_support;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::cart_service::CartService;
use crate::config::AppConfig;
use crate::errors::StartupError;
use crate::infrastructure::cart_repo::DieselCartStore;
use crate::infrastructure::catalog_client::HttpProductCatalog;
use crate::infrastructure::coupon_client::HttpCouponLookup;
use crate::openapi::ApiDoc;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The cart service as deployed: Postgres store, HTTP catalog and coupon clients.
pub type AppCartService = CartService<DieselCartStore, HttpProductCatalog, HttpCouponLookup>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), StartupError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StartupError::Migration(e.to_string()))?;
    for version in applied {
        log::info!("Applied migration {version}");
    }
    Ok(())
}

/// Wire the production service from configuration and a database pool.
pub fn build_service(config: &AppConfig, pool: DbPool) -> Result<AppCartService, StartupError> {
    Ok(CartService::new(
        DieselCartStore::new(pool),
        HttpProductCatalog::new(config.product_api_url.clone(), config.remote_timeout)?,
        HttpCouponLookup::new(config.coupon_api_url.clone(), config.remote_timeout)?,
    ))
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: AppCartService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(
                handlers::cart::configure::<DieselCartStore, HttpProductCatalog, HttpCouponLookup>,
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
