use cart_service::config::AppConfig;
use cart_service::errors::StartupError;
use cart_service::{build_server, build_service, create_pool, run_migrations};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url)?;
    run_migrations(&pool)?;

    let service = build_service(&config, pool)?;

    log::info!(
        "Starting server at http://{}:{} (catalog: {}, coupons: {})",
        config.host,
        config.port,
        config.product_api_url,
        config.coupon_api_url
    );

    build_server(service, &config.host, config.port)?.await?;
    Ok(())
}
