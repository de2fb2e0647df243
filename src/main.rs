use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{info, warn};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

use postboard::auth::{AccessPolicy, PasswordHasher, TokenAuthentication};
use postboard::config::Config;
use postboard::routes::{self, health};
use postboard::store::{MemoryStore, PgStore, Store};

fn startup_error(error: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, error.to_string())
}

async fn open_store(config: &Config) -> io::Result<Arc<dyn Store>> {
    if config.uses_memory_store() {
        warn!("DATABASE_URL=memory: data lives in process and is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .map_err(startup_error)?;
    let store = PgStore::new(pool);
    store.migrate().await.map_err(startup_error)?;
    Ok(Arc::new(store))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(startup_error)?;
    let store = web::Data::from(open_store(&config).await?);
    let hasher = web::Data::new(PasswordHasher::new(config.bcrypt_cost));
    let policy = web::Data::new(AccessPolicy::new(config.default_permission));

    info!("Starting postboard server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(hasher.clone())
            .app_data(policy.clone())
            .wrap(TokenAuthentication)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
