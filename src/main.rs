use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};

use boardforge::auth::AuthMiddleware;
use boardforge::config::Config;
use boardforge::routes::{self, health};
use boardforge::{InMemoryStore, PgStore, SharedStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let store: SharedStore = match &config.database_url {
        Some(database_url) => {
            let store = PgStore::connect(database_url)
                .await
                .map_err(std::io::Error::other)?;
            store.migrate().await.map_err(std::io::Error::other)?;
            Arc::new(store)
        }
        None => {
            log::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Arc::new(InMemoryStore::new())
        }
    };

    log::info!("Starting BoardForge server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(store.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
