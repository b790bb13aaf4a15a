use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use taskguard::{
    config::Config,
    routes::{self, health},
    services::accounts,
    store::{MemoryStore, PgStore, Store},
    AppState,
};

fn cors(origin: Option<&str>) -> Cors {
    let cors = match origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };
    cors.allow_any_method().allow_any_header().max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.database_max_connections)
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            store
                .migrate()
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            log::info!("connected to Postgres");
            Arc::new(store)
        }
        None => {
            log::warn!("DATABASE_URL is not set; using the in-memory store, data will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::from_config(&config, store);

    if let Some(admin) = &config.admin {
        match accounts::ensure_admin(&state, admin).await {
            Ok(Some(user)) => log::info!("created admin account '{}'", user.username),
            Ok(None) => log::info!("admin account already present"),
            Err(err) => log::error!("could not create admin account: {}", err),
        }
    }

    let state = web::Data::new(state);
    let cors_origin = config.cors_origin.clone();

    log::info!("Starting taskguard server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(cors_origin.as_deref()))
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api/v1").configure(routes::config))
            .default_service(web::route().to(routes::not_found))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
