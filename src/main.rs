use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, web};
use contractor_backend::cache::{CacheConfig, ResponseCache};
use contractor_backend::config::AppConfig;
use contractor_backend::create_pool;
use contractor_backend::handlers;
use contractor_backend::storage::DocumentStore;
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {e}");
        std::io::Error::other(e)
    })?;

    let db = create_pool(&config.database_url).await.map_err(|e| {
        tracing::error!("Failed to connect to database: {e}");
        std::io::Error::other(e)
    })?;

    if config.run_migrations {
        Migrator::up(&db, None).await.map_err(|e| {
            tracing::error!("Migrations failed: {e}");
            std::io::Error::other(e)
        })?;
        tracing::info!("Migrations applied");
    }
    let db_data = web::Data::new(db);

    tokio::fs::create_dir_all(&config.storage_root).await?;
    let store = DocumentStore::new(&config.storage_root, &config.storage_public_path);
    let store_data = web::Data::new(store);

    // Redis is optional: without REDIS_URL every report is computed live.
    let cache = ResponseCache::connect(config.redis_url.as_deref(), CacheConfig::from_env()).await;
    let cache_data = web::Data::new(cache);

    let limits_data = web::Data::new(config.upload_limits);
    let policy_data = web::Data::new(config.delete_policy);
    tracing::info!(policy = config.delete_policy.as_str(), "Contractor delete policy");

    let bind_addr = config.bind_addr();
    let storage_root = config.storage_root.clone();
    let storage_public_path = config.storage_public_path.clone();
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(store_data.clone())
            .app_data(cache_data.clone())
            .app_data(policy_data.clone())
            .app_data(limits_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
            .service(Files::new(&storage_public_path, &storage_root))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
