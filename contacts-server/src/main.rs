mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use std::sync::Arc;

use chrono::Duration;

use application::auth_service::AuthService;
use application::contact_service::ContactService;
use data::contact_repository::PostgresContactRepository;
use data::user_repository::PostgresUserRepository;
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::security::JwtKeys;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let contact_repo = Arc::new(PostgresContactRepository::new(pool));

    let keys = JwtKeys::new(config.jwt_secret.clone())
        .with_ttl(Duration::seconds(config.token_ttl_secs));
    let auth_service = Arc::new(AuthService::new(user_repo, keys));
    let contact_service = Arc::new(ContactService::new(contact_repo));

    server::start_rest_server(config, auth_service, contact_service).await
}
