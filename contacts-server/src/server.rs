use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpServer, web};
use tracing::info;

use crate::application::auth_service::AuthService;
use crate::application::contact_service::ContactService;
use crate::data::contact_repository::ContactRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::config::AppConfig;
use crate::presentation::handlers;
use crate::presentation::middleware::RequestTracing;

pub async fn start_rest_server<U, C>(
    config: AppConfig,
    auth_service: Arc<AuthService<U>>,
    contact_service: Arc<ContactService<C>>,
) -> anyhow::Result<()>
where
    U: UserRepository + 'static,
    C: ContactRepository + 'static,
{
    let bind_address = (config.host.clone(), config.port);
    info!(host = %bind_address.0, port = bind_address.1, "HTTP server starting");

    let auth_data = web::Data::from(auth_service);
    let contact_data = web::Data::from(contact_service);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(RequestTracing)
            .wrap(security_headers())
            .wrap(build_cors(&config))
            .app_data(auth_data.clone())
            .app_data(contact_data.clone())
            .configure(handlers::routes::<U, C>(auth_data.keys().clone()))
    })
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("Referrer-Policy", "no-referrer"))
        .add(("Permissions-Policy", "geolocation=()"))
        .add(("Cross-Origin-Opener-Policy", "same-origin"))
}

pub fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PATCH", "PUT", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .supports_credentials()
        .max_age(3600);

    if config.cors_origins.is_empty() {
        cors = cors.allow_any_origin();
    }
    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
