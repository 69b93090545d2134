pub mod auth;
pub mod contact;

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::contact_repository::ContactRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::dto::MessageResponse;
use crate::presentation::middleware::JwtAuthMiddleware;
use crate::presentation::utils::AuthenticatedUser;

/// Full route table. Everything under `/contacts`, `/protected` and
/// `/auth/logout` sits behind the auth guard.
pub fn routes<U, C>(keys: JwtKeys) -> impl FnOnce(&mut web::ServiceConfig)
where
    U: UserRepository + 'static,
    C: ContactRepository + 'static,
{
    move |cfg| {
        cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
            DomainError::invalid_input(format!("Invalid request body: {}", err)).into()
        }))
        .route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .service(auth::scope::<U>(keys.clone()))
        .service(
            web::resource("/protected")
                .wrap(JwtAuthMiddleware::new(keys.clone()))
                .route(web::get().to(protected)),
        )
        .service(
            web::scope("/contacts")
                .wrap(JwtAuthMiddleware::new(keys))
                .route("", web::get().to(contact::list_contacts::<C>))
                .route("", web::post().to(contact::create_contact::<C>))
                .route("/{id}", web::patch().to(contact::update_contact::<C>))
                .route("/{id}", web::delete().to(contact::delete_contact::<C>)),
        );
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse::new("Hello World"))
}

async fn protected(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse::new(format!(
        "Hello {}, you have accessed a protected route!",
        user.email
    )))
}
