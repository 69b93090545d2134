use actix_web::{HttpRequest, HttpResponse, Scope, web};
use tracing::info;

use crate::application::auth_service::AuthService;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::dto::{CredentialsRequest, MessageResponse, TokenResponse};
use crate::presentation::middleware::JwtAuthMiddleware;
use crate::presentation::utils::{AuthenticatedUser, request_id};

pub fn scope<R: UserRepository + 'static>(keys: JwtKeys) -> Scope {
    web::scope("/auth")
        .route("/register", web::post().to(register::<R>))
        .route("/login", web::post().to(login::<R>))
        .service(
            web::resource("/logout")
                .wrap(JwtAuthMiddleware::new(keys))
                .route(web::post().to(logout::<R>)),
        )
}

async fn register<R: UserRepository + 'static>(
    req: HttpRequest,
    service: web::Data<AuthService<R>>,
    payload: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, DomainError> {
    let user = service
        .register(payload.email(), payload.password())
        .await?;

    info!(request_id = %request_id(&req), user_id = %user.id, "user registered");

    Ok(HttpResponse::Created().json(MessageResponse::new("User registered")))
}

async fn login<R: UserRepository + 'static>(
    req: HttpRequest,
    service: web::Data<AuthService<R>>,
    payload: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, DomainError> {
    let token = service.login(payload.email(), payload.password()).await?;

    info!(request_id = %request_id(&req), "user logged in");

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

async fn logout<R: UserRepository + 'static>(
    user: AuthenticatedUser,
    service: web::Data<AuthService<R>>,
) -> HttpResponse {
    service.logout(user.id);
    HttpResponse::Ok().json(MessageResponse::new("Logged out"))
}
