use std::future::{Ready, ready};
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_service::{Service, Transform};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::utils::AuthenticatedUser;

const REQUEST_ID_HEADER: &str = "x-request-id";
const TIMING_HEADER: &str = "server-timing";

#[derive(Clone)]
pub struct RequestId(pub String);

/// Tags every request with an `x-request-id` (reusing the caller's if
/// present) and logs one line per completed request.
pub struct RequestTracing;

impl<S, B> Transform<S, ServiceRequest> for RequestTracing
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTracingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTracingService { service }))
    }
}

pub struct RequestTracingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTracingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let method = req.method().clone();
        let path = req.path().to_owned();

        req.extensions_mut().insert(RequestId(request_id.clone()));
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let elapsed = start.elapsed();
            info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = res.status().as_u16(),
                duration_ms = elapsed.as_millis(),
                "request completed"
            );

            let headers = res.response_mut().headers_mut();
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            if let Ok(value) = HeaderValue::from_str(&format!("app;dur={}", elapsed.as_millis())) {
                headers.insert(HeaderName::from_static(TIMING_HEADER), value);
            }
            Ok(res)
        })
    }
}

/// Extracts the token from an `Authorization` value of the form
/// `Bearer <token>`.
pub fn bearer_token(header: Option<&str>) -> Result<&str, DomainError> {
    let mut parts = header.ok_or(DomainError::NoToken)?.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(DomainError::NoToken),
    }
}

/// Auth guard for protected routes. Trust is purely cryptographic: the token
/// is verified against the signing secret and its identity attached to the
/// request, without a store round-trip.
pub struct JwtAuthMiddleware {
    keys: JwtKeys,
}

impl JwtAuthMiddleware {
    pub fn new(keys: JwtKeys) -> Self {
        Self { keys }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct JwtAuthService<S> {
    service: Rc<S>,
    keys: JwtKeys,
}

impl<S> JwtAuthService<S> {
    fn authenticate(&self, req: &ServiceRequest) -> Result<AuthenticatedUser, DomainError> {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = bearer_token(header)?;

        let claims = self.keys.verify_token(token).map_err(|err| {
            debug!(error = %err, "rejected bearer token");
            DomainError::InvalidToken
        })?;
        AuthenticatedUser::try_from(claims)
    }
}

impl<S, B> Service<ServiceRequest> for JwtAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.authenticate(&req) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let service = Rc::clone(&self.service);
                Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(err) => {
                let res = req.error_response(err).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use actix_web::{App, HttpResponse, web};
    use chrono::Duration;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case(Some("Bearer abc.def.ghi"), Some("abc.def.ghi"))]
    #[case(Some("bearer abc"), Some("abc"))]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("Bearer"), None)]
    #[case(Some("Bearer "), None)]
    #[case(Some("abc.def.ghi"), None)]
    #[case(Some("Basic dXNlcjpwdw=="), None)]
    #[case(Some("Bearer a b"), None)]
    fn extracts_bearer_token(#[case] header: Option<&str>, #[case] expected: Option<&str>) {
        match (bearer_token(header), expected) {
            (Ok(token), Some(expected)) => assert_eq!(token, expected),
            (Err(DomainError::NoToken), None) => {}
            (other, _) => panic!("unexpected result {other:?} for {header:?}"),
        }
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({ "id": user.id, "email": user.email }))
    }

    fn keys() -> JwtKeys {
        JwtKeys::new("guard-secret".into())
    }

    async fn call_guarded(header: Option<String>) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new().service(
                web::resource("/me")
                    .wrap(JwtAuthMiddleware::new(keys()))
                    .route(web::get().to(whoami)),
            ),
        )
        .await;

        let mut req = actix_test::TestRequest::get().uri("/me");
        if let Some(header) = header {
            req = req.insert_header((AUTHORIZATION, header));
        }
        let res = actix_test::call_service(&app, req.to_request()).await;
        let status = res.status();
        (status, actix_test::read_body_json(res).await)
    }

    #[actix_web::test]
    async fn valid_token_attaches_identity() {
        let id = Uuid::new_v4();
        let token = keys().generate_token(id, "alice@x.com").unwrap();

        let (status, body) = call_guarded(Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.to_string());
        assert_eq!(body["email"], "alice@x.com");
    }

    #[actix_web::test]
    async fn missing_header_is_401() {
        let (status, body) = call_guarded(None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "No token provided");
    }

    #[actix_web::test]
    async fn malformed_header_is_401() {
        let (status, _) = call_guarded(Some("Bearer".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn bad_token_is_403() {
        let (status, body) = call_guarded(Some("Bearer invalid-token".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Invalid token");
    }

    #[actix_web::test]
    async fn expired_token_is_403() {
        let token = keys()
            .with_ttl(Duration::seconds(-10))
            .generate_token(Uuid::new_v4(), "alice@x.com")
            .unwrap();

        let (status, _) = call_guarded(Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn foreign_secret_is_403() {
        let token = JwtKeys::new("someone-else".into())
            .generate_token(Uuid::new_v4(), "alice@x.com")
            .unwrap();

        let (status, _) = call_guarded(Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn request_id_is_echoed_or_generated() {
        let app = actix_test::init_service(
            App::new()
                .wrap(RequestTracing)
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header(("x-request-id", "abc-123"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.headers().get("x-request-id").unwrap(), "abc-123");
        assert!(res.headers().contains_key("server-timing"));

        let req = actix_test::TestRequest::get().uri("/").to_request();
        let res = actix_test::call_service(&app, req).await;
        let generated = res.headers().get("x-request-id").unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(generated).is_ok());
    }
}
