use actix_web::{HttpRequest, HttpResponse, web};
use tracing::info;
use uuid::Uuid;

use crate::application::contact_service::ContactService;
use crate::data::contact_repository::ContactRepository;
use crate::domain::contact::ContactPatch;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CreateContactRequest, UpdateContactRequest};
use crate::presentation::utils::{AuthenticatedUser, request_id};

const BODY_REQUIRED: &str = "Request body is required";

fn parse_contact_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw).map_err(|_| DomainError::invalid_input("Invalid contact id"))
}

pub async fn list_contacts<R: ContactRepository + 'static>(
    user: AuthenticatedUser,
    contacts: web::Data<ContactService<R>>,
) -> Result<HttpResponse, DomainError> {
    let items = contacts.list(user.id).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn create_contact<R: ContactRepository + 'static>(
    req: HttpRequest,
    user: AuthenticatedUser,
    contacts: web::Data<ContactService<R>>,
    payload: web::Json<CreateContactRequest>,
) -> Result<HttpResponse, DomainError> {
    let payload = payload.into_inner();
    if payload.is_empty() {
        return Err(DomainError::invalid_input(BODY_REQUIRED));
    }

    let contact = contacts.create(user.id, payload.into()).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        contact_id = %contact.id,
        "contact created"
    );

    Ok(HttpResponse::Created().json(contact))
}

pub async fn update_contact<R: ContactRepository + 'static>(
    req: HttpRequest,
    user: AuthenticatedUser,
    contacts: web::Data<ContactService<R>>,
    path: web::Path<String>,
    payload: web::Json<UpdateContactRequest>,
) -> Result<HttpResponse, DomainError> {
    let contact_id = parse_contact_id(&path)?;
    let patch = ContactPatch::from(payload.into_inner());
    if patch.is_empty() {
        return Err(DomainError::invalid_input(BODY_REQUIRED));
    }

    let contact = contacts.update(contact_id, user.id, patch).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        contact_id = %contact.id,
        "contact updated"
    );

    Ok(HttpResponse::Ok().json(contact))
}

pub async fn delete_contact<R: ContactRepository + 'static>(
    req: HttpRequest,
    user: AuthenticatedUser,
    contacts: web::Data<ContactService<R>>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let contact_id = parse_contact_id(&path)?;
    contacts.delete(contact_id, user.id).await?;

    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        contact_id = %contact_id,
        "contact deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
