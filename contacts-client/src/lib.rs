//! Typed HTTP client for the contacts API.

mod error;
mod http_client;

pub use error::ContactsClientError;
pub use http_client::{Contact, ContactsClient, NewContact};
