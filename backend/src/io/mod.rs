//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain.
//!
//! - **auth**: bearer-token validation and the [`auth::AuthenticatedOwner`] extractor
//! - **rest**: axum handlers translating DTOs from the `shared` crate into
//!   domain commands and domain errors into HTTP status codes
//!
//! Handlers contain no business rules; the owner established by the auth
//! middleware is passed to the services explicitly.

pub mod auth;
pub mod rest;
