//! `backfill-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod slug;
pub mod value_object;

pub use entity::Entity;
pub use error::DomainError;
pub use id::{EventId, InvoiceId, OrganizerId};
pub use slug::Slug;
pub use value_object::ValueObject;
