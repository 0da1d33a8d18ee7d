//! `condohub-core`: shared domain building blocks.
//!
//! Identifiers, the domain error model, and the record contract every stored
//! entity implements. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod patch;
pub mod text;

pub use entity::{Entity, Record};
pub use error::{DomainError, DomainResult};
pub use id::{EnterpriseId, RecordId, UserId};
