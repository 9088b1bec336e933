//! `catalog-core`: shared building blocks for the catalog query service.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{AttachmentId, ProductId, TermId};
