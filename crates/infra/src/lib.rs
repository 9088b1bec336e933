//! Infrastructure layer: catalog collaborators, configuration and the
//! listing pipeline.

pub mod catalog_query;
pub mod catalog_store;
pub mod config;
