//! HTTP API: router, request parsing and response mapping for the catalog
//! query service.

pub mod app;
