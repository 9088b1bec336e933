//! Catalog collaborator boundary.
//!
//! Traits for the product store, taxonomy lookup, media resolver,
//! related-product recommender, permalink resolver and platform readiness,
//! plus the adapters that implement them.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod site;
pub mod r#trait;

pub use in_memory::{Attachment, CatalogSeed, InMemoryCatalog};
#[cfg(feature = "postgres")]
pub use postgres::PostgresCatalog;
pub use site::SiteUrls;
pub use r#trait::{
    CommercePlatform, ImageSize, MediaResolver, PageWindow, PermalinkResolver, ProductQuery,
    ProductStore, RelatedProducts, StoreError, TaxonomyLookup,
};
