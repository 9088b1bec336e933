//! Catalog domain module.
//!
//! Product records, taxonomy terms, query criteria and the enriched listing
//! views, implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage).

pub mod listing;
pub mod product;
pub mod query;
pub mod taxonomy;

pub use listing::{CatalogPage, ListedProduct, RelatedProductView};
pub use product::{Product, ProductStatus, effective_price, parse_price};
pub use query::{FilterCriteria, PageRequest, Pagination, PriceRange, QueryProfile};
pub use taxonomy::{Taxonomy, Term};
