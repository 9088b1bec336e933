use async_trait::async_trait;
use thiserror::Error;

use catalog_core::{AttachmentId, DomainError, ProductId};
use catalog_products::{FilterCriteria, PageRequest, Product, ProductStatus, Taxonomy, Term};

/// Failure reported by a catalog collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("catalog store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed a query.
    #[error("catalog query failed: {0}")]
    Query(String),

    /// A stored row could not be mapped to a domain value.
    #[error("failed to decode catalog record: {0}")]
    Decode(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Store-side product query.
///
/// Matching semantics (search, taxonomy membership, inclusion) belong to the
/// store; the pipeline only forwards predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub status: ProductStatus,
    /// Restrict results to these ids when set.
    pub include: Option<Vec<ProductId>>,
    /// Free-text search over product text; empty means no constraint.
    pub search: String,
    /// Category names, any-match.
    pub categories: Vec<String>,
    /// Tag names, any-match.
    pub tags: Vec<String>,
}

impl ProductQuery {
    /// Published-only query carrying the store-side part of the criteria.
    pub fn published(criteria: &FilterCriteria) -> Self {
        Self {
            status: ProductStatus::Published,
            include: criteria.id.map(|id| vec![id]),
            search: criteria.name.clone(),
            categories: criteria.categories.iter().cloned().collect(),
            tags: criteria.tags.iter().cloned().collect(),
        }
    }
}

/// Offset/limit window for a page query.
///
/// Values are passed through untouched from the page request. Stores
/// interpret them with the platform's rules: a limit of exactly `-1` is
/// unbounded, any lower limit counts by its absolute value, a zero limit
/// selects nothing, and a negative offset counts by its absolute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    pub fn for_page(request: PageRequest) -> Self {
        Self {
            limit: request.per_page,
            offset: request.offset(),
        }
    }

    /// Limit as a row count, `None` when unbounded.
    pub fn row_limit(&self) -> Option<usize> {
        match self.limit {
            -1 => None,
            limit => Some(usize::try_from(limit.unsigned_abs()).unwrap_or(usize::MAX)),
        }
    }

    /// Rows to skip; a negative offset skips its absolute value.
    pub fn row_offset(&self) -> usize {
        usize::try_from(self.offset.unsigned_abs()).unwrap_or(usize::MAX)
    }
}

/// Image size variants understood by the media resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSize {
    Thumbnail,
    Full,
}

/// Product queries against the catalog.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Count query: ids of every product matching `query`, unpaginated.
    async fn matching_ids(&self, query: &ProductQuery) -> Result<Vec<ProductId>, StoreError>;

    /// Page query: at most `window.limit` matching products from `window.offset`,
    /// in store-default order.
    async fn fetch_page(
        &self,
        query: &ProductQuery,
        window: PageWindow,
    ) -> Result<Vec<Product>, StoreError>;

    /// Load a single product by id, whatever its status.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
}

/// Taxonomy term lookups.
#[async_trait]
pub trait TaxonomyLookup: Send + Sync {
    /// Terms assigned to a product, in store order.
    async fn product_terms(
        &self,
        product: ProductId,
        taxonomy: Taxonomy,
    ) -> Result<Vec<Term>, StoreError>;

    /// Every term of a taxonomy, including unused ones.
    async fn all_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>, StoreError>;
}

/// Attachment id to public URL.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// `None` when the attachment does not exist.
    async fn attachment_url(
        &self,
        attachment: AttachmentId,
        size: ImageSize,
    ) -> Result<Option<String>, StoreError>;
}

/// Related-product recommendations.
#[async_trait]
pub trait RelatedProducts: Send + Sync {
    /// Up to `limit` suggested ids. Suggestions may be stale.
    async fn related_ids(&self, product: ProductId, limit: usize) -> Result<Vec<ProductId>, StoreError>;
}

/// Canonical product URLs.
#[async_trait]
pub trait PermalinkResolver: Send + Sync {
    async fn permalink(&self, product: &Product) -> Result<String, StoreError>;
}

/// Host platform readiness (the commerce module being loaded and active).
#[async_trait]
pub trait CommercePlatform: Send + Sync {
    async fn commerce_active(&self) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_minus_one_is_unbounded() {
        assert_eq!(PageWindow::new(-1, 0).row_limit(), None);
        assert_eq!(PageWindow::new(-3, 0).row_limit(), Some(3));
        assert_eq!(PageWindow::new(0, 0).row_limit(), Some(0));
        assert_eq!(PageWindow::new(10, 0).row_limit(), Some(10));
    }

    #[test]
    fn negative_offset_counts_by_absolute_value() {
        assert_eq!(PageWindow::new(10, -10).row_offset(), 10);
        assert_eq!(PageWindow::new(10, 20).row_offset(), 20);
        assert!(PageWindow::new(10, i64::MIN).row_offset() > 0);
    }

    #[test]
    fn page_zero_window_skips_one_page() {
        let window = PageWindow::for_page(PageRequest::new(0, 10));
        assert_eq!(window.row_offset(), 10);
        assert_eq!(window.row_limit(), Some(10));
    }
}
