//! Catalog listing pipeline (application-level orchestration).
//!
//! This module turns parsed filter criteria and a page request into one
//! enriched result page. It composes the collaborator traits from
//! [`crate::catalog_store`] and contains no IO of its own.
//!
//! ## Flow
//!
//! ```text
//! FilterCriteria + PageRequest + QueryProfile
//!   ↓
//! 1. Readiness check (commerce module active, else fail before any query)
//!   ↓
//! 2. Count query (all matching ids, no window)  → total_products
//!   ↓
//! 3. Page query (limit = per_page, offset = (page-1)*per_page)
//!   ↓
//! 4. Price filter on the fetched window only
//!   ↓
//! 5. Enrichment (media, taxonomy names, permalink, related products)
//!   ↓
//! 6. Assembly (pagination totals, optional catalog enumerations)
//! ```
//!
//! Pagination totals are taken from step 2, so a page trimmed by the price
//! filter still reports the unfiltered totals.
//!
//! Search, taxonomy and inclusion matching are delegated to the store; this
//! module never re-implements them.

use std::sync::Arc;

use futures::try_join;
use thiserror::Error;

use catalog_products::{
    CatalogPage, FilterCriteria, PageRequest, Pagination, Product, QueryProfile, Taxonomy, Term,
};

use crate::catalog_store::{
    CommercePlatform, MediaResolver, PageWindow, PermalinkResolver, ProductQuery, ProductStore,
    RelatedProducts, StoreError, TaxonomyLookup,
};

pub mod enrich;

pub use enrich::RELATED_PRODUCTS_LIMIT;

/// External collaborators the pipeline reads from.
#[derive(Clone)]
pub struct CatalogCollaborators {
    pub store: Arc<dyn ProductStore>,
    pub taxonomy: Arc<dyn TaxonomyLookup>,
    pub media: Arc<dyn MediaResolver>,
    pub related: Arc<dyn RelatedProducts>,
    pub permalinks: Arc<dyn PermalinkResolver>,
    pub platform: Arc<dyn CommercePlatform>,
}

impl CatalogCollaborators {
    /// Use one backend for every collaborator role.
    pub fn from_shared<B>(backend: Arc<B>) -> Self
    where
        B: ProductStore
            + TaxonomyLookup
            + MediaResolver
            + RelatedProducts
            + PermalinkResolver
            + CommercePlatform
            + 'static,
    {
        Self {
            store: backend.clone(),
            taxonomy: backend.clone(),
            media: backend.clone(),
            related: backend.clone(),
            permalinks: backend.clone(),
            platform: backend,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogQueryError {
    /// The host platform's commerce module is not active; no query was run.
    #[error("commerce module is not active")]
    CommerceUnavailable,

    /// A collaborator failed; the request is abandoned without a partial page.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogQueryOutcome {
    /// At least one product survived the price filter.
    Page(CatalogPage),
    /// The query was valid but nothing survived the price filter.
    Empty,
}

/// Runs the listing pipeline against a set of collaborators.
#[derive(Clone)]
pub struct CatalogQueryService {
    collaborators: CatalogCollaborators,
}

impl CatalogQueryService {
    pub fn new(collaborators: CatalogCollaborators) -> Self {
        Self { collaborators }
    }

    pub fn collaborators(&self) -> &CatalogCollaborators {
        &self.collaborators
    }

    #[tracing::instrument(
        skip_all,
        fields(page = request.page, per_page = request.per_page, include_related = profile.include_related)
    )]
    pub async fn list_products(
        &self,
        criteria: &FilterCriteria,
        request: PageRequest,
        profile: QueryProfile,
    ) -> Result<CatalogQueryOutcome, CatalogQueryError> {
        let c = &self.collaborators;

        if !c.platform.commerce_active().await? {
            tracing::warn!("commerce module inactive; rejecting catalog query");
            return Err(CatalogQueryError::CommerceUnavailable);
        }

        let mut query = ProductQuery::published(criteria);
        if !profile.include_id {
            query.include = None;
        }

        let total_products = c.store.matching_ids(&query).await?.len() as u64;

        let window = PageWindow::for_page(request);
        let fetched = c.store.fetch_page(&query, window).await?;
        let fetched_count = fetched.len();

        let in_range: Vec<Product> = fetched
            .into_iter()
            .filter(|p| criteria.price.contains(p.effective_price()))
            .collect();

        tracing::debug!(
            total_products,
            fetched = fetched_count,
            in_price_range = in_range.len(),
            limit = window.limit,
            offset = window.offset,
            "catalog page fetched"
        );

        if in_range.is_empty() {
            return Ok(CatalogQueryOutcome::Empty);
        }

        let products = enrich::enrich_page(c, &in_range, profile.include_related).await?;

        let (all_categories, all_tags) = if profile.include_catalog_enumerations {
            let (categories, tags) = try_join!(
                c.taxonomy.all_terms(Taxonomy::Category),
                c.taxonomy.all_terms(Taxonomy::Tag),
            )?;
            (Some(term_names(categories)), Some(term_names(tags)))
        } else {
            (None, None)
        };

        Ok(CatalogQueryOutcome::Page(CatalogPage {
            products,
            pagination: Pagination::compute(total_products, request),
            all_categories,
            all_tags,
        }))
    }
}

fn term_names(terms: Vec<Term>) -> Vec<String> {
    terms.into_iter().map(|t| t.name).collect()
}
