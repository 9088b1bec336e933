use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard};

use async_trait::async_trait;
use serde::Deserialize;

use catalog_core::{AttachmentId, ProductId, TermId};
use catalog_products::{Product, Taxonomy, Term};

use super::r#trait::{
    CommercePlatform, ImageSize, MediaResolver, PageWindow, PermalinkResolver, ProductQuery,
    ProductStore, RelatedProducts, StoreError, TaxonomyLookup,
};
use super::site::SiteUrls;

/// Uploaded media file, relative to the uploads directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub file: String,
}

/// Serialized catalog contents used to seed an [`InMemoryCatalog`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl CatalogSeed {
    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::Decode(format!("catalog seed: {e}")))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Unavailable(format!("failed to read catalog seed {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }
}

#[derive(Debug, Default)]
struct CatalogData {
    products: BTreeMap<ProductId, Product>,
    terms: Vec<Term>,
    attachments: HashMap<AttachmentId, String>,
}

impl CatalogData {
    fn term(&self, id: TermId) -> Option<&Term> {
        self.terms.iter().find(|t| t.id == id)
    }

    fn terms_for(&self, product: &Product, taxonomy: Taxonomy) -> Vec<Term> {
        let ids = match taxonomy {
            Taxonomy::Category => &product.category_ids,
            Taxonomy::Tag => &product.tag_ids,
        };
        ids.iter()
            .filter_map(|id| self.term(*id))
            .filter(|t| t.taxonomy == taxonomy)
            .cloned()
            .collect()
    }

    fn has_any_term(&self, product: &Product, taxonomy: Taxonomy, names: &[String]) -> bool {
        self.terms_for(product, taxonomy)
            .iter()
            .any(|t| names.iter().any(|n| t.matches_name(n)))
    }

    fn matches(&self, product: &Product, query: &ProductQuery) -> bool {
        if product.status != query.status {
            return false;
        }
        if let Some(include) = &query.include {
            if !include.contains(&product.id) {
                return false;
            }
        }
        if !matches_search(product, &query.search) {
            return false;
        }
        if !query.categories.is_empty()
            && !self.has_any_term(product, Taxonomy::Category, &query.categories)
        {
            return false;
        }
        if !query.tags.is_empty() && !self.has_any_term(product, Taxonomy::Tag, &query.tags) {
            return false;
        }
        true
    }

    /// Matching products in store-default order: newest first, then id descending.
    fn matching(&self, query: &ProductQuery) -> Vec<&Product> {
        let mut matched: Vec<&Product> = self
            .products
            .values()
            .filter(|p| self.matches(p, query))
            .collect();
        matched.sort_by_key(|p| Reverse((p.published_at, p.id)));
        matched
    }
}

/// Every whitespace-separated search word must appear in the name or the
/// description, case-insensitively.
fn matches_search(product: &Product, search: &str) -> bool {
    let name = product.name.to_lowercase();
    let description = product.description.to_lowercase();
    search
        .split_whitespace()
        .map(str::to_lowercase)
        .all(|word| name.contains(&word) || description.contains(&word))
}

/// In-memory catalog implementing every collaborator trait.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug)]
pub struct InMemoryCatalog {
    data: RwLock<CatalogData>,
    urls: SiteUrls,
    commerce_active: AtomicBool,
}

impl InMemoryCatalog {
    pub fn new(urls: SiteUrls) -> Self {
        Self {
            data: RwLock::new(CatalogData::default()),
            urls,
            commerce_active: AtomicBool::new(true),
        }
    }

    pub fn from_seed(seed: CatalogSeed, urls: SiteUrls) -> Self {
        let catalog = Self::new(urls);
        if let Ok(mut data) = catalog.data.write() {
            data.terms = seed.terms;
            data.attachments = seed.attachments.into_iter().map(|a| (a.id, a.file)).collect();
            data.products = seed.products.into_iter().map(|p| (p.id, p)).collect();
        }
        catalog
    }

    pub fn insert_product(&self, product: Product) {
        if let Ok(mut data) = self.data.write() {
            data.products.insert(product.id, product);
        }
    }

    pub fn insert_term(&self, term: Term) {
        if let Ok(mut data) = self.data.write() {
            data.terms.retain(|t| t.id != term.id);
            data.terms.push(term);
        }
    }

    pub fn insert_attachment(&self, attachment: Attachment) {
        if let Ok(mut data) = self.data.write() {
            data.attachments.insert(attachment.id, attachment.file);
        }
    }

    pub fn set_commerce_active(&self, active: bool) {
        self.commerce_active.store(active, Ordering::SeqCst);
    }

    pub fn product_count(&self) -> usize {
        self.data.read().map(|d| d.products.len()).unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogData>, StoreError> {
        self.data
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory catalog lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProductStore for InMemoryCatalog {
    async fn matching_ids(&self, query: &ProductQuery) -> Result<Vec<ProductId>, StoreError> {
        let data = self.read()?;
        Ok(data.matching(query).into_iter().map(|p| p.id).collect())
    }

    async fn fetch_page(
        &self,
        query: &ProductQuery,
        window: PageWindow,
    ) -> Result<Vec<Product>, StoreError> {
        let data = self.read()?;
        let matched = data.matching(query).into_iter().skip(window.row_offset());
        let page = match window.row_limit() {
            Some(limit) => matched.take(limit).cloned().collect(),
            None => matched.cloned().collect(),
        };
        Ok(page)
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.products.get(&id).cloned())
    }
}

#[async_trait]
impl TaxonomyLookup for InMemoryCatalog {
    async fn product_terms(
        &self,
        product: ProductId,
        taxonomy: Taxonomy,
    ) -> Result<Vec<Term>, StoreError> {
        let data = self.read()?;
        Ok(data
            .products
            .get(&product)
            .map(|p| data.terms_for(p, taxonomy))
            .unwrap_or_default())
    }

    async fn all_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>, StoreError> {
        let data = self.read()?;
        let mut terms: Vec<Term> = data
            .terms
            .iter()
            .filter(|t| t.taxonomy == taxonomy)
            .cloned()
            .collect();
        terms.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(terms)
    }
}

#[async_trait]
impl MediaResolver for InMemoryCatalog {
    async fn attachment_url(
        &self,
        attachment: AttachmentId,
        size: ImageSize,
    ) -> Result<Option<String>, StoreError> {
        let data = self.read()?;
        Ok(data
            .attachments
            .get(&attachment)
            .map(|file| self.urls.attachment_url(file, size)))
    }
}

#[async_trait]
impl RelatedProducts for InMemoryCatalog {
    /// Published products sharing at least one category or tag, most shared
    /// terms first, then highest id.
    async fn related_ids(&self, product: ProductId, limit: usize) -> Result<Vec<ProductId>, StoreError> {
        let data = self.read()?;
        let Some(source) = data.products.get(&product) else {
            return Ok(vec![]);
        };
        let source_terms: HashSet<TermId> = source
            .category_ids
            .iter()
            .chain(source.tag_ids.iter())
            .copied()
            .collect();

        let mut scored: Vec<(usize, ProductId)> = data
            .products
            .values()
            .filter(|p| p.id != product && p.is_published())
            .filter_map(|p| {
                let shared = p
                    .category_ids
                    .iter()
                    .chain(p.tag_ids.iter())
                    .filter(|id| source_terms.contains(id))
                    .count();
                (shared > 0).then_some((shared, p.id))
            })
            .collect();
        scored.sort_by_key(|(shared, id)| Reverse((*shared, *id)));

        Ok(scored.into_iter().take(limit).map(|(_, id)| id).collect())
    }
}

#[async_trait]
impl PermalinkResolver for InMemoryCatalog {
    async fn permalink(&self, product: &Product) -> Result<String, StoreError> {
        Ok(self.urls.permalink(product))
    }
}

#[async_trait]
impl CommercePlatform for InMemoryCatalog {
    async fn commerce_active(&self) -> Result<bool, StoreError> {
        Ok(self.commerce_active.load(Ordering::SeqCst))
    }
}
