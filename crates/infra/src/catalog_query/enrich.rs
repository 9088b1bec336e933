//! Per-product enrichment: media URLs, taxonomy names, permalinks and
//! related products.
//!
//! Lookups for one product run concurrently, as do the products of a page and
//! the related suggestions of a product. Results are joined in input order, so
//! the output keeps the store's page order and the recommender's order.

use futures::future::try_join_all;
use futures::try_join;

use catalog_core::{AttachmentId, ProductId};
use catalog_products::{ListedProduct, Product, RelatedProductView, Taxonomy, Term};

use crate::catalog_store::{ImageSize, StoreError};

use super::CatalogCollaborators;

/// How many related suggestions are requested per product.
pub const RELATED_PRODUCTS_LIMIT: usize = 5;

/// Enrich every product of a page, preserving order. Fails on the first
/// collaborator error.
pub async fn enrich_page(
    collaborators: &CatalogCollaborators,
    products: &[Product],
    include_related: bool,
) -> Result<Vec<ListedProduct>, StoreError> {
    try_join_all(
        products
            .iter()
            .map(|p| enrich_product(collaborators, p, include_related)),
    )
    .await
}

pub async fn enrich_product(
    collaborators: &CatalogCollaborators,
    product: &Product,
    include_related: bool,
) -> Result<ListedProduct, StoreError> {
    let taxonomy = &collaborators.taxonomy;

    let (thumbnail, original, gallery, categories, tags, product_url, related) = try_join!(
        image_url(collaborators, product.image_id, ImageSize::Thumbnail),
        image_url(collaborators, product.image_id, ImageSize::Full),
        gallery_urls(collaborators, &product.gallery_image_ids),
        taxonomy.product_terms(product.id, Taxonomy::Category),
        taxonomy.product_terms(product.id, Taxonomy::Tag),
        collaborators.permalinks.permalink(product),
        related_products(collaborators, product.id, include_related),
    )?;

    Ok(ListedProduct {
        id: product.id,
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.regular_price,
        price_with_discount: product.effective_price(),
        categories: term_names(categories),
        tags: term_names(tags),
        featured_image_original: original,
        featured_image_thumbnail: thumbnail,
        product_url,
        gallery_images_urls: gallery,
        related_products: related,
    })
}

/// Resolve the recommender's suggestions to views, skipping ids that no
/// longer point at a published product.
pub async fn related_products(
    collaborators: &CatalogCollaborators,
    product: ProductId,
    enabled: bool,
) -> Result<Vec<RelatedProductView>, StoreError> {
    if !enabled {
        return Ok(vec![]);
    }

    let ids = collaborators
        .related
        .related_ids(product, RELATED_PRODUCTS_LIMIT)
        .await?;

    let resolved = try_join_all(ids.into_iter().map(|id| related_view(collaborators, id))).await?;

    let views: Vec<RelatedProductView> = resolved.into_iter().flatten().collect();
    tracing::trace!(product = %product, related = views.len(), "resolved related products");
    Ok(views)
}

async fn related_view(
    collaborators: &CatalogCollaborators,
    id: ProductId,
) -> Result<Option<RelatedProductView>, StoreError> {
    let Some(product) = collaborators
        .store
        .find_product(id)
        .await?
        .filter(Product::is_published)
    else {
        tracing::debug!(related = %id, "skipping unresolvable related product");
        return Ok(None);
    };

    let (thumbnail, product_url) = try_join!(
        image_url(collaborators, product.image_id, ImageSize::Thumbnail),
        collaborators.permalinks.permalink(&product),
    )?;

    Ok(Some(RelatedProductView::from_product(&product, thumbnail, product_url)))
}

async fn image_url(
    collaborators: &CatalogCollaborators,
    attachment: Option<AttachmentId>,
    size: ImageSize,
) -> Result<Option<String>, StoreError> {
    match attachment {
        Some(id) => collaborators.media.attachment_url(id, size).await,
        None => Ok(None),
    }
}

/// Full-size gallery URLs in gallery order; unknown attachments are dropped.
async fn gallery_urls(
    collaborators: &CatalogCollaborators,
    attachments: &[AttachmentId],
) -> Result<Vec<String>, StoreError> {
    let urls = try_join_all(
        attachments
            .iter()
            .map(|id| collaborators.media.attachment_url(*id, ImageSize::Full)),
    )
    .await?;
    Ok(urls.into_iter().flatten().collect())
}

fn term_names(terms: Vec<Term>) -> Vec<String> {
    terms.into_iter().map(|t| t.name).collect()
}
