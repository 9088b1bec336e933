//! Enriched listing views produced by the query pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::ProductId;

use crate::product::{Product, effective_price};
use crate::query::Pagination;

/// Reduced projection of a related product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedProductView {
    pub id: ProductId,
    pub name: String,
    pub price: Option<Decimal>,
    pub price_with_discount: Option<Decimal>,
    pub thumbnail_url: Option<String>,
    pub product_url: String,
}

impl RelatedProductView {
    pub fn from_product(product: &Product, thumbnail_url: Option<String>, product_url: String) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.regular_price,
            price_with_discount: effective_price(product.regular_price, product.sale_price),
            thumbnail_url,
            product_url,
        }
    }
}

/// A product that survived the price filter, with every derived field
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedProduct {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Option<Decimal>,
    pub price_with_discount: Option<Decimal>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub featured_image_original: Option<String>,
    pub featured_image_thumbnail: Option<String>,
    pub product_url: String,
    pub gallery_images_urls: Vec<String>,
    /// Empty when the profile skips related products.
    pub related_products: Vec<RelatedProductView>,
}

/// One page of enriched products plus pagination totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub products: Vec<ListedProduct>,
    pub pagination: Pagination,
    pub all_categories: Option<Vec<String>>,
    pub all_tags: Option<Vec<String>>,
}
