use rust_decimal::Decimal;
use serde::Serialize;

use catalog_core::ProductId;
use catalog_products::{CatalogPage, ListedProduct, QueryProfile, RelatedProductView};

// -------------------------
// Response DTOs
// -------------------------

/// Successful listing body. Pagination fields sit next to `products`.
#[derive(Debug, Serialize)]
pub struct CatalogPageResponse {
    pub products: Vec<ProductResponse>,
    pub is_last_page: bool,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_products: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_products: Option<Vec<RelatedProductResponse>>,
}

#[derive(Debug, Serialize)]
pub struct RelatedProductResponse {
    pub id: ProductId,
    pub name: String,
    pub price: Option<Decimal>,
    pub price_with_discount: Option<Decimal>,
    pub thumbnail_url: Option<String>,
    pub product_url: String,
}

// -------------------------
// Mapping helpers
// -------------------------

pub fn catalog_page_to_response(page: CatalogPage, profile: QueryProfile) -> CatalogPageResponse {
    CatalogPageResponse {
        products: page
            .products
            .into_iter()
            .map(|p| listed_product_to_response(p, profile))
            .collect(),
        is_last_page: page.pagination.is_last_page,
        current_page: page.pagination.current_page,
        total_pages: page.pagination.total_pages,
        total_products: page.pagination.total_products,
        all_categories: page.all_categories,
        all_tags: page.all_tags,
    }
}

pub fn listed_product_to_response(p: ListedProduct, profile: QueryProfile) -> ProductResponse {
    ProductResponse {
        id: profile.include_id.then_some(p.id),
        name: p.name,
        description: p.description,
        price: p.price,
        price_with_discount: p.price_with_discount,
        categories: p.categories,
        tags: p.tags,
        featured_image_original: p.featured_image_original,
        featured_image_thumbnail: p.featured_image_thumbnail,
        product_url: p.product_url,
        gallery_images_urls: p.gallery_images_urls,
        related_products: profile.include_related.then(|| {
            p.related_products
                .into_iter()
                .map(related_product_to_response)
                .collect()
        }),
    }
}

fn related_product_to_response(r: RelatedProductView) -> RelatedProductResponse {
    RelatedProductResponse {
        id: r.id,
        name: r.name,
        price: r.price,
        price_with_discount: r.price_with_discount,
        thumbnail_url: r.thumbnail_url,
        product_url: r.product_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_products::Pagination;
    use core::str::FromStr;

    fn listed(id: i64) -> ListedProduct {
        ListedProduct {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Some(Decimal::from_str("80.00").unwrap()),
            price_with_discount: Some(Decimal::from_str("45.00").unwrap()),
            categories: vec!["Bags".to_string()],
            tags: vec![],
            featured_image_original: None,
            featured_image_thumbnail: None,
            product_url: format!("https://shop.test/?p={id}"),
            gallery_images_urls: vec![],
            related_products: vec![],
        }
    }

    fn page() -> CatalogPage {
        CatalogPage {
            products: vec![listed(9)],
            pagination: Pagination {
                current_page: 1,
                total_pages: 1,
                total_products: 1,
                is_last_page: true,
            },
            all_categories: Some(vec!["Bags".to_string()]),
            all_tags: Some(vec![]),
        }
    }

    #[test]
    fn extended_shape_has_ids_related_and_enumerations() {
        let body = serde_json::to_value(catalog_page_to_response(page(), QueryProfile::extended())).unwrap();
        assert_eq!(body["products"][0]["id"], 9);
        assert_eq!(body["products"][0]["related_products"], serde_json::json!([]));
        assert_eq!(body["products"][0]["price"], "80.00");
        assert_eq!(body["products"][0]["price_with_discount"], "45.00");
        assert_eq!(body["products"][0]["featured_image_thumbnail"], serde_json::Value::Null);
        assert_eq!(body["all_categories"], serde_json::json!(["Bags"]));
        assert_eq!(body["is_last_page"], true);
        assert_eq!(body["total_products"], 1);
    }

    #[test]
    fn basic_shape_omits_profile_fields() {
        let mut page = page();
        page.all_categories = None;
        page.all_tags = None;

        let body = serde_json::to_value(catalog_page_to_response(page, QueryProfile::basic())).unwrap();
        let product = body["products"][0].as_object().unwrap();
        assert!(!product.contains_key("id"));
        assert!(!product.contains_key("related_products"));
        assert!(body.get("all_categories").is_none());
        assert!(body.get("all_tags").is_none());
    }
}
