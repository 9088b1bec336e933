use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::{AttachmentId, DomainError, DomainResult, ProductId, TermId};

/// Publication status as recorded by the commerce platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Draft,
    Pending,
    Private,
    #[serde(rename = "publish")]
    Published,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Pending => "pending",
            ProductStatus::Private => "private",
            ProductStatus::Published => "publish",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "private" => Ok(Self::Private),
            "publish" => Ok(Self::Published),
            other => Err(DomainError::validation(format!("unknown product status: {other}"))),
        }
    }
}

/// Product record as returned by the catalog store.
///
/// Taxonomy assignments are kept as term ids; names are resolved through the
/// taxonomy lookup at enrichment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub status: ProductStatus,
    #[serde(default)]
    pub regular_price: Option<Decimal>,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub image_id: Option<AttachmentId>,
    #[serde(default)]
    pub gallery_image_ids: Vec<AttachmentId>,
    #[serde(default)]
    pub category_ids: Vec<TermId>,
    #[serde(default)]
    pub tag_ids: Vec<TermId>,
    #[serde(default)]
    pub published_at: DateTime<Utc>,
}

impl Product {
    /// Sale price when set and non-zero, otherwise the regular price.
    pub fn effective_price(&self) -> Option<Decimal> {
        effective_price(self.regular_price, self.sale_price)
    }

    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Published
    }
}

/// Effective price selection shared by listed and related products.
pub fn effective_price(regular: Option<Decimal>, sale: Option<Decimal>) -> Option<Decimal> {
    match sale {
        Some(s) if !s.is_zero() => Some(s),
        _ => regular,
    }
}

/// Parse a stored price string. The platform stores "no price" as an empty
/// string, which maps to `None`.
pub fn parse_price(raw: &str) -> DomainResult<Option<Decimal>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(raw)
        .map(Some)
        .map_err(|e| DomainError::validation(format!("invalid price {raw:?}: {e}")))
}
