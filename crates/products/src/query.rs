//! Catalog query model: filter criteria, page requests, pagination totals and
//! response profiles.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use catalog_core::ProductId;

/// Upper bound used when the caller gives no `maxprice`.
pub const DEFAULT_MAX_PRICE: f64 = i64::MAX as f64;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Inclusive price range applied to the effective price of fetched products.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: DEFAULT_MAX_PRICE,
        }
    }
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether an effective price falls within `[min, max]`.
    ///
    /// A product without any price counts as 0, the same way the platform
    /// coerces an empty price string.
    pub fn contains(&self, effective_price: Option<Decimal>) -> bool {
        let price = effective_price.and_then(|p| p.to_f64()).unwrap_or(0.0);
        price >= self.min && price <= self.max
    }
}

/// Filters forwarded to the catalog store, plus the client-side price range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Exact product id (`include=[id]` at the store).
    pub id: Option<ProductId>,
    /// Free-text search; empty means no constraint.
    pub name: String,
    /// Category names, any-match; empty means no constraint.
    pub categories: BTreeSet<String>,
    /// Tag names, any-match; empty means no constraint.
    pub tags: BTreeSet<String>,
    pub price: PriceRange,
}

/// 1-based page request.
///
/// Values are taken as given: a zero or negative page yields a zero or
/// negative offset, and the store decides what such a window means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self { page, per_page }
    }

    /// `(page - 1) * per_page`, saturating instead of overflowing.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// Pagination metadata reported with every non-empty result page.
///
/// Totals come from the store-level count, before the price filter trims
/// the fetched window, so `total_products` can exceed what the pages
/// actually return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_products: u64,
    pub is_last_page: bool,
}

impl Pagination {
    pub fn compute(total_products: u64, request: PageRequest) -> Self {
        let total_pages = total_pages(total_products, request.per_page);
        Self {
            current_page: request.page,
            total_pages,
            total_products,
            is_last_page: request.page >= total_pages,
        }
    }
}

/// `ceil(total / per_page)`; a zero page size yields zero pages and a
/// negative one a non-positive count.
pub fn total_pages(total_products: u64, per_page: i64) -> i64 {
    if per_page == 0 {
        return 0;
    }
    (total_products as f64 / per_page as f64).ceil() as i64
}

/// Response shape switches for the listing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryProfile {
    /// Accept the `id` filter and report product ids.
    pub include_id: bool,
    /// Resolve and report related products.
    pub include_related: bool,
    /// Report every category and tag name in the envelope.
    pub include_catalog_enumerations: bool,
}

impl QueryProfile {
    pub const fn extended() -> Self {
        Self {
            include_id: true,
            include_related: true,
            include_catalog_enumerations: true,
        }
    }

    pub const fn basic() -> Self {
        Self {
            include_id: false,
            include_related: false,
            include_catalog_enumerations: false,
        }
    }
}

impl Default for QueryProfile {
    fn default() -> Self {
        Self::extended()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(2, 5).offset(), 5);
        assert_eq!(PageRequest::new(4, 25).offset(), 75);
    }

    #[test]
    fn non_positive_pages_are_not_corrected() {
        assert_eq!(PageRequest::new(0, 10).offset(), -10);
        assert_eq!(PageRequest::new(-2, 10).offset(), -30);
        assert_eq!(PageRequest::new(i64::MIN, 10).offset(), i64::MIN);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(11, 0), 0);
        assert_eq!(total_pages(5, -3), -1);
    }

    #[test]
    fn last_page_flag_follows_page_number() {
        let p = Pagination::compute(25, PageRequest::new(2, 10));
        assert_eq!(p.total_pages, 3);
        assert!(!p.is_last_page);

        let p = Pagination::compute(25, PageRequest::new(3, 10));
        assert!(p.is_last_page);

        // Past the end still counts as last.
        let p = Pagination::compute(25, PageRequest::new(9, 10));
        assert!(p.is_last_page);
    }

    #[test]
    fn price_range_is_inclusive() {
        let range = PriceRange::new(10.0, 50.0);
        assert!(range.contains(Some(dec("10"))));
        assert!(range.contains(Some(dec("50.00"))));
        assert!(!range.contains(Some(dec("50.01"))));
        assert!(!range.contains(Some(dec("9.99"))));
    }

    #[test]
    fn unpriced_products_count_as_zero() {
        assert!(PriceRange::default().contains(None));
        assert!(!PriceRange::new(1.0, 5.0).contains(None));
    }

    #[test]
    fn profiles_toggle_every_flag() {
        let ext = QueryProfile::extended();
        let basic = QueryProfile::basic();
        assert!(ext.include_id && ext.include_related && ext.include_catalog_enumerations);
        assert!(!basic.include_id && !basic.include_related && !basic.include_catalog_enumerations);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn total_pages_matches_integer_ceiling(total in 0u64..1_000_000, per_page in 1i64..1_000) {
                let expected = (total as i64 + per_page - 1) / per_page;
                prop_assert_eq!(total_pages(total, per_page), expected);
            }

            #[test]
            fn is_last_page_iff_page_reaches_total(total in 0u64..10_000, page in -5i64..200, per_page in 1i64..100) {
                let p = Pagination::compute(total, PageRequest::new(page, per_page));
                prop_assert_eq!(p.is_last_page, page >= p.total_pages);
                prop_assert_eq!(p.current_page, page);
            }

            #[test]
            fn offset_is_page_minus_one_times_size(page in 1i64..10_000, per_page in 0i64..1_000) {
                prop_assert_eq!(PageRequest::new(page, per_page).offset(), (page - 1) * per_page);
            }

            #[test]
            fn price_filter_is_inclusive_on_both_ends(cents in 0i64..1_000_000, lo in 0i64..10_000, span in 0i64..10_000) {
                let price = Decimal::new(cents, 2);
                let min = lo as f64;
                let max = (lo + span) as f64;
                let as_float = cents as f64 / 100.0;
                prop_assert_eq!(
                    PriceRange::new(min, max).contains(Some(price)),
                    as_float >= min && as_float <= max
                );
            }
        }
    }
}
