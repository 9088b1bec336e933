use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use std::collections::BTreeSet;
use std::sync::Arc;

use catalog_core::{ProductId, TermId};
use catalog_infra::catalog_query::{CatalogCollaborators, CatalogQueryService};
use catalog_infra::catalog_store::{InMemoryCatalog, SiteUrls};
use catalog_products::{
    FilterCriteria, PageRequest, PriceRange, Product, ProductStatus, QueryProfile, Taxonomy, Term,
};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;

const CATEGORIES: [&str; 4] = ["Shoes", "Bags", "Hats", "Belts"];

fn seeded_catalog(products: i64) -> Arc<InMemoryCatalog> {
    let catalog = InMemoryCatalog::new(SiteUrls::with_default_media("https://bench.test"));
    for (idx, name) in CATEGORIES.iter().enumerate() {
        catalog.insert_term(Term {
            id: TermId::new(idx as i64 + 1),
            taxonomy: Taxonomy::Category,
            name: name.to_string(),
            slug: name.to_lowercase(),
        });
    }

    let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for id in 1..=products {
        catalog.insert_product(Product {
            id: ProductId::new(id),
            name: format!("Bench product {id}"),
            slug: format!("bench-product-{id}"),
            description: "Generated for benchmarks".to_string(),
            status: ProductStatus::Published,
            regular_price: Some(Decimal::new(id % 200 * 100, 2)),
            sale_price: (id % 3 == 0).then(|| Decimal::new(id % 150 * 100, 2)),
            image_id: None,
            gallery_image_ids: vec![],
            category_ids: vec![TermId::new(id % 4 + 1)],
            tag_ids: vec![],
            published_at: epoch + Duration::minutes(id),
        });
    }
    Arc::new(catalog)
}

/// Full listing pipeline for one page at different page sizes.
fn bench_list_page(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = CatalogQueryService::new(CatalogCollaborators::from_shared(seeded_catalog(5_000)));
    let criteria = FilterCriteria {
        categories: ["Shoes", "Bags"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        price: PriceRange::new(10.0, 150.0),
        ..FilterCriteria::default()
    };

    let mut group = c.benchmark_group("list_page");
    for per_page in [10i64, 50, 100] {
        group.throughput(Throughput::Elements(per_page as u64));
        group.bench_with_input(BenchmarkId::from_parameter(per_page), &per_page, |b, &per_page| {
            b.iter(|| {
                rt.block_on(service.list_products(
                    black_box(&criteria),
                    PageRequest::new(2, per_page),
                    QueryProfile::extended(),
                ))
                .unwrap()
            });
        });
    }
    group.finish();
}

/// Basic profile skips related products and catalog enumerations.
fn bench_profiles(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = CatalogQueryService::new(CatalogCollaborators::from_shared(seeded_catalog(5_000)));
    let criteria = FilterCriteria::default();

    let mut group = c.benchmark_group("profiles");
    for (label, profile) in [("extended", QueryProfile::extended()), ("basic", QueryProfile::basic())] {
        group.bench_function(label, |b| {
            b.iter(|| {
                rt.block_on(service.list_products(&criteria, PageRequest::default(), black_box(profile)))
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_list_page, bench_profiles);
criterion_main!(benches);
