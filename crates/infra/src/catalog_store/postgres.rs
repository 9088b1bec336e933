//! Postgres-backed catalog.
//!
//! Reads the schema in `migrations/0001_catalog.sql`. Search is a
//! case-insensitive `ILIKE` per search word over name and description;
//! taxonomy filters compare lower-cased term names.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};

use catalog_core::{AttachmentId, ProductId, TermId};
use catalog_products::{Product, ProductStatus, Taxonomy, Term, parse_price};

use super::r#trait::{
    CommercePlatform, ImageSize, MediaResolver, PageWindow, PermalinkResolver, ProductQuery,
    ProductStore, RelatedProducts, StoreError, TaxonomyLookup,
};
use super::site::SiteUrls;

const SCHEMA: &str = include_str!("../../migrations/0001_catalog.sql");

const PRODUCT_COLUMNS: &str = r#"
    SELECT
        p.id,
        p.name,
        p.slug,
        p.description,
        p.status,
        p.regular_price,
        p.sale_price,
        p.image_id,
        p.gallery_image_ids,
        p.published_at,
        ARRAY(
            SELECT pt.term_id
            FROM catalog_product_terms pt
            JOIN catalog_terms t ON t.id = pt.term_id
            WHERE pt.product_id = p.id AND t.taxonomy = 'product_cat'
            ORDER BY pt.term_order, t.name
        ) AS category_ids,
        ARRAY(
            SELECT pt.term_id
            FROM catalog_product_terms pt
            JOIN catalog_terms t ON t.id = pt.term_id
            WHERE pt.product_id = p.id AND t.taxonomy = 'product_tag'
            ORDER BY pt.term_order, t.name
        ) AS tag_ids
    FROM catalog_products p
"#;

pub struct PostgresCatalog {
    pool: PgPool,
    urls: SiteUrls,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool, urls: SiteUrls) -> Self {
        Self { pool, urls }
    }

    pub async fn connect(database_url: &str, urls: SiteUrls) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self::new(pool, urls))
    }

    /// Create the catalog tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Decode(err.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}

/// Escape `LIKE` wildcards so search words match literally.
fn like_pattern(word: &str) -> String {
    let mut escaped = String::with_capacity(word.len() + 2);
    escaped.push('%');
    for ch in word.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn push_term_filter(qb: &mut QueryBuilder<'_, Postgres>, taxonomy: Taxonomy, names: &[String]) {
    if names.is_empty() {
        return;
    }
    let lowered: Vec<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();
    qb.push(
        " AND EXISTS (SELECT 1 FROM catalog_product_terms pt \
         JOIN catalog_terms t ON t.id = pt.term_id \
         WHERE pt.product_id = p.id AND t.taxonomy = ",
    );
    qb.push_bind(taxonomy.as_str());
    qb.push(" AND lower(t.name) = ANY(");
    qb.push_bind(lowered);
    qb.push("))");
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    qb.push(" WHERE p.status = ");
    qb.push_bind(query.status.as_str());

    if let Some(include) = &query.include {
        let ids: Vec<i64> = include.iter().map(|id| id.get()).collect();
        qb.push(" AND p.id = ANY(");
        qb.push_bind(ids);
        qb.push(")");
    }

    for word in query.search.split_whitespace() {
        let pattern = like_pattern(word);
        qb.push(" AND (p.name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR p.description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    push_term_filter(qb, Taxonomy::Category, &query.categories);
    push_term_filter(qb, Taxonomy::Tag, &query.tags);
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let status: String = row.try_get("status").map_err(map_sqlx_error)?;
    let regular: String = row.try_get("regular_price").map_err(map_sqlx_error)?;
    let sale: String = row.try_get("sale_price").map_err(map_sqlx_error)?;
    let image_id: Option<i64> = row.try_get("image_id").map_err(map_sqlx_error)?;
    let gallery: Vec<i64> = row.try_get("gallery_image_ids").map_err(map_sqlx_error)?;
    let categories: Vec<i64> = row.try_get("category_ids").map_err(map_sqlx_error)?;
    let tags: Vec<i64> = row.try_get("tag_ids").map_err(map_sqlx_error)?;
    let published_at: DateTime<Utc> = row.try_get("published_at").map_err(map_sqlx_error)?;

    Ok(Product {
        id: ProductId::new(row.try_get("id").map_err(map_sqlx_error)?),
        name: row.try_get("name").map_err(map_sqlx_error)?,
        slug: row.try_get("slug").map_err(map_sqlx_error)?,
        description: row.try_get("description").map_err(map_sqlx_error)?,
        status: status.parse::<ProductStatus>()?,
        regular_price: parse_price(&regular)?,
        sale_price: parse_price(&sale)?,
        image_id: image_id.map(AttachmentId::new),
        gallery_image_ids: gallery.into_iter().map(AttachmentId::new).collect(),
        category_ids: categories.into_iter().map(TermId::new).collect(),
        tag_ids: tags.into_iter().map(TermId::new).collect(),
        published_at,
    })
}

fn term_from_row(row: &PgRow, taxonomy: Taxonomy) -> Result<Term, StoreError> {
    Ok(Term {
        id: TermId::new(row.try_get("id").map_err(map_sqlx_error)?),
        taxonomy,
        name: row.try_get("name").map_err(map_sqlx_error)?,
        slug: row.try_get("slug").map_err(map_sqlx_error)?,
    })
}

#[async_trait]
impl ProductStore for PostgresCatalog {
    #[tracing::instrument(skip_all)]
    async fn matching_ids(&self, query: &ProductQuery) -> Result<Vec<ProductId>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT p.id FROM catalog_products p");
        push_filters(&mut qb, query);
        qb.push(" ORDER BY p.published_at DESC, p.id DESC");

        let ids: Vec<i64> = qb
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(ids.into_iter().map(ProductId::new).collect())
    }

    #[tracing::instrument(skip_all, fields(limit = window.limit, offset = window.offset))]
    async fn fetch_page(
        &self,
        query: &ProductQuery,
        window: PageWindow,
    ) -> Result<Vec<Product>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_COLUMNS);
        push_filters(&mut qb, query);
        qb.push(" ORDER BY p.published_at DESC, p.id DESC");
        if let Some(limit) = window.row_limit() {
            qb.push(" LIMIT ");
            qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(window.row_offset()).unwrap_or(i64::MAX));

        let rows = qb.build().fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        rows.iter().map(product_from_row).collect()
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_COLUMNS);
        qb.push(" WHERE p.id = ");
        qb.push_bind(id.get());

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(product_from_row).transpose()
    }
}

#[async_trait]
impl TaxonomyLookup for PostgresCatalog {
    async fn product_terms(
        &self,
        product: ProductId,
        taxonomy: Taxonomy,
    ) -> Result<Vec<Term>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.slug
            FROM catalog_product_terms pt
            JOIN catalog_terms t ON t.id = pt.term_id
            WHERE pt.product_id = $1 AND t.taxonomy = $2
            ORDER BY pt.term_order, t.name
            "#,
        )
        .bind(product.get())
        .bind(taxonomy.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(|r| term_from_row(r, taxonomy)).collect()
    }

    async fn all_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug
            FROM catalog_terms
            WHERE taxonomy = $1
            ORDER BY lower(name)
            "#,
        )
        .bind(taxonomy.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(|r| term_from_row(r, taxonomy)).collect()
    }
}

#[async_trait]
impl MediaResolver for PostgresCatalog {
    async fn attachment_url(
        &self,
        attachment: AttachmentId,
        size: ImageSize,
    ) -> Result<Option<String>, StoreError> {
        let file: Option<String> = sqlx::query_scalar("SELECT file FROM catalog_attachments WHERE id = $1")
            .bind(attachment.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(file.map(|f| self.urls.attachment_url(&f, size)))
    }
}

#[async_trait]
impl RelatedProducts for PostgresCatalog {
    async fn related_ids(&self, product: ProductId, limit: usize) -> Result<Vec<ProductId>, StoreError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT p.id
            FROM catalog_products p
            JOIN catalog_product_terms pt ON pt.product_id = p.id
            WHERE pt.term_id IN (
                    SELECT term_id FROM catalog_product_terms WHERE product_id = $1
                )
              AND p.id <> $1
              AND p.status = 'publish'
            GROUP BY p.id
            ORDER BY COUNT(*) DESC, p.id DESC
            LIMIT $2
            "#,
        )
        .bind(product.get())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(ids.into_iter().map(ProductId::new).collect())
    }
}

#[async_trait]
impl PermalinkResolver for PostgresCatalog {
    async fn permalink(&self, product: &Product) -> Result<String, StoreError> {
        Ok(self.urls.permalink(product))
    }
}

#[async_trait]
impl CommercePlatform for PostgresCatalog {
    /// The catalog counts as active once its product table exists.
    async fn commerce_active(&self) -> Result<bool, StoreError> {
        sqlx::query_scalar("SELECT to_regclass('catalog_products') IS NOT NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
