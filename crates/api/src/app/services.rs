use std::sync::Arc;

use thiserror::Error;

use catalog_infra::catalog_query::{CatalogCollaborators, CatalogQueryService};
use catalog_infra::catalog_store::{CatalogSeed, InMemoryCatalog, StoreError};
use catalog_infra::config::AppConfig;

use crate::app::params::TextSanitizer;

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("catalog backend: {0}")]
    Store(#[from] StoreError),
    #[error("text sanitizer: {0}")]
    Sanitizer(#[from] regex::Error),
}

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppServices {
    catalog: CatalogQueryService,
    sanitizer: Arc<TextSanitizer>,
}

impl AppServices {
    pub fn new(catalog: CatalogQueryService) -> Result<Self, ServicesError> {
        Ok(Self {
            catalog,
            sanitizer: Arc::new(TextSanitizer::new()?),
        })
    }

    /// Serve every collaborator role from one in-memory catalog.
    pub fn in_memory(catalog: Arc<InMemoryCatalog>) -> Result<Self, ServicesError> {
        Self::new(CatalogQueryService::new(CatalogCollaborators::from_shared(catalog)))
    }

    pub fn catalog(&self) -> &CatalogQueryService {
        &self.catalog
    }

    pub fn sanitizer(&self) -> &TextSanitizer {
        &self.sanitizer
    }
}

/// Wire the catalog backend selected by the configuration.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, ServicesError> {
    if let Some(database_url) = &config.database_url {
        #[cfg(feature = "postgres")]
        {
            return build_postgres_services(database_url, config).await;
        }
        #[cfg(not(feature = "postgres"))]
        {
            let _ = database_url;
            tracing::warn!("DATABASE_URL set but postgres feature not enabled, falling back to in-memory");
        }
    }

    build_in_memory_services(config)
}

fn build_in_memory_services(config: &AppConfig) -> Result<AppServices, ServicesError> {
    let catalog = match &config.fixture {
        Some(path) => {
            let seed = CatalogSeed::from_json_file(path)?;
            tracing::info!(
                fixture = %path.display(),
                products = seed.products.len(),
                terms = seed.terms.len(),
                "seeding in-memory catalog"
            );
            InMemoryCatalog::from_seed(seed, config.urls.clone())
        }
        None => {
            tracing::warn!("CATALOG_FIXTURE not set; serving an empty catalog");
            InMemoryCatalog::new(config.urls.clone())
        }
    };
    catalog.set_commerce_active(config.commerce_active);

    AppServices::in_memory(Arc::new(catalog))
}

#[cfg(feature = "postgres")]
async fn build_postgres_services(
    database_url: &str,
    config: &AppConfig,
) -> Result<AppServices, ServicesError> {
    use catalog_infra::catalog_store::PostgresCatalog;

    let catalog = PostgresCatalog::connect(database_url, config.urls.clone()).await?;
    catalog.migrate().await?;
    tracing::info!("using postgres catalog");

    AppServices::new(CatalogQueryService::new(CatalogCollaborators::from_shared(Arc::new(
        catalog,
    ))))
}
