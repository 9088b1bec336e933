use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use catalog_infra::catalog_query::CatalogQueryOutcome;
use catalog_products::QueryProfile;

use crate::app::{dto, errors, params};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/basic", get(list_products_basic))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(raw): Query<HashMap<String, String>>,
) -> axum::response::Response {
    respond(&services, &raw, QueryProfile::extended()).await
}

pub async fn list_products_basic(
    Extension(services): Extension<Arc<AppServices>>,
    Query(raw): Query<HashMap<String, String>>,
) -> axum::response::Response {
    respond(&services, &raw, QueryProfile::basic()).await
}

#[tracing::instrument(skip(services, raw))]
async fn respond(
    services: &AppServices,
    raw: &HashMap<String, String>,
    profile: QueryProfile,
) -> axum::response::Response {
    let (criteria, request) = params::parse_catalog_request(raw, profile, services.sanitizer());

    match services.catalog().list_products(&criteria, request, profile).await {
        Ok(CatalogQueryOutcome::Page(page)) => (
            StatusCode::OK,
            Json(dto::catalog_page_to_response(page, profile)),
        )
            .into_response(),
        Ok(CatalogQueryOutcome::Empty) => errors::no_products_found(),
        Err(e) => errors::query_error_to_response(e),
    }
}
