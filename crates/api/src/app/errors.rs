use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_infra::catalog_query::CatalogQueryError;

pub const COMMERCE_UNAVAILABLE: &str = "WooCommerce is not active";
pub const NO_PRODUCTS_FOUND: &str = "No products found within the specified criteria";

/// Map a pipeline failure to an `{error}` body.
///
/// An inactive commerce module is reported with 200, like the empty result;
/// collaborator failures are reported as a bad gateway.
pub fn query_error_to_response(err: CatalogQueryError) -> axum::response::Response {
    match err {
        CatalogQueryError::CommerceUnavailable => json_error(StatusCode::OK, COMMERCE_UNAVAILABLE),
        CatalogQueryError::Store(e) => {
            tracing::warn!(error = %e, "catalog store failure");
            json_error(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

pub fn no_products_found() -> axum::response::Response {
    json_error(StatusCode::OK, NO_PRODUCTS_FOUND)
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}
