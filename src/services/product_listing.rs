//! Filtered, paginated product listing.
//!
//! The active filter is never kept on the server. A filtered listing hands
//! back an opaque token and page links carry it, so every caller replays
//! only their own search.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{ProductFilter, ProductPage},
    queries::product_queries,
    utils::pagination::{PageRequest, page_count},
};

pub fn encode_filter(filter: &ProductFilter) -> Option<String> {
    if *filter == ProductFilter::All {
        return None;
    }
    serde_json::to_vec(filter)
        .ok()
        .map(|json| URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_filter(token: Option<&str>) -> Result<ProductFilter> {
    let token = match token.map(str::trim) {
        None | Some("") => return Ok(ProductFilter::All),
        Some(token) => token,
    };

    let json = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| AppError::BadRequest("Invalid filter token".to_string()))?;

    serde_json::from_slice(&json)
        .map_err(|_| AppError::BadRequest("Invalid filter token".to_string()))
}

pub async fn list_products(
    pool: &PgPool,
    filter: &ProductFilter,
    page: PageRequest,
) -> Result<ProductPage> {
    let (products, total) = product_queries::fetch_page(pool, filter, page).await?;

    tracing::debug!(?filter, page = page.page, total, "Resolved product page");

    Ok(ProductPage {
        products,
        total,
        page: page.page,
        per_page: page.per_page,
        pages: page_count(total, page.per_page),
        filter: encode_filter(filter),
    })
}
