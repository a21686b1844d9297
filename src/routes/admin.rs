use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    error::Result,
    models::{CatalogSummary, UserListQuery, UserPage},
    queries::{admin_queries, user_queries},
    utils::pagination::{PageRequest, page_count},
};

pub async fn panel(State(state): State<AppState>) -> Result<Json<CatalogSummary>> {
    let summary = admin_queries::catalog_summary(&state.db).await?;
    Ok(Json(summary))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListQuery>,
) -> Result<Json<UserPage>> {
    let page = PageRequest::new(params.page, state.pagination.users_per_page);
    let search = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let (users, total) = user_queries::search_users(&state.db, search, page).await?;

    Ok(Json(UserPage {
        users,
        total,
        page: page.page,
        per_page: page.per_page,
        pages: page_count(total, page.per_page),
        search: params.q.is_some(),
    }))
}
