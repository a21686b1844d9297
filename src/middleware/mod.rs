use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AppError, models::UserRole, utils::jwt};

/// Rejects the request unless it carries a valid bearer token with the admin
/// role. Runs before the handler touches the body or the database.
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))?;

    let claims = jwt::verify_token(&state.jwt_secret, token)?;

    if claims.role != UserRole::Admin {
        tracing::warn!(user = %claims.sub, path = %req.uri().path(), "Admin access denied");
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
