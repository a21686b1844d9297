mod admin;
mod health;
mod login;
mod products;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{AppState, middleware::admin_middleware};

pub fn create_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", get(admin::panel).post(admin::panel))
        .route("/users", get(admin::list_users))
        .route(
            "/products",
            get(products::product_list).post(products::filter_products),
        )
        .route(
            "/products/add",
            get(products::add_form).post(products::add_product),
        )
        .route(
            "/products/update/{id}",
            get(products::update_form).post(products::update_product),
        )
        .route(
            "/products/{id}",
            get(products::get_product).delete(products::delete_product),
        )
        .route("/products/{id}/images", get(products::product_images))
        .route_layer(middleware::from_fn_with_state(state, admin_middleware));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/auth/login", post(login::login_user))
        .nest("/admin", admin)
}
