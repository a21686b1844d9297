use axum::{
    Extension, Form, Json,
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{AppError, Result},
    forms::{FilterAction, FilterForm, SubmitAction, validate_filter, validate_product},
    models::{
        ProductDetail, ProductFilter, ProductFormResponse, ProductImagesResponse, ProductListQuery,
        ProductPage,
    },
    queries::{category_queries, product_queries, supplier_queries},
    services::{product_listing, product_service},
    utils::{jwt::Claims, multipart::read_product_submission, pagination::PageRequest},
};

const PANEL_PATH: &str = "/admin";
const PRODUCT_LIST_PATH: &str = "/admin/products";
const PRODUCT_ADD_PATH: &str = "/admin/products/add";

async fn list(state: &AppState, filter: &ProductFilter, page: Option<u32>) -> Result<ProductPage> {
    let page = PageRequest::new(page, state.pagination.products_per_page);
    product_listing::list_products(&state.db, filter, page).await
}

async fn form_response(
    state: &AppState,
    product: Option<ProductDetail>,
) -> Result<Json<ProductFormResponse>> {
    let categories = category_queries::get_choices(&state.db).await?;
    let suppliers = supplier_queries::get_choices(&state.db).await?;

    Ok(Json(ProductFormResponse {
        product,
        categories,
        suppliers,
    }))
}

/// Page links replay whatever filter their token encodes.
pub async fn product_list(
    State(state): State<AppState>,
    Query(params): Query<ProductListQuery>,
) -> Result<Json<ProductPage>> {
    let filter = product_listing::decode_filter(params.filter.as_deref())?;
    Ok(Json(list(&state, &filter, params.page).await?))
}

pub async fn filter_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListQuery>,
    Form(form): Form<FilterForm>,
) -> Result<Response> {
    let filter = match validate_filter(&form)? {
        FilterAction::Reset => return Ok(Redirect::to(PRODUCT_LIST_PATH).into_response()),
        FilterAction::Search(filter) => filter,
        FilterAction::ShowAll => ProductFilter::All,
    };

    Ok(Json(list(&state, &filter, params.page).await?).into_response())
}

pub async fn add_form(State(state): State<AppState>) -> Result<Json<ProductFormResponse>> {
    form_response(&state, None).await
}

pub async fn add_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<Redirect> {
    let (form, files) = read_product_submission(multipart).await?;
    let input = validate_product(&form)?;

    product_service::create_product(&state.db, &state.images, &claims.email, &input, &files)
        .await?;

    Ok(match form.action() {
        SubmitAction::Save => Redirect::to(PANEL_PATH),
        SubmitAction::SaveAndContinue => Redirect::to(PRODUCT_ADD_PATH),
    })
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductFormResponse>> {
    let product = product_queries::find_detail_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with id {} not found", id)))?;

    form_response(&state, Some(product)).await
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Redirect> {
    let (form, files) = read_product_submission(multipart).await?;
    let input = validate_product(&form)?;

    product_service::update_product(&state.db, &state.images, &claims.email, id, &input, &files)
        .await?;

    Ok(match form.action() {
        SubmitAction::Save => Redirect::to(PANEL_PATH),
        SubmitAction::SaveAndContinue => {
            Redirect::to(&format!("{}/products/update/{}", PANEL_PATH, id))
        }
    })
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    product_service::delete_product(&state.db, &state.images, &claims.email, id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductDetail>> {
    let product = product_queries::find_detail_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with id {} not found", id)))?;

    Ok(Json(product))
}

pub async fn product_images(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductImagesResponse>> {
    let images = product_service::product_images(&state.db, &state.images, id).await?;
    Ok(Json(ProductImagesResponse { images }))
}
