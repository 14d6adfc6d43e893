use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::ApiError,
    state::AppState,
};

use super::dto::{CreateProductRequest, UpdateProductRequest};
use super::repo::Product;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/find/:id", get(get_product))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = Product::list_all(&state.db).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;
    Ok(Json(product))
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    payload.validate()?;

    // Racing duplicates lose at the unique indexes: at most one create wins.
    let product = Product::insert(
        &state.db,
        &payload.title,
        &payload.description,
        &payload.img,
        payload.price,
        &payload.categories,
        payload.size.as_deref(),
        payload.color.as_deref(),
    )
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::Conflict(
            "a product with the same title, desc or img already exists".into(),
        ),
        other => other,
    })?;

    info!(product_id = %product.id, admin = %claims.sub, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    payload.validate()?;

    let product = Product::update(&state.db, id, payload.into_patch())
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict(
                "a product with the same title, desc or img already exists".into(),
            ),
            other => other,
        })?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;

    info!(product_id = %product.id, admin = %claims.sub, "product updated");
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !Product::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("product not found".into()));
    }

    info!(product_id = %id, admin = %claims.sub, "product deleted");
    Ok(Json(json!({ "message": "product deleted" })))
}
