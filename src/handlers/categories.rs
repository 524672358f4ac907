use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::errors::{ApiError, ApiResult};
use crate::models::{category_map, CategoriesResponse};

/// GET /categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<CategoriesResponse>> {
    let categories = state.db.call(|db| db.list_categories_by_id()).await?;

    if categories.is_empty() {
        return Err(ApiError::not_found());
    }

    log::debug!("Listing {} categories", categories.len());
    Ok(Json(CategoriesResponse {
        success: true,
        categories: category_map(categories),
    }))
}
