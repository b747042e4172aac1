use axum::{extract::Path, Json};

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::categories::registry;
use crate::shared::types::ApiResponse;
use crate::shared::validation::CATEGORY_KEY_REGEX;

/// List the canonical categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_categories() -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories: Vec<CategoryResponseDto> = registry::MAIN_CATEGORIES
        .iter()
        .map(CategoryResponseDto::from)
        .collect();
    Ok(Json(ApiResponse::success(Some(categories), None, None)))
}

/// Get a category by key
#[utoipa::path(
    get,
    path = "/api/categories/{key}",
    params(
        ("key" = String, Path, description = "Category key")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Malformed category key"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(Path(key): Path<String>) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    if !CATEGORY_KEY_REGEX.is_match(&key) {
        return Err(AppError::BadRequest(format!(
            "Invalid category key '{}'",
            key
        )));
    }

    let category = registry::by_key(&key)
        .map(CategoryResponseDto::from)
        .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", key)))?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}
