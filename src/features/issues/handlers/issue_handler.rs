use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::issues::dtos::{
    IssueDetailDto, IssueStatusDto, IssueSummaryDto, LocationResponseDto, UpdateLocationDto,
    UpdateStatusDto, UploadIssueDto,
};
use crate::features::issues::services::{IssueService, UploadService};
use crate::modules::storage::LocalImageStore;
use crate::shared::constants::{is_image_mime_type_allowed, ALLOWED_IMAGE_MIME_TYPES, MAX_IMAGE_SIZE};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// State for issue handlers
#[derive(Clone)]
pub struct IssueState {
    pub issue_service: Arc<IssueService>,
    pub upload_service: Arc<UploadService>,
    pub store: Arc<LocalImageStore>,
}

/// List issues, newest first
#[utoipa::path(
    get,
    path = "/api/issues",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of issues", body = ApiResponse<Vec<IssueSummaryDto>>)
    ),
    tag = "issues"
)]
pub async fn list_issues(
    State(state): State<IssueState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<IssueSummaryDto>>>> {
    let (issues, total) = state.issue_service.list(&pagination).await?;
    let dtos: Vec<IssueSummaryDto> = issues
        .iter()
        .map(|issue| IssueSummaryDto::from_issue(issue, &state.store))
        .collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Upload an issue photo and run the classification pipeline
#[utoipa::path(
    post,
    path = "/api/issues",
    request_body(
        content = UploadIssueDto,
        content_type = "multipart/form-data",
        description = "Photo of the issue"
    ),
    responses(
        (status = 201, description = "Issue created", body = ApiResponse<IssueSummaryDto>),
        (status = 400, description = "Missing or invalid image"),
        (status = 502, description = "Classification provider failed")
    ),
    tag = "issues"
)]
pub async fn upload_issue(
    State(state): State<IssueState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<IssueSummaryDto>>)> {
    let mut image_data: Option<Vec<u8>> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "image" {
            let ct = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let data = field.bytes().await.map_err(|e| {
                debug!("Failed to read image bytes: {}", e);
                AppError::BadRequest(format!("Failed to read image data: {}", e))
            })?;

            image_data = Some(data.to_vec());
            content_type = Some(ct);
        } else {
            debug!("Ignoring unknown field: {}", field_name);
        }
    }

    let image_data = image_data
        .ok_or_else(|| AppError::Validation("image: this field is required".to_string()))?;

    if image_data.is_empty() {
        return Err(AppError::Validation(
            "image: the submitted file is empty".to_string(),
        ));
    }

    if image_data.len() > MAX_IMAGE_SIZE {
        return Err(AppError::Validation(format!(
            "image: file too large, maximum size is {} bytes",
            MAX_IMAGE_SIZE
        )));
    }

    let content_type = content_type.unwrap_or_default();
    if !is_image_mime_type_allowed(&content_type) {
        return Err(AppError::Validation(format!(
            "image: type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_IMAGE_MIME_TYPES.join(", ")
        )));
    }

    let issue = state
        .upload_service
        .process_upload(&image_data, &content_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(IssueSummaryDto::from_issue(&issue, &state.store)),
            None,
            None,
        )),
    ))
}

/// Get the full record for one issue
#[utoipa::path(
    get,
    path = "/api/issues/{id}",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    responses(
        (status = 200, description = "Issue found", body = ApiResponse<IssueDetailDto>),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues"
)]
pub async fn get_issue(
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IssueDetailDto>>> {
    let issue = state.issue_service.get(id).await?;
    let dto = IssueDetailDto::from_issue(issue, &state.store);
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Correct an issue's coordinates
#[utoipa::path(
    patch,
    path = "/api/issues/{id}/location",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    request_body = UpdateLocationDto,
    responses(
        (status = 200, description = "Location updated", body = ApiResponse<LocationResponseDto>),
        (status = 400, description = "Missing, non-numeric or out-of-range coordinates"),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues"
)]
pub async fn update_location(
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateLocationDto>,
) -> Result<Json<ApiResponse<LocationResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let issue = state
        .issue_service
        .update_location(id, dto.latitude, dto.longitude)
        .await?;

    let response = LocationResponseDto {
        latitude: issue.latitude.unwrap_or(dto.latitude),
        longitude: issue.longitude.unwrap_or(dto.longitude),
    };
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Read an issue's workflow status
#[utoipa::path(
    get,
    path = "/api/issues/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    responses(
        (status = 200, description = "Current status", body = ApiResponse<IssueStatusDto>),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues"
)]
pub async fn get_issue_status(
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IssueStatusDto>>> {
    let issue = state.issue_service.get(id).await?;
    Ok(Json(ApiResponse::success(
        Some(IssueStatusDto::from(issue)),
        None,
        None,
    )))
}

/// Apply a workflow transition
#[utoipa::path(
    patch,
    path = "/api/issues/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Issue ID")
    ),
    request_body = UpdateStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<IssueStatusDto>),
        (status = 400, description = "Invalid transition or malformed status"),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues"
)]
pub async fn update_issue_status(
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateStatusDto>,
) -> Result<Json<ApiResponse<IssueStatusDto>>> {
    let issue = state.issue_service.update_status(id, dto.status).await?;
    Ok(Json(ApiResponse::success(
        Some(IssueStatusDto::from(issue)),
        None,
        None,
    )))
}
