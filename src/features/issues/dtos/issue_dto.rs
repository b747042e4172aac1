use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::issues::models::{Issue, IssueSeverity, IssueStatus};
use crate::modules::storage::LocalImageStore;

/// Summary returned by the list and upload endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueSummaryDto {
    pub id: Uuid,
    pub image_url: String,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl IssueSummaryDto {
    pub fn from_issue(issue: &Issue, store: &LocalImageStore) -> Self {
        // coordinates are a pair or nothing
        let (latitude, longitude) = match issue.coordinates() {
            Some((lat, lon)) => (Some(lat), Some(lon)),
            None => (None, None),
        };

        Self {
            id: issue.id,
            image_url: store.public_url(&issue.image_path),
            status: issue.status,
            created_at: issue.created_at,
            latitude,
            longitude,
        }
    }
}

/// Full record returned by the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueDetailDto {
    pub id: Uuid,
    pub image_url: String,
    pub main_category: String,
    pub sub_category: String,
    pub severity: IssueSeverity,
    pub risks: Vec<String>,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
}

impl IssueDetailDto {
    pub fn from_issue(issue: Issue, store: &LocalImageStore) -> Self {
        Self {
            id: issue.id,
            image_url: store.public_url(&issue.image_path),
            main_category: issue.main_category,
            sub_category: issue.sub_category,
            severity: issue.severity,
            risks: issue.risks.0,
            description: issue.description,
            latitude: issue.latitude,
            longitude: issue.longitude,
            status: issue.status,
            created_at: issue.created_at,
        }
    }
}

/// Status view: current workflow state plus the immutable creation time
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueStatusDto {
    pub id: Uuid,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Issue> for IssueStatusDto {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id,
            status: issue.status,
            created_at: issue.created_at,
        }
    }
}

/// Upload request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadIssueDto {
    /// Photo of the issue
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
}

/// Request DTO for correcting an issue's coordinates.
/// Both fields are required together; ranges are decimal degrees.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateLocationDto {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "longitude must be between -180 and 180"
    ))]
    pub longitude: f64,
}

/// Response DTO for the location update
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationResponseDto {
    pub latitude: f64,
    pub longitude: f64,
}

/// Request DTO for a status transition
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusDto {
    pub status: IssueStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_location_dto_accepts_valid_ranges() {
        let dto = UpdateLocationDto {
            latitude: 40.7128,
            longitude: -74.006,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_location_dto_rejects_out_of_range_latitude() {
        let dto = UpdateLocationDto {
            latitude: 1000.0,
            longitude: 0.0,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("latitude"));
    }

    #[test]
    fn test_location_dto_rejects_out_of_range_longitude() {
        let dto = UpdateLocationDto {
            latitude: 0.0,
            longitude: -180.5,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_location_dto_requires_both_fields() {
        // longitude absent: rejected at deserialization, before validation
        let result = serde_json::from_str::<UpdateLocationDto>(r#"{"latitude": 10.0}"#);
        assert!(result.is_err());
    }
}
