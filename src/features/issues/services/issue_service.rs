use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::analysis::IssueClassification;
use crate::features::issues::models::{Issue, IssueStatus};
use crate::shared::types::PaginationQuery;

/// Column list shared by every query that materializes an `Issue`
const ISSUE_COLUMNS: &str = "id, image_path, main_category, sub_category, severity, risks, \
     description, latitude, longitude, status, created_at";

/// Service for issue record operations
pub struct IssueService {
    pool: SqlitePool,
}

impl IssueService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a record for a freshly stored image with placeholder
    /// classification fields and status `new`. Everything except the image
    /// path comes from the table defaults.
    pub async fn create(&self, image_path: &str) -> Result<Issue> {
        let sql = format!(
            "INSERT INTO issues (id, image_path, created_at) VALUES (?, ?, ?) \
             RETURNING {ISSUE_COLUMNS}"
        );

        let issue = sqlx::query_as::<_, Issue>(&sql)
            .bind(Uuid::new_v4())
            .bind(image_path)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create issue: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Created issue {} for image {}", issue.id, image_path);
        Ok(issue)
    }

    /// List issues, newest first
    pub async fn list(&self, pagination: &PaginationQuery) -> Result<(Vec<Issue>, i64)> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM issues")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let sql = format!(
            "SELECT {ISSUE_COLUMNS} FROM issues ORDER BY created_at DESC LIMIT ? OFFSET ?"
        );

        let issues = sqlx::query_as::<_, Issue>(&sql)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list issues: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((issues, total))
    }

    /// Get an issue by id
    pub async fn get(&self, id: Uuid) -> Result<Issue> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?");

        sqlx::query_as::<_, Issue>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("Issue {} not found", id)))
    }

    /// Apply a finished classification, and the extracted coordinates when
    /// present, as one update. Status and creation time are untouched.
    pub async fn apply_classification(
        &self,
        id: Uuid,
        classification: &IssueClassification,
        coordinates: Option<(f64, f64)>,
    ) -> Result<Issue> {
        let risks = sqlx::types::Json(classification.risks.clone());

        let issue = if let Some((latitude, longitude)) = coordinates {
            let sql = format!(
                "UPDATE issues SET main_category = ?, sub_category = ?, severity = ?, \
                 risks = ?, description = ?, latitude = ?, longitude = ? \
                 WHERE id = ? RETURNING {ISSUE_COLUMNS}"
            );
            sqlx::query_as::<_, Issue>(&sql)
                .bind(&classification.main_category)
                .bind(&classification.sub_category)
                .bind(classification.severity)
                .bind(risks)
                .bind(&classification.description)
                .bind(latitude)
                .bind(longitude)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
        } else {
            let sql = format!(
                "UPDATE issues SET main_category = ?, sub_category = ?, severity = ?, \
                 risks = ?, description = ? \
                 WHERE id = ? RETURNING {ISSUE_COLUMNS}"
            );
            sqlx::query_as::<_, Issue>(&sql)
                .bind(&classification.main_category)
                .bind(&classification.sub_category)
                .bind(classification.severity)
                .bind(risks)
                .bind(&classification.description)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
        }
        .map_err(|e| {
            tracing::error!("Failed to apply classification to issue {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Issue {} not found", id)))?;

        tracing::info!(
            "Applied classification to issue {}: {} / {}",
            id,
            issue.main_category,
            issue.sub_category
        );
        Ok(issue)
    }

    /// Overwrite both coordinates. Range validation happens at the DTO layer;
    /// both fields always travel together.
    pub async fn update_location(&self, id: Uuid, latitude: f64, longitude: f64) -> Result<Issue> {
        let sql = format!(
            "UPDATE issues SET latitude = ?, longitude = ? WHERE id = ? RETURNING {ISSUE_COLUMNS}"
        );

        let issue = sqlx::query_as::<_, Issue>(&sql)
            .bind(latitude)
            .bind(longitude)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update location of issue {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Issue {} not found", id)))?;

        tracing::info!(
            "Updated location of issue {} to ({}, {})",
            id,
            latitude,
            longitude
        );
        Ok(issue)
    }

    /// Apply a workflow transition.
    ///
    /// The check and the write are one unit: the UPDATE is keyed on the
    /// observed prior status, so a transition raced by another request
    /// matches zero rows and is rejected against the fresh state instead of
    /// applying over it.
    pub async fn update_status(&self, id: Uuid, requested: IssueStatus) -> Result<Issue> {
        let current = self.get(id).await?.status;

        if !current.can_transition_to(requested) {
            return Err(Self::transition_error(current, requested));
        }

        match self.apply_transition(id, current, requested).await? {
            Some(issue) => {
                tracing::info!("Issue {} moved {} -> {}", id, current, requested);
                Ok(issue)
            }
            None => {
                let fresh = self.get(id).await?;
                Err(Self::transition_error(fresh.status, requested))
            }
        }
    }

    /// Conditional transition write: succeeds only while the row still holds
    /// the expected prior status.
    async fn apply_transition(
        &self,
        id: Uuid,
        expected: IssueStatus,
        requested: IssueStatus,
    ) -> Result<Option<Issue>> {
        let sql = format!(
            "UPDATE issues SET status = ? WHERE id = ? AND status = ? RETURNING {ISSUE_COLUMNS}"
        );

        sqlx::query_as::<_, Issue>(&sql)
            .bind(requested)
            .bind(id)
            .bind(expected)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update status of issue {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    fn transition_error(current: IssueStatus, requested: IssueStatus) -> AppError {
        let allowed = current
            .allowed_transitions()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        AppError::BadRequest(format!(
            "Transition from '{}' to '{}' is not allowed. Allowed: {} -> [{}].",
            current, requested, current, allowed
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::issues::models::IssueSeverity;
    use crate::shared::test_helpers::test_pool;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    fn sample_classification() -> IssueClassification {
        IssueClassification {
            main_category: "Roads & Transport".to_string(),
            sub_category: "Pothole".to_string(),
            severity: IssueSeverity::High,
            risks: vec!["safety".to_string()],
            description: Sentence(3..8).fake(),
        }
    }

    #[tokio::test]
    async fn test_create_uses_placeholders() {
        let service = IssueService::new(test_pool().await);

        let issue = service.create("issues/a.png").await.unwrap();

        assert_eq!(issue.image_path, "issues/a.png");
        assert_eq!(issue.status, IssueStatus::New);
        assert_eq!(issue.severity, IssueSeverity::Low);
        assert_eq!(issue.main_category, "");
        assert_eq!(issue.sub_category, "");
        assert_eq!(issue.description, "");
        assert!(issue.risks.0.is_empty());
        assert_eq!(issue.coordinates(), None);
    }

    #[tokio::test]
    async fn test_apply_classification_round_trip() {
        let service = IssueService::new(test_pool().await);
        let issue = service.create("issues/a.png").await.unwrap();
        let classification = sample_classification();

        let updated = service
            .apply_classification(issue.id, &classification, Some((40.7128, -74.006)))
            .await
            .unwrap();

        // a later read returns exactly what the pipeline wrote
        let fetched = service.get(issue.id).await.unwrap();
        for current in [&updated, &fetched] {
            assert_eq!(current.main_category, classification.main_category);
            assert_eq!(current.sub_category, classification.sub_category);
            assert_eq!(current.severity, classification.severity);
            assert_eq!(current.risks.0, classification.risks);
            assert_eq!(current.description, classification.description);
            assert_eq!(current.coordinates(), Some((40.7128, -74.006)));
        }
        // classification does not touch the workflow or creation time
        assert_eq!(fetched.status, IssueStatus::New);
        assert_eq!(fetched.created_at, issue.created_at);
    }

    #[tokio::test]
    async fn test_apply_classification_without_coordinates() {
        let service = IssueService::new(test_pool().await);
        let issue = service.create("issues/a.png").await.unwrap();

        let updated = service
            .apply_classification(issue.id, &sample_classification(), None)
            .await
            .unwrap();

        assert_eq!(updated.coordinates(), None);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let service = IssueService::new(test_pool().await);
        let result = service.get(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_counts() {
        let service = IssueService::new(test_pool().await);
        let first = service.create("issues/1.png").await.unwrap();
        let second = service.create("issues/2.png").await.unwrap();

        let (issues, total) = service.list(&PaginationQuery::default()).await.unwrap();

        assert_eq!(total, 2);
        assert_eq!(issues[0].id, second.id);
        assert_eq!(issues[1].id, first.id);
    }

    #[tokio::test]
    async fn test_update_location_overwrites_both() {
        let service = IssueService::new(test_pool().await);
        let issue = service.create("issues/a.png").await.unwrap();

        let updated = service
            .update_location(issue.id, -33.8688, 151.2093)
            .await
            .unwrap();

        assert_eq!(updated.coordinates(), Some((-33.8688, 151.2093)));
        // location correction leaves classification and status alone
        assert_eq!(updated.status, IssueStatus::New);
        assert_eq!(updated.main_category, "");
    }

    #[tokio::test]
    async fn test_status_walks_the_workflow() {
        let service = IssueService::new(test_pool().await);
        let issue = service.create("issues/a.png").await.unwrap();

        let reviewed = service
            .update_status(issue.id, IssueStatus::Review)
            .await
            .unwrap();
        assert_eq!(reviewed.status, IssueStatus::Review);

        let fixed = service
            .update_status(issue.id, IssueStatus::Fixed)
            .await
            .unwrap();
        assert_eq!(fixed.status, IssueStatus::Fixed);
    }

    #[tokio::test]
    async fn test_skipping_a_state_is_rejected_and_not_applied() {
        let service = IssueService::new(test_pool().await);
        let issue = service.create("issues/a.png").await.unwrap();

        let result = service.update_status(issue.id, IssueStatus::Fixed).await;

        match result {
            Err(AppError::BadRequest(msg)) => {
                assert!(msg.contains("'new'"));
                assert!(msg.contains("'fixed'"));
                assert!(msg.contains("[review]"));
            }
            other => panic!("expected BadRequest, got {:?}", other.map(|i| i.status)),
        }

        assert_eq!(service.get(issue.id).await.unwrap().status, IssueStatus::New);
    }

    #[tokio::test]
    async fn test_fixed_is_terminal() {
        let service = IssueService::new(test_pool().await);
        let issue = service.create("issues/a.png").await.unwrap();
        service.update_status(issue.id, IssueStatus::Review).await.unwrap();
        service.update_status(issue.id, IssueStatus::Fixed).await.unwrap();

        let result = service.update_status(issue.id, IssueStatus::Review).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_stale_transition_matches_no_rows() {
        let service = IssueService::new(test_pool().await);
        let issue = service.create("issues/a.png").await.unwrap();

        // first writer wins
        let applied = service
            .apply_transition(issue.id, IssueStatus::New, IssueStatus::Review)
            .await
            .unwrap();
        assert!(applied.is_some());

        // a second writer that still observed 'new' loses
        let stale = service
            .apply_transition(issue.id, IssueStatus::New, IssueStatus::Review)
            .await
            .unwrap();
        assert!(stale.is_none());
        assert_eq!(
            service.get(issue.id).await.unwrap().status,
            IssueStatus::Review
        );
    }

    #[tokio::test]
    async fn test_status_update_on_unknown_id_is_not_found() {
        let service = IssueService::new(test_pool().await);
        let result = service.update_status(Uuid::new_v4(), IssueStatus::Review).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
