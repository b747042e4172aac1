//! Demo seeding: a handful of plausible issues for development and demos.
//!
//! Runs at startup when `SEED_DEMO_DATA=true`, and only against an empty
//! table, so it never touches real data.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::categories::registry::MAIN_CATEGORIES;
use crate::features::issues::models::{IssueSeverity, IssueStatus};
use crate::modules::storage::LocalImageStore;

/// Minimal valid 1x1 PNG used as the placeholder photo for seeded issues
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00,
    0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0x64, 0x60, 0xF8, 0x5F,
    0x0F, 0x00, 0x02, 0x87, 0x01, 0x80, 0xEB, 0x47, 0xBA, 0x92, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

struct SeedIssue {
    category_index: usize,
    sub_category: &'static str,
    severity: IssueSeverity,
    status: IssueStatus,
    coordinates: Option<(f64, f64)>,
}

const SEED_DATA: &[SeedIssue] = &[
    SeedIssue {
        category_index: 0,
        sub_category: "Pothole",
        severity: IssueSeverity::High,
        status: IssueStatus::New,
        coordinates: Some((40.7128, -74.0060)),
    },
    SeedIssue {
        category_index: 1,
        sub_category: "Leaking pipe",
        severity: IssueSeverity::Medium,
        status: IssueStatus::Review,
        coordinates: Some((34.0522, -118.2437)),
    },
    SeedIssue {
        category_index: 2,
        sub_category: "Dumped waste",
        severity: IssueSeverity::High,
        status: IssueStatus::New,
        coordinates: None,
    },
    SeedIssue {
        category_index: 3,
        sub_category: "Broken bench",
        severity: IssueSeverity::Low,
        status: IssueStatus::Fixed,
        coordinates: Some((51.5074, -0.1278)),
    },
    SeedIssue {
        category_index: 4,
        sub_category: "Exposed wiring",
        severity: IssueSeverity::High,
        status: IssueStatus::Review,
        coordinates: None,
    },
    SeedIssue {
        category_index: 5,
        sub_category: "Structural crack",
        severity: IssueSeverity::Medium,
        status: IssueStatus::New,
        coordinates: Some((48.8566, 2.3522)),
    },
    SeedIssue {
        category_index: 6,
        sub_category: "Missing ramp",
        severity: IssueSeverity::Medium,
        status: IssueStatus::New,
        coordinates: None,
    },
    SeedIssue {
        category_index: 7,
        sub_category: "Uncategorized",
        severity: IssueSeverity::Low,
        status: IssueStatus::New,
        coordinates: Some((-33.8688, 151.2093)),
    },
    SeedIssue {
        category_index: 0,
        sub_category: "Cracked pavement",
        severity: IssueSeverity::Low,
        status: IssueStatus::Fixed,
        coordinates: Some((35.6762, 139.6503)),
    },
    SeedIssue {
        category_index: 2,
        sub_category: "Overflowing bin",
        severity: IssueSeverity::Medium,
        status: IssueStatus::Review,
        coordinates: None,
    },
];

pub struct SeedService {
    pool: SqlitePool,
    store: Arc<LocalImageStore>,
}

impl SeedService {
    pub fn new(pool: SqlitePool, store: Arc<LocalImageStore>) -> Self {
        Self { pool, store }
    }

    /// Insert the demo issues. Returns how many were created; zero when the
    /// table already has data.
    pub async fn run(&self) -> Result<usize> {
        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM issues")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if existing > 0 {
            tracing::info!("Skipping demo seed: {} issue(s) already present", existing);
            return Ok(0);
        }

        let mut created = 0;
        for seed in SEED_DATA {
            let category = &MAIN_CATEGORIES[seed.category_index];
            let image_path = self.store.save(PLACEHOLDER_PNG, "image/png")?;

            let risks = if seed.severity == IssueSeverity::High {
                sqlx::types::Json(vec!["safety".to_string()])
            } else {
                sqlx::types::Json(Vec::new())
            };

            sqlx::query(
                "INSERT INTO issues (id, image_path, main_category, sub_category, severity, \
                 risks, description, latitude, longitude, status, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(uuid::Uuid::new_v4())
            .bind(&image_path)
            .bind(category.label)
            .bind(seed.sub_category)
            .bind(seed.severity)
            .bind(risks)
            .bind(format!("Seed issue: {}.", seed.sub_category))
            .bind(seed.coordinates.map(|c| c.0))
            .bind(seed.coordinates.map(|c| c.1))
            .bind(seed.status)
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert seed issue: {:?}", e);
                AppError::Database(e)
            })?;

            created += 1;
        }

        tracing::info!("Seeded {} demo issue(s)", created);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::issues::services::IssueService;
    use crate::shared::test_helpers::{test_image_store, test_pool};
    use crate::shared::types::PaginationQuery;

    #[tokio::test]
    async fn test_seed_creates_ten_issues() {
        let pool = test_pool().await;
        let (store, _dir) = test_image_store();
        let seed = SeedService::new(pool.clone(), Arc::new(store));

        assert_eq!(seed.run().await.unwrap(), 10);

        let query = PaginationQuery {
            page: 1,
            page_size: 100,
        };
        let (issues, total) = IssueService::new(pool).list(&query).await.unwrap();
        assert_eq!(total, 10);
        // every seeded category is canonical, coordinates travel in pairs
        for issue in issues {
            assert!(crate::features::categories::registry::is_canonical_label(
                &issue.main_category
            ));
            assert_eq!(issue.latitude.is_some(), issue.longitude.is_some());
        }
    }

    #[tokio::test]
    async fn test_seed_skips_non_empty_table() {
        let pool = test_pool().await;
        let (store, _dir) = test_image_store();
        let seed = SeedService::new(pool.clone(), Arc::new(store));

        IssueService::new(pool)
            .create("issues/existing.png")
            .await
            .unwrap();

        assert_eq!(seed.run().await.unwrap(), 0);
    }
}
