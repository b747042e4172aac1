use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::analysis::analyzer::{ImageAnalyzer, IssueClassification};
use crate::features::issues::models::IssueSeverity;

/// Deterministic stub analyzer for development and testing.
///
/// Always returns the same classification; no external APIs are called.
pub struct MockAnalyzer;

#[async_trait]
impl ImageAnalyzer for MockAnalyzer {
    async fn analyze(&self, _image: &[u8], _content_type: &str) -> Result<IssueClassification> {
        Ok(IssueClassification {
            main_category: "Roads & Transport".to_string(),
            sub_category: "Pothole".to_string(),
            severity: IssueSeverity::High,
            risks: vec!["safety".to_string()],
            description: "Visible pothole causing unsafe driving conditions.".to_string(),
        })
    }
}
