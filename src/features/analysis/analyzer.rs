use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::issues::models::IssueSeverity;

/// Structured classification of one uploaded issue photo.
///
/// `main_category` is always one of the canonical registry labels.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueClassification {
    pub main_category: String,
    pub sub_category: String,
    pub severity: IssueSeverity,
    pub risks: Vec<String>,
    pub description: String,
}

/// The single capability a classification provider has to implement.
///
/// Implementations must either return a complete classification or an error;
/// there is no partial result and no silent fallback. The caller (the upload
/// pipeline) decides what a failure means.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, image: &[u8], content_type: &str) -> Result<IssueClassification>;
}
