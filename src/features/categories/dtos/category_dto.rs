use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::categories::registry::Category;

/// Response DTO for a canonical category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub key: String,
    pub label: String,
    pub description: String,
}

impl From<&Category> for CategoryResponseDto {
    fn from(c: &Category) -> Self {
        Self {
            key: c.key.to_string(),
            label: c.label.to_string(),
            description: c.description.to_string(),
        }
    }
}
