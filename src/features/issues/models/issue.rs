use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Review workflow status of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    New,
    Review,
    Fixed,
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueStatus::New => write!(f, "new"),
            IssueStatus::Review => write!(f, "review"),
            IssueStatus::Fixed => write!(f, "fixed"),
        }
    }
}

impl IssueStatus {
    /// The status transition table: each state maps to the full set of states
    /// it may move to. `fixed` is terminal.
    pub fn allowed_transitions(self) -> &'static [IssueStatus] {
        match self {
            IssueStatus::New => &[IssueStatus::Review],
            IssueStatus::Review => &[IssueStatus::Fixed],
            IssueStatus::Fixed => &[],
        }
    }

    /// Whether moving from `self` to `target` is allowed
    pub fn can_transition_to(self, target: IssueStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }
}

/// Severity assigned by the image analyzer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, JsonSchema,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueSeverity::Low => write!(f, "low"),
            IssueSeverity::Medium => write!(f, "medium"),
            IssueSeverity::High => write!(f, "high"),
        }
    }
}

/// Database model for a community-reported issue
#[derive(Debug, Clone, FromRow)]
pub struct Issue {
    pub id: Uuid,
    pub image_path: String,
    pub main_category: String,
    pub sub_category: String,
    pub severity: IssueSeverity,
    pub risks: Json<Vec<String>>,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
}

impl Issue {
    /// Coordinates as a pair; present only when both fields are set
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use IssueStatus::{Fixed, New, Review};

    #[test]
    fn test_transition_table_all_nine_pairs() {
        let expectations = [
            (New, New, false),
            (New, Review, true),
            (New, Fixed, false),
            (Review, New, false),
            (Review, Review, false),
            (Review, Fixed, true),
            (Fixed, New, false),
            (Fixed, Review, false),
            (Fixed, Fixed, false),
        ];

        for (from, to, allowed) in expectations {
            assert_eq!(
                from.can_transition_to(to),
                allowed,
                "transition {} -> {}",
                from,
                to
            );
        }
    }

    #[test]
    fn test_fixed_is_terminal() {
        assert!(Fixed.allowed_transitions().is_empty());
    }

    #[test]
    fn test_status_serde_round_trip() {
        let json = serde_json::to_string(&Review).unwrap();
        assert_eq!(json, "\"review\"");
        let status: IssueStatus = serde_json::from_str("\"fixed\"").unwrap();
        assert_eq!(status, Fixed);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(serde_json::from_str::<IssueStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_severity_serde_matches_display() {
        for severity in [IssueSeverity::Low, IssueSeverity::Medium, IssueSeverity::High] {
            let json = serde_json::to_string(&severity).unwrap();
            assert_eq!(json, format!("\"{}\"", severity));
        }
    }
}
