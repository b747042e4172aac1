mod issue;

pub use issue::{Issue, IssueSeverity, IssueStatus};
