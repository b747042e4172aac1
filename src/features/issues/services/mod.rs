mod issue_service;
mod seed_service;
mod upload_service;

pub use issue_service::IssueService;
pub use seed_service::{SeedService, PLACEHOLDER_PNG};
pub use upload_service::UploadService;
