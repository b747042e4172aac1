mod analyzer;
mod mock;
mod vision;

pub use analyzer::{ImageAnalyzer, IssueClassification};
pub use mock::MockAnalyzer;
pub use vision::VisionAnalyzer;
