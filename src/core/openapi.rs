use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::issues::{
    dtos as issues_dtos, handlers as issues_handlers, models as issues_models,
};
use crate::shared::types::Meta;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Issues
        issues_handlers::list_issues,
        issues_handlers::upload_issue,
        issues_handlers::get_issue,
        issues_handlers::update_location,
        issues_handlers::get_issue_status,
        issues_handlers::update_issue_status,
        // Categories (static reference data)
        categories_handlers::list_categories,
        categories_handlers::get_category,
    ),
    components(schemas(
        issues_dtos::IssueSummaryDto,
        issues_dtos::IssueDetailDto,
        issues_dtos::IssueStatusDto,
        issues_dtos::UpdateLocationDto,
        issues_dtos::LocationResponseDto,
        issues_dtos::UpdateStatusDto,
        issues_dtos::UploadIssueDto,
        issues_models::IssueStatus,
        issues_models::IssueSeverity,
        categories_dtos::CategoryResponseDto,
        Meta,
    )),
    tags(
        (name = "issues", description = "Community issue reports and review workflow"),
        (name = "categories", description = "Canonical category vocabulary"),
    )
)]
pub struct ApiDoc;

/// Applies the configured title/version/description to the generated doc
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
