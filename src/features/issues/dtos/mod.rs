mod issue_dto;

pub use issue_dto::{
    IssueDetailDto, IssueStatusDto, IssueSummaryDto, LocationResponseDto, UpdateLocationDto,
    UpdateStatusDto, UploadIssueDto,
};
