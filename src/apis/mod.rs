pub mod datasets;
pub mod organizations;
mod repository;
pub mod users;

// Re-export all APIs
pub use datasets::DatasetApi;
pub use organizations::{MyOrganizationApi, OrganizationApi, OrganizationDatasetApi};
pub use users::{MeApi, UserApi, UserDatasetApi};

use crate::error::{AvaandmedError, AvaandmedResult};

/// Accepted length of privacy-violation and access-request descriptions, in characters
pub const DESCRIPTION_LEN: std::ops::RangeInclusive<usize> = 20..=1000;

/// Page size used by `list()` on the dataset collections
pub const DEFAULT_LIST_LIMIT: u32 = 20;

/// Highest accepted quality or metadata rating
pub const MAX_RATING: u8 = 10;

/// Build `{base}/{segment}/...` with every segment percent-encoded
pub(crate) fn join_path(base: &str, segments: &[&str]) -> String {
    segments.iter().fold(base.to_string(), |mut path, segment| {
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
        path
    })
}

pub(crate) fn validate_description(description: &str) -> AvaandmedResult<()> {
    if !DESCRIPTION_LEN.contains(&description.chars().count()) {
        return Err(AvaandmedError::invalid_param(format!(
            "Description must be at least {} characters long, but no longer than {}.",
            DESCRIPTION_LEN.start(),
            DESCRIPTION_LEN.end()
        )));
    }
    Ok(())
}

pub(crate) fn validate_rating(quality_rating: u8, metadata_rating: u8) -> AvaandmedResult<()> {
    if quality_rating > MAX_RATING || metadata_rating > MAX_RATING {
        return Err(AvaandmedError::invalid_param(format!(
            "Rating must be from 0 to {}.",
            MAX_RATING
        )));
    }
    Ok(())
}

pub(crate) fn validate_limit(limit: u32) -> AvaandmedResult<()> {
    if limit == 0 {
        return Err(AvaandmedError::invalid_param("Limit cannot be 0 or less."));
    }
    Ok(())
}
