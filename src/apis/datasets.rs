use crate::{
    apis::{repository::DatasetRepository, validate_description, validate_rating},
    client::{AvaandmedClient, HttpMethod},
    error::AvaandmedResult,
    models::{Dataset, FileColumn, InquiryRequest, Preview, RatingRequest, SearchResult},
};
use log::{debug, info};
use std::path::Path;

const ENDPOINT: &str = "/datasets";

/// Public dataset operations
pub struct DatasetApi<'a> {
    repository: DatasetRepository<'a>,
}

impl<'a> DatasetApi<'a> {
    pub fn new(client: &'a AvaandmedClient) -> Self {
        Self {
            repository: DatasetRepository::new(client, ENDPOINT),
        }
    }

    fn client(&self) -> &'a AvaandmedClient {
        self.repository.client()
    }

    /// Get a dataset by id
    pub async fn get_by_id(&self, id: &str) -> AvaandmedResult<Dataset> {
        self.repository.get_dataset(id).await
    }

    /// Get a dataset by slug
    pub async fn get_by_slug(&self, slug: &str) -> AvaandmedResult<Dataset> {
        self.repository.get_dataset_by_slug(slug).await
    }

    /// List datasets
    ///
    /// # Arguments
    /// * `limit` - Maximum number of datasets, must be positive
    pub async fn get_dataset_list(&self, limit: u32) -> AvaandmedResult<Vec<Dataset>> {
        self.repository.get_dataset_list(limit).await
    }

    /// List datasets with the default page size
    pub async fn list(&self) -> AvaandmedResult<Vec<Dataset>> {
        self.repository.list().await
    }

    /// Total number of datasets currently published
    pub async fn get_total(&self) -> AvaandmedResult<u64> {
        let path = self.repository.path(&["total"]);
        debug!("HTTP GET {}", path);

        self.client().request(HttpMethod::Get, &path).await
    }

    /// Distinct mimetypes of the files known to the portal
    pub async fn get_distinct_mimetypes(&self) -> AvaandmedResult<Vec<String>> {
        let path = self.repository.path(&["mimetypes", "distinct"]);
        debug!("HTTP GET {}", path);

        self.client().request(HttpMethod::Get, &path).await
    }

    /// Preview file rows the way the portal shows them
    pub async fn get_file_rows_preview(&self, id: &str, file_id: &str) -> AvaandmedResult<Preview> {
        self.repository.get_file_rows_preview(id, file_id).await
    }

    /// Page through the content of a processed file
    pub async fn paginate_file_by_id(&self, id: &str, file_id: &str) -> AvaandmedResult<Preview> {
        self.repository.paginate_file(id, file_id).await
    }

    /// Column descriptions of a dataset file
    pub async fn get_file_columns(
        &self,
        id: &str,
        file_id: &str,
    ) -> AvaandmedResult<Vec<FileColumn>> {
        self.repository.get_file_columns(id, file_id).await
    }

    /// Download a processed file
    ///
    /// # Arguments
    /// * `id` - Dataset id
    /// * `file_id` - File id
    /// * `out_file` - Destination path, must not be empty
    pub async fn download_file(
        &self,
        id: &str,
        file_id: &str,
        out_file: impl AsRef<Path>,
    ) -> AvaandmedResult<i32> {
        self.repository
            .download_file(id, file_id, out_file.as_ref())
            .await
    }

    /// Report a privacy violation in a dataset
    ///
    /// # Arguments
    /// * `id` - Dataset id
    /// * `description` - 20 to 1000 characters
    pub async fn file_privacy_violation(&self, id: &str, description: &str) -> AvaandmedResult<()> {
        validate_description(description)?;
        info!("Reporting privacy violation for dataset {}", id);
        let path = self.repository.path(&["privacy-violations"]);
        let body = InquiryRequest {
            dataset_id: id.to_string(),
            description: description.to_string(),
        };

        self.client()
            .request_ack_with_body(HttpMethod::Post, &path, &body)
            .await
    }

    /// Ask for additional access to a dataset
    ///
    /// # Arguments
    /// * `id` - Dataset id
    /// * `description` - 20 to 1000 characters
    pub async fn apply_for_access(&self, id: &str, description: &str) -> AvaandmedResult<()> {
        validate_description(description)?;
        info!("Applying for access to dataset {}", id);
        let path = self.repository.path(&["access-permissions"]);
        let body = InquiryRequest {
            dataset_id: id.to_string(),
            description: description.to_string(),
        };

        self.client()
            .request_ack_with_body(HttpMethod::Post, &path, &body)
            .await
    }

    /// Rate a dataset
    ///
    /// # Arguments
    /// * `id` - Dataset id
    /// * `quality_rating` - 0 to 10
    /// * `metadata_rating` - 0 to 10
    pub async fn rate_dataset(
        &self,
        id: &str,
        quality_rating: u8,
        metadata_rating: u8,
    ) -> AvaandmedResult<()> {
        validate_rating(quality_rating, metadata_rating)?;
        info!("Rating dataset {}", id);
        let path = self.repository.path(&["rating"]);
        let body = RatingRequest {
            dataset_id: id.to_string(),
            quality_rating,
            metadata_rating,
        };

        self.client()
            .request_ack_with_body(HttpMethod::Post, &path, &body)
            .await
    }

    /// Rating summary of a dataset
    pub async fn get_dataset_rating_by_slug(&self, slug: &str) -> AvaandmedResult<serde_json::Value> {
        let path = self.repository.path(&["rating", slug]);
        debug!("HTTP GET {}", path);

        self.client().request(HttpMethod::Get, &path).await
    }

    /// Search datasets by keyword, region and year
    pub async fn search(
        &self,
        keyword_id: u64,
        region_id: u64,
        year: i32,
    ) -> AvaandmedResult<Vec<SearchResult>> {
        info!(
            "Searching datasets: keyword={} region={} year={}",
            keyword_id, region_id, year
        );
        let path = format!(
            "{}?keywordIds={}&regionIds={}&year={}",
            self.repository.path(&["search"]),
            keyword_id,
            region_id,
            year
        );

        self.client().request(HttpMethod::Get, &path).await
    }
}
