use crate::{
    apis::{join_path, validate_limit, DEFAULT_LIST_LIMIT},
    client::{AvaandmedClient, HttpMethod},
    error::AvaandmedResult,
    models::{Dataset, FileColumn, Preview},
};
use log::{debug, info};
use std::path::Path;

/// Dataset operations shared by every collection rooted at a datasets endpoint
pub(crate) struct DatasetRepository<'a> {
    client: &'a AvaandmedClient,
    base: String,
}

impl<'a> DatasetRepository<'a> {
    pub(crate) fn new(client: &'a AvaandmedClient, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
        }
    }

    pub(crate) fn client(&self) -> &'a AvaandmedClient {
        self.client
    }

    pub(crate) fn base(&self) -> &str {
        &self.base
    }

    /// `{base}/{segments...}`
    pub(crate) fn path(&self, segments: &[&str]) -> String {
        join_path(&self.base, segments)
    }

    pub(crate) async fn get_dataset(&self, id: &str) -> AvaandmedResult<Dataset> {
        info!("Getting dataset {}", id);
        let path = self.path(&[id]);
        debug!("HTTP GET {}", path);

        self.client.request(HttpMethod::Get, &path).await
    }

    pub(crate) async fn get_dataset_by_slug(&self, slug: &str) -> AvaandmedResult<Dataset> {
        info!("Getting dataset by slug {}", slug);
        let path = self.path(&["slug", slug]);
        debug!("HTTP GET {}", path);

        self.client.request(HttpMethod::Get, &path).await
    }

    pub(crate) async fn get_dataset_list(&self, limit: u32) -> AvaandmedResult<Vec<Dataset>> {
        validate_limit(limit)?;
        info!("Listing up to {} datasets from {}", limit, self.base);
        let path = format!("{}?limit={}", self.base, limit);

        self.client.request(HttpMethod::Get, &path).await
    }

    pub(crate) async fn list(&self) -> AvaandmedResult<Vec<Dataset>> {
        self.get_dataset_list(DEFAULT_LIST_LIMIT).await
    }

    pub(crate) async fn get_file_rows_preview(
        &self,
        id: &str,
        file_id: &str,
    ) -> AvaandmedResult<Preview> {
        let path = self.path(&[id, "files", file_id, "preview"]);
        debug!("HTTP GET {}", path);

        self.client.request(HttpMethod::Get, &path).await
    }

    pub(crate) async fn paginate_file(&self, id: &str, file_id: &str) -> AvaandmedResult<Preview> {
        let path = self.path(&[id, "files", file_id]);
        debug!("HTTP GET {}", path);

        self.client.request(HttpMethod::Get, &path).await
    }

    pub(crate) async fn get_file_columns(
        &self,
        id: &str,
        file_id: &str,
    ) -> AvaandmedResult<Vec<FileColumn>> {
        let path = self.path(&[id, "files", file_id, "columns"]);
        debug!("HTTP GET {}", path);

        self.client.request(HttpMethod::Get, &path).await
    }

    pub(crate) async fn download_file(
        &self,
        id: &str,
        file_id: &str,
        out_file: &Path,
    ) -> AvaandmedResult<i32> {
        let path = self.path(&[id, "files", file_id, "download"]);
        self.client.download(&path, out_file).await
    }
}
