use crate::{
    apis::{join_path, repository::DatasetRepository},
    client::AvaandmedClient,
    error::AvaandmedResult,
    models::{Dataset, Preview},
};
use std::path::Path;

const ME_ENDPOINT: &str = "/users/me";

/// User API operations
pub struct UserApi<'a> {
    client: &'a AvaandmedClient,
}

impl<'a> UserApi<'a> {
    pub fn new(client: &'a AvaandmedClient) -> Self {
        Self { client }
    }

    /// The user the API key belongs to
    pub fn me(&self) -> MeApi<'a> {
        MeApi::new(self.client)
    }
}

/// Operations on the authenticated user
pub struct MeApi<'a> {
    client: &'a AvaandmedClient,
}

impl<'a> MeApi<'a> {
    pub fn new(client: &'a AvaandmedClient) -> Self {
        Self { client }
    }

    /// Datasets owned by the authenticated user
    pub fn dataset(&self) -> UserDatasetApi<'a> {
        UserDatasetApi::new(self.client)
    }
}

/// The authenticated user's datasets
pub struct UserDatasetApi<'a> {
    repository: DatasetRepository<'a>,
}

impl<'a> UserDatasetApi<'a> {
    pub fn new(client: &'a AvaandmedClient) -> Self {
        Self {
            repository: DatasetRepository::new(client, join_path(ME_ENDPOINT, &["datasets"])),
        }
    }

    pub async fn get_by_id(&self, id: &str) -> AvaandmedResult<Dataset> {
        self.repository.get_dataset(id).await
    }

    pub async fn get_dataset_list(&self, limit: u32) -> AvaandmedResult<Vec<Dataset>> {
        self.repository.get_dataset_list(limit).await
    }

    pub async fn list(&self) -> AvaandmedResult<Vec<Dataset>> {
        self.repository.list().await
    }

    pub async fn get_file_rows_preview(&self, id: &str, file_id: &str) -> AvaandmedResult<Preview> {
        self.repository.get_file_rows_preview(id, file_id).await
    }

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
}
