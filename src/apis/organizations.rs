use crate::{
    apis::{join_path, repository::DatasetRepository},
    client::{AvaandmedClient, HttpMethod},
    error::AvaandmedResult,
    models::{
        AccessPermission, Dataset, DatasetMetadata, DatasetRating, File, FileErrors,
        FileIndicesRequest, Index, Organization, Preview, PrivacyViolation,
    },
};
use log::{debug, info};
use serde::Serialize;
use std::path::Path;

const MY_ORGANIZATIONS_ENDPOINT: &str = "/organizations/my-organizations";

/// Organization API operations
pub struct OrganizationApi<'a> {
    client: &'a AvaandmedClient,
}

impl<'a> OrganizationApi<'a> {
    pub fn new(client: &'a AvaandmedClient) -> Self {
        Self { client }
    }

    /// Organizations the authenticated key belongs to
    pub fn my_organization(&self) -> MyOrganizationApi<'a> {
        MyOrganizationApi::new(self.client)
    }
}

/// Operations on the caller's own organizations
pub struct MyOrganizationApi<'a> {
    client: &'a AvaandmedClient,
}

impl<'a> MyOrganizationApi<'a> {
    pub fn new(client: &'a AvaandmedClient) -> Self {
        Self { client }
    }

    /// List the organizations of the authenticated user
    pub async fn get_list_my_orgs(&self) -> AvaandmedResult<Vec<Organization>> {
        info!("Listing my organizations");
        debug!("HTTP GET {}", MY_ORGANIZATIONS_ENDPOINT);

        self.client
            .request(HttpMethod::Get, MY_ORGANIZATIONS_ENDPOINT)
            .await
    }

    /// Get one of the user's organizations
    pub async fn get_my_org_by_id(&self, org_id: &str) -> AvaandmedResult<Organization> {
        info!("Getting my organization {}", org_id);
        let path = join_path(MY_ORGANIZATIONS_ENDPOINT, &[org_id]);
        debug!("HTTP GET {}", path);

        self.client.request(HttpMethod::Get, &path).await
    }

    /// Datasets managed by the organization `org_id`
    pub fn dataset(&self, org_id: &str) -> OrganizationDatasetApi<'a> {
        OrganizationDatasetApi::new(self.client, org_id)
    }
}

/// Dataset management for one organization
pub struct OrganizationDatasetApi<'a> {
    repository: DatasetRepository<'a>,
}

impl<'a> OrganizationDatasetApi<'a> {
    pub fn new(client: &'a AvaandmedClient, org_id: &str) -> Self {
        let base = join_path(MY_ORGANIZATIONS_ENDPOINT, &[org_id, "datasets"]);
        Self {
            repository: DatasetRepository::new(client, base),
        }
    }

    fn client(&self) -> &'a AvaandmedClient {
        self.repository.client()
    }

    async fn get<T>(&self, segments: &[&str]) -> AvaandmedResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let path = self.repository.path(segments);
        debug!("HTTP GET {}", path);
        self.client().request(HttpMethod::Get, &path).await
    }

    async fn ack(&self, method: HttpMethod, segments: &[&str]) -> AvaandmedResult<()> {
        let path = self.repository.path(segments);
        debug!("HTTP {} {}", method, path);
        self.client().request_ack(method, &path).await
    }

    pub async fn get_by_id(&self, id: &str) -> AvaandmedResult<Dataset> {
        self.repository.get_dataset(id).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> AvaandmedResult<Dataset> {
        self.repository.get_dataset_by_slug(slug).await
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

    /// Create a dataset from metadata; the new dataset is returned
    pub async fn create_dataset_metadata(
        &self,
        metadata: &DatasetMetadata,
    ) -> AvaandmedResult<Dataset> {
        info!("Creating dataset {:?}", metadata.name_en);
        debug!("HTTP POST {}", self.repository.base());

        self.client()
            .request_with_body(HttpMethod::Post, self.repository.base(), metadata)
            .await
    }

    /// Update dataset fields
    ///
    /// # Arguments
    /// * `id` - Dataset id
    /// * `fields` - Partial dataset in camelCase, e.g. `{"maintainerEmail": "..."}`
    pub async fn update<B>(&self, id: &str, fields: &B) -> AvaandmedResult<()>
    where
        B: Serialize + ?Sized,
    {
        info!("Updating dataset {}", id);
        let path = self.repository.path(&[id]);
        debug!("HTTP PUT {}", path);

        self.client()
            .request_ack_with_body(HttpMethod::Put, &path, fields)
            .await
    }

    pub async fn delete(&self, id: &str) -> AvaandmedResult<()> {
        info!("Deleting dataset {}", id);
        self.ack(HttpMethod::Delete, &[id]).await
    }

    /// Discard unpublished changes
    pub async fn discard(&self, id: &str) -> AvaandmedResult<()> {
        info!("Discarding dataset {}", id);
        self.ack(HttpMethod::Put, &[id, "discard"]).await
    }

    pub async fn publish(&self, id: &str) -> AvaandmedResult<()> {
        info!("Publishing dataset {}", id);
        self.ack(HttpMethod::Put, &[id, "publish"]).await
    }

    /// Most recent dataset still waiting for processing
    pub async fn get_latest_pending(&self) -> AvaandmedResult<Dataset> {
        self.get(&["latest", "pending"]).await
    }

    pub async fn get_all_privacy_violations(&self) -> AvaandmedResult<Vec<PrivacyViolation>> {
        self.get(&["privacy-violations"]).await
    }

    pub async fn get_privacy_violation(&self, violation_id: &str) -> AvaandmedResult<PrivacyViolation> {
        self.get(&["privacy-violations", violation_id]).await
    }

    pub async fn consider_privacy_violation(&self, violation_id: &str) -> AvaandmedResult<()> {
        info!("Considering privacy violation {}", violation_id);
        self.ack(HttpMethod::Put, &["privacy-violations", violation_id, "consider"])
            .await
    }

    pub async fn disregard_privacy_violation(&self, violation_id: &str) -> AvaandmedResult<()> {
        info!("Disregarding privacy violation {}", violation_id);
        self.ack(HttpMethod::Put, &["privacy-violations", violation_id, "disregard"])
            .await
    }

    pub async fn get_all_access_permissions(&self) -> AvaandmedResult<Vec<AccessPermission>> {
        self.get(&["access-permissions"]).await
    }

    pub async fn get_access_permission(&self, permission_id: &str) -> AvaandmedResult<AccessPermission> {
        self.get(&["access-permissions", permission_id]).await
    }

    pub async fn approve_access_permission(&self, permission_id: &str) -> AvaandmedResult<()> {
        info!("Approving access permission {}", permission_id);
        self.ack(HttpMethod::Put, &["access-permissions", permission_id, "approve"])
            .await
    }

    pub async fn decline_access_permission(&self, permission_id: &str) -> AvaandmedResult<()> {
        info!("Declining access permission {}", permission_id);
        self.ack(HttpMethod::Put, &["access-permissions", permission_id, "decline"])
            .await
    }

    /// Files attached to a dataset
    pub async fn get_all_files(&self, id: &str) -> AvaandmedResult<Vec<File>> {
        self.get(&[id, "files"]).await
    }

    /// File rows including the validation errors found while processing
    pub async fn get_file_rows_with_errors(
        &self,
        id: &str,
        file_id: &str,
    ) -> AvaandmedResult<FileErrors> {
        self.get(&[id, "files", file_id]).await
    }

    pub async fn delete_file(&self, id: &str, file_id: &str) -> AvaandmedResult<()> {
        info!("Deleting file {} of dataset {}", file_id, id);
        self.ack(HttpMethod::Delete, &[id, "files", file_id]).await
    }

    pub async fn get_file_index(&self, id: &str, file_id: &str) -> AvaandmedResult<Index> {
        self.get(&[id, "files", file_id, "indices"]).await
    }

    pub async fn create_file_indices(
        &self,
        id: &str,
        file_id: &str,
        indices: &FileIndicesRequest,
    ) -> AvaandmedResult<()> {
        info!("Creating indices for file {} of dataset {}", file_id, id);
        let path = self.repository.path(&[id, "files", file_id, "indices"]);
        debug!("HTTP POST {}", path);

        self.client()
            .request_ack_with_body(HttpMethod::Post, &path, indices)
            .await
    }

    /// Ratings users have given a dataset
    pub async fn get_rating(&self, slug: &str) -> AvaandmedResult<Vec<DatasetRating>> {
        self.get(&[slug, "ratings"]).await
    }
}
