use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wrapper around every successful JSON response: `{"data": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Error body returned with non-success statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: Option<u16>,
    /// A string, or a list of strings for validation failures
    pub message: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl ErrorResponse {
    /// Human readable message, if the body carried one
    pub fn message_text(&self) -> Option<String> {
        match self.message.as_ref()? {
            serde_json::Value::String(message) => Some(message.clone()),
            serde_json::Value::Array(items) => {
                let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
                (!parts.is_empty()).then(|| parts.join("; "))
            }
            _ => None,
        }
    }
}

/// Payload of a successful key-login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
}

/// Dataset metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: Option<String>,
    pub status: Option<String>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub organization: Option<Organization>,
    pub organization_id: Option<String>,
    pub user: Option<User>,
    pub user_id: Option<String>,
    pub files: Option<Vec<File>>,
    pub keywords: Option<Vec<Keyword>>,
    pub categories: Option<Vec<Category>>,
    pub regions: Option<Vec<Region>>,
    pub coordinate_reference_systems: Option<Vec<CoordinateReferenceSystem>>,
    pub is_actual: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub name_et: Option<String>,
    pub name_en: Option<String>,
    pub description_et: Option<String>,
    pub description_en: Option<String>,
    pub maintainer: Option<String>,
    pub maintainer_email: Option<String>,
    pub maintainer_phone: Option<String>,
    pub citations: Option<Vec<Citation>>,
    pub conformities: Option<Vec<Conformity>>,
    pub south_lat: Option<String>,
    pub north_lat: Option<String>,
    pub west_lon: Option<String>,
    pub east_long: Option<String>,
    pub language: Option<String>,
    #[serde(alias = "license")]
    pub licence: Option<Licence>,
    pub license_id: Option<u64>,
    pub data_from: Option<DateTime<Utc>>,
    pub data_to: Option<DateTime<Utc>>,
    pub update_interval_unit: Option<UpdateIntervalUnit>,
    pub update_interval_frequency: Option<u32>,
    pub access: Option<Access>,
    pub available_to: Option<DateTime<Utc>>,
    pub landing_page: Option<String>,
    pub qualified_attribution: Option<String>,
    pub was_generated_by: Option<String>,
    pub spatial_resolution: Option<String>,
    pub geoportal_identifier: Option<String>,
    pub geoportal_keywords: Option<String>,
    pub lineage: Option<String>,
    pub pixel_size: Option<String>,
    pub resource_type: Option<ResourceType>,
    pub topic_categories: Option<Vec<TopicCategory>>,
}

/// Organization publishing datasets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Option<String>,
    pub reg_code: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub contact: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub is_public_body: Option<bool>,
    pub notifications: Option<Vec<Notification>>,
}

/// Portal user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub language: Option<String>,
    pub notifications: Option<Vec<Notification>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordEmsCategory {
    pub id: u64,
    pub ems_category_id: u64,
    pub keyword_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub id: u64,
    pub name: String,
    pub language: String,
    pub keyword_ems_category: Option<KeywordEmsCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conformity {
    pub release_date: String,
    pub specification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Licence {
    pub id: String,
    pub name: String,
    pub description: String,
    pub code: Option<String>,
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinateReferenceSystem {
    pub id: u64,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub ems_ids: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: u64,
    pub name: String,
    pub coordinates: Option<String>,
}

/// Processing state of files and inquiries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    None,
    Pending,
    Completed,
    Failed,
}

/// File attached to a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub id: String,
    pub name: String,
    pub mimetype: String,
    pub size: String,
    pub dataset_id: String,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
    pub processing_status: ProcessingStatus,
    pub storage_filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateIntervalUnit {
    Continual,
    Minute,
    Workday,
    Day,
    Week,
    Month,
    Quarter,
    Year,
    AsNeeded,
    Irregular,
    NotPlanned,
    Unknown,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Dataset,
    Series,
    Service,
}

/// ISO 19115 topic category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TopicCategory {
    Biota,
    Boundaries,
    ClimatologyMeteorologyAtmosphere,
    Economy,
    Elevation,
    Environment,
    Farming,
    GeoscientificInformation,
    Health,
    ImageryBaseMapsEarthCover,
    InlandWaters,
    IntelligenceMilitary,
    Location,
    Oceans,
    PlanningCadastre,
    Society,
    Structure,
    Transportation,
    UtilitiesCommunication,
}

/// Notification an organization or user subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    DatasetCommented,
    DatasetRated,
    DatasetAccessRequest,
    DataWishNew,
    DatasetPrivacyViolation,
}

/// Column description returned by the `/columns` endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileColumn {
    pub column: Option<String>,
    #[serde(rename = "type")]
    pub column_type: Option<String>,
    pub description: Option<String>,
    pub api_field_name: Option<String>,
    pub unit: Option<String>,
    pub required: Option<bool>,
    pub private: Option<bool>,
    pub unique: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InformationHolder {
    pub slug: String,
    pub name: String,
}

/// Dataset search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: Option<String>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub name_et: Option<String>,
    pub name_en: Option<String>,
    pub description: Option<String>,
    pub description_et: Option<String>,
    pub description_en: Option<String>,
    pub information_holder: Option<InformationHolder>,
    pub update_interval_frequency: Option<u32>,
    pub update_interval_unit: Option<UpdateIntervalUnit>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub keywords: Option<Vec<String>>,
    pub keywords_et: Option<Vec<String>>,
    pub keywords_en: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub categories_et: Option<Vec<String>>,
    pub categories_en: Option<Vec<String>>,
}

/// Rows of a processed file as the portal renders them
pub type Preview = Vec<serde_json::Map<String, serde_json::Value>>;

/// Rows of a file together with their validation errors
pub type FileErrors = Vec<serde_json::Map<String, serde_json::Value>>;

/// Dataset summary embedded in inquiries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialDatasetInfo {
    pub id: Option<String>,
    pub name_et: Option<String>,
    pub name_en: Option<String>,
    pub slug: Option<String>,
    pub organization_id: Option<String>,
    pub user_id: Option<String>,
    pub name: Option<String>,
}

/// Request submitted about a dataset (privacy violation or access permission)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub description: Option<String>,
    pub dataset_id: Option<String>,
    pub status: ProcessingStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub dataset: Option<PartialDatasetInfo>,
    pub user: Option<User>,
    pub seen: Option<bool>,
}

pub type PrivacyViolation = Inquiry;
pub type AccessPermission = Inquiry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polynomial {
    pub id: u64,
    pub column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    pub id: u64,
    pub column: String,
    pub identifier: String,
}

/// Indices defined on a dataset file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    pub polynomial: Vec<Polynomial>,
    pub identifier: Vec<Identifier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRating {
    pub id: u64,
    pub quality_rating: Option<u8>,
    pub metadata_rating: Option<u8>,
    pub description: Option<String>,
}

/// Body for creating a dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub name_et: String,
    pub name_en: String,
    pub description_et: String,
    pub description_en: String,
    pub maintainer: String,
    pub maintainer_email: String,
    pub maintainer_phone: String,
    pub keyword_ids: Vec<u64>,
    pub category_ids: Vec<u64>,
    pub region_ids: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_interval_unit: Option<UpdateIntervalUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_interval_frequency: Option<u32>,
}

/// Body for privacy-violation reports and access requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
    pub dataset_id: String,
    pub description: String,
}

/// Body for rating a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub dataset_id: String,
    pub quality_rating: u8,
    pub metadata_rating: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierRequest {
    pub column: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolynomialRequest {
    pub column: String,
}

/// Body for creating file indices
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileIndicesRequest {
    pub identifier: Vec<IdentifierRequest>,
    pub polynomial: Vec<PolynomialRequest>,
}
