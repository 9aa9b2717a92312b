/*
 * Avaandmed API client - Rust client for the Estonian open data portal
 */

// Internal modules
mod client;
pub mod config;
pub mod models; // Make models public
mod apis;
mod error;
mod auth;

// Re-export public types and interfaces
pub use client::{AvaandmedClient, HttpMethod, DOWNLOAD_SUCCESS};
pub use config::ClientConfig;
pub use models::*;
pub use apis::*;
pub use error::{AvaandmedError, AvaandmedResult};
pub use auth::{Authentication, BearerAuth, Credentials, KeyLoginAuth, NoAuth, X_API_KEY};

// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AvaandmedClient, ClientConfig, Credentials, HttpMethod,
        AvaandmedError, AvaandmedResult,
        // Common model types
        Dataset, Organization, User, File, FileColumn, SearchResult,
        DatasetMetadata, FileIndicesRequest, Preview,
    };
}
