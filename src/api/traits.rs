use crate::api::error::ApiError;
use crate::api::types::{ApiScope, SubmissionPayload, SubmitAck};
use crate::models::Property;
use async_trait::async_trait;

/// Listing backend as seen by the editor and the listing view.
/// Implemented over HTTP by [`crate::api::ApiClient`]; tests use in-memory fakes.
#[async_trait]
pub trait PropertyApi: Send + Sync {
    /// Fetch one listing for editing
    async fn get_property(&self, id: i64, scope: ApiScope) -> Result<Property, ApiError>;

    /// Fetch the listings visible in the given scope
    async fn get_properties(&self, scope: ApiScope) -> Result<Vec<Property>, ApiError>;

    /// Create or update a listing from an assembled payload
    async fn submit(&self, payload: SubmissionPayload) -> Result<SubmitAck, ApiError>;
}
