use crate::editor::ledger::NewImage;
use serde::{Deserialize, Serialize};

/// Which slice of the backend a call operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiScope {
    /// Listings owned by one agent
    Agent(i64),
    /// Every listing, through the admin endpoints
    Admin,
}

/// Where a submission goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update(i64),
    AdminUpdate(i64),
}

impl SubmitTarget {
    /// Multipart part name for uploaded files
    pub fn file_field(self) -> &'static str {
        match self {
            SubmitTarget::Create => "images",
            SubmitTarget::Update(_) | SubmitTarget::AdminUpdate(_) => "newImages",
        }
    }

    pub fn property_id(self) -> Option<i64> {
        match self {
            SubmitTarget::Create => None,
            SubmitTarget::Update(id) | SubmitTarget::AdminUpdate(id) => Some(id),
        }
    }
}

/// Multipart name carrying ids of images to delete
pub const REMOVED_IMAGES_FIELD: &str = "imagesToRemove";

/// Everything one create/update request sends: flat string fields plus
/// the image diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub target: SubmitTarget,
    pub fields: Vec<(String, String)>,
    pub new_files: Vec<NewImage>,
    pub removed_ids: Vec<i64>,
}

impl SubmissionPayload {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Server acknowledgement of a create or update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAck {
    #[serde(default)]
    pub message: String,
    pub property_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_field_depends_on_target() {
        assert_eq!(SubmitTarget::Create.file_field(), "images");
        assert_eq!(SubmitTarget::Update(4).file_field(), "newImages");
        assert_eq!(SubmitTarget::AdminUpdate(4).file_field(), "newImages");
        assert_eq!(SubmitTarget::Create.property_id(), None);
        assert_eq!(SubmitTarget::AdminUpdate(4).property_id(), Some(4));
    }

    #[test]
    fn ack_parses_camel_case() {
        let ack: SubmitAck =
            serde_json::from_str(r#"{"message":"Property updated","propertyId":12}"#).unwrap();
        assert_eq!(ack.property_id, 12);
        assert_eq!(ack.message, "Property updated");
    }
}
