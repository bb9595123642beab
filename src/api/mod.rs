pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use traits::PropertyApi;
pub use types::{ApiScope, SubmissionPayload, SubmitAck, SubmitTarget};
