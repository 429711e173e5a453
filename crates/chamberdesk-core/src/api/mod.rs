//! Backend access: the HTTP client, its error type, and upload checks.

pub mod client;
pub mod error;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::ApiClient;
pub use error::ApiError;
pub use upload::{Attachment, UploadError};
