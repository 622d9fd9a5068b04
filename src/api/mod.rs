pub mod client;
pub mod service;
pub mod types;

pub use client::ApiClient;
pub use service::{SubmissionRequest, SubmissionService};
pub use types::{ApiResponse, ProcessImageRequest};
