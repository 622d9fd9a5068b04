use serde::{Deserialize, Serialize};

use crate::overlay::GraphParams;

pub const STATUS_SUCCESS: &str = "success";

/// Body of POST /process_image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessImageRequest {
    /// PNG data URL of the captured photo.
    pub image: String,
    pub graph_params: GraphParams,
}

/// Envelope every backend endpoint answers with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Composed image data URL, present on process_image success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    pub fn message_or_default(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "no message from backend".to_string())
    }
}
