use std::time::Duration;

use tracing::{debug, info};

use crate::api::types::{ApiResponse, ProcessImageRequest};
use crate::config::ServerSettings;
use crate::error::ApiError;

/// HTTP client for the two backend endpoints. Stateless beyond the
/// connection pool; safe to share behind an Arc.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String, request_timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(ApiError::Build)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &ServerSettings) -> Result<Self, ApiError> {
        Self::new(
            settings.base_url.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// Registers one workout. The backend keeps all state; the client only
    /// cares that the answer is "success".
    pub async fn record_workout(&self) -> Result<(), ApiError> {
        const ENDPOINT: &str = "record_workout";
        debug!("Registering workout at {}/{}", self.base_url, ENDPOINT);

        let response = self
            .http
            .post(format!("{}/{}", self.base_url, ENDPOINT))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: ENDPOINT,
                source,
            })?;

        let body: ApiResponse =
            response
                .json()
                .await
                .map_err(|source| ApiError::Transport {
                    endpoint: ENDPOINT,
                    source,
                })?;

        if body.is_success() {
            info!("Workout registered");
            Ok(())
        } else {
            Err(ApiError::Rejected {
                endpoint: ENDPOINT,
                message: body.message_or_default(),
            })
        }
    }

    /// Sends the captured photo and graph parameters for compositing.
    /// Returns the composed image as a data URL.
    pub async fn process_image(&self, request: &ProcessImageRequest) -> Result<String, ApiError> {
        const ENDPOINT: &str = "process_image";
        debug!(
            "Submitting {}x{} overlay at ({}, {}) to {}/{}",
            request.graph_params.width,
            request.graph_params.height,
            request.graph_params.x,
            request.graph_params.y,
            self.base_url,
            ENDPOINT
        );

        let response = self
            .http
            .post(format!("{}/{}", self.base_url, ENDPOINT))
            .json(request)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: ENDPOINT,
                source,
            })?;

        let body: ApiResponse =
            response
                .json()
                .await
                .map_err(|source| ApiError::Transport {
                    endpoint: ENDPOINT,
                    source,
                })?;

        if !body.is_success() {
            return Err(ApiError::Rejected {
                endpoint: ENDPOINT,
                message: body.message_or_default(),
            });
        }
        body.image.ok_or(ApiError::MissingImage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{GraphParams, PositionPreset, SizePreset};
    use mockito::Matcher;

    fn test_client(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(server.url(), Duration::from_secs(5)).unwrap()
    }

    fn test_request() -> ProcessImageRequest {
        ProcessImageRequest {
            image: "data:image/png;base64,AAAA".to_string(),
            graph_params: GraphParams::resolve(
                SizePreset::Small,
                PositionPreset::TopLeft,
                (640, 480),
                "2026-01-01".to_string(),
                "2026-12-31".to_string(),
            ),
        }
    }

    #[tokio::test]
    async fn record_workout_succeeds_on_success_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/record_workout")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        client.record_workout().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn record_workout_surfaces_backend_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/record_workout")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"error","message":"database locked"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let err = client.record_workout().await.unwrap_err();
        match err {
            ApiError::Rejected { endpoint, message } => {
                assert_eq!(endpoint, "record_workout");
                assert_eq!(message, "database locked");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn process_image_posts_the_wire_body_and_returns_the_image() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/process_image")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "image": "data:image/png;base64,AAAA",
                "graph_params": {"width": 250, "height": 166, "x": 20, "y": 20}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success","image":"data:image/png;base64,BBBB"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let composed = client.process_image(&test_request()).await.unwrap();
        assert_eq!(composed, "data:image/png;base64,BBBB");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn process_image_without_image_field_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/process_image")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let err = client.process_image(&test_request()).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingImage));
    }
}
