use std::pin::Pin;
use std::sync::Arc;

use futures::task::{Context, Poll};
use futures::Future;
use tower::Service;

use crate::api::client::ApiClient;
use crate::api::types::ProcessImageRequest;
use crate::common::Snapshot;
use crate::encode::to_png_data_url;
use crate::overlay::{GraphParams, PositionPreset, SizePreset};

/// One submission: the snapshot plus everything the overlay placement needs.
#[derive(Clone)]
pub struct SubmissionRequest {
    pub snapshot: Snapshot,
    pub size: SizePreset,
    pub position: PositionPreset,
    pub start_date: String,
    pub end_date: String,
}

/// Encodes the snapshot, resolves the overlay placement and posts the result
/// to the backend. Wrapped in a tower timeout by the flow controller.
#[derive(Clone)]
pub struct SubmissionService {
    api: Arc<ApiClient>,
}

impl SubmissionService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

impl Service<SubmissionRequest> for SubmissionService {
    type Response = String;
    type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: SubmissionRequest) -> Self::Future {
        let api = self.api.clone();

        Box::pin(async move {
            let image = to_png_data_url(req.snapshot.image())?;
            let graph_params = GraphParams::resolve(
                req.size,
                req.position,
                req.snapshot.dimensions(),
                req.start_date,
                req.end_date,
            );
            let composed = api
                .process_image(&ProcessImageRequest {
                    image,
                    graph_params,
                })
                .await?;
            Ok(composed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SnapshotSource;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use mockito::Matcher;
    use std::time::Duration;
    use tower::timeout::Timeout;
    use tower::ServiceExt;

    fn test_snapshot(width: u32, height: u32) -> Snapshot {
        Snapshot::new(
            DynamicImage::ImageRgb8(ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
                width,
                height,
                Rgb([128, 128, 128]),
            )),
            SnapshotSource::Camera,
        )
    }

    #[tokio::test]
    async fn submission_resolves_placement_against_the_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/process_image")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "graph_params": {
                    "width": 250, "height": 166, "x": 730, "y": 614,
                    "start_date": "2026-01-01", "end_date": "2026-12-31"
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success","image":"data:image/png;base64,CCCC"}"#)
            .create_async()
            .await;

        let api = Arc::new(
            ApiClient::new(server.url(), Duration::from_secs(5)).unwrap(),
        );
        let service = Timeout::new(SubmissionService::new(api), Duration::from_secs(10));

        let composed = service
            .oneshot(SubmissionRequest {
                snapshot: test_snapshot(1000, 800),
                size: SizePreset::Small,
                position: PositionPreset::BottomRight,
                start_date: "2026-01-01".to_string(),
                end_date: "2026-12-31".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(composed, "data:image/png;base64,CCCC");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn backend_rejection_propagates_through_the_service() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/process_image")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"error","message":"graph rendering failed"}"#)
            .create_async()
            .await;

        let api = Arc::new(
            ApiClient::new(server.url(), Duration::from_secs(5)).unwrap(),
        );
        let service = Timeout::new(SubmissionService::new(api), Duration::from_secs(10));

        let err = service
            .oneshot(SubmissionRequest {
                snapshot: test_snapshot(64, 64),
                size: SizePreset::Medium,
                position: PositionPreset::Center,
                start_date: "2026-01-01".to_string(),
                end_date: "2026-12-31".to_string(),
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("graph rendering failed"));
    }
}
