use image::DynamicImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

use crate::common::{Snapshot, SnapshotSource};
use crate::error::CameraError;

/// Which physical camera to request, mirroring the "user" / "environment"
/// facing modes of the original capture contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(FacingMode::User),
            "environment" => Some(FacingMode::Environment),
            _ => None,
        }
    }
}

pub enum CameraEvent {
    Frame(Snapshot),
    Failed(CameraError),
}

/// Owns the capture worker for one stream. Switching facing mode means
/// stopping this client and opening a new one, the stream is never reused.
pub struct CameraClient {
    cancel_token: CancellationToken,
    capture_thread: Option<std::thread::JoinHandle<()>>,
    facing: FacingMode,
}

impl CameraClient {
    pub fn open(facing: FacingMode, event_tx: Sender<CameraEvent>) -> Self {
        let cancel_token = CancellationToken::new();
        let mut worker = CaptureWorker::new(facing, event_tx);
        Self {
            cancel_token: cancel_token.clone(),
            capture_thread: Some(std::thread::spawn(move || worker.run(cancel_token))),
            facing,
        }
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn stop(&mut self) {
        self.cancel_token.cancel();
        if let Some(thread) = self.capture_thread.take() {
            thread.join().expect("Capture thread panicked");
        }
    }
}

impl Drop for CameraClient {
    fn drop(&mut self) {
        self.stop();
    }
}

struct CaptureWorker {
    facing: FacingMode,
    event_tx: Sender<CameraEvent>,
}

impl CaptureWorker {
    fn new(facing: FacingMode, event_tx: Sender<CameraEvent>) -> Self {
        Self { facing, event_tx }
    }

    fn run(&mut self, cancel_token: CancellationToken) {
        tracing::info!("Opening camera stream, facing '{}'", self.facing.as_str());

        let mut camera = match self.open_device() {
            Ok(camera) => camera,
            Err(e) => {
                tracing::error!("Error opening camera: {}", e);
                let _ = self.event_tx.try_send(CameraEvent::Failed(e));
                return;
            }
        };

        while !cancel_token.is_cancelled() {
            match camera.frame() {
                Ok(buffer) => match buffer.decode_image::<RgbFormat>() {
                    Ok(decoded) => {
                        self.publish_frame(DynamicImage::ImageRgb8(decoded));
                    }
                    Err(e) => {
                        tracing::error!("Failed to decode camera frame: {}", e);
                    }
                },
                Err(e) => {
                    let err = CameraError::Frame(e.to_string());
                    tracing::error!("{}", err);
                    let _ = self.event_tx.try_send(CameraEvent::Failed(err));
                    break;
                }
            }
        }

        if let Err(e) = camera.stop_stream() {
            tracing::warn!("Failed to stop camera stream cleanly: {}", e);
        }
        tracing::info!("Camera stream closed, facing '{}'", self.facing.as_str());
    }

    fn publish_frame(&mut self, image: DynamicImage) {
        let snapshot = Snapshot::new(image, SnapshotSource::Camera);
        match self.event_tx.try_send(CameraEvent::Frame(snapshot)) {
            Ok(_) => {}
            Err(TrySendError::Full(_)) => {
                // Drop frame to keep the preview real-time
                tracing::warn!("Dropping camera frame: channel full");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("Frame channel closed, stopping capture loop");
            }
        }
    }

    fn open_device(&self) -> Result<nokhwa::Camera, CameraError> {
        let devices =
            nokhwa::query(ApiBackend::Auto).map_err(|e| CameraError::Open(e.to_string()))?;
        if devices.is_empty() {
            return Err(CameraError::NoDevice(self.facing.as_str().to_string()));
        }

        let index = device_index_for(self.facing, devices.len());
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera = nokhwa::Camera::new(CameraIndex::Index(index as u32), requested)
            .map_err(|e| CameraError::Open(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CameraError::Open(e.to_string()))?;
        Ok(camera)
    }
}

/// "user" maps to the first enumerated device, "environment" to the last.
/// Single-camera hosts resolve both to device 0, like a browser falling back
/// to whatever camera exists.
fn device_index_for(facing: FacingMode, device_count: usize) -> usize {
    match facing {
        FacingMode::User => 0,
        FacingMode::Environment => device_count.saturating_sub(1),
    }
}
