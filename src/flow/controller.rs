use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_util::sync::CancellationToken;
use tower::timeout::Timeout;
use tower::ServiceExt;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, SubmissionRequest, SubmissionService};
use crate::capture::{decode_file, CameraClient, CameraEvent, FacingMode};
use crate::common::Snapshot;
use crate::config::Settings;
use crate::error::FlowError;
use crate::flow::state::{FlowEvent, FlowMachine, FlowStage};
use crate::handoff::{HandoffStore, RESULT_KEY};
use crate::overlay::{PositionPreset, SizePreset};

/// Notifications from background tasks back to the controller, drained once
/// per UI frame.
#[derive(Debug)]
pub enum ControllerEvent {
    WorkoutRecorded,
    WorkoutRejected(String),
    UploadDecoded(Snapshot),
    UploadFailed(String),
    CountdownTick(u32),
    CountdownFinished,
    SubmissionSucceeded(String),
    SubmissionFailed(String),
}

/// Owns everything one capture flow touches: the stage machine, the active
/// presets and dates, the camera stream, the pending snapshot and the
/// submission guard. Constructed at flow start, torn down on exit.
pub struct FlowController {
    machine: FlowMachine,
    settings: Settings,
    api: Arc<ApiClient>,
    handoff: HandoffStore,

    size: SizePreset,
    position: PositionPreset,
    facing: FacingMode,
    start_date: String,
    end_date: String,
    timer_secs: u32,
    upload_path: String,

    camera: Option<CameraClient>,
    camera_rx: Option<mpsc::Receiver<CameraEvent>>,
    latest_frame: Option<Snapshot>,

    event_tx: mpsc::Sender<ControllerEvent>,
    event_rx: mpsc::Receiver<ControllerEvent>,
    cancel_token: CancellationToken,

    registering: bool,
    submission_in_flight: bool,
    countdown: Option<u32>,
    last_error: Option<String>,
}

impl FlowController {
    pub fn new(settings: Settings, api: Arc<ApiClient>, handoff: HandoffStore) -> Self {
        let (event_tx, event_rx) = mpsc::channel(100);
        let today = Utc::now();
        let facing = FacingMode::parse(&settings.camera.default_facing)
            .unwrap_or(FacingMode::User);

        Self {
            machine: FlowMachine::new(),
            settings,
            api,
            handoff,
            size: SizePreset::Small,
            position: PositionPreset::BottomRight,
            facing,
            start_date: format!("{}-01-01", today.year()),
            end_date: format!("{}-12-31", today.year()),
            timer_secs: 0,
            upload_path: String::new(),
            camera: None,
            camera_rx: None,
            latest_frame: None,
            event_tx,
            event_rx,
            cancel_token: CancellationToken::new(),
            registering: false,
            submission_in_flight: false,
            countdown: None,
            last_error: None,
        }
    }

    // --- accessors used by the views ---

    pub fn stage(&self) -> FlowStage {
        self.machine.stage()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn registering(&self) -> bool {
        self.registering
    }

    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn latest_frame(&self) -> Option<&Snapshot> {
        self.latest_frame.as_ref()
    }

    pub fn size_mut(&mut self) -> &mut SizePreset {
        &mut self.size
    }

    pub fn position_mut(&mut self) -> &mut PositionPreset {
        &mut self.position
    }

    pub fn start_date_mut(&mut self) -> &mut String {
        &mut self.start_date
    }

    pub fn end_date_mut(&mut self) -> &mut String {
        &mut self.end_date
    }

    pub fn timer_secs_mut(&mut self) -> &mut u32 {
        &mut self.timer_secs
    }

    pub fn upload_path_mut(&mut self) -> &mut String {
        &mut self.upload_path
    }

    // --- stage actions ---

    /// Registers the workout, then advances to source selection. The button
    /// stays disabled while the request is out.
    pub fn begin(&mut self) {
        if self.stage() != FlowStage::Settings || self.registering {
            return;
        }
        self.registering = true;
        self.last_error = None;

        let api = self.api.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = match api.record_workout().await {
                Ok(()) => ControllerEvent::WorkoutRecorded,
                Err(e) => ControllerEvent::WorkoutRejected(e.to_string()),
            };
            let _ = event_tx.send(event).await;
        });
    }

    pub fn choose_camera(&mut self) {
        self.apply_or_report(FlowEvent::ChooseCamera);
    }

    pub fn choose_upload(&mut self) {
        self.close_camera();
        self.apply_or_report(FlowEvent::ChooseUpload);
    }

    /// Opens the stream for the currently selected facing mode and moves to
    /// the live stage. Open failures come back as camera events and drop the
    /// flow back to the options stage.
    pub fn open_camera(&mut self) {
        if self.stage() != FlowStage::CameraOptions {
            return;
        }
        self.last_error = None;
        self.start_stream();
        self.apply_or_report(FlowEvent::StreamOpened);
    }

    /// Tears the stream down and re-requests it with the opposite facing.
    pub fn switch_facing(&mut self) {
        if self.stage() != FlowStage::CameraLive {
            return;
        }
        self.close_camera();
        self.facing = self.facing.toggled();
        self.start_stream();
        self.apply_or_report(FlowEvent::SwitchFacing);
    }

    /// Captures either immediately or after the configured self-timer.
    pub fn snap(&mut self) {
        if self.stage() != FlowStage::CameraLive || self.countdown.is_some() {
            return;
        }
        if self.timer_secs > 0 {
            self.start_countdown(self.timer_secs);
        } else if let Err(e) = self.capture_now() {
            self.report(e);
        }
    }

    /// Kicks off read + decode of the chosen file.
    pub fn submit_upload(&mut self) {
        if self.stage() != FlowStage::Uploading {
            return;
        }
        self.last_error = None;

        let path = PathBuf::from(self.upload_path.trim());
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = match decode_file(path).await {
                Ok(snapshot) => ControllerEvent::UploadDecoded(snapshot),
                Err(e) => ControllerEvent::UploadFailed(e.to_string()),
            };
            let _ = event_tx.send(event).await;
        });
    }

    pub fn retry(&mut self) {
        if self.apply_or_report(FlowEvent::Retry) {
            self.reset_flow_state();
        }
    }

    pub fn start_over(&mut self) {
        if self.apply_or_report(FlowEvent::StartOver) {
            self.reset_flow_state();
        }
    }

    /// Consumes the stored result for the result view.
    pub fn take_result(&mut self) -> Option<String> {
        match self.handoff.take(RESULT_KEY) {
            Ok(result) => result,
            Err(e) => {
                self.report(e.to_string());
                None
            }
        }
    }

    /// Stops the camera worker and any pending countdown. Called on app
    /// exit; safe to call twice.
    pub fn teardown(&mut self) {
        self.cancel_token.cancel();
        self.close_camera();
    }

    // --- per-frame pump, called from the UI update loop ---

    pub fn pump_events(&mut self) {
        self.pump_camera();
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => self.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("Controller event channel disconnected");
                    break;
                }
            }
        }
    }

    fn pump_camera(&mut self) {
        let Some(camera_rx) = self.camera_rx.as_mut() else {
            return;
        };
        let mut failure: Option<String> = None;
        loop {
            match camera_rx.try_recv() {
                Ok(CameraEvent::Frame(snapshot)) => {
                    self.latest_frame = Some(snapshot);
                }
                Ok(CameraEvent::Failed(e)) => {
                    failure = Some(e.to_string());
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        if let Some(message) = failure {
            warn!("Camera stream failed: {}", message);
            self.close_camera();
            self.countdown = None;
            self.report(message);
            self.apply_or_report(FlowEvent::StreamFailed);
        }
    }

    fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::WorkoutRecorded => {
                self.registering = false;
                self.apply_or_report(FlowEvent::WorkoutRecorded);
            }
            ControllerEvent::WorkoutRejected(message) => {
                self.registering = false;
                self.report(message);
            }
            ControllerEvent::UploadDecoded(snapshot) => {
                if self.apply_or_report(FlowEvent::UploadDecoded) {
                    if let Err(e) = self.submit(snapshot) {
                        self.fail_submission(e.to_string());
                    }
                }
            }
            ControllerEvent::UploadFailed(message) => {
                self.apply_or_report(FlowEvent::DecodeFailed);
                self.report(message);
            }
            ControllerEvent::CountdownTick(remaining) => {
                self.countdown = Some(remaining);
            }
            ControllerEvent::CountdownFinished => {
                self.countdown = None;
                if self.stage() == FlowStage::CameraLive {
                    if let Err(e) = self.capture_now() {
                        self.report(e);
                    }
                }
            }
            ControllerEvent::SubmissionSucceeded(image) => {
                self.submission_in_flight = false;
                match self.handoff.put(RESULT_KEY, &image) {
                    Ok(()) => {
                        info!("Composed image stored under '{}'", RESULT_KEY);
                        self.apply_or_report(FlowEvent::ProcessSucceeded);
                    }
                    Err(e) => self.fail_submission(e.to_string()),
                }
            }
            ControllerEvent::SubmissionFailed(message) => {
                self.fail_submission(message);
            }
        }
    }

    // --- internals ---

    fn start_stream(&mut self) {
        let (camera_tx, camera_rx) = mpsc::channel(self.settings.camera.frame_buffer_size);
        self.camera = Some(CameraClient::open(self.facing, camera_tx));
        self.camera_rx = Some(camera_rx);
        self.latest_frame = None;
    }

    fn close_camera(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            camera.stop();
        }
        self.camera_rx = None;
    }

    /// Takes the most recent full-resolution frame, stops the stream, and
    /// hands the snapshot to the submission pipeline.
    fn capture_now(&mut self) -> Result<(), FlowError> {
        let snapshot = self.latest_frame.take().ok_or(FlowError::NoSnapshot)?;
        self.close_camera();
        self.machine.apply(FlowEvent::SnapshotTaken)?;
        self.submit(snapshot)
    }

    fn submit(&mut self, snapshot: Snapshot) -> Result<(), FlowError> {
        if self.submission_in_flight {
            return Err(FlowError::SubmissionInFlight);
        }
        self.submission_in_flight = true;
        debug!(
            "Submitting snapshot {:?} with {:?}/{:?}",
            snapshot.id(),
            self.size,
            self.position
        );

        let request = SubmissionRequest {
            snapshot,
            size: self.size,
            position: self.position,
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        };
        let service = Timeout::new(
            SubmissionService::new(self.api.clone()),
            std::time::Duration::from_secs(self.settings.server.request_timeout_secs),
        );
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = match service.oneshot(request).await {
                Ok(image) => ControllerEvent::SubmissionSucceeded(image),
                Err(e) => ControllerEvent::SubmissionFailed(e.to_string()),
            };
            let _ = event_tx.send(event).await;
        });
        Ok(())
    }

    fn start_countdown(&mut self, secs: u32) {
        self.countdown = Some(secs);
        let event_tx = self.event_tx.clone();
        let cancel = self.cancel_token.child_token();
        tokio::spawn(async move {
            for remaining in (1..=secs).rev() {
                let _ = event_tx.send(ControllerEvent::CountdownTick(remaining)).await;
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
                }
            }
            let _ = event_tx.send(ControllerEvent::CountdownFinished).await;
        });
    }

    fn fail_submission(&mut self, message: String) {
        self.submission_in_flight = false;
        self.report(message);
        self.apply_or_report(FlowEvent::ProcessFailed);
    }

    fn reset_flow_state(&mut self) {
        self.close_camera();
        self.latest_frame = None;
        self.countdown = None;
        self.registering = false;
        self.submission_in_flight = false;
        self.last_error = None;
    }

    fn apply_or_report(&mut self, event: FlowEvent) -> bool {
        match self.machine.apply(event) {
            Ok(stage) => {
                debug!("Flow stage -> {:?}", stage);
                true
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    fn report(&mut self, message: impl ToString) {
        self.last_error = Some(message.to_string());
    }
}

impl Drop for FlowController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use std::time::Duration;
    use tempfile::tempdir;

    fn controller_for(server: &mockito::ServerGuard, handoff_root: &std::path::Path) -> FlowController {
        let mut settings = Settings::default();
        settings.server.base_url = server.url();
        settings.server.request_timeout_secs = 5;
        let api = Arc::new(ApiClient::from_settings(&settings.server).unwrap());
        let handoff = HandoffStore::at(handoff_root.to_path_buf()).unwrap();
        FlowController::new(settings, api, handoff)
    }

    async fn pump_until_stage(controller: &mut FlowController, stage: FlowStage) {
        for _ in 0..250 {
            controller.pump_events();
            if controller.stage() == stage {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "never reached {:?}, stuck in {:?} (last error: {:?})",
            stage,
            controller.stage(),
            controller.last_error()
        );
    }

    fn write_test_photo(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("photo.png");
        let img = DynamicImage::ImageRgb8(ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
            1000,
            800,
            Rgb([10, 20, 30]),
        ));
        img.save_with_format(&path, ImageFormat::Png).unwrap();
        path
    }

    #[tokio::test]
    async fn upload_flow_reaches_done_and_stores_the_result() {
        let mut server = mockito::Server::new_async().await;
        let _record = server
            .mock("POST", "/record_workout")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success"}"#)
            .create_async()
            .await;
        let _process = server
            .mock("POST", "/process_image")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "graph_params": {"width": 250, "height": 166, "x": 730, "y": 614}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success","image":"data:image/png;base64,DDDD"}"#)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let mut controller = controller_for(&server, &dir.path().join("handoff"));
        let photo = write_test_photo(dir.path());

        controller.begin();
        pump_until_stage(&mut controller, FlowStage::SourceSelect).await;

        controller.choose_upload();
        assert_eq!(controller.stage(), FlowStage::Uploading);

        *controller.upload_path_mut() = photo.display().to_string();
        controller.submit_upload();
        pump_until_stage(&mut controller, FlowStage::Done).await;

        assert_eq!(
            controller.take_result().as_deref(),
            Some("data:image/png;base64,DDDD")
        );
        // One-shot: consumed on read.
        assert!(controller.take_result().is_none());
    }

    #[tokio::test]
    async fn registration_rejection_keeps_the_flow_on_settings() {
        let mut server = mockito::Server::new_async().await;
        let _record = server
            .mock("POST", "/record_workout")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"error","message":"database locked"}"#)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let mut controller = controller_for(&server, dir.path());

        controller.begin();
        for _ in 0..100 {
            controller.pump_events();
            if controller.last_error().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert_eq!(controller.stage(), FlowStage::Settings);
        assert!(!controller.registering());
        assert!(controller
            .last_error()
            .unwrap()
            .contains("database locked"));
    }

    #[tokio::test]
    async fn failed_submission_lands_in_failed_with_a_retry_path() {
        let mut server = mockito::Server::new_async().await;
        let _record = server
            .mock("POST", "/record_workout")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success"}"#)
            .create_async()
            .await;
        let _process = server
            .mock("POST", "/process_image")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"error","message":"graph rendering failed"}"#)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let mut controller = controller_for(&server, &dir.path().join("handoff"));
        let photo = write_test_photo(dir.path());

        controller.begin();
        pump_until_stage(&mut controller, FlowStage::SourceSelect).await;
        controller.choose_upload();
        *controller.upload_path_mut() = photo.display().to_string();
        controller.submit_upload();
        pump_until_stage(&mut controller, FlowStage::Failed).await;

        assert!(controller
            .last_error()
            .unwrap()
            .contains("graph rendering failed"));

        controller.retry();
        assert_eq!(controller.stage(), FlowStage::Settings);
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn bad_upload_path_stays_on_uploading() {
        let mut server = mockito::Server::new_async().await;
        let _record = server
            .mock("POST", "/record_workout")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success"}"#)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let mut controller = controller_for(&server, dir.path());

        controller.begin();
        pump_until_stage(&mut controller, FlowStage::SourceSelect).await;
        controller.choose_upload();
        *controller.upload_path_mut() = "/nope/missing.png".to_string();
        controller.submit_upload();

        for _ in 0..100 {
            controller.pump_events();
            if controller.last_error().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(controller.stage(), FlowStage::Uploading);
    }

    #[test]
    fn dates_default_to_the_current_year() {
        let year = Utc::now().year();
        let settings = Settings::default();
        let api = Arc::new(
            ApiClient::new("http://127.0.0.1:1".to_string(), Duration::from_secs(1)).unwrap(),
        );
        let dir = tempdir().unwrap();
        let handoff = HandoffStore::at(dir.path().to_path_buf()).unwrap();
        let controller = FlowController::new(settings, api, handoff);
        assert_eq!(controller.start_date, format!("{year}-01-01"));
        assert_eq!(controller.end_date, format!("{year}-12-31"));
    }
}
