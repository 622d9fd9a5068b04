use thiserror::Error;

use crate::flow::state::{FlowEvent, FlowStage};

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Api Error: {0}")]
    Api(#[from] ApiError),
    #[error("Camera Error: {0}")]
    Camera(#[from] CameraError),
    #[error("Flow Error: {0}")]
    Flow(#[from] FlowError),
    #[error("Image codec error: {0}")]
    Image(String),
    #[error("Handoff store error: {0}")]
    Handoff(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("UI error: {0}")]
    Ui(String),
}

// Backend API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("Failed to reach {endpoint}: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Backend rejected {endpoint}: {message}")]
    Rejected {
        endpoint: &'static str,
        message: String,
    },
    #[error("Backend reported success for process_image but returned no image")]
    MissingImage,
}

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("No camera device available for facing mode '{0}'")]
    NoDevice(String),
    #[error("Failed to open camera stream: {0}")]
    Open(String),
    #[error("Failed to read camera frame: {0}")]
    Frame(String),
}

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Event {event:?} is not valid in stage {stage:?}")]
    InvalidTransition { stage: FlowStage, event: FlowEvent },
    #[error("A submission is already in flight")]
    SubmissionInFlight,
    #[error("No snapshot available to submit")]
    NoSnapshot,
}
