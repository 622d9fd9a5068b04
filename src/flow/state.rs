use crate::error::FlowError;

/// The stages of one capture flow, in the order a user normally walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Settings,
    SourceSelect,
    CameraOptions,
    CameraLive,
    Uploading,
    Processing,
    Done,
    Failed,
}

/// Inputs to the flow machine. Data rides on the controller, not the event;
/// the machine only decides whether a stage change is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    WorkoutRecorded,
    ChooseCamera,
    ChooseUpload,
    StreamOpened,
    StreamFailed,
    SwitchFacing,
    SnapshotTaken,
    UploadDecoded,
    DecodeFailed,
    ProcessSucceeded,
    ProcessFailed,
    Retry,
    StartOver,
}

/// Guarded stage machine. Every transition goes through `apply`; an event
/// that is not legal in the current stage is rejected instead of performed.
#[derive(Debug)]
pub struct FlowMachine {
    stage: FlowStage,
}

impl Default for FlowMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowMachine {
    pub fn new() -> Self {
        Self {
            stage: FlowStage::Settings,
        }
    }

    pub fn stage(&self) -> FlowStage {
        self.stage
    }

    pub fn apply(&mut self, event: FlowEvent) -> Result<FlowStage, FlowError> {
        let next = Self::transition(self.stage, event)?;
        self.stage = next;
        Ok(next)
    }

    fn transition(stage: FlowStage, event: FlowEvent) -> Result<FlowStage, FlowError> {
        use FlowEvent::*;
        use FlowStage::*;

        let next = match (stage, event) {
            (Settings, WorkoutRecorded) => SourceSelect,
            (SourceSelect, ChooseCamera) => CameraOptions,
            (SourceSelect, ChooseUpload) => Uploading,
            // Camera failure leaves the user on the options stage, where
            // upload remains available as a fallback.
            (CameraOptions, StreamOpened) => CameraLive,
            (CameraOptions, StreamFailed) => CameraOptions,
            (CameraOptions, ChooseUpload) => Uploading,
            (CameraLive, SwitchFacing) => CameraLive,
            (CameraLive, StreamFailed) => CameraOptions,
            (CameraLive, SnapshotTaken) => Processing,
            (Uploading, UploadDecoded) => Processing,
            (Uploading, DecodeFailed) => Uploading,
            (Processing, ProcessSucceeded) => Done,
            (Processing, ProcessFailed) => Failed,
            (Failed, Retry) => Settings,
            (Done, StartOver) => Settings,
            (stage, event) => return Err(FlowError::InvalidTransition { stage, event }),
        };
        Ok(next)
    }
}
