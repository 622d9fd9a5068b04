pub mod controller;
pub mod state;

pub use controller::{ControllerEvent, FlowController};
pub use state::{FlowEvent, FlowMachine, FlowStage};
