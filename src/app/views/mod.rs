pub mod camera_view;
pub mod result_view;
pub mod settings_view;
pub mod source_view;
pub mod status_view;
pub mod upload_view;

use crate::flow::FlowController;

/// One view per flow stage. Views render controller state and forward user
/// intent back to it; they keep no flow state of their own beyond UI caches.
pub trait View {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut FlowController);
}

pub use camera_view::{CameraLiveView, CameraOptionsView};
pub use result_view::ResultView;
pub use settings_view::SettingsView;
pub use source_view::SourceView;
pub use status_view::{FailedView, ProcessingView};
pub use upload_view::UploadView;
