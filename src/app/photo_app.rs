use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::app::views::{
    CameraLiveView, CameraOptionsView, FailedView, ProcessingView, ResultView, SettingsView,
    SourceView, UploadView, View,
};
use crate::config::Settings;
use crate::error::AppError;
use crate::flow::{FlowController, FlowStage};
use crate::handoff::HandoffStore;

pub struct PhotoApp {
    controller: FlowController,
    settings_view: SettingsView,
    source_view: SourceView,
    camera_options_view: CameraOptionsView,
    camera_live_view: CameraLiveView,
    upload_view: UploadView,
    processing_view: ProcessingView,
    failed_view: FailedView,
    result_view: ResultView,
}

impl PhotoApp {
    pub fn new(controller: FlowController) -> Self {
        Self {
            controller,
            settings_view: SettingsView,
            source_view: SourceView,
            camera_options_view: CameraOptionsView,
            camera_live_view: CameraLiveView,
            upload_view: UploadView,
            processing_view: ProcessingView,
            failed_view: FailedView,
            result_view: ResultView::default(),
        }
    }

    pub fn start_gui(settings: Settings) -> Result<(), AppError> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(egui::vec2(1024.0, 768.0))
                .with_title("Mulambo - Workout Photos"),
            ..Default::default()
        };

        let api = Arc::new(ApiClient::from_settings(&settings.server)?);
        let handoff = HandoffStore::open()?;
        let controller = FlowController::new(settings, api, handoff);

        info!("Starting capture-and-compose UI");
        eframe::run_native(
            "Mulambo - Workout Photos",
            options,
            Box::new(move |_cc| Ok(Box::new(PhotoApp::new(controller)))),
        )
        .map_err(|e| AppError::Ui(e.to_string()))
    }
}

impl eframe::App for PhotoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.pump_events();

        // The failed stage shows its error itself; everywhere else surface
        // the last error in a bottom strip, the flow keeps running.
        if self.controller.stage() != FlowStage::Failed {
            if let Some(message) = self
                .controller
                .last_error()
                .map(|message| message.to_string())
            {
                egui::TopBottomPanel::bottom("error_panel").show(ctx, |ui| {
                    ui.label(format!("[ERROR] {message}"));
                });
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.controller.stage() {
            FlowStage::Settings => self.settings_view.draw(ui, &mut self.controller),
            FlowStage::SourceSelect => self.source_view.draw(ui, &mut self.controller),
            FlowStage::CameraOptions => self.camera_options_view.draw(ui, &mut self.controller),
            FlowStage::CameraLive => self.camera_live_view.draw(ui, &mut self.controller),
            FlowStage::Uploading => self.upload_view.draw(ui, &mut self.controller),
            FlowStage::Processing => self.processing_view.draw(ui, &mut self.controller),
            FlowStage::Done => self.result_view.draw(ui, &mut self.controller),
            FlowStage::Failed => self.failed_view.draw(ui, &mut self.controller),
        });

        ctx.request_repaint();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.teardown();
    }
}
