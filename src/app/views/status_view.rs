use crate::app::views::View;
use crate::flow::FlowController;

#[derive(Default)]
pub struct ProcessingView;

impl View for ProcessingView {
    fn draw(&mut self, ui: &mut egui::Ui, _controller: &mut FlowController) {
        ui.heading("Processing");
        ui.separator();
        ui.spinner();
        ui.label("Compositing your statistics graph onto the photo...");
    }
}

#[derive(Default)]
pub struct FailedView;

impl View for FailedView {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut FlowController) {
        ui.heading("Something went wrong");
        ui.separator();

        if let Some(message) = controller.last_error() {
            ui.label(message.to_string());
        }

        if ui.button("Back to settings").clicked() {
            controller.retry();
        }
    }
}
