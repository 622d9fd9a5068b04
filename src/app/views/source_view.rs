use crate::app::views::View;
use crate::flow::FlowController;

#[derive(Default)]
pub struct SourceView;

impl View for SourceView {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut FlowController) {
        ui.heading("Where is the photo coming from?");
        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Use the camera").clicked() {
                controller.choose_camera();
            }
            if ui.button("Upload a file").clicked() {
                controller.choose_upload();
            }
        });
    }
}
