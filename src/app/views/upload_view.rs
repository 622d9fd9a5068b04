use crate::app::views::View;
use crate::flow::FlowController;

#[derive(Default)]
pub struct UploadView;

impl View for UploadView {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut FlowController) {
        ui.heading("Upload a photo");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("File path");
            ui.text_edit_singleline(controller.upload_path_mut());
        });

        if ui.button("Use this photo").clicked() {
            controller.submit_upload();
        }
    }
}
