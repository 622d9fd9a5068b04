use egui::TextureOptions;

use crate::app::views::View;
use crate::encode::from_data_url;
use crate::flow::FlowController;

/// Displays the composed photo handed off by the capture flow. The handoff
/// key is one-shot, so the decoded texture is cached for repeated frames.
#[derive(Default)]
pub struct ResultView {
    loaded: bool,
    texture: Option<egui::TextureHandle>,
    error: Option<String>,
}

impl ResultView {
    fn load(&mut self, ui: &egui::Ui, controller: &mut FlowController) {
        self.loaded = true;
        let Some(data_url) = controller.take_result() else {
            self.error = Some("No result found. Did the flow complete?".to_string());
            return;
        };
        match from_data_url(&data_url) {
            Ok(image) => {
                let rgb = image.to_rgb8();
                let color_image = egui::ColorImage::from_rgb(
                    [rgb.width() as usize, rgb.height() as usize],
                    rgb.as_raw().as_slice(),
                );
                self.texture = Some(ui.ctx().load_texture(
                    "composed_result",
                    color_image,
                    TextureOptions::default(),
                ));
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }
}

impl View for ResultView {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut FlowController) {
        ui.heading("Your workout photo");
        ui.separator();

        if !self.loaded {
            self.load(ui, controller);
        }

        if let Some(texture) = &self.texture {
            ui.add(
                egui::Image::new(texture)
                    .max_size(egui::vec2(800.0, 600.0))
                    .maintain_aspect_ratio(true),
            );
        } else if let Some(error) = &self.error {
            ui.label(error.to_string());
        }

        ui.separator();
        if ui.button("Start over").clicked() {
            self.loaded = false;
            self.texture = None;
            self.error = None;
            controller.start_over();
        }
    }
}
