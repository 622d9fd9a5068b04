use egui::TextureOptions;

use crate::app::views::View;
use crate::flow::FlowController;

#[derive(Default)]
pub struct CameraOptionsView;

impl View for CameraOptionsView {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut FlowController) {
        ui.heading("Camera");
        ui.separator();

        ui.label(format!(
            "Facing mode: {}",
            controller.facing().as_str()
        ));

        ui.horizontal(|ui| {
            if ui.button("Open camera").clicked() {
                controller.open_camera();
            }
            if ui.button("Upload a file instead").clicked() {
                controller.choose_upload();
            }
        });
    }
}

#[derive(Default)]
pub struct CameraLiveView;

impl View for CameraLiveView {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut FlowController) {
        ui.heading("Live preview");
        ui.separator();

        if let Some(frame) = controller.latest_frame() {
            let image = frame.image().to_rgb8();
            let color_image = egui::ColorImage::from_rgb(
                [image.width() as usize, image.height() as usize],
                image.as_raw().as_slice(),
            );
            let texture_handle =
                ui.ctx()
                    .load_texture("camera_preview", color_image, TextureOptions::default());
            ui.add(
                egui::Image::new(&texture_handle)
                    .max_size(egui::vec2(800.0, 600.0))
                    .maintain_aspect_ratio(true),
            );
        } else {
            ui.spinner();
            ui.label("Waiting for the first frame...");
        }

        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Self-timer (seconds)");
            ui.add(egui::DragValue::new(controller.timer_secs_mut()).range(0..=10));
        });

        ui.horizontal(|ui| {
            match controller.countdown() {
                Some(remaining) => {
                    ui.add_enabled(false, egui::Button::new(format!("Photo in {remaining}...")));
                }
                None => {
                    if ui.button("Take photo").clicked() {
                        controller.snap();
                    }
                }
            }
            if ui.button("Switch camera").clicked() {
                controller.switch_facing();
            }
        });
    }
}
