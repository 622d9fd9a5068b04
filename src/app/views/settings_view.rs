use crate::app::views::View;
use crate::flow::FlowController;
use crate::overlay::{PositionPreset, SizePreset};

#[derive(Default)]
pub struct SettingsView;

impl View for SettingsView {
    fn draw(&mut self, ui: &mut egui::Ui, controller: &mut FlowController) {
        ui.heading("Workout photo settings");
        ui.separator();

        egui::ComboBox::from_label("Graph size")
            .selected_text(controller.size_mut().label())
            .show_ui(ui, |ui| {
                for size in SizePreset::ALL {
                    ui.selectable_value(controller.size_mut(), size, size.label());
                }
            });

        egui::ComboBox::from_label("Graph position")
            .selected_text(controller.position_mut().label())
            .show_ui(ui, |ui| {
                for position in PositionPreset::ALL {
                    ui.selectable_value(controller.position_mut(), position, position.label());
                }
            });

        ui.horizontal(|ui| {
            ui.label("Start date");
            ui.text_edit_singleline(controller.start_date_mut());
        });
        ui.horizontal(|ui| {
            ui.label("End date");
            ui.text_edit_singleline(controller.end_date_mut());
        });

        ui.separator();

        let registering = controller.registering();
        let label = if registering {
            "Registering workout..."
        } else {
            "Start"
        };
        if ui
            .add_enabled(!registering, egui::Button::new(label))
            .clicked()
        {
            controller.begin();
        }
    }
}
