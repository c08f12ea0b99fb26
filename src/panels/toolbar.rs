use crate::PaintApp;
use crate::brush::{MAX_BRUSH_WIDTH, MIN_BRUSH_WIDTH, to_hex_color};
use egui::Slider;

pub(crate) fn hex_input_id() -> egui::Id {
    egui::Id::new("brush_hex_color")
}

/// Color, brush size and the undo/redo/clear/save buttons
pub fn toolbar(app: &mut PaintApp, ui: &mut egui::Ui) {
    ui.horizontal_wrapped(|ui| {
        let mut brush = app.controller().brush();

        // Color picker
        ui.label("Color");
        let mut color = brush.color();
        if egui::color_picker::color_edit_button_srgba(ui, &mut color, egui::color_picker::Alpha::Opaque).changed() {
            brush.set_color(color);
            app.set_brush(brush);
            *app.hex_input_mut() = to_hex_color(color);
        }

        let hex = ui.add(
            egui::TextEdit::singleline(app.hex_input_mut())
                .id(hex_input_id())
                .desired_width(70.0),
        );
        if hex.lost_focus() {
            let text = app.hex_input_mut().clone();
            if brush.set_color_hex(&text) {
                app.set_brush(brush);
            } else {
                app.set_status(format!("Invalid color {text:?}, expected #rrggbb"));
                *app.hex_input_mut() = to_hex_color(brush.color());
            }
        }

        ui.separator();

        // Brush size slider
        let mut width = brush.width();
        ui.label(format!("Brush Size: {}px", width));
        if ui
            .add(Slider::new(&mut width, MIN_BRUSH_WIDTH..=MAX_BRUSH_WIDTH).show_value(false))
            .changed()
        {
            brush.set_width(width);
            app.set_brush(brush);
        }

        ui.separator();

        let can_undo = app.controller().can_undo() && !app.controller().is_restoring();
        let can_redo = app.controller().can_redo() && !app.controller().is_restoring();

        if ui.add_enabled(can_undo, egui::Button::new("↺ Undo")).on_hover_text("Undo").clicked() {
            app.undo();
        }
        if ui.add_enabled(can_redo, egui::Button::new("↻ Redo")).on_hover_text("Redo").clicked() {
            app.redo();
        }
        if ui.button("🗑 Clear").on_hover_text("Clear canvas").clicked() {
            app.clear();
        }
        if ui.button("⬇ Save").on_hover_text("Save artwork").clicked() {
            app.save();
        }
    });
}
