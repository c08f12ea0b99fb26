use crate::PaintApp;
use crate::surface::DrawingSurface;
use egui::{Color32, TextureHandle, TextureOptions};

/// GPU copy of the surface, re-uploaded whenever the surface revision moves
#[derive(Default)]
pub struct CanvasView {
    texture: Option<TextureHandle>,
    revision: Option<u64>,
}

impl std::fmt::Debug for CanvasView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasView")
            .field("texture", &self.texture.as_ref().map(|t| t.size()))
            .field("revision", &self.revision)
            .finish()
    }
}

impl CanvasView {
    fn texture(&mut self, ctx: &egui::Context, surface: &DrawingSurface) -> Option<&TextureHandle> {
        let (width, height) = surface.size();
        if width == 0 || height == 0 {
            self.texture = None;
            self.revision = None;
            return None;
        }

        if self.revision != Some(surface.revision()) || self.texture.is_none() {
            let image = egui::ColorImage::from_rgba_unmultiplied(
                [width as usize, height as usize],
                surface.raster().as_raw(),
            );
            match &mut self.texture {
                Some(texture) => texture.set(image, TextureOptions::NEAREST),
                None => self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST)),
            }
            self.revision = Some(surface.revision());
        }
        self.texture.as_ref()
    }
}

pub fn canvas_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        // Sized from the window, not the panel, so footer text never resizes it
        let (width, height) = app.config().canvas_size(ctx.screen_rect().size());
        app.controller_mut().resize(width, height);

        ui.vertical_centered(|ui| {
            let size = egui::vec2(width as f32, height as f32);
            let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

            // Handle input
            let visible = rect.intersect(ui.clip_rect());
            app.handle_canvas_input(ctx, rect, visible, ui.layer_id());

            // Render the canvas
            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 8.0, Color32::WHITE);
            if let Some(texture) = app.canvas_texture(ctx) {
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(texture.id(), rect, uv, Color32::WHITE);
            }
            painter.rect_stroke(rect, 8.0, egui::Stroke::new(2.0, Color32::from_gray(0xdd)));
        });
    });
}

impl PaintApp {
    fn canvas_texture(&mut self, ctx: &egui::Context) -> Option<TextureHandle> {
        let (view, controller) = self.canvas_parts();
        view.texture(ctx, controller.surface()).cloned()
    }
}
