use crate::auth::{AuthGate, LocalSession};
use crate::brush::{BrushSettings, BrushState, to_hex_color};
use crate::config::PaintConfig;
use crate::controller::{PaintController, SaveOutcome};
use crate::export::ExportSink;
use crate::input::{InputEvent, InputHandler};
use crate::panels::{self, CanvasView};

/// The Aurora Atelier window: header, toolbar, canvas and footer around one
/// [`PaintController`].
pub struct PaintApp {
    config: PaintConfig,
    controller: PaintController,
    session: LocalSession,
    sink: Box<dyn ExportSink>,
    input: InputHandler,
    canvas: CanvasView,
    hex_input: String,
    status: Option<String>,
}

impl Default for PaintApp {
    fn default() -> Self {
        Self::with_config(PaintConfig::default())
    }
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: PaintConfig) -> Self {
        let mut app = Self::with_config(config);

        // Load previous brush settings (if any).
        if let Some(storage) = cc.storage {
            if let Some(settings) = eframe::get_value::<BrushSettings>(storage, eframe::APP_KEY) {
                let mut brush = app.controller.brush();
                settings.apply_to(&mut brush);
                app.set_brush(brush);
            }
        }
        app
    }

    pub fn with_config(config: PaintConfig) -> Self {
        // The surface is sized on the first frame, once the layout is known.
        let controller = PaintController::from_config(0, 0, &config);
        let hex_input = to_hex_color(controller.brush().color());
        let sink = default_sink(&config);
        Self {
            config,
            controller,
            session: LocalSession::new(),
            sink,
            input: InputHandler::new(),
            canvas: CanvasView::default(),
            hex_input,
            status: None,
        }
    }

    pub fn config(&self) -> &PaintConfig {
        &self.config
    }

    pub fn controller(&self) -> &PaintController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PaintController {
        &mut self.controller
    }

    pub fn session(&self) -> &LocalSession {
        &self.session
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub(crate) fn hex_input_mut(&mut self) -> &mut String {
        &mut self.hex_input
    }

    pub(crate) fn canvas_parts(&mut self) -> (&mut CanvasView, &PaintController) {
        (&mut self.canvas, &self.controller)
    }

    pub fn set_brush(&mut self, brush: BrushState) {
        self.controller.set_brush(brush);
        self.hex_input = to_hex_color(brush.color());
    }

    pub fn undo(&mut self) {
        if self.controller.undo() {
            self.settle_restore();
        }
    }

    pub fn redo(&mut self) {
        if self.controller.redo() {
            self.settle_restore();
        }
    }

    pub fn clear(&mut self) {
        if self.controller.clear() {
            self.status = None;
        }
    }

    pub fn save(&mut self) {
        match self.controller.save(&mut self.session, self.sink.as_mut()) {
            Ok(SaveOutcome::SignInRequired) => self.set_status("Sign in to save your artwork"),
            Ok(SaveOutcome::Saved { location }) => self.set_status(format!("Saved to {location}")),
            Err(err) => {
                log::error!("Save failed: {}", err);
                self.set_status(format!("Save failed: {err}"));
            }
        }
    }

    /// Translate this frame's pointer events for the canvas at `rect`.
    ///
    /// Only presses inside `visible` on `layer` start strokes. Nothing reaches
    /// the canvas while the sign-in modal is up.
    pub(crate) fn handle_canvas_input(
        &mut self,
        ctx: &egui::Context,
        rect: egui::Rect,
        visible: egui::Rect,
        layer: egui::LayerId,
    ) {
        self.controller.set_surface_origin(rect.min);
        if self.session.is_prompt_open() {
            if self.controller.input().is_drawing() {
                self.controller.handle_input(&InputEvent::PointerCancel);
            }
            return;
        }
        for event in self.input.process_input(ctx, visible, layer) {
            self.controller.handle_input(&event);
        }
    }

    /// Lay out one frame of the whole window
    pub fn show(&mut self, ctx: &egui::Context) {
        self.settle_restore();
        self.handle_shortcuts(ctx);

        self.header(ctx);
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| panels::toolbar(self, ui));
        self.footer(ctx);
        panels::canvas_panel(self, ctx);
        self.sign_in_modal(ctx);

        if self.controller.is_restoring() {
            ctx.request_repaint();
        }
    }

    /// Land a pending restore if its decode is done
    fn settle_restore(&mut self) {
        if let Some(Err(err)) = self.controller.poll_restore() {
            self.set_status(format!("Could not restore that step: {err}"));
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, KeyboardShortcut, Modifiers};

        // Text fields keep their own undo
        if ctx.wants_keyboard_input() {
            return;
        }

        let redo_shift = KeyboardShortcut::new(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z);
        let redo_y = KeyboardShortcut::new(Modifiers::COMMAND, Key::Y);
        let undo = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);

        // Shift+Z first: the plain undo shortcut would match it as well.
        if ctx.input_mut(|i| i.consume_shortcut(&redo_shift) || i.consume_shortcut(&redo_y)) {
            self.redo();
        } else if ctx.input_mut(|i| i.consume_shortcut(&undo)) {
            self.undo();
        }
    }

    fn header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Aurora Atelier");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.session.is_signed_in() {
                        if ui.button("Sign out").clicked() {
                            self.session.sign_out();
                        }
                        ui.label("Signed in");
                    } else if ui.button("Sign in").clicked() {
                        self.session.request_sign_in();
                    }
                });
            });
        });
    }

    fn footer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                if let Some(status) = &self.status {
                    ui.label(status);
                }
                ui.strong("\"Every brushstroke shapes a new reality.\"");
                ui.small("Express your creativity, one stroke at a time.");
            });
        });
    }

    fn sign_in_modal(&mut self, ctx: &egui::Context) {
        if !self.session.is_prompt_open() {
            return;
        }
        egui::Window::new("Sign in")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("Sign in to save your artwork.");
                ui.horizontal(|ui| {
                    if ui.button("Sign in").clicked() {
                        self.session.sign_in();
                        self.status = None;
                    }
                    if ui.button("Cancel").clicked() {
                        self.session.dismiss_prompt();
                    }
                });
            });
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &BrushSettings::from(self.controller.brush()));
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_sink(config: &PaintConfig) -> Box<dyn ExportSink> {
    Box::new(crate::export::FileSink::new(&config.export_directory))
}

#[cfg(target_arch = "wasm32")]
fn default_sink(_config: &PaintConfig) -> Box<dyn ExportSink> {
    Box::new(crate::export::DownloadSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MemorySink;
    use egui::{Event, Key, Modifiers, Pos2, Rect, pos2, vec2};

    fn test_app() -> (PaintApp, egui::Context) {
        let mut app = PaintApp::default();
        app.sink = Box::new(MemorySink::default());
        let ctx = egui::Context::default();
        // Two frames so the layout and window areas settle
        run_frame(&mut app, &ctx, vec![]);
        run_frame(&mut app, &ctx, vec![]);
        (app, ctx)
    }

    fn run_frame(app: &mut PaintApp, ctx: &egui::Context, events: Vec<Event>) {
        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, vec2(1000.0, 800.0))),
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| app.show(ctx));
    }

    fn button(pos: Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: Modifiers::default(),
        }
    }

    fn key(key: Key, modifiers: Modifiers) -> Event {
        Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    fn drag(app: &mut PaintApp, ctx: &egui::Context, from: Pos2, to: Pos2) {
        run_frame(app, ctx, vec![Event::PointerMoved(from), button(from, true)]);
        run_frame(app, ctx, vec![Event::PointerMoved(to)]);
        run_frame(app, ctx, vec![button(to, false)]);
    }

    fn stroke(app: &mut PaintApp, from: Pos2, to: Pos2) {
        app.controller.handle_input(&InputEvent::PointerDown { position: from });
        app.controller.handle_input(&InputEvent::PointerMove { position: to });
        app.controller.handle_input(&InputEvent::PointerUp);
    }

    fn canvas_rect(app: &PaintApp) -> Rect {
        let (width, height) = app.controller.surface().size();
        Rect::from_min_size(app.controller.input().origin(), vec2(width as f32, height as f32))
    }

    fn painted(app: &PaintApp) -> usize {
        app.controller.surface().raster().pixels().filter(|p| p.0[3] != 0).count()
    }

    #[test]
    fn test_canvas_is_sized_from_the_window() {
        let (app, _ctx) = test_app();
        assert_eq!(app.controller.surface().size(), (800, 560));
    }

    #[test]
    fn test_drag_on_canvas_draws_a_stroke() {
        let (mut app, ctx) = test_app();
        let from = canvas_rect(&app).center();
        drag(&mut app, &ctx, from, from + vec2(20.0, 0.0));

        assert_eq!(app.controller.history().len(), 2);
        assert!(painted(&app) > 0);
    }

    #[test]
    fn test_drag_on_sign_in_modal_leaves_canvas_alone() {
        let (mut app, ctx) = test_app();
        stroke(&mut app, pos2(150.0, 200.0), pos2(250.0, 200.0));
        assert!(app.controller.undo());
        run_frame(&mut app, &ctx, vec![]);
        assert!(app.controller.can_redo());

        app.session.request_sign_in();
        run_frame(&mut app, &ctx, vec![]);
        run_frame(&mut app, &ctx, vec![]);

        // The modal is anchored at the window centre, over the canvas
        let centre = pos2(500.0, 400.0);
        assert!(canvas_rect(&app).contains(centre));
        drag(&mut app, &ctx, centre, centre + vec2(20.0, 0.0));

        assert_eq!(app.controller.history().len(), 2);
        assert!(app.controller.can_redo());
        assert_eq!(painted(&app), 0);
    }

    #[test]
    fn test_status_line_does_not_clip_the_canvas() {
        let (mut app, ctx) = test_app();
        let rect = canvas_rect(&app);
        let y = rect.bottom() - 3.0;
        stroke(&mut app, pos2(rect.left() + 10.0, y), pos2(rect.left() + 100.0, y));
        let size = app.controller.surface().size();
        let before = app.controller.surface().raster().clone();
        assert!(painted(&app) > 0);

        app.save();
        assert_eq!(app.status(), Some("Sign in to save your artwork"));
        run_frame(&mut app, &ctx, vec![]);
        run_frame(&mut app, &ctx, vec![]);

        app.status = None;
        app.session.dismiss_prompt();
        run_frame(&mut app, &ctx, vec![]);
        run_frame(&mut app, &ctx, vec![]);

        assert_eq!(app.controller.surface().size(), size);
        assert_eq!(app.controller.surface().raster(), &before);
    }

    #[test]
    fn test_shortcuts_undo_and_redo() {
        let (mut app, ctx) = test_app();
        stroke(&mut app, pos2(150.0, 200.0), pos2(250.0, 200.0));
        let drawn = painted(&app);

        run_frame(&mut app, &ctx, vec![key(Key::Z, Modifiers::COMMAND)]);
        assert_eq!(app.controller.history().current_step(), 0);
        assert_eq!(painted(&app), 0);

        run_frame(&mut app, &ctx, vec![key(Key::Z, Modifiers::COMMAND | Modifiers::SHIFT)]);
        assert_eq!(app.controller.history().current_step(), 1);
        assert_eq!(painted(&app), drawn);

        run_frame(&mut app, &ctx, vec![key(Key::Z, Modifiers::COMMAND)]);
        run_frame(&mut app, &ctx, vec![key(Key::Y, Modifiers::COMMAND)]);
        assert_eq!(app.controller.history().current_step(), 1);
    }

    #[test]
    fn test_shortcuts_are_skipped_while_editing_hex_color() {
        let (mut app, ctx) = test_app();
        stroke(&mut app, pos2(150.0, 200.0), pos2(250.0, 200.0));

        let field = panels::hex_input_id();
        ctx.memory_mut(|memory| memory.request_focus(field));
        run_frame(&mut app, &ctx, vec![key(Key::Z, Modifiers::COMMAND)]);
        assert_eq!(app.controller.history().current_step(), 1);

        ctx.memory_mut(|memory| memory.surrender_focus(field));
        run_frame(&mut app, &ctx, vec![key(Key::Z, Modifiers::COMMAND)]);
        assert_eq!(app.controller.history().current_step(), 0);
    }
}
