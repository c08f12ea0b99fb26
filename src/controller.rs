use egui::{Color32, Pos2};
use futures::future::{FutureExt, LocalBoxFuture};
use image::RgbaImage;

use crate::auth::AuthGate;
use crate::brush::BrushState;
use crate::config::PaintConfig;
use crate::error::{SaveError, SnapshotResult};
use crate::export::{EXPORT_FILE_NAME, ExportSink};
use crate::history::{DEFAULT_HISTORY_DEPTH, History, Restore};
use crate::input::{InputEvent, InputStateMachine, StrokeCommand};
use crate::surface::DrawingSurface;

/// Result of a save request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nobody is signed in; a sign-in prompt was requested and nothing was exported
    SignInRequired,
    /// The image was exported and delivered
    Saved { location: String },
}

/// An undo/redo whose snapshot is still being decoded
struct PendingRestore {
    restore: Restore,
    decode: LocalBoxFuture<'static, SnapshotResult<RgbaImage>>,
}

/// Owns every piece of canvas state and applies user intents to it.
///
/// While a restore is pending the surface may still show the old pixels, so
/// stroke starts, clears, saves and further undo/redo are refused until it lands.
pub struct PaintController {
    surface: DrawingSurface,
    history: History,
    input: InputStateMachine,
    brush: BrushState,
    pending: Option<PendingRestore>,
    export_file_name: String,
}

impl std::fmt::Debug for PaintController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintController")
            .field("surface", &self.surface)
            .field("history", &format!("{}/{}", self.history.current_step(), self.history.len()))
            .field("input", &self.input.state())
            .field("brush", &self.brush)
            .field("restoring", &self.pending.is_some())
            .finish()
    }
}

impl PaintController {
    /// A blank canvas with the default brush and history depth
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_parts(width, height, BrushState::default(), DEFAULT_HISTORY_DEPTH, EXPORT_FILE_NAME)
    }

    pub fn from_config(width: u32, height: u32, config: &PaintConfig) -> Self {
        Self::with_parts(
            width,
            height,
            config.initial_brush(),
            config.history_depth,
            &config.export_file_name,
        )
    }

    fn with_parts(width: u32, height: u32, brush: BrushState, depth: usize, export_file_name: &str) -> Self {
        let mut controller = Self {
            surface: DrawingSurface::new(width, height),
            history: History::new(depth),
            input: InputStateMachine::new(),
            brush,
            pending: None,
            export_file_name: export_file_name.to_owned(),
        };
        // Baseline: the blank canvas is the first thing undo can return to.
        controller.record_snapshot();
        controller
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn input(&self) -> &InputStateMachine {
        &self.input
    }

    pub fn brush(&self) -> BrushState {
        self.brush
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_restoring(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_brush(&mut self, brush: BrushState) {
        self.brush = brush;
    }

    pub fn set_color(&mut self, color: Color32) {
        self.brush.set_color(color);
    }

    /// Returns false if `hex` is not a `#rrggbb` color
    pub fn set_color_hex(&mut self, hex: &str) -> bool {
        self.brush.set_color_hex(hex)
    }

    /// Out-of-range widths are clamped into [1, 50]
    pub fn set_brush_width(&mut self, width: u32) {
        self.brush.set_width(width);
    }

    /// Where the surface's top-left corner sits on screen
    pub fn set_surface_origin(&mut self, origin: Pos2) {
        self.input.set_origin(origin);
    }

    /// Feed one pointer or touch event through the input state machine
    pub fn handle_input(&mut self, event: &InputEvent) {
        if let Some(command) = self.input.handle(event) {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: StrokeCommand) {
        match command {
            StrokeCommand::Begin(point) => {
                if self.pending.is_some() {
                    log::debug!("Stroke refused while a restore is pending");
                    self.input.reset();
                    return;
                }
                self.surface.begin_stroke(point);
            }
            StrokeCommand::Extend(point) => self.surface.extend_stroke(point, &self.brush),
            StrokeCommand::End => {
                if self.surface.end_stroke() {
                    self.record_snapshot();
                }
            }
        }
    }

    /// Erase the canvas and record the blank state
    pub fn clear(&mut self) -> bool {
        if self.pending.is_some() {
            log::debug!("Clear refused while a restore is pending");
            return false;
        }
        log::info!("Clearing canvas");
        self.input.reset();
        self.surface.clear();
        self.record_snapshot();
        true
    }

    /// Start restoring the previous snapshot. Returns false if nothing was issued.
    pub fn undo(&mut self) -> bool {
        if !self.ready_for_history_move("Undo") {
            return false;
        }
        match self.history.undo() {
            Some(restore) => {
                self.begin_restore(restore);
                true
            }
            None => false,
        }
    }

    /// Start restoring the next snapshot. Returns false if nothing was issued.
    pub fn redo(&mut self) -> bool {
        if !self.ready_for_history_move("Redo") {
            return false;
        }
        match self.history.redo() {
            Some(restore) => {
                self.begin_restore(restore);
                true
            }
            None => false,
        }
    }

    /// Make progress on a pending restore without blocking.
    ///
    /// Returns `None` while nothing is pending or the decode is not done yet.
    pub fn poll_restore(&mut self) -> Option<SnapshotResult<()>> {
        let pending = self.pending.as_mut()?;
        let result = pending.decode.as_mut().now_or_never()?;
        let pending = self.pending.take()?;
        Some(self.finish_restore(&pending.restore, result))
    }

    /// Wait for a pending restore to land.
    ///
    /// The restore stays parked until its decode resolves, so dropping this
    /// future early leaves it for the next `poll_restore`.
    pub async fn settle(&mut self) -> Option<SnapshotResult<()>> {
        let result = self.pending.as_mut()?.decode.as_mut().await;
        let pending = self.pending.take()?;
        Some(self.finish_restore(&pending.restore, result))
    }

    /// Reallocate the surface, keeping the current pixels at the origin.
    ///
    /// The timeline is left alone; older snapshots are clipped or padded when
    /// they are restored into the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
    }

    /// Export and deliver the canvas if someone is signed in
    pub fn save(&mut self, auth: &mut dyn AuthGate, sink: &mut dyn ExportSink) -> Result<SaveOutcome, SaveError> {
        if !auth.is_signed_in() {
            log::info!("Save requires sign-in");
            auth.request_sign_in();
            return Ok(SaveOutcome::SignInRequired);
        }
        if self.pending.is_some() {
            return Err(SaveError::RestorePending);
        }

        let png = self.surface.export_image()?;
        let location = sink.deliver(&self.export_file_name, &png)?;
        Ok(SaveOutcome::Saved { location })
    }

    fn ready_for_history_move(&self, action: &str) -> bool {
        if self.pending.is_some() {
            log::debug!("{} refused while a restore is pending", action);
            return false;
        }
        if self.surface.is_stroking() {
            log::debug!("{} refused while a stroke is in progress", action);
            return false;
        }
        true
    }

    fn begin_restore(&mut self, restore: Restore) {
        log::debug!(
            "Restoring step {} -> {} (snapshot {})",
            restore.from,
            restore.to,
            restore.snapshot.id()
        );
        let decode = restore.snapshot.decode();
        self.pending = Some(PendingRestore { restore, decode });
    }

    fn finish_restore(&mut self, restore: &Restore, result: SnapshotResult<RgbaImage>) -> SnapshotResult<()> {
        match result {
            Ok(raster) => {
                self.surface.restore(&raster);
                Ok(())
            }
            Err(err) => {
                log::error!("Restore failed: {}", err);
                self.history.rollback(restore);
                Err(err)
            }
        }
    }

    fn record_snapshot(&mut self) {
        match self.surface.capture() {
            Ok(snapshot) => self.history.snapshot(snapshot),
            Err(err) => log::error!("Failed to capture snapshot: {}", err),
        }
    }
}
