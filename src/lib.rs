#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod auth;
pub mod brush;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod history;
pub mod input;
pub mod panels;
pub mod snapshot;
pub mod surface;

pub use app::PaintApp;
pub use auth::{AuthGate, LocalSession};
pub use brush::BrushState;
pub use config::PaintConfig;
pub use controller::{PaintController, SaveOutcome};
pub use error::{SaveError, SnapshotError, SurfaceError};
pub use export::{EXPORT_FILE_NAME, ExportSink};
pub use history::History;
pub use input::{InputEvent, InputStateMachine, StrokeCommand};
pub use snapshot::Snapshot;
pub use surface::DrawingSurface;
