mod canvas_panel;
mod toolbar;

pub use canvas_panel::{CanvasView, canvas_panel};
pub use toolbar::toolbar;
#[cfg(test)]
pub(crate) use toolbar::hex_input_id;
