//! Chart rendering via the external renderer binary

mod options;
mod runner;

pub use options::{ChartKind, RenderOptions, TimeScale};
pub use runner::{click_map_path, image_path, RenderError, RenderOutcome, Renderer};
