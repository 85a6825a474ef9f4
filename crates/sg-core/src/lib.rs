pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod id;
pub mod model;

pub use config::EditorConfig;
pub use error::{EngineError, ErrorKind};
pub use geometry::{GridDelta, PixelRect, ResizeHandle, Viewport};
pub use grid::{GridSpan, MinSize};
pub use id::{ElementId, IdShape};
pub use model::*;
