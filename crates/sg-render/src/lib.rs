pub mod hit;
pub mod project;
pub mod surface;

pub use hit::{HitTarget, hit_target};
pub use project::{NodeProjection, project};
pub use surface::{MemorySurface, Surface};
