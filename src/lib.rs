pub mod camera;
pub mod color;
pub mod functor;
pub mod geometry;
pub mod presets;
pub mod renderer;
pub mod scene;
pub mod texture;
pub mod util;

pub use crate::renderer::{BatchProgress, BatchSettings, RayTraceWorker, RenderJob, SimpleRayTraceWorker, render_batch};
pub use camera::{OrthogonalCamera, Rendering};
pub use scene::{FrozenScene, Scene};
