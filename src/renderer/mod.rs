mod machinery;
mod scratch;
mod worker;

use thiserror::Error;

use crate::{
    color::Rgba,
    geometry::{Ray, WorldPoint, WorldVector},
    scene::{Light, Shape, Triangle},
};

pub use machinery::{BatchProgress, BatchSettings, JobResult, RenderJob, WorkerCount, render_batch};
pub use scratch::{Scratch, ScratchGuard, ScratchPool};
pub use worker::SimpleRayTraceWorker;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("{count} non-triangle shapes in scene, only triangles are supported")]
    UnsupportedShapes { count: usize },
    #[error("got {origins} ray origins but {directions} ray directions")]
    RayCountMismatch { origins: usize, directions: usize },
}

/// Rendering kernel, turns rays into colors.
pub trait RayTraceWorker: Send + Sync {
    /// Traces rays given as parallel arrays of origins and directions.
    /// Returns one color per ray, `default_color` for rays that hit nothing.
    fn ray_trace(
        &self,
        origins: &[WorldPoint],
        directions: &[WorldVector],
        triangles: &[Triangle],
        other_shapes: &[Shape],
        lights: &[Light],
        default_color: Rgba,
    ) -> Result<Vec<Rgba>, RenderError>;

    fn ray_trace_rays(
        &self,
        rays: &[Ray],
        triangles: &[Triangle],
        other_shapes: &[Shape],
        lights: &[Light],
        default_color: Rgba,
    ) -> Result<Vec<Rgba>, RenderError> {
        let (origins, directions): (Vec<_>, Vec<_>) =
            rays.iter().map(|ray| (ray.origin, ray.direction)).unzip();
        self.ray_trace(
            &origins,
            &directions,
            triangles,
            other_shapes,
            lights,
            default_color,
        )
    }
}
