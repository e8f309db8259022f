use index_vec::{IndexSlice, IndexVec};

use crate::{
    color::{Rgba, TRANSPARENT},
    geometry::{Ray, WorldPoint, WorldVector},
    renderer::{RayTraceWorker, RenderError},
};

use super::{Decomposable as _, Light, SceneObject, Shape, Triangle};

index_vec::define_index_type! {
    pub struct TriangleIdx = usize;
}

/// Immutable, flattened snapshot of a [`super::Scene`], ready for ray tracing.
#[derive(Clone, Debug)]
pub struct FrozenScene {
    triangles: IndexVec<TriangleIdx, Triangle>,
    other_shapes: Vec<Shape>,
    lights: Vec<Light>,
}

impl FrozenScene {
    pub(super) fn new<'a>(objects: impl Iterator<Item = &'a SceneObject>) -> FrozenScene {
        let mut triangles = IndexVec::new();
        let mut other_shapes = Vec::new();
        let mut lights = Vec::new();
        let mut dropped = 0usize;

        let mut push_triangle = |triangle: Triangle| {
            if triangle.texture().is_empty() {
                dropped += 1;
            } else {
                triangles.push(triangle);
            }
        };

        for object in objects {
            match object {
                SceneObject::Triangle(triangle) => push_triangle(triangle.clone()),
                SceneObject::Cube(cube) => cube.triangles().into_iter().for_each(&mut push_triangle),
                SceneObject::Cuboid(cuboid) => {
                    cuboid.triangles().into_iter().for_each(&mut push_triangle)
                }
                SceneObject::Shape(shape) => other_shapes.push(shape.clone()),
                SceneObject::Light(light) => lights.push(*light),
            }
        }

        if dropped > 0 {
            log::debug!("Dropped {dropped} triangles with empty textures");
        }
        log::debug!(
            "Froze scene with {} triangles, {} other shapes and {} lights",
            triangles.len(),
            other_shapes.len(),
            lights.len()
        );

        FrozenScene {
            triangles,
            other_shapes,
            lights,
        }
    }

    pub fn triangles(&self) -> &IndexSlice<TriangleIdx, [Triangle]> {
        &self.triangles
    }

    pub fn other_shapes(&self) -> &[Shape] {
        &self.other_shapes
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Color of rays that hit nothing.
    pub fn default_color(&self) -> Rgba {
        TRANSPARENT
    }

    /// Traces parallel arrays of ray origins and directions, one color per ray.
    pub fn ray_trace<W: RayTraceWorker + ?Sized>(
        &self,
        origins: &[WorldPoint],
        directions: &[WorldVector],
        worker: &W,
    ) -> Result<Vec<Rgba>, RenderError> {
        worker.ray_trace(
            origins,
            directions,
            self.triangles.as_raw_slice(),
            &self.other_shapes,
            &self.lights,
            self.default_color(),
        )
    }

    pub fn ray_trace_rays<W: RayTraceWorker + ?Sized>(
        &self,
        rays: &[Ray],
        worker: &W,
    ) -> Result<Vec<Rgba>, RenderError> {
        worker.ray_trace_rays(
            rays,
            self.triangles.as_raw_slice(),
            &self.other_shapes,
            &self.lights,
            self.default_color(),
        )
    }
}
