use bon::bon;
use itertools::izip;
use ordered_float::OrderedFloat;

use crate::{
    color::{self, Rgba},
    functor::{ScalarTriangleFunctor, Sidedness, TriangleFunctor},
    geometry::{Ray, WorldPoint, WorldVector, is_invalid_point},
    scene::{Light, LightSource as _, Shape, Triangle},
    util::sort,
};

use super::{
    RayTraceWorker, RenderError,
    scratch::{Scratch, ScratchPool},
};

/// Brute force ray tracer: every ray is tested against every triangle.
///
/// Hits along a ray are composited nearest first. Non-triangle shapes are rejected.
#[derive(Debug)]
pub struct SimpleRayTraceWorker<F: TriangleFunctor = ScalarTriangleFunctor> {
    functor: F,
    sidedness: Sidedness,
    pool: ScratchPool,
}

#[bon]
impl SimpleRayTraceWorker<ScalarTriangleFunctor> {
    /// `max_idle_scratch` is the number of idle scratch buffer sets kept between calls,
    /// the CPU count by default.
    #[builder]
    pub fn new(
        #[builder(default)] sidedness: Sidedness,
        max_idle_scratch: Option<usize>,
    ) -> Self {
        Self::with_functor(ScalarTriangleFunctor, sidedness, max_idle_scratch)
    }
}

impl Default for SimpleRayTraceWorker<ScalarTriangleFunctor> {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl<F: TriangleFunctor> SimpleRayTraceWorker<F> {
    pub fn with_functor(functor: F, sidedness: Sidedness, max_idle_scratch: Option<usize>) -> Self {
        SimpleRayTraceWorker {
            functor,
            sidedness,
            pool: ScratchPool::new(max_idle_scratch.unwrap_or_else(num_cpus::get)),
        }
    }

    pub fn sidedness(&self) -> Sidedness {
        self.sidedness
    }

    pub fn scratch_pool(&self) -> &ScratchPool {
        &self.pool
    }

    fn trace(
        &self,
        scratch: &mut Scratch,
        origins: &[WorldPoint],
        directions: &[WorldVector],
        triangles: &[Triangle],
        lights: &[Light],
        default_color: Rgba,
    ) -> Vec<Rgba> {
        let triangle_count = triangles.len();

        scratch
            .geometry
            .extend(triangles.iter().map(|triangle| triangle.geometry().clone()));
        self.functor
            .normal_vectors(&scratch.geometry, &mut scratch.normals);
        self.functor.intersect_grid(
            origins,
            directions,
            &scratch.geometry,
            self.sidedness,
            &mut scratch.hits,
        );

        let mut total_hits = 0usize;
        let mut result = Vec::with_capacity(origins.len());

        for (ray_index, origin) in origins.iter().enumerate() {
            let row = &scratch.hits[ray_index * triangle_count..(ray_index + 1) * triangle_count];

            scratch.hit_indices.clear();
            for (triangle_index, hit) in row.iter().enumerate() {
                if !is_invalid_point(hit) {
                    scratch.distances[triangle_index] = (hit - origin).norm_squared();
                    scratch.hit_indices.push(triangle_index);
                }
            }

            if scratch.hit_indices.is_empty() {
                result.push(default_color);
                continue;
            }
            total_hits += scratch.hit_indices.len();

            let distances = &scratch.distances;
            sort::sort_by_key(&mut scratch.hit_indices, |index| {
                OrderedFloat(distances[*index])
            });

            scratch.hit_normals.clear();
            scratch
                .hit_normals
                .extend(scratch.hit_indices.iter().map(|index| scratch.normals[*index]));
            scratch.intensities.clear();
            scratch.intensities.resize(scratch.hit_indices.len(), 0.0);
            for light in lights {
                light.apply(&mut scratch.intensities, &scratch.hit_normals);
            }

            scratch.colors.clear();
            for (index, intensity) in izip!(&scratch.hit_indices, &scratch.intensities) {
                let triangle = &triangles[*index];
                let texture = triangle.texture();
                let uv = self
                    .functor
                    .texture_uv(&scratch.geometry[*index], &row[*index], &texture.size());
                let mut color = color::unpack(texture.sample_clamped(&uv));
                color::apply_light_intensity(&mut color, *intensity);
                scratch.colors.push(color);
            }

            let mut composite = scratch.colors[0];
            for layer in &scratch.colors[1..] {
                if composite.a >= 1.0 {
                    break;
                }
                color::composite_under(&mut composite, layer);
            }
            result.push(composite);
        }

        log::debug!(
            "Traced {} rays against {} triangles, {} hits",
            origins.len(),
            triangle_count,
            total_hits
        );

        result
    }
}

impl<F: TriangleFunctor> RayTraceWorker for SimpleRayTraceWorker<F> {
    fn ray_trace(
        &self,
        origins: &[WorldPoint],
        directions: &[WorldVector],
        triangles: &[Triangle],
        other_shapes: &[Shape],
        lights: &[Light],
        default_color: Rgba,
    ) -> Result<Vec<Rgba>, RenderError> {
        check_input(origins.len(), directions.len(), other_shapes)?;

        let mut scratch = self.pool.checkout(origins.len(), triangles.len());
        Ok(self.trace(
            &mut scratch,
            origins,
            directions,
            triangles,
            lights,
            default_color,
        ))
    }

    fn ray_trace_rays(
        &self,
        rays: &[Ray],
        triangles: &[Triangle],
        other_shapes: &[Shape],
        lights: &[Light],
        default_color: Rgba,
    ) -> Result<Vec<Rgba>, RenderError> {
        check_input(rays.len(), rays.len(), other_shapes)?;

        let mut scratch = self.pool.checkout(rays.len(), triangles.len());
        let mut origins = std::mem::take(&mut scratch.origins);
        let mut directions = std::mem::take(&mut scratch.directions);
        origins.extend(rays.iter().map(|ray| ray.origin));
        directions.extend(rays.iter().map(|ray| ray.direction));

        let result = self.trace(
            &mut scratch,
            &origins,
            &directions,
            triangles,
            lights,
            default_color,
        );

        scratch.origins = origins;
        scratch.directions = directions;
        Ok(result)
    }
}

fn check_input(origins: usize, directions: usize, other_shapes: &[Shape]) -> Result<(), RenderError> {
    if origins != directions {
        return Err(RenderError::RayCountMismatch {
            origins,
            directions,
        });
    }
    if !other_shapes.is_empty() {
        return Err(RenderError::UnsupportedShapes {
            count: other_shapes.len(),
        });
    }
    Ok(())
}
