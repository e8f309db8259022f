use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use crate::{
    color::Rgba,
    geometry::{FloatType, Triangle, WorldPoint, WorldVector},
};

/// Working memory of one ray tracing call.
///
/// The `rays * triangles` sized buffers are the expensive ones, everything
/// else is per ray and small.
#[derive(Debug, Default)]
pub struct Scratch {
    rays: usize,
    triangles: usize,

    pub geometry: Vec<Triangle<WorldPoint>>,
    pub normals: Vec<WorldVector>,
    /// Intersection of ray `r` with triangle `t` at `r * triangles + t`.
    pub hits: Vec<WorldPoint>,
    pub distances: Vec<FloatType>,

    pub origins: Vec<WorldPoint>,
    pub directions: Vec<WorldVector>,

    pub hit_indices: Vec<usize>,
    pub hit_normals: Vec<WorldVector>,
    pub intensities: Vec<FloatType>,
    pub colors: Vec<Rgba>,
}

impl Scratch {
    /// Number of rays and triangles the buffers are sized for.
    pub fn shape(&self) -> (usize, usize) {
        (self.rays, self.triangles)
    }

    fn prepare(&mut self, rays: usize, triangles: usize) {
        self.rays = rays;
        self.triangles = triangles;

        self.geometry.clear();
        self.normals.clear();
        self.normals.resize(triangles, WorldVector::zeros());
        self.hits.clear();
        self.hits.resize(rays * triangles, WorldPoint::origin());
        self.distances.clear();
        self.distances.resize(triangles, 0.0);

        self.origins.clear();
        self.directions.clear();
        self.hit_indices.clear();
        self.hit_normals.clear();
        self.intensities.clear();
        self.colors.clear();
    }
}

/// Pool of scratch buffers, checked out for the duration of one call.
///
/// Each checkout is exclusive, concurrent calls never share buffers.
/// Returned buffers are kept for reuse up to `max_idle`, the rest is freed.
#[derive(Debug)]
pub struct ScratchPool {
    idle: Mutex<Vec<Scratch>>,
    max_idle: usize,
}

impl ScratchPool {
    pub fn new(max_idle: usize) -> ScratchPool {
        ScratchPool {
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    pub fn max_idle(&self) -> usize {
        self.max_idle
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Hands out buffers sized for the given shape.
    /// Prefers idle buffers last used with the same shape.
    pub fn checkout(&self, rays: usize, triangles: usize) -> ScratchGuard<'_> {
        let reused = {
            let mut idle = self.idle.lock();
            let position = idle
                .iter()
                .rposition(|scratch| scratch.shape() == (rays, triangles))
                .or_else(|| idle.len().checked_sub(1));
            position.map(|position| idle.swap_remove(position))
        };

        let mut scratch = match reused {
            Some(scratch) => {
                log::trace!(
                    "Reusing scratch buffers of shape {:?} for {rays} rays x {triangles} triangles",
                    scratch.shape()
                );
                scratch
            }
            None => {
                log::trace!("Allocating scratch buffers for {rays} rays x {triangles} triangles");
                Scratch::default()
            }
        };
        scratch.prepare(rays, triangles);

        ScratchGuard {
            pool: self,
            scratch: Some(scratch),
        }
    }

    fn give_back(&self, scratch: Scratch) {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(scratch);
        }
    }
}

pub struct ScratchGuard<'a> {
    pool: &'a ScratchPool,
    scratch: Option<Scratch>,
}

impl Deref for ScratchGuard<'_> {
    type Target = Scratch;

    fn deref(&self) -> &Scratch {
        self.scratch
            .as_ref()
            .unwrap_or_else(|| unreachable!("Scratch is only taken on drop"))
    }
}

impl DerefMut for ScratchGuard<'_> {
    fn deref_mut(&mut self) -> &mut Scratch {
        self.scratch
            .as_mut()
            .unwrap_or_else(|| unreachable!("Scratch is only taken on drop"))
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        if let Some(scratch) = self.scratch.take() {
            self.pool.give_back(scratch);
        }
    }
}
