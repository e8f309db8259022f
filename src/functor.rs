//! Pure geometry of textured triangles: containment, plane equations, ray
//! intersection, normals and UV mapping.
//!
//! Every operation has a scalar and a batched form. The batched forms are
//! provided in terms of the scalar ones, so their results are bitwise identical.

use crate::geometry::{
    EPSILON, INVALID_POINT, PlaneVector, TexturePixel, TextureSize, Triangle, WorldPoint,
    WorldVector,
};

/// Which faces of a triangle a ray can hit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Sidedness {
    /// Only the front face, the one the normal points out of.
    Single,
    #[default]
    Double,
}

pub trait TriangleFunctor: Send + Sync {
    /// Whether `pos` lies within the triangle, edges and vertices included.
    fn contains(&self, triangle: &Triangle<WorldPoint>, pos: &WorldPoint) -> bool;

    /// Coefficients `(A, B, C, D)` where `(A, B, C)` is the unnormalized normal
    /// and `D = P1 · normal`.
    fn plane_vector(&self, triangle: &Triangle<WorldPoint>) -> PlaneVector;

    /// Intersection of a line with the triangle, `INVALID_POINT` if none.
    fn intersects(
        &self,
        triangle: &Triangle<WorldPoint>,
        origin: &WorldPoint,
        direction: &WorldVector,
    ) -> WorldPoint;

    /// Like [`TriangleFunctor::intersects`], but rays hitting the back face miss.
    fn intersects_single_sided(
        &self,
        triangle: &Triangle<WorldPoint>,
        origin: &WorldPoint,
        direction: &WorldVector,
    ) -> WorldPoint;

    /// Unit normal following the winding order. Zero vector for degenerate triangles.
    fn normal_vector(&self, triangle: &Triangle<WorldPoint>) -> WorldVector;

    /// Maps a point of the triangle to texel coordinates.
    /// `P2 - P1` is the texture's x axis, `P3 - P1` its y axis. Not clamped.
    fn texture_uv(
        &self,
        triangle: &Triangle<WorldPoint>,
        pos: &WorldPoint,
        texture_size: &TextureSize,
    ) -> TexturePixel;

    fn intersects_sided(
        &self,
        triangle: &Triangle<WorldPoint>,
        origin: &WorldPoint,
        direction: &WorldVector,
        sidedness: Sidedness,
    ) -> WorldPoint {
        match sidedness {
            Sidedness::Single => self.intersects_single_sided(triangle, origin, direction),
            Sidedness::Double => self.intersects(triangle, origin, direction),
        }
    }

    fn contains_all(
        &self,
        triangles: &[Triangle<WorldPoint>],
        positions: &[WorldPoint],
        out: &mut [bool],
    ) {
        assert_eq!(triangles.len(), positions.len());
        assert_eq!(triangles.len(), out.len());
        for ((triangle, pos), out) in triangles.iter().zip(positions).zip(out) {
            *out = self.contains(triangle, pos);
        }
    }

    fn plane_vectors(&self, triangles: &[Triangle<WorldPoint>], out: &mut [PlaneVector]) {
        assert_eq!(triangles.len(), out.len());
        for (triangle, out) in triangles.iter().zip(out) {
            *out = self.plane_vector(triangle);
        }
    }

    fn normal_vectors(&self, triangles: &[Triangle<WorldPoint>], out: &mut [WorldVector]) {
        assert_eq!(triangles.len(), out.len());
        for (triangle, out) in triangles.iter().zip(out) {
            *out = self.normal_vector(triangle);
        }
    }

    /// Intersects the i-th ray with the i-th triangle.
    fn intersect_all(
        &self,
        triangles: &[Triangle<WorldPoint>],
        origins: &[WorldPoint],
        directions: &[WorldVector],
        sidedness: Sidedness,
        out: &mut [WorldPoint],
    ) {
        assert_eq!(triangles.len(), origins.len());
        assert_eq!(triangles.len(), directions.len());
        assert_eq!(triangles.len(), out.len());
        for (i, out) in out.iter_mut().enumerate() {
            *out = self.intersects_sided(&triangles[i], &origins[i], &directions[i], sidedness);
        }
    }

    /// Intersects every ray with every triangle.
    /// The result for ray `r` and triangle `t` is at `out[r * triangles.len() + t]`.
    fn intersect_grid(
        &self,
        origins: &[WorldPoint],
        directions: &[WorldVector],
        triangles: &[Triangle<WorldPoint>],
        sidedness: Sidedness,
        out: &mut [WorldPoint],
    ) {
        assert_eq!(origins.len(), directions.len());
        assert_eq!(origins.len() * triangles.len(), out.len());
        if triangles.is_empty() {
            return;
        }
        for ((origin, direction), row) in origins
            .iter()
            .zip(directions)
            .zip(out.chunks_exact_mut(triangles.len()))
        {
            for (triangle, out) in triangles.iter().zip(row) {
                *out = self.intersects_sided(triangle, origin, direction, sidedness);
            }
        }
    }

    fn texture_uvs(
        &self,
        triangles: &[Triangle<WorldPoint>],
        positions: &[WorldPoint],
        texture_sizes: &[TextureSize],
        out: &mut [TexturePixel],
    ) {
        assert_eq!(triangles.len(), positions.len());
        assert_eq!(triangles.len(), texture_sizes.len());
        assert_eq!(triangles.len(), out.len());
        for (i, out) in out.iter_mut().enumerate() {
            *out = self.texture_uv(&triangles[i], &positions[i], &texture_sizes[i]);
        }
    }
}

/// Straightforward one-at-a-time implementation.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScalarTriangleFunctor;

impl TriangleFunctor for ScalarTriangleFunctor {
    fn contains(&self, triangle: &Triangle<WorldPoint>, pos: &WorldPoint) -> bool {
        if triangle.iter().any(|vertex| vertex == pos) {
            return true;
        }

        let normal = triangle.normal();
        let normal_length = normal.norm();
        if normal_length < EPSILON {
            return false;
        }
        let distance = normal.dot(&(pos - triangle[0])).abs() / normal_length;
        if distance > EPSILON {
            return false;
        }

        let a = triangle[0] - pos;
        let b = triangle[1] - pos;
        let c = triangle[2] - pos;
        let ab = a.cross(&b);
        let bc = b.cross(&c);
        let ca = c.cross(&a);

        ab.dot(&bc) >= 0.0 && bc.dot(&ca) >= 0.0 && ca.dot(&ab) >= 0.0
    }

    fn plane_vector(&self, triangle: &Triangle<WorldPoint>) -> PlaneVector {
        let normal = triangle.normal();
        normal.push(triangle[0].coords.dot(&normal))
    }

    fn intersects(
        &self,
        triangle: &Triangle<WorldPoint>,
        origin: &WorldPoint,
        direction: &WorldVector,
    ) -> WorldPoint {
        triangle.intersect(origin, direction)
    }

    fn intersects_single_sided(
        &self,
        triangle: &Triangle<WorldPoint>,
        origin: &WorldPoint,
        direction: &WorldVector,
    ) -> WorldPoint {
        if direction.dot(&triangle.normal()) > 0.0 {
            return INVALID_POINT;
        }
        triangle.intersect(origin, direction)
    }

    fn normal_vector(&self, triangle: &Triangle<WorldPoint>) -> WorldVector {
        triangle
            .normal()
            .try_normalize(0.0)
            .unwrap_or_else(WorldVector::zeros)
    }

    fn texture_uv(
        &self,
        triangle: &Triangle<WorldPoint>,
        pos: &WorldPoint,
        texture_size: &TextureSize,
    ) -> TexturePixel {
        let [e12, e13] = triangle.edges();
        let offset = pos - triangle[0];
        let u = offset.dot(&e12) / e12.norm_squared();
        let v = offset.dot(&e13) / e13.norm_squared();
        TexturePixel::new(
            (u * texture_size.x as f32).floor() as i64,
            (v * texture_size.y as f32).floor() as i64,
        )
    }
}
