use super::{EPSILON, FloatType, INVALID_POINT, Triangle, WorldPoint, WorldVector};

impl Triangle<WorldPoint> {
    /// Calculates the intersection of a line with the (two sided) triangle.
    /// Returns the intersection point, or `INVALID_POINT` if there is none.
    ///
    /// Only the barycentric coordinates are checked, the distance along the ray is not,
    /// so triangles behind the ray origin are hit as well.
    /// Adapted from https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm
    pub fn intersect(&self, origin: &WorldPoint, direction: &WorldVector) -> WorldPoint {
        let [e1, e2] = self.edges();

        let p = direction.cross(&e2);
        let det = e1.dot(&p);
        if det > -EPSILON && det < EPSILON {
            // Ray is parallel to the plane of the triangle
            return INVALID_POINT;
        }

        let inv_det = 1.0 / det;
        let t_vec = origin - self[0];
        let u = t_vec.dot(&p) * inv_det;
        if u < -EPSILON || u > 1.0 + EPSILON {
            return INVALID_POINT;
        }

        let q = t_vec.cross(&e1);
        let v = direction.dot(&q) * inv_det;
        if v < -EPSILON || u + v > 1.0 + EPSILON {
            return INVALID_POINT;
        }

        let w: FloatType = 1.0 - u - v;
        if w <= -EPSILON {
            return INVALID_POINT;
        }

        WorldPoint::from(self[0].coords * w + self[1].coords * u + self[2].coords * v)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::is_invalid_point;
    use assert2::assert;
    use test_case::test_case;

    fn unit_triangle() -> Triangle<WorldPoint> {
        Triangle::new(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(0.0, 1.0, 0.0),
            WorldPoint::new(1.0, 0.0, 0.0),
        )
    }

    #[test_case(0.125, 0.125 ; "interior")]
    #[test_case(0.0, 0.0 ; "vertex")]
    #[test_case(0.5, 0.5 ; "hypotenuse")]
    #[test_case(0.0, 0.7 ; "leg")]
    fn hits_inside(x: f32, y: f32) {
        let hit = unit_triangle().intersect(
            &WorldPoint::new(x, y, 3.0),
            &WorldVector::new(0.0, 0.0, -1.0),
        );
        assert!((hit - WorldPoint::new(x, y, 0.0)).norm() < 1e-5);
    }

    #[test_case(0.75, 0.75 ; "past hypotenuse")]
    #[test_case(-0.1, 0.5 ; "left of leg")]
    #[test_case(0.5, -0.1 ; "below leg")]
    fn misses_outside(x: f32, y: f32) {
        let hit = unit_triangle().intersect(
            &WorldPoint::new(x, y, 3.0),
            &WorldVector::new(0.0, 0.0, -1.0),
        );
        assert!(is_invalid_point(&hit));
    }

    #[test]
    fn parallel_ray_misses() {
        let hit = unit_triangle().intersect(
            &WorldPoint::new(0.1, 0.1, 0.0),
            &WorldVector::new(1.0, 1.0, 0.0),
        );
        assert!(is_invalid_point(&hit));
    }

    #[test]
    fn origin_behind_triangle_still_hits() {
        let hit = unit_triangle().intersect(
            &WorldPoint::new(0.2, 0.2, -3.0),
            &WorldVector::new(0.0, 0.0, -1.0),
        );
        assert!((hit - WorldPoint::new(0.2, 0.2, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn degenerate_triangle_never_hits() {
        let triangle = Triangle::new(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(1.0, 1.0, 0.0),
            WorldPoint::new(2.0, 2.0, 0.0),
        );
        let hit = triangle.intersect(
            &WorldPoint::new(1.0, 1.0, 1.0),
            &WorldVector::new(0.0, 0.0, -1.0),
        );
        assert!(is_invalid_point(&hit));
    }
}
