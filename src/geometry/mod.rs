mod ray_triangle_intersection;
mod triangle;

pub use triangle::Triangle;

pub type FloatType = f32;

pub type ScreenPoint = nalgebra::Point2<u32>;
pub type ScreenSize = nalgebra::Vector2<u32>;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;

/// Plane equation coefficients `(A, B, C, D)` of `Ax + By + Cz + D = 0`.
pub type PlaneVector = nalgebra::Vector4<FloatType>;

/// Integer texel coordinates. May be negative or past the texture size,
/// nothing along the UV mapping path clamps them.
pub type TexturePixel = nalgebra::Point2<i64>;
pub type TextureSize = nalgebra::Vector2<u32>;

pub const EPSILON: FloatType = 1e-6;

/// Sentinel returned by intersection routines when there is no hit.
pub const INVALID_POINT: WorldPoint = WorldPoint::new(FloatType::NAN, FloatType::NAN, FloatType::NAN);

/// Any NaN component marks a point as "no intersection".
pub fn is_invalid_point(point: &WorldPoint) -> bool {
    point.coords.iter().any(|c| c.is_nan())
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Direction of the ray, not necessarily normalized.
    pub direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray { origin, direction }
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction * distance
    }
}
