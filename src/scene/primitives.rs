use crate::{
    color::{self, Rgba},
    functor::{ScalarTriangleFunctor, TriangleFunctor as _},
    geometry::{
        self, EPSILON, FloatType, PlaneVector, Ray, TextureSize, WorldPoint, WorldVector,
        is_invalid_point,
    },
    texture::Texture,
};

use super::{Intersectable, Planar};

/// Color reported for points of untextured triangles.
pub const FALLBACK_COLOR: Rgba = Rgba {
    r: 0.5,
    g: 0.5,
    b: 0.5,
    a: 0.5,
};

/// Textured triangle.
///
/// The texture's x axis runs along `P2 - P1`, its y axis along `P3 - P1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    geometry: geometry::Triangle<WorldPoint>,
    texture: Texture,
}

impl Triangle {
    /// Untextured triangle.
    pub fn new(a: WorldPoint, b: WorldPoint, c: WorldPoint) -> Triangle {
        Self::with_texture(a, b, c, Texture::fallback())
    }

    pub fn with_texture(a: WorldPoint, b: WorldPoint, c: WorldPoint, texture: Texture) -> Triangle {
        Self::from_geometry(geometry::Triangle::new(a, b, c), texture)
    }

    pub fn from_geometry(geometry: geometry::Triangle<WorldPoint>, texture: Texture) -> Triangle {
        Triangle { geometry, texture }
    }

    pub fn geometry(&self) -> &geometry::Triangle<WorldPoint> {
        &self.geometry
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn texture_size(&self) -> TextureSize {
        self.texture.size()
    }

    pub fn has_texture(&self) -> bool {
        self.texture.has_texture()
    }

    pub fn normal_vector(&self) -> WorldVector {
        ScalarTriangleFunctor.normal_vector(&self.geometry)
    }

    /// Color of the texture at a point of the triangle.
    /// Points outside of the triangle sample the nearest texel.
    pub fn texture_color(&self, pos: &WorldPoint) -> Rgba {
        if !self.has_texture() {
            return FALLBACK_COLOR;
        }
        let uv = ScalarTriangleFunctor.texture_uv(&self.geometry, pos, &self.texture.size());
        color::unpack(self.texture.sample_clamped(&uv))
    }
}

impl Intersectable for Triangle {
    fn intersect(&self, ray: &Ray) -> Option<WorldPoint> {
        let hit = ScalarTriangleFunctor.intersects(&self.geometry, &ray.origin, &ray.direction);
        (!is_invalid_point(&hit)).then_some(hit)
    }

    fn contains(&self, pos: &WorldPoint) -> bool {
        ScalarTriangleFunctor.contains(&self.geometry, pos)
    }
}

impl Planar for Triangle {
    fn plane_vector(&self) -> PlaneVector {
        ScalarTriangleFunctor.plane_vector(&self.geometry)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: WorldPoint,
    pub radius: FloatType,
}

impl Sphere {
    pub fn new(center: WorldPoint, radius: FloatType) -> Sphere {
        Sphere { center, radius }
    }
}

impl Intersectable for Sphere {
    /// Nearest intersection in front of the ray origin.
    fn intersect(&self, ray: &Ray) -> Option<WorldPoint> {
        let a = ray.direction.norm_squared();
        if a == 0.0 {
            return None;
        }
        let oc = ray.origin - self.center;
        let b = oc.dot(&ray.direction) / a;
        let c = (oc.dot(&oc) - self.radius * self.radius) / a;
        let discriminant = b * b - c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = -b - sqrt_disc;
        let t2 = -b + sqrt_disc;
        let t = if t1 > 0.0 {
            t1
        } else if t2 > 0.0 {
            t2
        } else {
            return None;
        };

        Some(ray.point_at(t))
    }

    /// Whether the point lies on the surface of the sphere.
    fn contains(&self, pos: &WorldPoint) -> bool {
        ((pos - self.center).norm() - self.radius).abs() <= EPSILON * self.radius.max(1.0)
    }
}

/// Primitive shapes other than triangles.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
}

impl Intersectable for Shape {
    fn intersect(&self, ray: &Ray) -> Option<WorldPoint> {
        match self {
            Shape::Sphere(sphere) => sphere.intersect(ray),
        }
    }

    fn contains(&self, pos: &WorldPoint) -> bool {
        match self {
            Shape::Sphere(sphere) => sphere.contains(pos),
        }
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}
