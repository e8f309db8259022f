mod frozen;
mod light;
mod primitives;
mod solids;

use indexmap::IndexMap;

use crate::geometry::{FloatType, PlaneVector, Ray, WorldPoint, WorldVector};

pub use frozen::{FrozenScene, TriangleIdx};
pub use light::{AmbientLight, DirectionalLight, Light};
pub use primitives::{FALLBACK_COLOR, Shape, Sphere, Triangle};
pub use solids::{Cube, CubeFace, Cuboid, UvRect};

/// Objects that a ray can hit.
pub trait Intersectable {
    /// Point where the ray (extended in both directions for triangles) meets the object.
    fn intersect(&self, ray: &Ray) -> Option<WorldPoint>;

    /// Whether the point lies on the surface of the object.
    fn contains(&self, pos: &WorldPoint) -> bool;
}

pub trait Planar {
    /// Coefficients of `Ax + By + Cz + D = 0`.
    fn plane_vector(&self) -> PlaneVector;
}

/// Solids that are rendered as a set of triangles.
pub trait Decomposable {
    /// Builds new triangles on every call.
    fn triangles(&self) -> Vec<Triangle>;
}

pub trait LightSource {
    /// Updates per hit light intensities, given the unit normals at the hits.
    fn apply(&self, intensities: &mut [FloatType], normals: &[WorldVector]);
}

#[derive(Clone, Debug, PartialEq)]
pub enum SceneObject {
    Triangle(Triangle),
    Cube(Cube),
    Cuboid(Cuboid),
    Shape(Shape),
    Light(Light),
}

macro_rules! scene_object_from {
    ($($type:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$type> for SceneObject {
                fn from(value: $type) -> Self {
                    SceneObject::$variant(value.into())
                }
            }
        )*
    };
}

scene_object_from! {
    Triangle => Triangle,
    Cube => Cube,
    Cuboid => Cuboid,
    Shape => Shape,
    Sphere => Shape,
    Light => Light,
    AmbientLight => Light,
    DirectionalLight => Light,
}

index_vec::define_index_type! {
    /// Handle of an object added to a [`Scene`].
    pub struct ObjectId = u32;
}

/// Mutable collection of scene objects.
///
/// Iteration follows insertion order. Rendering needs a [`FrozenScene`] snapshot,
/// created by [`Scene::freeze`].
#[derive(Clone, Debug, Default)]
pub struct Scene {
    objects: IndexMap<ObjectId, SceneObject>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Scene {
        Self::default()
    }

    pub fn add(&mut self, object: impl Into<SceneObject>) -> ObjectId {
        let id = ObjectId::from_raw(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, object.into());
        id
    }

    /// Removes an object, keeping the order of the remaining ones.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        self.objects.shift_remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    /// Flattens the current content into an immutable snapshot.
    pub fn freeze(&self) -> FrozenScene {
        FrozenScene::new(self.objects.values())
    }
}

impl<O: Into<SceneObject>> Extend<O> for Scene {
    fn extend<T: IntoIterator<Item = O>>(&mut self, iter: T) {
        for object in iter {
            self.add(object);
        }
    }
}

impl<O: Into<SceneObject>> FromIterator<O> for Scene {
    fn from_iter<T: IntoIterator<Item = O>>(iter: T) -> Self {
        let mut scene = Scene::new();
        scene.extend(iter);
        scene
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{geometry::TextureSize, texture::Texture};
    use assert2::{assert, let_assert};

    fn triangle() -> Triangle {
        Triangle::new(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(0.0, 1.0, 0.0),
            WorldPoint::new(1.0, 0.0, 0.0),
        )
    }

    #[test]
    fn add_and_remove() {
        let mut scene = Scene::new();
        let a = scene.add(triangle());
        let b = scene.add(AmbientLight::new(0.5));
        let c = scene.add(Sphere::new(WorldPoint::origin(), 1.0));
        assert!(scene.len() == 3);
        assert!(a != b);

        let_assert!(Some(SceneObject::Light(Light::Ambient(_))) = scene.remove(b));
        assert!(scene.remove(b).is_none());
        assert!(!scene.contains(b));
        assert!(scene.iter().map(|(id, _)| id).collect::<Vec<_>>() == vec![a, c]);

        // Ids are not reused.
        let d = scene.add(triangle());
        assert!(d != b);
    }

    #[test]
    fn freeze_classifies_objects() {
        let scene = [
            SceneObject::from(triangle()),
            Cube::new(WorldPoint::origin(), 1.0).into(),
            Sphere::new(WorldPoint::origin(), 1.0).into(),
            DirectionalLight::new(0.0, 0.0, -1.0, 1.0).into(),
            AmbientLight::new(0.2).into(),
        ]
        .into_iter()
        .collect::<Scene>();

        let frozen = scene.freeze();
        assert!(frozen.triangles().len() == 13);
        assert!(frozen.triangles()[TriangleIdx::new(0)] == triangle());
        assert!(frozen.other_shapes().len() == 1);
        assert!(frozen.lights().len() == 2);
        let_assert!(Light::Directional(_) = frozen.lights()[0]);
    }

    #[test]
    fn freeze_drops_triangles_without_pixels() {
        let empty = Texture::new(TextureSize::new(0, 0), Vec::<u32>::new()).unwrap();
        let mut textures: [Texture; 6] = std::array::from_fn(|_| Texture::fallback());
        textures[CubeFace::Up.index()] = empty.clone();

        let mut scene = Scene::new();
        scene.add(Cube::with_face_textures(WorldPoint::origin(), 1.0, textures));
        scene.add(Triangle::with_texture(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(0.0, 1.0, 0.0),
            WorldPoint::new(1.0, 0.0, 0.0),
            empty,
        ));

        assert!(scene.freeze().triangles().len() == 10);
    }

    #[test]
    fn frozen_snapshot_ignores_later_changes() {
        let mut scene = Scene::new();
        let id = scene.add(triangle());
        scene.add(AmbientLight::new(0.5));

        let frozen = scene.freeze();
        scene.remove(id);
        scene.add(Cube::new(WorldPoint::origin(), 1.0));
        scene.add(Sphere::new(WorldPoint::origin(), 2.0));
        scene.clear();

        assert!(frozen.triangles().len() == 1);
        assert!(frozen.triangles()[TriangleIdx::new(0)] == triangle());
        assert!(frozen.other_shapes().is_empty());
        assert!(frozen.lights() == &[Light::Ambient(AmbientLight::new(0.5))]);
    }
}
