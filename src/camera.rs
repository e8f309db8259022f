use std::sync::Arc;

use assert2::assert;
use bon::bon;
use image::RgbaImage;
use nalgebra::Unit;

use crate::{
    color,
    geometry::{EPSILON, FloatType, Ray, ScreenPoint, ScreenSize, WorldPoint, WorldVector},
    renderer::{RayTraceWorker, RenderError},
    scene::FrozenScene,
};

/// Rays of every pixel of a camera, row-major with row 0 at the bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct RayGrid {
    size: ScreenSize,
    origins: Vec<WorldPoint>,
    directions: Vec<WorldVector>,
}

impl RayGrid {
    pub fn size(&self) -> ScreenSize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn origins(&self) -> &[WorldPoint] {
        &self.origins
    }

    pub fn directions(&self) -> &[WorldVector] {
        &self.directions
    }

    /// Ray of grid cell `(x, y)`, with `y` growing upwards.
    pub fn ray(&self, point: &ScreenPoint) -> Option<Ray> {
        if point.x >= self.size.x || point.y >= self.size.y {
            return None;
        }
        let index = (point.y * self.size.x + point.x) as usize;
        Some(Ray::new(self.origins[index], self.directions[index]))
    }
}

/// Parallel projection camera.
///
/// All rays share the camera direction, their origins cover a
/// `scene_width` x `scene_height` rectangle centered at `position`.
/// The ray grid is computed once and reused by every render.
#[derive(Clone, Debug)]
pub struct OrthogonalCamera {
    position: WorldPoint,
    direction: WorldVector,
    up: WorldVector,
    right: Unit<WorldVector>,
    scene_width: FloatType,
    scene_height: FloatType,
    rays: Arc<RayGrid>,
}

#[bon]
impl OrthogonalCamera {
    /// `up` is used as given, only `right` is normalized.
    ///
    /// # Panics
    /// When the resolution or the scene extents are empty, or when
    /// `direction` and `up` are parallel.
    #[builder]
    pub fn new(
        position: WorldPoint,
        direction: WorldVector,
        up: WorldVector,
        resolution: ScreenSize,
        scene_width: FloatType,
        scene_height: FloatType,
    ) -> Self {
        assert!(resolution.x > 0);
        assert!(resolution.y > 0);
        assert!(scene_width > 0.0);
        assert!(scene_height > 0.0);
        let Some(right) = Unit::try_new(direction.cross(&up), EPSILON) else {
            panic!("`direction` and `up` must be linearly independent");
        };

        let rays = Arc::new(Self::ray_grid(
            &position,
            &direction,
            &up,
            &right,
            resolution,
            scene_width,
            scene_height,
        ));

        OrthogonalCamera {
            position,
            direction,
            up,
            right,
            scene_width,
            scene_height,
            rays,
        }
    }
}

impl OrthogonalCamera {
    fn ray_grid(
        position: &WorldPoint,
        direction: &WorldVector,
        up: &WorldVector,
        right: &Unit<WorldVector>,
        resolution: ScreenSize,
        scene_width: FloatType,
        scene_height: FloatType,
    ) -> RayGrid {
        let (width, height) = (resolution.x, resolution.y);
        let d_up = up * (scene_height / height as FloatType);
        let d_right = right.as_ref() * (scene_width / width as FloatType);
        let start = position - d_up * (height as FloatType * 0.5) - d_right * (width as FloatType * 0.5);

        let count = (width * height) as usize;
        let mut origins = Vec::with_capacity(count);
        for y in 0..height {
            for x in 0..width {
                origins.push(start + d_up * y as FloatType + d_right * x as FloatType);
            }
        }

        RayGrid {
            size: resolution,
            origins,
            directions: vec![*direction; count],
        }
    }

    pub fn position(&self) -> WorldPoint {
        self.position
    }

    pub fn direction(&self) -> WorldVector {
        self.direction
    }

    pub fn up(&self) -> WorldVector {
        self.up
    }

    pub fn right(&self) -> WorldVector {
        self.right.into_inner()
    }

    pub fn resolution(&self) -> ScreenSize {
        self.rays.size
    }

    pub fn scene_width(&self) -> FloatType {
        self.scene_width
    }

    pub fn scene_height(&self) -> FloatType {
        self.scene_height
    }

    pub fn aspect_ratio(&self) -> FloatType {
        self.rays.size.x as FloatType / self.rays.size.y as FloatType
    }

    pub fn rays(&self) -> &RayGrid {
        &self.rays
    }

    /// Traces the scene and assembles the image, top row first.
    pub fn render<W: RayTraceWorker + ?Sized>(
        &self,
        scene: &FrozenScene,
        worker: &W,
    ) -> Result<Rendering, RenderError> {
        let colors = scene.ray_trace(&self.rays.origins, &self.rays.directions, worker)?;

        // Ray rows grow upwards, image rows grow downwards.
        let pixels = colors
            .chunks_exact(self.rays.size.x as usize)
            .rev()
            .flat_map(|row| row.iter().map(color::pack))
            .collect();

        Ok(Rendering {
            size: self.rays.size,
            pixels,
        })
    }
}

/// Rendered image as packed `0xAARRGGBB` pixels, row-major with row 0 at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendering {
    pub size: ScreenSize,
    pub pixels: Vec<u32>,
}

impl Rendering {
    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn height(&self) -> u32 {
        self.size.y
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        self.pixels.get((y * self.size.x + x) as usize).copied()
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.size.x, self.size.y, |x, y| {
            color::packed_to_image(self.pixel(x, y).unwrap_or(color::TRANSPARENT_PACKED))
        })
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;
    use crate::{
        functor::Sidedness,
        geometry::TextureSize,
        presets,
        renderer::SimpleRayTraceWorker,
        scene::{AmbientLight, Cube, CubeFace, Scene, Sphere, Triangle},
        texture::{FALLBACK_PIXEL, Texture},
    };
    use assert2::{assert, let_assert};

    fn looking_down(position: WorldPoint, resolution: u32, extent: FloatType) -> OrthogonalCamera {
        OrthogonalCamera::builder()
            .position(position)
            .direction(WorldVector::new(0.0, 0.0, -1.0))
            .up(WorldVector::new(0.0, 1.0, 0.0))
            .resolution(ScreenSize::new(resolution, resolution))
            .scene_width(extent)
            .scene_height(extent)
            .build()
    }

    fn double_sided() -> SimpleRayTraceWorker {
        SimpleRayTraceWorker::builder()
            .sidedness(Sidedness::Double)
            .build()
    }

    fn single_sided() -> SimpleRayTraceWorker {
        SimpleRayTraceWorker::builder()
            .sidedness(Sidedness::Single)
            .build()
    }

    #[test]
    fn ray_grid_layout() {
        let camera = looking_down(WorldPoint::new(0.5, 0.5, 3.0), 8, 1.0);
        assert!(camera.right() == WorldVector::x());
        assert!(camera.rays().len() == 64);
        assert!(camera.aspect_ratio() == 1.0);

        let_assert!(Some(ray) = camera.rays().ray(&ScreenPoint::new(1, 1)));
        assert!((ray.origin - WorldPoint::new(0.125, 0.125, 3.0)).norm() < 1e-6);
        assert!(ray.direction == WorldVector::new(0.0, 0.0, -1.0));

        let_assert!(Some(ray) = camera.rays().ray(&ScreenPoint::new(7, 0)));
        assert!((ray.origin - WorldPoint::new(0.875, 0.0, 3.0)).norm() < 1e-6);

        assert!(camera.rays().ray(&ScreenPoint::new(8, 0)).is_none());
    }

    #[test]
    #[should_panic]
    fn parallel_up_is_rejected() {
        OrthogonalCamera::builder()
            .position(WorldPoint::origin())
            .direction(WorldVector::new(0.0, 0.0, -1.0))
            .up(WorldVector::new(0.0, 0.0, 2.0))
            .resolution(ScreenSize::new(4, 4))
            .scene_width(1.0)
            .scene_height(1.0)
            .build();
    }

    #[test]
    fn untextured_triangle_at_half_brightness() {
        let mut scene = Scene::new();
        scene.add(Triangle::new(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(0.0, 1.0, 0.0),
            WorldPoint::new(1.0, 0.0, 0.0),
        ));
        scene.add(AmbientLight::new(0.5));

        let camera = looking_down(WorldPoint::new(0.5, 0.5, 3.0), 8, 1.0);
        let rendering = camera.render(&scene.freeze(), &double_sided()).unwrap();

        assert!(rendering.size == ScreenSize::new(8, 8));
        // Ray (1, 1) lands on image row 8 - 1 - 1.
        assert!(rendering.pixel(1, 6) == Some(FALLBACK_PIXEL));
        assert!(rendering.pixel(7, 0) == Some(color::TRANSPARENT_PACKED));
        assert!(rendering.pixel(0, 7) == Some(FALLBACK_PIXEL));
        assert!(rendering.pixel(0, 0) == Some(FALLBACK_PIXEL));
        assert!(rendering.pixel(8, 0).is_none());
    }

    #[test]
    fn image_rows_are_flipped() {
        // Right triangle covering only the bottom left corner of the view.
        let mut scene = Scene::new();
        scene.add(Triangle::with_texture(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(0.0, 0.5, 0.0),
            WorldPoint::new(0.5, 0.0, 0.0),
            Texture::solid(TextureSize::new(1, 1), 0xFFFF0000),
        ));
        scene.add(AmbientLight::new(0.5));

        let camera = looking_down(WorldPoint::new(0.5, 0.5, 3.0), 4, 1.0);
        let rendering = camera.render(&scene.freeze(), &double_sided()).unwrap();

        assert!(rendering.pixel(0, 3) == Some(0xFFFF0000));
        assert!(rendering.pixel(0, 0) == Some(color::TRANSPARENT_PACKED));

        let image = rendering.to_rgba_image();
        assert!(image.dimensions() == (4, 4));
        assert!(image.get_pixel(0, 3).0 == [255, 0, 0, 255]);
        assert!(image.get_pixel(0, 0).0 == [0, 0, 0, 0]);
    }

    #[test]
    fn cube_faces_keep_their_textures() {
        let colors = [
            0xFFFF0000, 0xFF00FF00, 0xFF0000FF, 0xFFFFFF00, 0xFF00FFFF, 0xFFFF00FF,
        ];
        let textures = colors.map(|pixel| Texture::solid(TextureSize::new(1, 1), pixel));

        let mut scene = Scene::new();
        scene.add(Cube::with_face_textures(WorldPoint::origin(), 1.0, textures));
        scene.add(AmbientLight::new(0.5));

        let camera = presets::icon_camera(ScreenSize::new(32, 32));
        let rendering = camera.render(&scene.freeze(), &single_sided()).unwrap();

        let mut counts = HashMap::<u32, usize>::new();
        for pixel in &rendering.pixels {
            *counts.entry(*pixel).or_default() += 1;
        }

        let visible = [CubeFace::Front, CubeFace::Left, CubeFace::Up];
        for face in CubeFace::ALL {
            let count = counts.get(&colors[face.index()]).copied().unwrap_or(0);
            if visible.contains(&face) {
                assert!(count > 10, "face {face:?}");
            } else {
                assert!(count == 0, "face {face:?}");
            }
        }
        assert!(counts[&color::TRANSPARENT_PACKED] > 0);
        assert!(counts.len() == 4);
    }

    #[test]
    fn back_faces_only_show_when_double_sided() {
        let mut scene = Scene::new();
        scene.add(Cube::with_texture(
            WorldPoint::origin(),
            1.0,
            Texture::solid(TextureSize::new(1, 1), 0x80FFFFFF),
        ));
        scene.add(AmbientLight::new(0.5));
        let scene = scene.freeze();

        // Rays pass through the top and bottom faces, away from their diagonals.
        let camera = looking_down(WorldPoint::new(0.2, 0.1, 3.0), 2, 0.2);
        let alpha = 128.0 / 255.0;

        let single = camera.render(&scene, &single_sided()).unwrap();
        for pixel in &single.pixels {
            assert!(*pixel == 0x80FFFFFF);
        }

        let double = camera.render(&scene, &double_sided()).unwrap();
        let expected = color::pack(&color::Rgba::new(1.0, 1.0, 1.0, alpha + alpha * (1.0 - alpha)));
        for pixel in &double.pixels {
            let [_, _, _, a] = color::unpack_u8(*pixel);
            assert!(a == color::unpack_u8(expected)[3]);
            assert!(a > 0xBF);
        }
    }

    #[test]
    fn other_shapes_fail_the_render() {
        let mut scene = Scene::new();
        scene.add(Sphere::new(WorldPoint::origin(), 1.0));
        let camera = looking_down(WorldPoint::new(0.0, 0.0, 3.0), 2, 1.0);

        let_assert!(
            Err(RenderError::UnsupportedShapes { count: 1 }) =
                camera.render(&scene.freeze(), &double_sided())
        );
    }
}
