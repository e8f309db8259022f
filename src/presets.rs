//! Standard setup for rendering block item icons.

use crate::{
    camera::OrthogonalCamera,
    geometry::{FloatType, ScreenSize, WorldPoint, WorldVector},
    scene::{AmbientLight, DirectionalLight, Light},
};

pub const ICON_CAMERA_POSITION: WorldPoint = WorldPoint::new(4.01, -4.0, 4.0 / 1.27);
pub const ICON_SCENE_WIDTH: FloatType = 1.62;
pub const ICON_SCENE_HEIGHT: FloatType = 1.61;
pub const ICON_AMBIENT_INTENSITY: FloatType = 0.5;
pub const ICON_SUN: DirectionalLight = DirectionalLight {
    direction: WorldVector::new(-1.0, 1.5, -2.25),
    intensity: 0.63,
};

pub fn icon_camera_direction() -> WorldVector {
    WorldVector::new(-1.0, 1.0, -1.0 / 1.27).normalize()
}

/// Up vector perpendicular to `direction`, as close to `+z` as possible.
pub fn up_from_fuzzy(direction: &WorldVector, fuzzy_up: &WorldVector) -> WorldVector {
    direction.cross(&fuzzy_up.cross(direction)).normalize()
}

/// Isometric-ish view of a unit block centered at the origin.
pub fn icon_camera(resolution: ScreenSize) -> OrthogonalCamera {
    let direction = icon_camera_direction();
    OrthogonalCamera::builder()
        .position(ICON_CAMERA_POSITION)
        .direction(direction)
        .up(up_from_fuzzy(&direction, &WorldVector::z()))
        .resolution(resolution)
        .scene_width(ICON_SCENE_WIDTH)
        .scene_height(ICON_SCENE_HEIGHT)
        .build()
}

pub fn icon_lights(ambient: FloatType) -> [Light; 2] {
    [AmbientLight::new(ambient).into(), ICON_SUN.into()]
}
