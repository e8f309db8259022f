use crate::geometry::{FloatType, PlaneVector, WorldVector};

use super::LightSource;

/// Raises every intensity to at least a fixed floor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AmbientLight {
    pub intensity: FloatType,
}

impl AmbientLight {
    pub fn new(intensity: FloatType) -> AmbientLight {
        AmbientLight { intensity }
    }
}

impl LightSource for AmbientLight {
    fn apply(&self, intensities: &mut [FloatType], _normals: &[WorldVector]) {
        for intensity in intensities {
            *intensity = intensity.min(1.0).max(self.intensity);
        }
    }
}

/// Light coming from infinitely far away, lambertian.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels in. Doesn't need to be normalized.
    pub direction: WorldVector,
    pub intensity: FloatType,
}

impl DirectionalLight {
    pub fn new(x: FloatType, y: FloatType, z: FloatType, intensity: FloatType) -> DirectionalLight {
        DirectionalLight {
            direction: WorldVector::new(x, y, z),
            intensity,
        }
    }

    /// Direction in xyz, intensity in w.
    pub fn from_vector(vector: &PlaneVector) -> DirectionalLight {
        Self::new(vector.x, vector.y, vector.z, vector.w)
    }

    pub fn to_vector(&self) -> PlaneVector {
        self.direction.push(self.intensity)
    }
}

impl LightSource for DirectionalLight {
    fn apply(&self, intensities: &mut [FloatType], normals: &[WorldVector]) {
        assert_eq!(intensities.len(), normals.len());

        // A light without direction lights nothing.
        let Some(towards_light) = (-self.direction).try_normalize(0.0) else {
            return;
        };

        for (intensity, normal) in intensities.iter_mut().zip(normals) {
            let term = (self.intensity * normal.dot(&towards_light)).max(0.0);
            *intensity = intensity.max(term).min(1.0);
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
}

impl LightSource for Light {
    fn apply(&self, intensities: &mut [FloatType], normals: &[WorldVector]) {
        match self {
            Light::Ambient(light) => light.apply(intensities, normals),
            Light::Directional(light) => light.apply(intensities, normals),
        }
    }
}

impl From<AmbientLight> for Light {
    fn from(light: AmbientLight) -> Self {
        Light::Ambient(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;
    use test_case::test_case;

    #[test_case(0.0, 0.5 ; "raised to floor")]
    #[test_case(0.75, 0.75 ; "above floor kept")]
    #[test_case(1.5, 1.0 ; "capped")]
    fn ambient(current: f32, expected: f32) {
        let mut intensities = [current];
        AmbientLight::new(0.5).apply(&mut intensities, &[WorldVector::z()]);
        assert!(intensities[0] == expected);
    }

    #[test]
    fn directional_faces_light() {
        let light = DirectionalLight::new(0.0, 0.0, -2.0, 0.8);
        let normals = [
            WorldVector::z(),
            -WorldVector::z(),
            WorldVector::new(0.0, 0.6, 0.8),
        ];
        let mut intensities = [0.1; 3];
        light.apply(&mut intensities, &normals);

        assert!((intensities[0] - 0.8).abs() < 1e-6);
        // Facing away, stays at the previous value.
        assert!(intensities[1] == 0.1);
        assert!((intensities[2] - 0.64).abs() < 1e-6);
    }

    #[test]
    fn directional_is_capped() {
        let mut intensities = [0.0];
        DirectionalLight::new(0.0, 0.0, -1.0, 3.0).apply(&mut intensities, &[WorldVector::z()]);
        assert!(intensities[0] == 1.0);
    }

    #[test]
    fn zero_direction_contributes_nothing() {
        let mut intensities = [0.25];
        DirectionalLight::new(0.0, 0.0, 0.0, 1.0).apply(&mut intensities, &[WorldVector::z()]);
        assert!(intensities[0] == 0.25);
    }

    #[test]
    fn max_based_lights_commute() {
        let normals = [WorldVector::new(0.0, 0.6, 0.8), WorldVector::x()];
        let lights: [Light; 2] = [
            AmbientLight::new(0.3).into(),
            DirectionalLight::new(0.0, -1.0, -1.0, 0.9).into(),
        ];

        let mut forward = [0.0; 2];
        lights.iter().for_each(|light| light.apply(&mut forward, &normals));
        let mut backward = [0.0; 2];
        lights.iter().rev().for_each(|light| light.apply(&mut backward, &normals));
        assert!(forward == backward);
    }

    #[test]
    fn vector_form() {
        let light = DirectionalLight::new(-1.0, 1.5, -2.25, 0.63);
        assert!(DirectionalLight::from_vector(&light.to_vector()) == light);
    }
}
