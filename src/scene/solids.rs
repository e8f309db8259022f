use crate::{
    geometry::{FloatType, WorldPoint, WorldVector},
    texture::Texture,
};

use super::{Decomposable, Triangle};

/// Faces of an axis aligned box, in the order their triangles are emitted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    /// -z
    Down,
    /// +y
    Right,
    /// -x
    Back,
    /// -y
    Left,
    /// +x
    Front,
    /// +z
    Up,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Down,
        CubeFace::Right,
        CubeFace::Back,
        CubeFace::Left,
        CubeFace::Front,
        CubeFace::Up,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Outward facing unit normal.
    pub fn normal(self) -> WorldVector {
        match self {
            CubeFace::Down => -WorldVector::z(),
            CubeFace::Right => WorldVector::y(),
            CubeFace::Back => -WorldVector::x(),
            CubeFace::Left => -WorldVector::y(),
            CubeFace::Front => WorldVector::x(),
            CubeFace::Up => WorldVector::z(),
        }
    }
}

/// Rectangle of a texture atlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UvRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl UvRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> UvRect {
        UvRect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Corner indices of the two triangles of each face, in `CubeFace` order.
/// Corners 0 to 3 go counter clockwise around the bottom starting at `(-x, -y)`,
/// corners 4 to 7 lie above them.
const FACE_TRIANGLES: [[[usize; 3]; 2]; 6] = [
    [[0, 3, 1], [2, 1, 3]],
    [[2, 3, 6], [7, 6, 3]],
    [[3, 0, 7], [4, 7, 0]],
    [[0, 1, 4], [5, 4, 1]],
    [[1, 2, 5], [6, 5, 2]],
    [[4, 5, 7], [6, 7, 5]],
];

/// Emits the 12 triangles of an axis aligned box.
///
/// The first triangle of each face gets the face texture rotated by 180 degrees,
/// so that together with the second one the whole face shows the texture upright.
fn box_triangles(center: &WorldPoint, half: &WorldVector, textures: &[Texture; 6]) -> Vec<Triangle> {
    let corner = |sx: FloatType, sy: FloatType, sz: FloatType| {
        center + WorldVector::new(sx * half.x, sy * half.y, sz * half.z)
    };
    let vertices = [
        corner(-1.0, -1.0, -1.0),
        corner(1.0, -1.0, -1.0),
        corner(1.0, 1.0, -1.0),
        corner(-1.0, 1.0, -1.0),
        corner(-1.0, -1.0, 1.0),
        corner(1.0, -1.0, 1.0),
        corner(1.0, 1.0, 1.0),
        corner(-1.0, 1.0, 1.0),
    ];

    let mut triangles = Vec::with_capacity(12);
    for (face, texture) in FACE_TRIANGLES.iter().zip(textures) {
        let rotated = if texture.has_texture() {
            texture.central_symmetry()
        } else {
            texture.clone()
        };
        for (indices, texture) in face.iter().zip([rotated, texture.clone()]) {
            triangles.push(Triangle::with_texture(
                vertices[indices[0]],
                vertices[indices[1]],
                vertices[indices[2]],
                texture,
            ));
        }
    }
    triangles
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cube {
    pub center: WorldPoint,
    pub length: FloatType,
    /// Indexed by [`CubeFace::index`].
    pub textures: [Texture; 6],
}

impl Cube {
    /// Untextured cube.
    pub fn new(center: WorldPoint, length: FloatType) -> Cube {
        Self::with_texture(center, length, Texture::fallback())
    }

    /// Same texture on all faces.
    pub fn with_texture(center: WorldPoint, length: FloatType, texture: Texture) -> Cube {
        Self::with_face_textures(center, length, std::array::from_fn(|_| texture.clone()))
    }

    pub fn with_face_textures(center: WorldPoint, length: FloatType, textures: [Texture; 6]) -> Cube {
        Cube {
            center,
            length,
            textures,
        }
    }

    pub fn face_texture(&self, face: CubeFace) -> &Texture {
        &self.textures[face.index()]
    }
}

impl Decomposable for Cube {
    fn triangles(&self) -> Vec<Triangle> {
        let half = WorldVector::repeat(self.length / 2.0);
        box_triangles(&self.center, &half, &self.textures)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cuboid {
    pub center: WorldPoint,
    /// Edge lengths along x, y and z.
    pub size: WorldVector,
    /// Indexed by [`CubeFace::index`].
    pub textures: [Texture; 6],
}

impl Cuboid {
    pub fn new(center: WorldPoint, size: WorldVector) -> Cuboid {
        Self::with_face_textures(center, size, std::array::from_fn(|_| Texture::fallback()))
    }

    pub fn with_face_textures(center: WorldPoint, size: WorldVector, textures: [Texture; 6]) -> Cuboid {
        Cuboid {
            center,
            size,
            textures,
        }
    }

    /// Cuts the face textures out of a single atlas.
    pub fn from_atlas(
        center: WorldPoint,
        size: WorldVector,
        atlas: &Texture,
        uv: [UvRect; 6],
    ) -> Cuboid {
        let textures = uv.map(|rect| atlas.slice(rect.x, rect.y, rect.width, rect.height));
        Self::with_face_textures(center, size, textures)
    }

    pub fn face_texture(&self, face: CubeFace) -> &Texture {
        &self.textures[face.index()]
    }
}

impl Decomposable for Cuboid {
    fn triangles(&self) -> Vec<Triangle> {
        box_triangles(&self.center, &(self.size / 2.0), &self.textures)
    }
}
