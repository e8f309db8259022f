use std::sync::LazyLock;

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::{Texture, TextureId};
use crate::geometry::TextureSize;

/// Number of transformed textures kept by the process wide cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Pixel rearrangements that can be applied to a texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Sub-rectangle starting at `(x, y)`. Parts outside of the source are transparent.
    Slice {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    LeftRightMirror,
    TopBottomMirror,
    /// Rotation by 180 degrees.
    CentralSymmetry,
    /// Swaps rows and columns.
    Transpose,
}

impl Transform {
    fn apply(&self, source: &Texture) -> Texture {
        let width = source.width() as usize;
        let height = source.height() as usize;
        let pixels = source.pixels();

        let (size, result) = match *self {
            Transform::Slice {
                x,
                y,
                width: slice_width,
                height: slice_height,
            } => {
                let (x, y) = (x as usize, y as usize);
                let mut result = Vec::with_capacity(slice_width as usize * slice_height as usize);
                for j in 0..slice_height as usize {
                    for i in 0..slice_width as usize {
                        let (sx, sy) = (i + x, j + y);
                        result.push(if sx < width && sy < height {
                            pixels[sx + sy * width]
                        } else {
                            0
                        });
                    }
                }
                (TextureSize::new(slice_width, slice_height), result)
            }
            Transform::LeftRightMirror => {
                let result = pixels
                    .chunks_exact(width.max(1))
                    .flat_map(|row| row.iter().rev().copied())
                    .collect::<Vec<_>>();
                (source.size(), result)
            }
            Transform::TopBottomMirror => {
                let result = pixels
                    .chunks_exact(width.max(1))
                    .rev()
                    .flatten()
                    .copied()
                    .collect::<Vec<_>>();
                (source.size(), result)
            }
            Transform::CentralSymmetry => {
                let result = pixels.iter().rev().copied().collect::<Vec<_>>();
                (source.size(), result)
            }
            Transform::Transpose => {
                let mut result = vec![0; pixels.len()];
                for j in 0..height {
                    for i in 0..width {
                        result[i * height + j] = pixels[j * width + i];
                    }
                }
                (TextureSize::new(source.height(), source.width()), result)
            }
        };

        Texture::new_unchecked(size, result.into())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct TransformKey {
    source: TextureId,
    transform: Transform,
}

/// Bounded memo of transformed textures, least recently used entries are evicted first.
///
/// Transforms are computed outside of the lock, concurrent misses on the same key
/// may compute the result twice and the last insert wins.
pub struct TransformCache {
    entries: Mutex<IndexMap<TransformKey, Texture>>,
    capacity: usize,
}

impl TransformCache {
    pub fn new(capacity: usize) -> TransformCache {
        TransformCache {
            entries: Mutex::new(IndexMap::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn apply(&self, source: &Texture, transform: Transform) -> Texture {
        let key = TransformKey {
            source: source.id(),
            transform,
        };

        if let Some(hit) = self.lookup(&key) {
            return hit;
        }

        let result = transform.apply(source);
        self.insert(key, result.clone());
        result
    }

    fn lookup(&self, key: &TransformKey) -> Option<Texture> {
        let mut entries = self.entries.lock();
        let index = entries.get_index_of(key)?;
        let last = entries.len() - 1;
        entries.move_index(index, last);
        entries.get_index(last).map(|(_, texture)| texture.clone())
    }

    fn insert(&self, key: TransformKey, texture: Texture) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        entries.shift_remove(&key);
        entries.insert(key, texture);
        while entries.len() > self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                log::trace!("Evicting cached {:?} of texture {:?}", evicted.transform, evicted.source);
            }
        }
    }
}

static TRANSFORM_CACHE: LazyLock<TransformCache> =
    LazyLock::new(|| TransformCache::new(DEFAULT_CACHE_CAPACITY));

/// The cache used by the transform methods of [`Texture`].
pub fn transform_cache() -> &'static TransformCache {
    &TRANSFORM_CACHE
}

impl Texture {
    pub fn transformed(&self, transform: Transform) -> Texture {
        transform_cache().apply(self, transform)
    }

    pub fn slice(&self, x: u32, y: u32, width: u32, height: u32) -> Texture {
        self.transformed(Transform::Slice {
            x,
            y,
            width,
            height,
        })
    }

    pub fn left_right_mirror(&self) -> Texture {
        self.transformed(Transform::LeftRightMirror)
    }

    pub fn top_bottom_mirror(&self) -> Texture {
        self.transformed(Transform::TopBottomMirror)
    }

    pub fn central_symmetry(&self) -> Texture {
        self.transformed(Transform::CentralSymmetry)
    }

    pub fn transpose(&self) -> Texture {
        self.transformed(Transform::Transpose)
    }
}
