mod transform;

use std::sync::{
    Arc, LazyLock,
    atomic::{AtomicU64, Ordering},
};

use thiserror::Error;

use crate::geometry::{TexturePixel, TextureSize};

pub use transform::{DEFAULT_CACHE_CAPACITY, Transform, TransformCache, transform_cache};

/// Pixel of the fallback texture: mid gray, half transparent.
pub const FALLBACK_PIXEL: u32 = 0x80808080;

/// Identity of a pixel raster, shared by all clones of a texture.
/// Used to key memoized transforms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    const FALLBACK: TextureId = TextureId(0);

    fn next() -> TextureId {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        TextureId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextureError {
    #[error("texture of size {width}x{height} does not match pixel count {len}")]
    SizeMismatch { width: u32, height: u32, len: usize },
}

/// Row-major raster of packed `0xAARRGGBB` pixels.
/// Cloning is cheap, the pixels are shared.
#[derive(Clone, Debug)]
pub struct Texture {
    id: TextureId,
    size: TextureSize,
    pixels: Arc<[u32]>,
}

static FALLBACK: LazyLock<Texture> = LazyLock::new(|| Texture {
    id: TextureId::FALLBACK,
    size: TextureSize::new(1, 1),
    pixels: Arc::new([FALLBACK_PIXEL]),
});

impl Texture {
    pub fn new(size: TextureSize, pixels: impl Into<Arc<[u32]>>) -> Result<Texture, TextureError> {
        let pixels = pixels.into();
        if pixels.len() as u64 != size.x as u64 * size.y as u64 {
            return Err(TextureError::SizeMismatch {
                width: size.x,
                height: size.y,
                len: pixels.len(),
            });
        }
        Ok(Self::new_unchecked(size, pixels))
    }

    fn new_unchecked(size: TextureSize, pixels: Arc<[u32]>) -> Texture {
        debug_assert!(pixels.len() == size.x as usize * size.y as usize);
        Texture {
            id: TextureId::next(),
            size,
            pixels,
        }
    }

    /// The texture standing in for "no texture".
    pub fn fallback() -> Texture {
        FALLBACK.clone()
    }

    pub fn solid(size: TextureSize, pixel: u32) -> Texture {
        let pixels = vec![pixel; size.x as usize * size.y as usize];
        Self::new_unchecked(size, pixels.into())
    }

    pub fn from_image(image: &image::RgbaImage) -> Texture {
        let pixels = image
            .pixels()
            .map(crate::color::image_to_packed)
            .collect::<Vec<_>>();
        Self::new_unchecked(TextureSize::new(image.width(), image.height()), pixels.into())
    }

    /// Missing images map to the fallback texture.
    pub fn from_optional_image(image: Option<&image::RgbaImage>) -> Texture {
        image.map_or_else(Texture::fallback, Texture::from_image)
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn size(&self) -> TextureSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn height(&self) -> u32 {
        self.size.y
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// True if one of the dimensions is zero.
    pub fn is_empty(&self) -> bool {
        self.size.x == 0 || self.size.y == 0
    }

    /// False for the fallback texture.
    pub fn has_texture(&self) -> bool {
        self.id != TextureId::FALLBACK
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        Some(self.pixels[x as usize + y as usize * self.size.x as usize])
    }

    /// Looks up a texel, clamping the coordinates into the texture.
    /// Empty textures sample as the fallback pixel.
    pub fn sample_clamped(&self, uv: &TexturePixel) -> u32 {
        if self.is_empty() {
            return FALLBACK_PIXEL;
        }
        let x = uv.x.clamp(0, self.size.x as i64 - 1) as u32;
        let y = uv.y.clamp(0, self.size.y as i64 - 1) as u32;
        self.pixels[x as usize + y as usize * self.size.x as usize]
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id || (self.size == other.size && self.pixels == other.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{assert, let_assert};

    #[test]
    fn size_mismatch_is_rejected() {
        let result = Texture::new(TextureSize::new(2, 2), vec![0u32; 3]);
        let_assert!(Err(TextureError::SizeMismatch { width: 2, height: 2, len: 3 }) = result);
    }

    #[test]
    fn zero_sized_texture_is_empty() {
        let texture = Texture::new(TextureSize::new(0, 4), Vec::<u32>::new()).unwrap();
        assert!(texture.is_empty());
        assert!(texture.sample_clamped(&TexturePixel::new(0, 0)) == FALLBACK_PIXEL);
    }

    #[test]
    fn fallback_texture() {
        let fallback = Texture::fallback();
        assert!(!fallback.has_texture());
        assert!(fallback.size() == TextureSize::new(1, 1));
        assert!(fallback.pixel(0, 0) == Some(FALLBACK_PIXEL));
        assert!(Texture::from_optional_image(None).id() == fallback.id());
    }

    #[test]
    fn from_image_packs_pixels_row_major() {
        let mut image = image::RgbaImage::new(2, 1);
        image.put_pixel(1, 0, image::Rgba([0x11, 0x22, 0x33, 0x44]));
        let texture = Texture::from_image(&image);
        assert!(texture.has_texture());
        assert!(texture.pixels() == &[0, 0x44112233]);
    }

    #[test]
    fn clones_share_identity() {
        let texture = Texture::solid(TextureSize::new(2, 2), 1);
        let other = Texture::solid(TextureSize::new(2, 2), 1);
        assert!(texture.clone().id() == texture.id());
        assert!(other.id() != texture.id());
        assert!(other == texture);
    }

    #[test]
    fn sample_clamped_stays_inside() {
        let texture = Texture::new(TextureSize::new(2, 2), vec![1u32, 2, 3, 4]).unwrap();
        assert!(texture.sample_clamped(&TexturePixel::new(1, 1)) == 4);
        assert!(texture.sample_clamped(&TexturePixel::new(2, 0)) == 2);
        assert!(texture.sample_clamped(&TexturePixel::new(-1, 5)) == 3);
        assert!(texture.pixel(2, 0).is_none());
    }
}
