//! Conversions between packed `0xAARRGGBB` integers, float RGBA and HSB,
//! plus the layer compositing rule used by the ray tracer.

pub type Rgba = rgb::RGBA<f32>;

pub const TRANSPARENT: Rgba = Rgba {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.0,
};

/// Packed value of a fully transparent pixel.
pub const TRANSPARENT_PACKED: u32 = 0;

fn channel_to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

pub fn pack_u8(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Packs a 0-1 float color into `0xAARRGGBB`, clamping out of range channels.
pub fn pack(color: &Rgba) -> u32 {
    pack_u8(
        channel_to_u8(color.r),
        channel_to_u8(color.g),
        channel_to_u8(color.b),
        channel_to_u8(color.a),
    )
}

/// Splits `0xAARRGGBB` into `[r, g, b, a]` bytes.
pub fn unpack_u8(packed: u32) -> [u8; 4] {
    [
        (packed >> 16) as u8,
        (packed >> 8) as u8,
        packed as u8,
        (packed >> 24) as u8,
    ]
}

pub fn unpack(packed: u32) -> Rgba {
    let [r, g, b, a] = unpack_u8(packed);
    Rgba::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    )
}

/// Maps a packed pixel to pixel type compatible with module image.
pub fn packed_to_image(packed: u32) -> image::Rgba<u8> {
    image::Rgba(unpack_u8(packed))
}

pub fn image_to_packed(pixel: &image::Rgba<u8>) -> u32 {
    let [r, g, b, a] = pixel.0;
    pack_u8(r, g, b, a)
}

/// Hue, saturation and brightness, all in 0-1.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hsb {
    pub hue: f32,
    pub saturation: f32,
    pub brightness: f32,
}

impl Hsb {
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Hsb {
        let (r, g, b) = (r as f32, g as f32, b as f32);
        let cmax = r.max(g).max(b);
        let cmin = r.min(g).min(b);

        let brightness = cmax / 255.0;
        let saturation = if cmax != 0.0 { (cmax - cmin) / cmax } else { 0.0 };

        let hue = if saturation == 0.0 {
            0.0
        } else {
            let range = cmax - cmin;
            let red_c = (cmax - r) / range;
            let green_c = (cmax - g) / range;
            let blue_c = (cmax - b) / range;

            let hue = if r == cmax {
                blue_c - green_c
            } else if g == cmax {
                2.0 + red_c - blue_c
            } else {
                4.0 + green_c - red_c
            } / 6.0;

            if hue < 0.0 { hue + 1.0 } else { hue }
        };

        Hsb {
            hue,
            saturation,
            brightness,
        }
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        let to_u8 = |v: f32| (v * 255.0 + 0.5) as u8;
        let b = self.brightness;

        if self.saturation == 0.0 {
            let v = to_u8(b);
            return [v, v, v];
        }

        let h = (self.hue - self.hue.floor()) * 6.0;
        let f = h - h.floor();
        let p = b * (1.0 - self.saturation);
        let q = b * (1.0 - self.saturation * f);
        let t = b * (1.0 - self.saturation * (1.0 - f));

        let (r, g, bl) = match h as u32 {
            0 => (b, t, p),
            1 => (q, b, p),
            2 => (p, b, t),
            3 => (p, q, b),
            4 => (t, p, b),
            _ => (b, p, q),
        };
        [to_u8(r), to_u8(g), to_u8(bl)]
    }
}

/// Rescales the brightness of a color by `2 * intensity` (saturating at 1),
/// keeping hue, saturation and alpha.
pub fn apply_light_intensity(color: &mut Rgba, intensity: f32) {
    let mut hsb = Hsb::from_rgb8(
        channel_to_u8(color.r),
        channel_to_u8(color.g),
        channel_to_u8(color.b),
    );
    hsb.brightness = (hsb.brightness * intensity * 2.0).min(1.0);
    let [r, g, b] = hsb.to_rgb8();
    color.r = r as f32 / 255.0;
    color.g = g as f32 / 255.0;
    color.b = b as f32 / 255.0;
}

/// Folds a layer that lies behind `base` underneath it.
///
/// Layers are processed nearest first: a transparent base takes the new layer as is,
/// an opaque base hides it completely.
pub fn composite_under(base: &mut Rgba, under: &Rgba) {
    if base.a == 0.0 {
        *base = *under;
    } else if base.a < 1.0 {
        let remaining = 1.0 - base.a;
        base.r = base.r * base.a + under.r * under.a * remaining;
        base.g = base.g * base.a + under.g * under.a * remaining;
        base.b = base.b * base.a + under.b * under.a * remaining;
        base.a += under.a * remaining;
        if under.a == 1.0 {
            base.a = 1.0;
        }
    }
}
