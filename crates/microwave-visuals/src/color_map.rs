//! Color maps for the field surface.
//!
//! A map is sampled into a 256-entry lookup table once,
//! and the table becomes one layer of a GPU texture array.

use enterpolation::{linear::ConstEquidistantLinear, Curve};
use palette::{FromColor, IntoColor, Oklab, Srgb};

/// An 8-bit sRGB color with alpha, one lookup table entry.
pub type Color = [u8; 4];
pub(crate) const LUT_SIZE: usize = 256;
pub(crate) const TEX_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// A gradient mapping the unit interval onto colors.
#[derive(Clone, Debug)]
pub struct ColorMap {
    /// Shown in the log when the map is activated.
    pub name: String,
    pub(crate) lut: [Color; LUT_SIZE],
}

impl ColorMap {
    /// Create a map interpolating evenly spaced color stops given as `0xRRGGBB`.
    ///
    /// Interpolation happens in Oklab,
    /// so the gradient between stops is perceptually even.
    pub fn from_hex_stops<const N: usize>(name: &str, stops: [u32; N]) -> Self {
        let stops = stops.map(|hex| {
            let srgb: Srgb<f32> = Srgb::<u8>::from(hex).into_format();
            Oklab::from_color(srgb)
        });
        let curve = ConstEquidistantLinear::<f32, _, N>::equidistant_unchecked(stops);

        let mut lut = [[0; 4]; LUT_SIZE];
        for (entry, color) in lut.iter_mut().zip(curve.take(LUT_SIZE)) {
            *entry = to_rgba8(color.into_color());
        }
        Self {
            name: name.to_string(),
            lut,
        }
    }
}

fn to_rgba8(c: Srgb<f32>) -> Color {
    let channel = |v: f32| (v.clamp(0., 1.) * 255.).round() as u8;
    [channel(c.red), channel(c.green), channel(c.blue), u8::MAX]
}

pub mod builtin_color_maps {
    //! The color maps available by default, in `F2` cycling order.

    use super::ColorMap;

    /// Every builtin map, [`viridis`] first.
    pub fn all_builtins() -> Vec<ColorMap> {
        vec![viridis(), plasma(), coolwarm()]
    }

    /// The purple-green-yellow map most plotting libraries default to.
    pub fn viridis() -> ColorMap {
        ColorMap::from_hex_stops(
            "viridis",
            [
                0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58,
                0xb5de2b, 0xfde725,
            ],
        )
    }

    /// Dark blue through magenta to yellow.
    pub fn plasma() -> ColorMap {
        ColorMap::from_hex_stops(
            "plasma",
            [
                0x0d0887, 0x46039f, 0x7201a8, 0x9c179e, 0xbd3786, 0xd8576b, 0xed7953, 0xfb9f3a,
                0xfdca26, 0xf0f921,
            ],
        )
    }

    /// Diverging blue-gray-red map,
    /// suited to fields symmetric around zero.
    pub fn coolwarm() -> ColorMap {
        ColorMap::from_hex_stops(
            "coolwarm",
            [
                0x3b4cc0, 0x7396f5, 0xb0cbfc, 0xdddddd, 0xf6bfa6, 0xea7b60, 0xb40426,
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Color, expected: Color) {
        for (a, e) in actual.iter().zip(expected) {
            assert!(a.abs_diff(e) <= 1, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn maps_hit_their_end_stops() {
        let map = builtin_color_maps::viridis();
        assert_close(map.lut[0], [0x44, 0x01, 0x54, 255]);
        assert_close(map.lut[LUT_SIZE - 1], [0xfd, 0xe7, 0x25, 255]);

        let map = builtin_color_maps::coolwarm();
        assert_close(map.lut[0], [0x3b, 0x4c, 0xc0, 255]);
        assert_close(map.lut[LUT_SIZE - 1], [0xb4, 0x04, 0x26, 255]);
    }

    #[test]
    fn builtins_come_in_cycling_order() {
        let maps = builtin_color_maps::all_builtins();
        let names: Vec<&str> = maps.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["viridis", "plasma", "coolwarm"]);
    }
}
