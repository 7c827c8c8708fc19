//! Conversion between 8-bit RGB and the fixture's chromaticity + brightness.
//!
//! The fixture only understands an xy chromaticity and one brightness byte. To let
//! the red, green and blue channels be addressed independently, brightness is
//! pinned to `max(r, g, b)` and xy only carries the ratios between channels.
//! Decoding then restores the ratios at the level given by the brightness byte,
//! which makes `from_device_state(to_device_state(c))` return `c`.

use palette::{LinSrgb, Srgb};

/// Wide-gamut (D65) linear RGB to XYZ.
const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.664511, 0.154324, 0.162028],
    [0.283881, 0.668433, 0.047685],
    [0.000088, 0.072310, 0.986039],
];

/// Exact inverse of `RGB_TO_XYZ`.
const XYZ_TO_RGB: [[f64; 3]; 3] = [
    [1.656493646740894, -0.354852231612697, -0.255037806749715],
    [-0.707195833688164, 1.655398667801136, 0.036152567055389],
    [0.051713531912103, -0.121365027825794, 1.011530224669834],
];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Rgb {
        return Rgb { red, green, blue };
    }

    pub fn max_channel(&self) -> u8 {
        return self.red.max(self.green).max(self.blue);
    }

    pub fn is_black(&self) -> bool {
        return self.max_channel() == 0;
    }
}

/// What gets written to the fixture for a given RGB color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DeviceColor {
    pub xy: [f64; 2],
    pub brightness: u8,
}

pub fn to_device_state(rgb: Rgb) -> DeviceColor {
    let [x, y, z] = mul(&RGB_TO_XYZ, srgb_to_linear(rgb));
    let sum = x + y + z;
    let xy = if sum == 0.0 { [0.0, 0.0] } else { [x / sum, y / sum] };
    return DeviceColor {
        xy,
        brightness: rgb.max_channel(),
    };
}

/// Decodes a fixture's xy + brightness. A missing xy, or `y == 0`, decodes to black.
pub fn from_device_state(xy: Option<[f64; 2]>, brightness: u8) -> Rgb {
    let [x, y] = match xy {
        Some(xy) => xy,
        None => return Rgb::BLACK,
    };
    if y == 0.0 {
        return Rgb::BLACK;
    }

    // Direction only: Y pinned to 1 so any luminance left in an old brightness is dropped.
    let direction = [x / y, 1.0, (1.0 - x - y) / y];
    let linear = mul(&XYZ_TO_RGB, direction).map(|c| c.max(0.0));
    let peak = linear[0].max(linear[1]).max(linear[2]);
    if peak <= 0.0 {
        return Rgb::BLACK;
    }

    // The largest channel lands exactly on `brightness`, the others keep their
    // linear ratio to it. Scaling after gamma encoding would not invert
    // `to_device_state` for the smaller channels, since sRGB is not a pure power law.
    let level = srgb_to_linear(Rgb::new(brightness, brightness, brightness))[0];
    return linear_to_srgb(linear.map(|c| c / peak * level));
}

fn srgb_to_linear(rgb: Rgb) -> [f64; 3] {
    let linear: LinSrgb<f64> = Srgb::<f64>::new(
        f64::from(rgb.red) / 255.0,
        f64::from(rgb.green) / 255.0,
        f64::from(rgb.blue) / 255.0,
    )
    .into_linear();
    return [linear.red, linear.green, linear.blue];
}

fn linear_to_srgb(linear: [f64; 3]) -> Rgb {
    let [r, g, b] = linear.map(|c| c.max(0.0));
    let encoded = Srgb::<f64>::from_linear(LinSrgb::new(r, g, b));
    return Rgb::new(
        to_u8(encoded.red),
        to_u8(encoded.green),
        to_u8(encoded.blue),
    );
}

fn to_u8(c: f64) -> u8 {
    return (c.clamp(0.0, 1.0) * 255.0).round() as u8;
}

fn mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (row, o) in m.iter().zip(out.iter_mut()) {
        *o = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
    }
    return out;
}
