// Copyright 2025 Lars Brubaker
// License: MIT
//
// The pixel layouts the solver accepts: 8-bit gray and 8-bit RGB.

use image::{ImageBuffer, Luma, Pixel, Rgb};

use crate::error::{CloneError, Result};
use crate::geom::Real;

/// Three-channel working color.  Gray pixels use all three channels equally.
pub type Color = [Real; 3];

/// Owned 8-bit image of a clonable pixel type.
pub type PixelImage<P> = ImageBuffer<P, Vec<u8>>;

mod sealed {
    pub trait Sealed {}
    impl Sealed for image::Luma<u8> {}
    impl Sealed for image::Rgb<u8> {}
}

/// 8-bit pixel types that can be cloned.  Implemented for `Luma<u8>` and
/// `Rgb<u8>` only.
pub trait ClonePixel: Pixel<Subpixel = u8> + sealed::Sealed + Send + Sync {
    fn to_color(&self) -> Color;
    fn from_color(c: Color) -> Self;
}

impl ClonePixel for Luma<u8> {
    #[inline]
    fn to_color(&self) -> Color {
        let v = self.0[0] as Real;
        [v, v, v]
    }

    #[inline]
    fn from_color(c: Color) -> Self {
        Luma([saturate(c[0])])
    }
}

impl ClonePixel for Rgb<u8> {
    #[inline]
    fn to_color(&self) -> Color {
        self.0.map(|v| v as Real)
    }

    #[inline]
    fn from_color(c: Color) -> Self {
        Rgb(c.map(saturate))
    }
}

/// Round to nearest and clamp into `0..=255`.  NaN maps to 0.
#[inline]
pub fn saturate(v: Real) -> u8 {
    if v.is_nan() {
        0
    } else {
        v.round().clamp(0.0, 255.0) as u8
    }
}

#[inline]
pub(crate) fn color_sub(a: Color, b: Color) -> Color {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Read pixel (x, y) of `img` as a color; `image` names it in the error.
pub(crate) fn sample<P: ClonePixel>(
    img: &PixelImage<P>,
    image: &'static str,
    x: i64,
    y: i64,
) -> Result<Color> {
    let (width, height) = img.dimensions();
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        return Err(CloneError::OutOfBounds {
            image,
            x,
            y,
            width,
            height,
        });
    }
    Ok(img.get_pixel(x as u32, y as u32).to_color())
}
