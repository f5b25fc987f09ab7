use image::{Rgba, RgbaImage};

// 0.299, 0.587 and 0.114 in thousandths
const LUMA_R: i32 = 299;
const LUMA_G: i32 = 587;
const LUMA_B: i32 = 114;

const BINARIZE_THRESHOLD: u32 = 128;

/// Weighted luminosity of an RGB triple, rounded half up and clamped to a
/// byte.
pub fn weighted_gray(r: i32, g: i32, b: i32) -> u8 {
    weighted_gray_wide(r, g, b).clamp(0, 255) as u8
}

/// Rounded luminosity without clamping, in exact integer arithmetic.
fn weighted_gray_wide(r: i32, g: i32, b: i32) -> i32 {
    (LUMA_R * r + LUMA_G * g + LUMA_B * b + 500).div_euclid(1000)
}

/// Grayscale with the alpha channel preserved.
pub fn gray(source: &RgbaImage) -> RgbaImage {
    let (width, height) = source.dimensions();
    let mut output = RgbaImage::new(width, height);

    for x in 0..width {
        for y in 0..height {
            let Rgba([r, g, b, a]) = *source.get_pixel(x, y);
            let gray = weighted_gray(r as i32, g as i32, b as i32);
            output.put_pixel(x, y, Rgba([gray, gray, gray, a]));
        }
    }

    output
}

/// Black and white by channel average. Output is always opaque.
pub fn binarize(source: &RgbaImage) -> RgbaImage {
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    let (width, height) = source.dimensions();
    let mut output = RgbaImage::new(width, height);

    for x in 0..width {
        for y in 0..height {
            let Rgba([r, g, b, _]) = *source.get_pixel(x, y);
            let avg = (r as u32 + g as u32 + b as u32) / 3;
            output.put_pixel(x, y, if avg > BINARIZE_THRESHOLD { WHITE } else { BLACK });
        }
    }

    output
}

pub fn negative(source: &RgbaImage) -> RgbaImage {
    let (width, height) = source.dimensions();
    let mut output = RgbaImage::new(width, height);

    for x in 0..width {
        for y in 0..height {
            let Rgba([r, g, b, a]) = *source.get_pixel(x, y);
            output.put_pixel(x, y, Rgba([255 - r, 255 - g, 255 - b, a]));
        }
    }

    output
}

/// Relief effect from the running difference between each pixel and the
/// previously *emitted* pixel.
///
/// The previous colour starts as transparent black and carries across column
/// boundaries, so the result depends on the column-major traversal. Gray
/// values outside 0..=255 wrap to their low byte.
pub fn emboss(source: &RgbaImage) -> RgbaImage {
    let (width, height) = source.dimensions();
    let mut output = RgbaImage::new(width, height);
    let mut prev = Rgba([0u8, 0, 0, 0]);

    for x in 0..width {
        for y in 0..height {
            let Rgba([r, g, b, a]) = *source.get_pixel(x, y);
            let Rgba([pr, pg, pb, _]) = prev;

            let gray = weighted_gray_wide(
                r as i32 - pr as i32 + 128,
                g as i32 - pg as i32 + 128,
                b as i32 - pb as i32 + 128,
            ) as u8;

            prev = Rgba([gray, gray, gray, a]);
            output.put_pixel(x, y, prev);
        }
    }

    output
}
