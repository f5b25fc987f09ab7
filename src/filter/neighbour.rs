use image::{Rgba, RgbaImage};

const SHARPEN_THRESHOLD: i32 = 80;
const SHARPEN_BOOST: i32 = 100;

/// Boosts channels whose forward gradient (right + below) exceeds the
/// threshold.
///
/// Pixels in the last column or the last row have no forward neighbours and
/// are left transparent black. Assigned pixels are opaque.
pub fn sharpen(source: &RgbaImage) -> RgbaImage {
    let (width, height) = source.dimensions();
    let mut output = RgbaImage::new(width, height);

    for x in 0..width.saturating_sub(1) {
        for y in 0..height.saturating_sub(1) {
            let here = source.get_pixel(x, y);
            let right = source.get_pixel(x + 1, y);
            let below = source.get_pixel(x, y + 1);

            let mut pixel = Rgba([0, 0, 0, 255]);
            for c in 0..3 {
                let value = here[c] as i32;
                let gradient = (value - right[c] as i32).abs() + (value - below[c] as i32).abs();

                pixel[c] = if gradient > SHARPEN_THRESHOLD {
                    (gradient + SHARPEN_BOOST).min(255) as u8
                } else {
                    value as u8
                };
            }

            output.put_pixel(x, y, pixel);
        }
    }

    output
}

/// 3x3 box blur of the interior. The outermost ring is copied unchanged and
/// blurred pixels are opaque.
pub fn soften(source: &RgbaImage) -> RgbaImage {
    let (width, height) = source.dimensions();
    let mut output = source.clone();

    for x in 1..width.saturating_sub(1) {
        for y in 1..height.saturating_sub(1) {
            let mut sum = [0u32; 3];

            for nx in x - 1..=x + 1 {
                for ny in y - 1..=y + 1 {
                    let pixel = source.get_pixel(nx, ny);
                    for c in 0..3 {
                        sum[c] += pixel[c] as u32;
                    }
                }
            }

            let [r, g, b] = sum.map(|total| (total / 9).min(255) as u8);
            output.put_pixel(x, y, Rgba([r, g, b, 255]));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let seed = x.wrapping_mul(73) ^ y.wrapping_mul(151);
            Rgba([
                (seed * 37 % 256) as u8,
                (seed * 11 % 256) as u8,
                (seed * 199 % 256) as u8,
                255,
            ])
        })
    }

    #[test]
    fn test_soften_keeps_border_and_averages_interior() {
        let source = noisy(6, 5);
        let output = soften(&source);
        let (width, height) = source.dimensions();

        for (x, y, pixel) in output.enumerate_pixels() {
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                assert_eq!(pixel, source.get_pixel(x, y), "border at ({x}, {y})");
                continue;
            }

            for c in 0..3 {
                let mut sum = 0u32;
                for nx in x - 1..=x + 1 {
                    for ny in y - 1..=y + 1 {
                        sum += source.get_pixel(nx, ny)[c] as u32;
                    }
                }
                assert_eq!(pixel[c] as u32, sum / 9, "channel {c} at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_soften_flat_image_is_unchanged() {
        let source = RgbaImage::from_pixel(4, 4, Rgba([12, 140, 250, 255]));
        assert_eq!(soften(&source), source);
    }

    #[test]
    fn test_soften_too_small_for_interior() {
        let source = noisy(2, 7);
        assert_eq!(soften(&source), source);
    }

    #[test]
    fn test_sharpen_low_gradient_channels_unchanged() {
        let mut source = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255]));
        // red gradient 40 + 40, green 90 + 0, blue 0 + 0
        source.put_pixel(1, 0, Rgba([60, 190, 100, 255]));
        source.put_pixel(0, 1, Rgba([140, 100, 100, 255]));

        let output = sharpen(&source);

        assert_eq!(*output.get_pixel(0, 0), Rgba([100, 190, 100, 255]));
    }

    #[test]
    fn test_sharpen_boost_saturates() {
        let mut source = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        source.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        source.put_pixel(0, 1, Rgba([0, 0, 81, 255]));

        let output = sharpen(&source);

        // red 255 + 100 saturates, blue 81 + 100
        assert_eq!(*output.get_pixel(0, 0), Rgba([255, 0, 181, 255]));
    }

    #[test]
    fn test_sharpen_last_row_and_column_are_transparent() {
        let source = noisy(4, 3);
        let output = sharpen(&source);

        for y in 0..3 {
            assert_eq!(*output.get_pixel(3, y), Rgba([0, 0, 0, 0]));
        }
        for x in 0..4 {
            assert_eq!(*output.get_pixel(x, 2), Rgba([0, 0, 0, 0]));
        }
        assert_eq!(output.get_pixel(0, 0)[3], 255);
    }
}
