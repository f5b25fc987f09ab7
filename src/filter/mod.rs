//! Per-pixel image filters and the decode/encode wrapper that runs them
//! against files.
//!
//! Every filter is a pure function from a source [`RgbaImage`] to a freshly
//! allocated destination raster. Pixels are visited column by column (outer
//! loop over `x`, inner loop over `y`), which only matters for [`emboss`].

mod color;
mod neighbour;

use std::fmt::Display;
use std::fs::{self, File};
use std::io::BufReader;
use std::str::FromStr;

use camino::Utf8Path;
use image::{DynamicImage, ImageReader, RgbaImage};
use serde::Serialize;

use crate::error::FilterError;

pub use crate::filter::color::{binarize, emboss, gray, negative, weighted_gray};
pub use crate::filter::neighbour::{sharpen, soften};

/// The closed set of available filters.
///
/// The discriminant is persisted as the numeric prefix of destination file
/// names, so the order of the variants must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterKind {
    Gray = 0,
    Binarize = 1,
    Negative = 2,
    Emboss = 3,
    Sharpen = 4,
    Soften = 5,
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Gray,
        FilterKind::Binarize,
        FilterKind::Negative,
        FilterKind::Emboss,
        FilterKind::Sharpen,
        FilterKind::Soften,
    ];

    /// Integer index used in destination file names.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Gray => "gray",
            FilterKind::Binarize => "binarize",
            FilterKind::Negative => "negative",
            FilterKind::Emboss => "emboss",
            FilterKind::Sharpen => "sharpen",
            FilterKind::Soften => "soften",
        }
    }

    /// Applies the matching pixel transform.
    pub fn apply(self, source: &RgbaImage) -> RgbaImage {
        match self {
            FilterKind::Gray => gray(source),
            FilterKind::Binarize => binarize(source),
            FilterKind::Negative => negative(source),
            FilterKind::Emboss => emboss(source),
            FilterKind::Sharpen => sharpen(source),
            FilterKind::Soften => soften(source),
        }
    }
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilter(pub String);

impl Display for UnknownFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown filter '{}'", self.0)
    }
}

impl std::error::Error for UnknownFilter {}

impl TryFrom<u8> for FilterKind {
    type Error = UnknownFilter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        FilterKind::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| UnknownFilter(value.to_string()))
    }
}

impl FromStr for FilterKind {
    type Err = UnknownFilter;

    /// Accepts either the filter name (any case) or its numeric index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<u8>() {
            return FilterKind::try_from(index);
        }

        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}

/// Decodes `source`, applies `kind` and writes the result to `destination`.
///
/// The output format follows the destination extension.
pub fn run(kind: FilterKind, source: &Utf8Path, destination: &Utf8Path) -> Result<(), FilterError> {
    let input = decode(source)?;
    let output = kind.apply(&input);
    encode(output, destination)
}

pub(crate) fn decode(path: &Utf8Path) -> Result<RgbaImage, FilterError> {
    let reader = BufReader::new(File::open(path)?);
    let img = ImageReader::new(reader)
        .with_guessed_format()?
        .decode()
        .map_err(FilterError::Decode)?;

    Ok(img.to_rgba8())
}

pub(crate) fn encode(output: RgbaImage, path: &Utf8Path) -> Result<(), FilterError> {
    let format = image::ImageFormat::from_path(path).map_err(FilterError::Encode)?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_str().is_empty()) {
        fs::create_dir_all(dir).map_err(FilterError::Destination)?;
    }

    // JPEG and friends can't carry an alpha channel
    let result = match format {
        image::ImageFormat::Jpeg => DynamicImage::ImageRgba8(output)
            .to_rgb8()
            .save_with_format(path, format),
        _ => output.save_with_format(path, format),
    };

    result.map_err(FilterError::Encode)
}
