//! PNG load/save through the `image` crate.

use std::path::Path;

use image::{Rgba, RgbaImage, RgbImage};
use tracing::info;
use utils::{Channels, Grid};

use crate::error::{Error, Result};

/// Decodes an image and splits it into R, G and B grids. Alpha is dropped.
pub fn load_pixels(path: &Path) -> Result<Channels<Grid<u8>>> {
    info!(path = %path.display(), "loading image");
    let image = image::open(path)
        .map_err(|source| image_error(path, source))?
        .to_rgba8();
    Ok(split_channels(&image))
}

pub fn split_channels(image: &RgbaImage) -> Channels<Grid<u8>> {
    let (width, height) = image.dimensions();
    Channels::from_fn(|c| {
        Grid::from_fn(width as usize, height as usize, |x, y| {
            image.get_pixel(x as u32, y as u32).0[c.index()]
        })
    })
}

/// Joins three grids into an opaque RGBA image.
pub fn merge_channels(pixels: &Channels<Grid<u8>>) -> Result<RgbaImage> {
    let [r, g, b] = pixels.each_ref().into_array();
    for grid in [g, b] {
        if grid.dims() != r.dims() {
            return Err(Error::DimensionMismatch {
                expected: r.dims(),
                found: grid.dims(),
            });
        }
    }
    let (Ok(width), Ok(height)) = (u32::try_from(r.width()), u32::try_from(r.height())) else {
        return Err(Error::UnsupportedDimensions {
            width: r.width(),
            height: r.height(),
            reason: "image side exceeds u32",
        });
    };
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let at = (x as usize, y as usize);
        Rgba([r[at], g[at], b[at], 255])
    }))
}

pub fn save_pixels(path: &Path, pixels: &Channels<Grid<u8>>) -> Result<()> {
    let image = merge_channels(pixels)?;
    info!(path = %path.display(), "saving");
    image.save(path).map_err(|source| image_error(path, source))
}

pub fn save_rgb(path: &Path, image: &RgbImage) -> Result<()> {
    info!(path = %path.display(), "saving");
    image.save(path).map_err(|source| image_error(path, source))
}

fn image_error(path: &Path, source: image::ImageError) -> Error {
    match source {
        image::ImageError::IoError(source) => Error::Io {
            path: path.to_path_buf(),
            source,
        },
        source => Error::Image {
            path: path.to_path_buf(),
            source,
        },
    }
}
