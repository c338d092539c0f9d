//! # Image Loading
//!
//! Decodes the two input images into grids the core understands.
//!
//! Both images are converted to RGBA8 first. The heightmap keeps only its red
//! channel; the colormap keeps all four channels and is always resampled to
//! the heightmap's shape, so the two grids line up cell for cell.
//!
//! Row `i` of a grid is image row `y = i`, column `j` is `x = j`.

use std::path::Path;

use heightbrick_core::error::require_non_blank;
use heightbrick_core::{CoreError, Grid};
use image::imageops::{self, FilterType};
use image::{ImageError, RgbaImage};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Bicubic resampling, as used for both maps.
const FILTER: FilterType = FilterType::CatmullRom;

/// Loads a heightmap, optionally resampled to `width` x `height` pixels.
///
/// A missing dimension keeps the image's own size on that axis. Heights are
/// the red channel, so they range over `0..=255`.
///
/// # Errors
///
/// - `CoreError::InvalidParameter` for a blank path or a zero dimension
/// - `CoreError::NotFound` if the file does not exist
/// - `AppError::Image` if the file cannot be decoded
pub fn load_heightmap(
    path: impl AsRef<Path>,
    width: Option<u32>,
    height: Option<u32>,
) -> AppResult<Grid<u32>> {
    let path = path.as_ref();
    let img = open_rgba(path)?;
    let (own_width, own_height) = img.dimensions();
    let target = (width.unwrap_or(own_width), height.unwrap_or(own_height));
    if target.0 == 0 || target.1 == 0 {
        return Err(CoreError::InvalidParameter(format!(
            "heightmap size must be positive, got {}x{}",
            target.0, target.1
        ))
        .into());
    }

    let img = resample(img, target.0, target.1);
    debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "loaded heightmap"
    );
    to_grid(&img, |px| u32::from(px[0]))
}

/// Loads a colormap resampled to `rows` x `cols` pixels.
///
/// # Errors
///
/// - `CoreError::InvalidParameter` for a blank path or an unusable shape
/// - `CoreError::NotFound` if the file does not exist
/// - `AppError::Image` if the file cannot be decoded
pub fn load_colormap(path: impl AsRef<Path>, rows: usize, cols: usize) -> AppResult<Grid<[u8; 4]>> {
    let path = path.as_ref();
    let (width, height) = match (u32::try_from(cols), u32::try_from(rows)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(CoreError::InvalidParameter(format!(
                "colormap target shape {rows}x{cols} is not a valid image size"
            ))
            .into())
        }
    };

    let img = resample(open_rgba(path)?, width, height);
    debug!(path = %path.display(), width, height, "loaded colormap");
    to_grid(&img, |px| px)
}

fn open_rgba(path: &Path) -> AppResult<RgbaImage> {
    let name = path.display().to_string();
    require_non_blank("image path", &name)?;

    match image::open(path) {
        Ok(img) => Ok(img.to_rgba8()),
        Err(ImageError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(CoreError::NotFound { path: name }.into())
        }
        Err(e) => Err(AppError::Image {
            path: name,
            reason: e.to_string(),
        }),
    }
}

fn resample(img: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.dimensions() == (width, height) {
        img
    } else {
        imageops::resize(&img, width, height, FILTER)
    }
}

fn to_grid<T>(img: &RgbaImage, mut cell: impl FnMut([u8; 4]) -> T) -> AppResult<Grid<T>> {
    let data = img.pixels().map(|px| cell(px.0)).collect();
    Ok(Grid::from_vec(img.height() as usize, img.width() as usize, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::fs;
    use std::path::PathBuf;

    /// Helper to create a unique temp directory for each test.
    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("heightbrick_image_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path, width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) {
        RgbaImage::from_fn(width, height, |x, y| Rgba(f(x, y)))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_heightmap_uses_red_channel_row_major() {
        let dir = test_dir("red");
        let path = dir.join("hm.png");
        write_png(&path, 3, 2, |x, y| [(x + 10 * y) as u8, 200, 200, 255]);

        let heights = load_heightmap(&path, None, None).unwrap();
        assert_eq!(heights.shape(), (2, 3));
        assert_eq!(heights.as_slice(), &[0, 1, 2, 10, 11, 12]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_heightmap_resizes_requested_axes_only() {
        let dir = test_dir("resize");
        let path = dir.join("hm.png");
        write_png(&path, 4, 4, |_, _| [50, 0, 0, 255]);

        let wide = load_heightmap(&path, Some(8), None).unwrap();
        assert_eq!(wide.shape(), (4, 8));
        // A flat image stays flat under bicubic resampling
        assert!(wide.as_slice().iter().all(|&h| h == 50));

        let tall = load_heightmap(&path, None, Some(2)).unwrap();
        assert_eq!(tall.shape(), (2, 4));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_colormap_matches_requested_shape() {
        let dir = test_dir("colormap");
        let path = dir.join("cm.png");
        write_png(&path, 2, 2, |_, _| [12, 34, 56, 255]);

        let colors = load_colormap(&path, 3, 5).unwrap();
        assert_eq!(colors.shape(), (3, 5));
        assert!(colors.as_slice().iter().all(|&px| px == [12, 34, 56, 255]));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_image_is_not_found() {
        let dir = test_dir("missing");
        let path = dir.join("nope.png");
        assert_eq!(
            load_heightmap(&path, None, None).unwrap_err(),
            AppError::Core(CoreError::NotFound {
                path: path.display().to_string()
            })
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_garbage_image_is_decode_error() {
        let dir = test_dir("garbage");
        let path = dir.join("broken.png");
        fs::write(&path, "this file is plain text and certainly not a png image").unwrap();
        assert!(matches!(
            load_colormap(&path, 2, 2),
            Err(AppError::Image { .. })
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let dir = test_dir("zero");
        let path = dir.join("hm.png");
        write_png(&path, 2, 2, |_, _| [0, 0, 0, 255]);

        assert!(matches!(
            load_heightmap(&path, Some(0), None),
            Err(AppError::Core(CoreError::InvalidParameter(_)))
        ));
        assert!(matches!(
            load_colormap(&path, 0, 2),
            Err(AppError::Core(CoreError::InvalidParameter(_)))
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_blank_path_rejected() {
        assert!(matches!(
            load_heightmap("", None, None),
            Err(AppError::Core(CoreError::InvalidParameter(_)))
        ));
    }
}
