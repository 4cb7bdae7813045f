//! Rebuilds a transparent PNG from a remove.bg ZIP response.
//!
//! The ZIP holds `color.jpg` (RGB) and `alpha.png` (grayscale mask) of the
//! same size. Downloading both is much cheaper than a flattened RGBA PNG.

use crate::constants::{ALPHA_ENTRY, COLOR_ENTRY};
use crate::error::{RemoveBgError, Result};
use crate::storage::Storage;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, GrayImage, ImageEncoder, ImageFormat, RgbaImage};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

const MAX_ENTRY_PREALLOCATION: u64 = 64 << 20;

pub trait Compositor {
    fn process(&self, input_zip_path: &Path, output_image_path: &Path) -> Result<()>;
}

/// Reads the ZIP from disk and writes the composited PNG through [`Storage`].
#[derive(Debug, Clone, Default)]
pub struct ZipCompositor<S> {
    storage: S,
}

impl<S: Storage> ZipCompositor<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: Storage> Compositor for ZipCompositor<S> {
    fn process(&self, input_zip_path: &Path, output_image_path: &Path) -> Result<()> {
        if !self.storage.file_exists(input_zip_path) {
            return Err(RemoveBgError::FileNotFound(input_zip_path.to_path_buf()));
        }

        tracing::debug!("Extracting {:?}", input_zip_path);
        let (color, alpha) = read_zip(input_zip_path)?;

        tracing::debug!("Compositing {}x{}", color.width(), color.height());
        let composited = composite(&color, &alpha)?;

        tracing::debug!("Saving {:?}", output_image_path);
        let encoded = encode_png(&composited)?;
        self.storage.write(output_image_path, &encoded)
    }
}

/// Decodes the color and alpha planes. The alpha entry is looked up first.
fn read_zip(path: &Path) -> Result<(DynamicImage, GrayImage)> {
    let mut archive = ZipArchive::new(File::open(path)?)?;

    let alpha_bytes = read_entry(&mut archive, ALPHA_ENTRY)?;
    let color_bytes = read_entry(&mut archive, COLOR_ENTRY)?;

    let color = image::load_from_memory_with_format(&color_bytes, ImageFormat::Jpeg)?;
    let alpha = image::load_from_memory_with_format(&alpha_bytes, ImageFormat::Png)?.to_luma8();

    Ok((color, alpha))
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive.by_name(name).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => RemoveBgError::MissingZipEntry(name.to_string()),
        other => other.into(),
    })?;

    let mut bytes = Vec::with_capacity(capacity_hint(entry.size()));
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Preallocation for an entry, bounded since the declared size comes from
/// the archive header.
fn capacity_hint(declared_size: u64) -> usize {
    usize::try_from(declared_size.min(MAX_ENTRY_PREALLOCATION)).unwrap_or(0)
}

/// Merges a color image and a grayscale mask into one non-premultiplied RGBA
/// image. Gray intensity is copied straight into the alpha channel.
///
/// # Errors
/// * `RemoveBgError::DimensionMismatch` if the two planes differ in size
pub fn composite(color: &DynamicImage, alpha: &GrayImage) -> Result<RgbaImage> {
    let color_dims = (color.width(), color.height());
    let alpha_dims = alpha.dimensions();
    if color_dims != alpha_dims {
        return Err(RemoveBgError::DimensionMismatch {
            color: color_dims,
            alpha: alpha_dims,
        });
    }

    let mut composited: RgbaImage = color.to_rgba8();
    for (pixel, mask) in composited.pixels_mut().zip(alpha.pixels()) {
        pixel.0[3] = mask.0[0];
    }

    Ok(composited)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buffer)
}
