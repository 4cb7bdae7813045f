#![allow(dead_code)]

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use removebg::{
    Compositor, Notifier, Prompt, RemoveBgError, RequestParams, Result, Storage, TransformClient,
    TransformResponse,
};
use std::cell::RefCell;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempPath;
use zip::write::SimpleFileOptions;

pub const CAT_WIDTH: u32 = 64;
pub const CAT_HEIGHT: u32 = 48;

/// Orange-ish gradient standing in for the cat photo.
pub fn color_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            200u8.saturating_add((x % 50) as u8),
            (100 + y % 100) as u8,
            ((x * y) % 64) as u8,
        ])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

/// Elliptical foreground mask with a soft edge.
pub fn alpha_png(width: u32, height: u32) -> Vec<u8> {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let mask = GrayImage::from_fn(width, height, |x, y| {
        let dx = (x as f32 - cx) / cx;
        let dy = (y as f32 - cy) / cy;
        let d = (dx * dx + dy * dy).sqrt();
        Luma([((1.0 - d).clamp(0.0, 1.0) * 255.0) as u8])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(mask)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
    path.to_path_buf()
}

/// Same layout as a remove.bg ZIP response.
pub fn create_cat_zip(dir: &Path) -> PathBuf {
    let color = color_jpeg(CAT_WIDTH, CAT_HEIGHT);
    let alpha = alpha_png(CAT_WIDTH, CAT_HEIGHT);
    write_zip(
        &dir.join("example-cat.zip"),
        &[("color.jpg", color.as_slice()), ("alpha.png", alpha.as_slice())],
    )
}

pub fn create_input_images(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            File::create(&path)
                .unwrap()
                .write_all(b"fake jpg data")
                .unwrap();
            path
        })
        .collect()
}

// In-memory collaborators for driving the processor without I/O

#[derive(Debug, Default)]
pub struct Recorded {
    pub uploads: Vec<PathBuf>,
    pub prompts: Vec<usize>,
    pub notifications: usize,
}

pub type Shared = Rc<RefCell<Recorded>>;

pub struct StubClient(pub Shared);

impl TransformClient for StubClient {
    fn remove_background(
        &self,
        input_path: &Path,
        _api_key: &str,
        _params: &RequestParams,
    ) -> Result<TransformResponse> {
        self.0.borrow_mut().uploads.push(input_path.to_path_buf());
        Ok(TransformResponse {
            data: b"png".to_vec(),
            content_type: "image/png".to_string(),
        })
    }
}

pub struct MemoryStorage;

impl Storage for MemoryStorage {
    fn write(&self, _path: &Path, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    fn file_exists(&self, _path: &Path) -> bool {
        false
    }

    fn expand_paths(&self, raw_paths: &[String]) -> Result<Vec<PathBuf>> {
        Ok(raw_paths.iter().map(PathBuf::from).collect())
    }

    fn mkdir_all(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn create_temp_file(&self, _data: &[u8], _suffix: &str) -> Result<TempPath> {
        Err(RemoveBgError::Runtime("no temp files in memory".to_string()))
    }
}

pub struct StubPrompt(pub Shared, pub bool);

impl Prompt for StubPrompt {
    fn confirm_large_batch(&self, size: usize) -> bool {
        self.0.borrow_mut().prompts.push(size);
        self.1
    }
}

pub struct CountingNotifier(pub Shared);

impl Notifier for CountingNotifier {
    fn success(&self, _input_path: &Path, _index: usize, _total: usize) {
        self.0.borrow_mut().notifications += 1;
    }

    fn error(&self, _err: &RemoveBgError, _input_path: &Path, _index: usize, _total: usize) {
        self.0.borrow_mut().notifications += 1;
    }

    fn skip(&self, _input_path: &Path, _output_path: &Path, _index: usize, _total: usize) {
        self.0.borrow_mut().notifications += 1;
    }
}

pub struct NoopCompositor;

impl Compositor for NoopCompositor {
    fn process(&self, _input_zip_path: &Path, _output_image_path: &Path) -> Result<()> {
        Ok(())
    }
}
