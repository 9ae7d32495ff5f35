use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, RgbaImage};

use crate::error::{PackError, Result};
use crate::model::ImageKind;

/// Raster decode/encode capability used by the pipeline.
///
/// `decode` must be pure with respect to the packing run: it may be called from
/// several threads at once when decode prefetch is enabled.
pub trait ImageCodec: Send + Sync {
    fn decode(&self, path: &Path) -> Result<RgbaImage>;
    fn encode(&self, canvas: &RgbaImage, path: &Path, quality: u8) -> Result<()>;
}

/// Reads and writes image files with the `image` crate. The format always
/// follows the file extension, never the file contents.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileCodec;

impl ImageCodec for FileCodec {
    fn decode(&self, path: &Path) -> Result<RgbaImage> {
        let kind = ImageKind::from_path(path)
            .ok_or_else(|| PackError::decode(path, unsupported(path)))?;
        let mut reader = ImageReader::open(path).map_err(|e| PackError::decode(path, e))?;
        reader.set_format(kind.image_format());
        let img = reader.decode().map_err(|e| PackError::decode(path, e))?;
        Ok(img.to_rgba8())
    }

    fn encode(&self, canvas: &RgbaImage, path: &Path, quality: u8) -> Result<()> {
        let kind = ImageKind::from_path(path)
            .ok_or_else(|| PackError::encode(path, unsupported(path)))?;
        if !kind.is_lossy() {
            return canvas
                .save_with_format(path, kind.image_format())
                .map_err(|e| PackError::encode(path, e));
        }
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
        let file = File::create(path).map_err(|e| PackError::encode(path, e))?;
        let enc = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
        enc.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| PackError::encode(path, e))
    }
}

fn unsupported(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("unsupported format: {:?}", ext)
}

/// In-memory codec: serves pre-decoded images by path and keeps every encoded
/// canvas. Paths still have to carry a supported extension.
#[derive(Debug, Default)]
pub struct MemoryCodec {
    sources: HashMap<PathBuf, RgbaImage>,
    written: Mutex<HashMap<PathBuf, RgbaImage>>,
}

impl MemoryCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, image: RgbaImage) {
        self.sources.insert(path.into(), image);
    }

    pub fn with(mut self, path: impl Into<PathBuf>, image: RgbaImage) -> Self {
        self.insert(path, image);
        self
    }

    /// Returns the canvas last encoded to `path`, if any.
    pub fn written(&self, path: &Path) -> Option<RgbaImage> {
        self.written
            .lock()
            .ok()
            .and_then(|w| w.get(path).cloned())
    }
}

impl ImageCodec for MemoryCodec {
    fn decode(&self, path: &Path) -> Result<RgbaImage> {
        if ImageKind::from_path(path).is_none() {
            return Err(PackError::decode(path, unsupported(path)));
        }
        self.sources
            .get(path)
            .cloned()
            .ok_or_else(|| PackError::decode(path, "no such image"))
    }

    fn encode(&self, canvas: &RgbaImage, path: &Path, _quality: u8) -> Result<()> {
        if ImageKind::from_path(path).is_none() {
            return Err(PackError::encode(path, unsupported(path)));
        }
        let mut written = self
            .written
            .lock()
            .map_err(|_| PackError::encode(path, "codec state poisoned"))?;
        written.insert(path.to_path_buf(), canvas.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn file_codec_round_trips_png_and_rejects_unknown_extensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dot.png");
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]));
        FileCodec.encode(&img, &path, 100).expect("encode");
        let back = FileCodec.decode(&path).expect("decode");
        assert_eq!(back, img);

        let tga = dir.path().join("dot.tga");
        std::fs::write(&tga, b"not an image").expect("write");
        assert!(matches!(FileCodec.decode(&tga), Err(PackError::Decode { .. })));
        assert!(matches!(
            FileCodec.encode(&img, &tga, 100),
            Err(PackError::Encode { .. })
        ));
    }

    #[test]
    fn jpeg_encode_drops_alpha() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("atlas.jpg");
        let img = RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 128]));
        FileCodec.encode(&img, &path, 80).expect("encode jpeg");
        let back = FileCodec.decode(&path).expect("decode jpeg");
        assert_eq!(back.dimensions(), (8, 8));
        assert_eq!(back.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG but not really").expect("write");
        assert!(matches!(FileCodec.decode(&path), Err(PackError::Decode { .. })));
    }

    #[test]
    fn memory_codec_serves_and_captures() {
        let codec = MemoryCodec::new().with("/in/a.png", RgbaImage::new(4, 4));
        assert_eq!(codec.decode(Path::new("/in/a.png")).expect("a").dimensions(), (4, 4));
        assert!(codec.decode(Path::new("/in/missing.png")).is_err());
        codec
            .encode(&RgbaImage::new(2, 2), Path::new("/out/atlas.png"), 100)
            .expect("encode");
        assert!(codec.written(Path::new("/out/atlas.png")).is_some());
    }
}
