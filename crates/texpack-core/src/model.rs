use std::path::{Path, PathBuf};

use image::ImageFormat;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Rect {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        debug_assert!(left <= right && top <= bottom, "inverted rect");
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_size(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Returns true if `r` lies fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.left >= self.left && r.top >= self.top && r.right <= self.right && r.bottom <= self.bottom
    }

    /// Returns true if a `w`x`h` box fits inside `self` without rotation.
    pub fn fits(&self, w: u32, h: u32) -> bool {
        w <= self.width() && h <= self.height()
    }

    /// Strict overlap test; rects that only share an edge do not intersect.
    pub fn intersects(&self, r: &Rect) -> bool {
        self.left < r.right && r.left < self.right && self.top < r.bottom && r.top < self.bottom
    }
}

/// Raster formats understood by the codec layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
    Bmp,
    WebP,
}

impl ImageKind {
    /// Picks the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
            Self::WebP => ImageFormat::WebP,
        }
    }

    /// Lossy formats honour the configured encode quality.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

/// Per-input result of a packing run, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Placed; `slot` is the padded rectangle reserved in the atlas.
    Placed { path: PathBuf, id: String, slot: Rect },
    /// The codec could not produce pixels for this input.
    DecodeFailed { path: PathBuf, reason: String },
    /// No leaf could hold the padded size; skipped under the drop policy.
    Dropped {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

impl ItemOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Placed { path, .. } | Self::DecodeFailed { path, .. } | Self::Dropped { path, .. } => {
                path
            }
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }
}

/// One placed image as written to the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestFrame {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Manifest-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestMeta {
    pub app: String,
    pub version: String,
    /// Atlas image file name, or the configured override.
    pub image: String,
    pub size: Size,
    pub padding: u32,
    pub format: String,
    pub schema: String,
}

/// Side-car description of an atlas: where each named image lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub frames: Vec<ManifestFrame>,
    pub meta: ManifestMeta,
}

impl Manifest {
    pub fn from_json_str(s: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Locates an image inside the atlas by its logical name.
    pub fn find(&self, name: &str) -> Option<&ManifestFrame> {
        self.frames.iter().find(|f| f.name == name)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ManifestFrame> {
        self.frames.iter().find(|f| f.id == id)
    }
}

/// Statistics about a packing run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PackStats {
    /// Number of images written into the atlas.
    pub placed: usize,
    /// Number of inputs the codec rejected.
    pub decode_failed: usize,
    /// Number of decoded images that found no room (drop policy only).
    pub dropped: usize,
    /// width * height of the canvas.
    pub canvas_area: u64,
    /// Area reserved by placed slots, padding included.
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0).
    pub occupancy: f64,
}

impl PackStats {
    pub fn from_outcomes(outcomes: &[ItemOutcome], width: u32, height: u32) -> Self {
        let mut placed = 0;
        let mut decode_failed = 0;
        let mut dropped = 0;
        let mut used_area = 0u64;
        for o in outcomes {
            match o {
                ItemOutcome::Placed { slot, .. } => {
                    placed += 1;
                    used_area += slot.area();
                }
                ItemOutcome::DecodeFailed { .. } => decode_failed += 1,
                ItemOutcome::Dropped { .. } => dropped += 1,
            }
        }
        let canvas_area = width as u64 * height as u64;
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        Self {
            placed,
            decode_failed,
            dropped,
            canvas_area,
            used_area,
            occupancy,
        }
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Placed: {}, Undecodable: {}, Dropped: {}, Occupancy: {:.2}%, Canvas: {} px², Used: {} px²",
            self.placed,
            self.decode_failed,
            self.dropped,
            self.occupancy * 100.0,
            self.canvas_area,
            self.used_area,
        )
    }

    pub fn wasted_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.used_area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_are_exclusive() {
        let a = Rect::from_size(0, 0, 10, 10);
        let b = Rect::from_size(10, 0, 5, 10);
        assert_eq!(a.right, 10);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::from_size(9, 9, 2, 2)));
        assert!(Rect::new(0, 0, 20, 20).contains(&a));
        assert!(a.fits(10, 10));
        assert!(!a.fits(11, 1));
        assert!(Rect::from_size(3, 3, 0, 8).is_empty());
    }

    #[test]
    fn kind_from_extension_ignores_case() {
        assert_eq!(ImageKind::from_path(Path::new("/a/b.PNG")), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_path(Path::new("x.Jpeg")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("x.jpg")), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_path(Path::new("x.webp")), Some(ImageKind::WebP));
        assert_eq!(ImageKind::from_path(Path::new("x.tga")), None);
        assert_eq!(ImageKind::from_path(Path::new("png")), None);
    }

    #[test]
    fn stats_count_each_outcome() {
        let outcomes = vec![
            ItemOutcome::Placed {
                path: "/a.png".into(),
                id: "x".into(),
                slot: Rect::from_size(0, 0, 50, 50),
            },
            ItemOutcome::Dropped {
                path: "/b.png".into(),
                width: 80,
                height: 80,
            },
            ItemOutcome::DecodeFailed {
                path: "/c.tga".into(),
                reason: "unsupported".into(),
            },
        ];
        let s = PackStats::from_outcomes(&outcomes, 100, 100);
        assert_eq!((s.placed, s.dropped, s.decode_failed), (1, 1, 1));
        assert_eq!(s.used_area, 2500);
        assert_eq!(s.wasted_area(), 7500);
        assert!((s.occupancy - 0.25).abs() < 1e-9);
    }
}
