use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::model::ImageKind;

/// Largest accepted canvas edge, in pixels.
pub const MAX_DIMENSION: u32 = 4096;

/// What to do when an image finds no room in the tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    /// Fail the whole run on the first image that does not fit.
    #[default]
    Abort,
    /// Skip the image (not drawn, not in the manifest) and keep going.
    Drop,
}

impl FromStr for OversizePolicy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "drop" | "ignore" => Ok(Self::Drop),
            _ => Err(()),
        }
    }
}

/// Manifest serializations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    Json,
}

impl FromStr for SchemaFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Atlas width in pixels (1..=4096).
    pub width: u32,
    /// Atlas height in pixels (1..=4096).
    pub height: u32,
    /// Empty border reserved on every side of each image.
    pub padding: u32,
    /// Encoded atlas; the extension selects the format.
    pub output_image_path: PathBuf,
    /// Manifest path. Derived from `output_image_path` when unset.
    #[serde(default)]
    pub output_schema_path: Option<PathBuf>,
    /// Encode quality, JPEG only (1..=100).
    #[serde(default = "default_quality")]
    pub quality: u8,
    #[serde(default)]
    pub oversize: OversizePolicy,
    /// Manifest format name; only "json" is supported.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Replaces the atlas file name written to the manifest.
    #[serde(default)]
    pub meta_filename: Option<String>,
    /// Decode every input up front on the rayon pool (feature "parallel").
    #[serde(default)]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            padding: 1,
            output_image_path: PathBuf::from("packed.png"),
            output_schema_path: None,
            quality: default_quality(),
            oversize: OversizePolicy::default(),
            schema: default_schema(),
            meta_filename: None,
            parallel: false,
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Either dimension is outside 1..=4096
    /// - Padding is not smaller than both dimensions
    /// - The output extension or schema is unsupported, or quality is out of range
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::PackError;

        let valid = 1..=MAX_DIMENSION;
        if !valid.contains(&self.width) || !valid.contains(&self.height) {
            return Err(PackError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        if self.padding >= self.width.min(self.height) {
            return Err(PackError::InvalidConfig(format!(
                "padding ({}) must be smaller than the output image ({}x{})",
                self.padding, self.width, self.height
            )));
        }

        self.schema_format()?;

        if self.output_kind().is_none() {
            return Err(PackError::InvalidConfig(format!(
                "unsupported output format: {}",
                self.output_image_path.display()
            )));
        }

        if !(1..=100).contains(&self.quality) {
            return Err(PackError::InvalidConfig(format!(
                "quality ({}) must be within 1..=100",
                self.quality
            )));
        }

        Ok(())
    }

    pub fn schema_format(&self) -> crate::error::Result<SchemaFormat> {
        self.schema.parse().map_err(|_| {
            crate::error::PackError::InvalidConfig(format!(
                "unsupported schema {:?}, only json is supported",
                self.schema
            ))
        })
    }

    pub fn output_kind(&self) -> Option<ImageKind> {
        ImageKind::from_path(&self.output_image_path)
    }

    /// Manifest path: the configured one, or the image path with `.json`.
    pub fn schema_path(&self) -> PathBuf {
        self.output_schema_path
            .clone()
            .unwrap_or_else(|| self.output_image_path.with_extension("json"))
    }

    /// Value of the manifest's `image` field.
    pub fn meta_image_name(&self) -> String {
        match &self.meta_filename {
            Some(name) if !name.is_empty() => name.clone(),
            _ => file_name(&self.output_image_path),
        }
    }

    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }

    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn default_quality() -> u8 {
    100
}
fn default_schema() -> String {
    "json".into()
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn with_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.width = w;
        self.cfg.height = h;
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn output_image_path(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.output_image_path = v.into();
        self
    }
    pub fn output_schema_path(mut self, v: Option<PathBuf>) -> Self {
        self.cfg.output_schema_path = v;
        self
    }
    pub fn quality(mut self, v: u8) -> Self {
        self.cfg.quality = v;
        self
    }
    pub fn oversize(mut self, v: OversizePolicy) -> Self {
        self.cfg.oversize = v;
        self
    }
    pub fn ignore_large_image(mut self, v: bool) -> Self {
        self.cfg.oversize = if v {
            OversizePolicy::Drop
        } else {
            OversizePolicy::Abort
        };
        self
    }
    pub fn schema(mut self, v: impl Into<String>) -> Self {
        self.cfg.schema = v.into();
        self
    }
    pub fn meta_filename(mut self, v: Option<String>) -> Self {
        self.cfg.meta_filename = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}
