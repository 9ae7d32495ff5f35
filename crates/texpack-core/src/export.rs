use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::info;

use crate::config::{PackerConfig, SchemaFormat};
use crate::error::{PackError, Result};
use crate::model::{Manifest, ManifestMeta, Size};
use crate::pipeline::PackOutput;

const APP: &str = "texpack";
const PIXEL_FORMAT: &str = "RGBA8888";

/// Manifest for a finished run. Frames keep placement order.
pub fn build_manifest(output: &PackOutput, cfg: &PackerConfig) -> Manifest {
    let (w, h) = output.canvas.dimensions();
    Manifest {
        frames: output.placed.iter().filter_map(|i| i.to_frame()).collect(),
        meta: ManifestMeta {
            app: APP.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            image: cfg.meta_image_name(),
            size: Size { w, h },
            padding: cfg.padding,
            format: PIXEL_FORMAT.into(),
            schema: "json".into(),
        },
    }
}

/// `{ frames: [ { id, width, height, x, y, name } ], meta }`.
pub fn to_json(manifest: &Manifest) -> Result<Value> {
    Ok(serde_json::to_value(manifest)?)
}

/// Serializes the manifest next to the atlas (or to `output_schema_path`)
/// and returns the path written. Like the atlas itself, the target directory
/// must already exist.
pub fn write_manifest(output: &PackOutput, cfg: &PackerConfig) -> Result<PathBuf> {
    let path = cfg.schema_path();
    let body = match cfg.schema_format()? {
        SchemaFormat::Json => serde_json::to_string_pretty(&build_manifest(output, cfg))?,
    };
    fs::write(&path, body).map_err(|e| PackError::encode(&path, e))?;
    info!(path = %path.display(), "manifest written");
    Ok(path)
}
