use image::RgbaImage;
use texpack_core::prelude::*;

#[test]
fn manifest_round_trips_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let codec = MemoryCodec::new()
        .with("/art/ui/button.png", RgbaImage::new(20, 10))
        .with("/art/ui/icon.png", RgbaImage::new(8, 8));
    let cfg = PackerConfig::builder()
        .with_dimensions(64, 64)
        .output_image_path(dir.path().join("ui.png"))
        .meta_filename(Some("cdn/ui.png".into()))
        .build();
    let out = pack_images(
        vec![("/art/ui/icon.png", "ui/icon.png"), ("/art/ui/button.png", "ui/button.png")],
        &cfg,
        &codec,
    )
    .expect("pack");

    let written = write_manifest(&out, &cfg).expect("write");
    assert_eq!(written, dir.path().join("ui.json"));

    let text = std::fs::read_to_string(&written).expect("read");
    let manifest = Manifest::from_json_str(&text).expect("parse");
    assert_eq!(manifest, build_manifest(&out, &cfg));
    assert_eq!(manifest.meta.image, "cdn/ui.png");
    assert_eq!(manifest.meta.schema, "json");

    let button = manifest.find("ui/button.png").expect("button");
    assert_eq!((button.x, button.y, button.width, button.height), (1, 1, 20, 10));
    assert_eq!(
        button.id,
        texpack_core::image_id(std::path::Path::new("/art/ui/button.png"))
    );
    assert_eq!(manifest.find_by_id(&button.id), Some(button));
    assert!(manifest.find("ui/missing.png").is_none());
}

#[test]
fn dropped_images_are_not_in_the_manifest() {
    let codec = MemoryCodec::new()
        .with("/a.png", RgbaImage::new(10, 10))
        .with("/b.png", RgbaImage::new(100, 100));
    let cfg = PackerConfig::builder()
        .with_dimensions(32, 32)
        .ignore_large_image(true)
        .build();
    let out = pack_images(vec![("/a.png", "a"), ("/b.png", "b")], &cfg, &codec).expect("pack");
    let manifest = build_manifest(&out, &cfg);
    assert_eq!(manifest.frames.len(), 1);
    assert!(manifest.find("b").is_none());
}
