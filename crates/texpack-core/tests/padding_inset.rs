use image::{Rgba, RgbaImage};
use texpack_core::prelude::*;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[test]
fn content_is_drawn_inset_by_padding() {
    let codec = MemoryCodec::new().with("/p/red.png", RgbaImage::from_pixel(4, 4, RED));
    let cfg = PackerConfig::builder()
        .with_dimensions(16, 16)
        .padding(2)
        .build();
    let out = pack_images(vec![("/p/red.png", "red")], &cfg, &codec).expect("pack");

    let info = &out.placed[0];
    assert_eq!(info.placement, Some(Placement { x: 2, y: 2 }));
    for (x, y) in [(2, 2), (5, 5), (2, 5), (5, 2)] {
        assert_eq!(*out.canvas.get_pixel(x, y), RED, "({x},{y})");
    }
    for (x, y) in [(0, 0), (1, 1), (6, 6), (7, 2), (2, 7), (15, 15)] {
        assert_eq!(*out.canvas.get_pixel(x, y), CLEAR, "({x},{y})");
    }
}

#[test]
fn translucent_pixels_are_copied_verbatim() {
    let ghost = Rgba([12, 34, 56, 7]);
    let codec = MemoryCodec::new().with("/p/ghost.png", RgbaImage::from_pixel(3, 3, ghost));
    let cfg = PackerConfig::builder()
        .with_dimensions(8, 8)
        .padding(0)
        .build();
    let out = pack_images(vec![("/p/ghost.png", "ghost")], &cfg, &codec).expect("pack");
    assert_eq!(*out.canvas.get_pixel(0, 0), ghost);
    assert_eq!(*out.canvas.get_pixel(2, 2), ghost);
    assert_eq!(*out.canvas.get_pixel(3, 3), CLEAR);
}

#[test]
fn neighbours_never_bleed_into_each_others_padding() {
    let blue = Rgba([0, 0, 255, 255]);
    let codec = MemoryCodec::new()
        .with("/p/a.png", RgbaImage::from_pixel(4, 4, RED))
        .with("/p/b.png", RgbaImage::from_pixel(4, 4, blue));
    let cfg = PackerConfig::builder()
        .with_dimensions(32, 8)
        .padding(1)
        .build();
    let out = pack_images(vec![("/p/a.png", "a"), ("/p/b.png", "b")], &cfg, &codec).expect("pack");
    // a: slot (0,0)-(6,6), b: slot (6,0)-(12,6)
    assert_eq!(out.placed[1].placement, Some(Placement { x: 7, y: 1 }));
    assert_eq!(*out.canvas.get_pixel(4, 1), RED);
    assert_eq!(*out.canvas.get_pixel(5, 1), CLEAR);
    assert_eq!(*out.canvas.get_pixel(6, 1), CLEAR);
    assert_eq!(*out.canvas.get_pixel(7, 1), blue);
}
