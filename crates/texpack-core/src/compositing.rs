use image::RgbaImage;

/// Copy `src` into `canvas` with its top-left corner at (dx, dy).
///
/// Pixels are overwritten as-is, alpha included; nothing is blended. Parts of
/// `src` falling outside the canvas are clipped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    if dx >= cw || dy >= ch {
        return;
    }
    let rw = sw.min(cw - dx) as usize;
    let rh = sh.min(ch - dy);

    let src_stride = sw as usize * 4;
    let dst_stride = cw as usize * 4;
    let src_raw = src.as_raw();
    let dst_raw: &mut [u8] = canvas;
    for yy in 0..rh {
        let s = yy as usize * src_stride;
        let d = (dy + yy) as usize * dst_stride + dx as usize * 4;
        dst_raw[d..d + rw * 4].copy_from_slice(&src_raw[s..s + rw * 4]);
    }
}
