//! Software drawing primitives over a softbuffer framebuffer
//! (one `u32` per pixel, `0x00RRGGBB`).

use crate::ui::layout::Rect;

pub const BG_COLOR: [u8; 3] = [31, 31, 31];

pub type Rgba = (u8, u8, u8, u8);

// 5x7 bitmap font covering ASCII 32..127. One byte per column, LSB = top row.
#[rustfmt::skip]
static FONT_5X7: [[u8; 5]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5F, 0x00, 0x00], // ' ' !
    [0x00, 0x07, 0x00, 0x07, 0x00], [0x14, 0x7F, 0x14, 0x7F, 0x14], // " #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62], // $ %
    [0x36, 0x49, 0x55, 0x22, 0x50], [0x00, 0x05, 0x03, 0x00, 0x00], // & '
    [0x00, 0x1C, 0x22, 0x41, 0x00], [0x00, 0x41, 0x22, 0x1C, 0x00], // ( )
    [0x14, 0x08, 0x3E, 0x08, 0x14], [0x08, 0x08, 0x3E, 0x08, 0x08], // * +
    [0x00, 0x50, 0x30, 0x00, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08], // , -
    [0x00, 0x60, 0x60, 0x00, 0x00], [0x20, 0x10, 0x08, 0x04, 0x02], // . /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], [0x00, 0x42, 0x7F, 0x40, 0x00], // 0 1
    [0x42, 0x61, 0x51, 0x49, 0x46], [0x21, 0x41, 0x45, 0x4B, 0x31], // 2 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], [0x27, 0x45, 0x45, 0x45, 0x39], // 4 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], [0x01, 0x71, 0x09, 0x05, 0x03], // 6 7
    [0x36, 0x49, 0x49, 0x49, 0x36], [0x06, 0x49, 0x49, 0x29, 0x1E], // 8 9
    [0x00, 0x36, 0x36, 0x00, 0x00], [0x00, 0x56, 0x36, 0x00, 0x00], // : ;
    [0x08, 0x14, 0x22, 0x41, 0x00], [0x14, 0x14, 0x14, 0x14, 0x14], // < =
    [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x51, 0x09, 0x06], // > ?
    [0x3E, 0x41, 0x5D, 0x55, 0x1E], [0x7E, 0x11, 0x11, 0x11, 0x7E], // @ A
    [0x7F, 0x49, 0x49, 0x49, 0x36], [0x3E, 0x41, 0x41, 0x41, 0x22], // B C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], [0x7F, 0x49, 0x49, 0x49, 0x41], // D E
    [0x7F, 0x09, 0x09, 0x09, 0x01], [0x3E, 0x41, 0x49, 0x49, 0x7A], // F G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], [0x00, 0x41, 0x7F, 0x41, 0x00], // H I
    [0x20, 0x40, 0x41, 0x3F, 0x01], [0x7F, 0x08, 0x14, 0x22, 0x41], // J K
    [0x7F, 0x40, 0x40, 0x40, 0x40], [0x7F, 0x02, 0x0C, 0x02, 0x7F], // L M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], [0x3E, 0x41, 0x41, 0x41, 0x3E], // N O
    [0x7F, 0x09, 0x09, 0x09, 0x06], [0x3E, 0x41, 0x51, 0x21, 0x5E], // P Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], [0x46, 0x49, 0x49, 0x49, 0x31], // R S
    [0x01, 0x01, 0x7F, 0x01, 0x01], [0x3F, 0x40, 0x40, 0x40, 0x3F], // T U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], [0x3F, 0x40, 0x38, 0x40, 0x3F], // V W
    [0x63, 0x14, 0x08, 0x14, 0x63], [0x07, 0x08, 0x70, 0x08, 0x07], // X Y
    [0x61, 0x51, 0x49, 0x45, 0x43], [0x00, 0x7F, 0x41, 0x41, 0x00], // Z [
    [0x02, 0x04, 0x08, 0x10, 0x20], [0x00, 0x41, 0x41, 0x7F, 0x00], // \ ]
    [0x04, 0x02, 0x01, 0x02, 0x04], [0x40, 0x40, 0x40, 0x40, 0x40], // ^ _
    [0x00, 0x01, 0x02, 0x04, 0x00], [0x20, 0x54, 0x54, 0x54, 0x78], // ` a
    [0x7F, 0x48, 0x44, 0x44, 0x38], [0x38, 0x44, 0x44, 0x44, 0x20], // b c
    [0x38, 0x44, 0x44, 0x48, 0x7F], [0x38, 0x54, 0x54, 0x54, 0x18], // d e
    [0x08, 0x7E, 0x09, 0x01, 0x02], [0x0C, 0x52, 0x52, 0x52, 0x3E], // f g
    [0x7F, 0x08, 0x04, 0x04, 0x78], [0x00, 0x44, 0x7D, 0x40, 0x00], // h i
    [0x20, 0x40, 0x44, 0x3D, 0x00], [0x7F, 0x10, 0x28, 0x44, 0x00], // j k
    [0x00, 0x41, 0x7F, 0x40, 0x00], [0x7C, 0x04, 0x18, 0x04, 0x78], // l m
    [0x7C, 0x08, 0x04, 0x04, 0x78], [0x38, 0x44, 0x44, 0x44, 0x38], // n o
    [0x7C, 0x14, 0x14, 0x14, 0x08], [0x08, 0x14, 0x14, 0x18, 0x7C], // p q
    [0x7C, 0x08, 0x04, 0x04, 0x08], [0x48, 0x54, 0x54, 0x54, 0x20], // r s
    [0x04, 0x3F, 0x44, 0x40, 0x20], [0x3C, 0x40, 0x40, 0x20, 0x7C], // t u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], [0x3C, 0x40, 0x30, 0x40, 0x3C], // v w
    [0x44, 0x28, 0x10, 0x28, 0x44], [0x0C, 0x50, 0x50, 0x50, 0x3C], // x y
    [0x44, 0x64, 0x54, 0x4C, 0x44], [0x00, 0x08, 0x36, 0x41, 0x00], // z {
    [0x00, 0x00, 0x7F, 0x00, 0x00], [0x00, 0x41, 0x36, 0x08, 0x00], // | }
    [0x10, 0x08, 0x08, 0x10, 0x08], [0x00, 0x00, 0x00, 0x00, 0x00], // ~ DEL
];

/// Pack RGB into softbuffer u32 format: 0x00RRGGBB.
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn unpack_rgb(v: u32) -> (u8, u8, u8) {
    ((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

fn blend(dst: u32, r: u8, g: u8, b: u8, a: u32) -> u32 {
    if a >= 255 {
        return rgb(r, g, b);
    }
    let inv = 255 - a;
    let (dr, dg, db) = unpack_rgb(dst);
    rgb(
        ((r as u32 * a + dr as u32 * inv) / 255) as u8,
        ((g as u32 * a + dg as u32 * inv) / 255) as u8,
        ((b as u32 * a + db as u32 * inv) / 255) as u8,
    )
}

/// Scale an alpha channel by an opacity in `0.0..=1.0`.
pub fn fade(color: Rgba, opacity: f32) -> Rgba {
    let a = (color.3 as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    (color.0, color.1, color.2, a)
}

fn put(buf: &mut [u32], stride: u32, buf_h: u32, x: i32, y: i32, color: Rgba) {
    if x >= 0 && y >= 0 && (x as u32) < stride && (y as u32) < buf_h {
        let off = (y as u32 * stride + x as u32) as usize;
        buf[off] = blend(buf[off], color.0, color.1, color.2, color.3 as u32);
    }
}

fn draw_char(buf: &mut [u32], stride: u32, buf_h: u32, ch: char, px: i32, py: i32, scale: u32, color: Rgba) {
    let idx = (ch as u32).wrapping_sub(32) as usize;
    let Some(glyph) = FONT_5X7.get(idx) else {
        return;
    };
    for (col, bits) in glyph.iter().enumerate() {
        for row in 0..7u32 {
            if bits & (1 << row) == 0 {
                continue;
            }
            for sy in 0..scale {
                for sx in 0..scale {
                    let x = px + (col as u32 * scale + sx) as i32;
                    let y = py + (row * scale + sy) as i32;
                    put(buf, stride, buf_h, x, y, color);
                }
            }
        }
    }
}

/// Width in pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    (text.chars().count() as u32 * 6 * scale).saturating_sub(scale)
}

/// Draw a string. Returns the x position after the last character.
pub fn draw_text(buf: &mut [u32], stride: u32, buf_h: u32, text: &str, px: i32, py: i32, scale: u32, color: Rgba) -> i32 {
    let mut x = px;
    for ch in text.chars() {
        draw_char(buf, stride, buf_h, ch, x, py, scale, color);
        x += (6 * scale) as i32;
    }
    x
}

/// Draw `text` centered in `rect`, cut to fit its width.
pub fn draw_text_centered(buf: &mut [u32], stride: u32, buf_h: u32, text: &str, rect: Rect, scale: u32, color: Rgba) {
    let max_chars = ((rect.w + scale) / (6 * scale).max(1)) as usize;
    let shown: String = if text.chars().count() > max_chars {
        let keep = max_chars.saturating_sub(3);
        text.chars().take(keep).chain("...".chars()).collect()
    } else {
        text.to_owned()
    };
    let w = text_width(&shown, scale) as i32;
    let x = rect.x + (rect.w as i32 - w) / 2;
    let y = rect.y + (rect.h as i32 - (7 * scale) as i32) / 2;
    draw_text(buf, stride, buf_h, &shown, x, y, scale, color);
}

pub fn fill_rect(buf: &mut [u32], stride: u32, buf_h: u32, rect: Rect, color: Rgba) {
    if color.3 == 0 {
        return;
    }
    let x0 = rect.x.max(0) as u32;
    let y0 = rect.y.max(0) as u32;
    let x1 = ((rect.x as i64 + rect.w as i64).max(0) as u32).min(stride);
    let y1 = ((rect.y as i64 + rect.h as i64).max(0) as u32).min(buf_h);
    for y in y0..y1 {
        let row = (y * stride) as usize;
        for x in x0..x1 {
            let off = row + x as usize;
            buf[off] = blend(buf[off], color.0, color.1, color.2, color.3 as u32);
        }
    }
}

/// Outline `rect` with a border `thickness` pixels wide, drawn inside it.
pub fn stroke_rect(buf: &mut [u32], stride: u32, buf_h: u32, rect: Rect, thickness: u32, color: Rgba) {
    let t = thickness.min(rect.w / 2).min(rect.h / 2);
    let inner_h = rect.h.saturating_sub(2 * t);
    fill_rect(buf, stride, buf_h, Rect::new(rect.x, rect.y, rect.w, t), color);
    fill_rect(buf, stride, buf_h, Rect::new(rect.x, rect.y + (rect.h - t) as i32, rect.w, t), color);
    fill_rect(buf, stride, buf_h, Rect::new(rect.x, rect.y + t as i32, t, inner_h), color);
    fill_rect(buf, stride, buf_h, Rect::new(rect.x + (rect.w - t) as i32, rect.y + t as i32, t, inner_h), color);
}

pub fn fit_scale(img_w: f32, img_h: f32, win_w: f32, win_h: f32) -> f32 {
    (win_w / img_w).min(win_h / img_h)
}

/// Nearest-neighbour blit of an RGBA source at `scale`, with its top-left
/// corner at `(x0, y0)`, multiplied by `opacity`.
pub fn blit_scaled(
    dst: &mut [u32], dst_w: u32, dst_h: u32,
    src: &[u8], src_w: u32, src_h: u32,
    x0: f32, y0: f32, scale: f32,
    opacity: f32,
) {
    if scale <= 0.0 || opacity <= 0.0 {
        return;
    }
    let draw_w = src_w as f32 * scale;
    let draw_h = src_h as f32 * scale;

    let dx_start = x0.max(0.0) as u32;
    let dy_start = y0.max(0.0) as u32;
    let dx_end = ((x0 + draw_w).ceil().max(0.0) as u32).min(dst_w);
    let dy_end = ((y0 + draw_h).ceil().max(0.0) as u32).min(dst_h);

    let inv_scale = 1.0 / scale;
    let opacity = opacity.min(1.0);

    for dy in dy_start..dy_end {
        let sy = ((dy as f32 - y0) * inv_scale) as u32;
        if sy >= src_h {
            continue;
        }
        for dx in dx_start..dx_end {
            let sx = ((dx as f32 - x0) * inv_scale) as u32;
            if sx >= src_w {
                continue;
            }
            let si = (sy as usize * src_w as usize + sx as usize) * 4;
            let di = dy as usize * dst_w as usize + dx as usize;
            let sa = (src[si + 3] as f32 * opacity) as u32;
            if sa > 0 {
                dst[di] = blend(dst[di], src[si], src[si + 1], src[si + 2], sa);
            }
        }
    }
}

/// Fit an image of `img_w x img_h` inside `area`, centered, shrunk by
/// `extra_scale`. Never upscales past 1:1. Returns `(x0, y0, scale)`.
pub fn fit_into(img_w: u32, img_h: u32, area: Rect, extra_scale: f32) -> (f32, f32, f32) {
    let scale = fit_scale(img_w as f32, img_h as f32, area.w as f32, area.h as f32).min(1.0) * extra_scale;
    let (cx, cy) = area.center();
    (
        cx - img_w as f32 * scale / 2.0,
        cy - img_h as f32 * scale / 2.0,
        scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_buffer() {
        let mut buf = vec![0u32; 4 * 3];
        fill_rect(&mut buf, 4, 3, Rect::new(-2, 1, 4, 10), (255, 0, 0, 255));
        assert_eq!(buf[4], rgb(255, 0, 0));
        assert_eq!(buf[5], rgb(255, 0, 0));
        assert_eq!(buf[6], 0);
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn half_alpha_blends() {
        let mut buf = vec![rgb(0, 0, 0); 1];
        fill_rect(&mut buf, 1, 1, Rect::new(0, 0, 1, 1), (255, 255, 255, 128));
        let (r, g, b) = unpack_rgb(buf[0]);
        assert_eq!((r, g, b), (128, 128, 128));
    }

    #[test]
    fn fade_scales_alpha() {
        assert_eq!(fade((1, 2, 3, 200), 0.5), (1, 2, 3, 100));
        assert_eq!(fade((1, 2, 3, 200), 2.0), (1, 2, 3, 200));
        assert_eq!(fade((1, 2, 3, 200), 0.0).3, 0);
    }

    #[test]
    fn text_width_matches_advance() {
        let mut buf = vec![0u32; 64 * 16];
        let end = draw_text(&mut buf, 64, 16, "ab", 0, 0, 1, (255, 255, 255, 255));
        assert_eq!(end, 12);
        assert_eq!(text_width("ab", 1), 11);
        assert_eq!(text_width("", 2), 0);
    }

    #[test]
    fn stroke_leaves_interior_untouched() {
        let mut buf = vec![0u32; 5 * 5];
        stroke_rect(&mut buf, 5, 5, Rect::new(0, 0, 5, 5), 1, (255, 255, 255, 255));
        assert_eq!(buf[0], rgb(255, 255, 255));
        assert_eq!(buf[12], 0);
        assert_eq!(buf[24], rgb(255, 255, 255));
    }

    #[test]
    fn blit_respects_opacity() {
        let src = [200u8, 100, 50, 255];
        let mut dst = vec![0u32; 4];
        blit_scaled(&mut dst, 2, 2, &src, 1, 1, 0.0, 0.0, 2.0, 1.0);
        assert!(dst.iter().all(|&p| p == rgb(200, 100, 50)));

        let mut dst = vec![0u32; 1];
        blit_scaled(&mut dst, 1, 1, &src, 1, 1, 0.0, 0.0, 1.0, 0.0);
        assert_eq!(dst[0], 0);
    }

    #[test]
    fn fit_into_centers_without_upscaling() {
        let area = Rect::new(0, 0, 200, 100);
        let (x0, y0, s) = fit_into(50, 50, area, 1.0);
        assert_eq!(s, 1.0);
        assert_eq!((x0, y0), (75.0, 25.0));

        let (_, _, s) = fit_into(400, 100, area, 1.0);
        assert_eq!(s, 0.5);
    }
}
