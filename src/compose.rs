//! Logo and background composition on top of a painted QR raster.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::error::{Error, Result};
use crate::options::{Background, BgImageOptions, BgStyle, GifFrame, LogoOptions, LogoStyle};

/// Burns `logo` into the center of `canvas` and returns the result.
///
/// The logo keeps its aspect ratio and is shrunk until each edge is at most
/// `2 * canvas edge / rate`. Borders are filled rounded rectangles drawn behind it.
///
/// # Example
///
/// ```rust
/// use image::{Rgba, RgbaImage};
/// use qrstyle::compose::draw_logo;
/// use qrstyle::options::LogoOptions;
///
/// let qr = RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 255]));
/// let logo = LogoOptions::new(RgbaImage::from_pixel(100, 100, Rgba([255, 0, 0, 255])));
/// let out = draw_logo(&qr, &logo);
/// assert_eq!(*out.get_pixel(100, 100), Rgba([255, 0, 0, 255]));
/// ```
pub fn draw_logo(canvas: &RgbaImage, logo: &LogoOptions) -> RgbaImage {
    let mut out = canvas.clone();
    let (cw, ch) = out.dimensions();
    let rate = logo.rate.max(1);
    let limit_w = (cw * 2 / rate).max(1);
    let limit_h = (ch * 2 / rate).max(1);

    let (lw, lh) = logo.image.dimensions();
    let scale = (f64::from(limit_w) / f64::from(lw))
        .min(f64::from(limit_h) / f64::from(lh))
        .min(1.0);
    let w = ((f64::from(lw) * scale).floor() as u32).max(1);
    let h = ((f64::from(lh) * scale).floor() as u32).max(1);
    let mut image = if (w, h) == (lw, lh) {
        logo.image.clone()
    } else {
        imageops::resize(&logo.image, w, h, FilterType::Lanczos3)
    };

    let radius = w / 4;
    if logo.style == LogoStyle::Round {
        round_corners(&mut image, radius);
    }

    let x = i64::from(cw.saturating_sub(w) / 2);
    let y = i64::from(ch.saturating_sub(h) / 2);
    if logo.border {
        let pad = (w.max(h) / 16).max(2);
        if let Some(outer) = logo.outer_border_color {
            let outer_pad = i64::from(pad * 2);
            fill_rounded_rect(
                &mut out,
                x - outer_pad,
                y - outer_pad,
                w + pad * 4,
                h + pad * 4,
                radius + pad * 2,
                outer,
                logo.opacity,
            );
        }
        fill_rounded_rect(
            &mut out,
            x - i64::from(pad),
            y - i64::from(pad),
            w + pad * 2,
            h + pad * 2,
            radius + pad,
            logo.border_color,
            logo.opacity,
        );
    }
    blend_onto(&mut out, &image, x, y, logo.opacity);
    debug!(logo_w = w, logo_h = h, x, y, border = logo.border, "logo drawn");
    out
}

/// Composites `qr` with a static background.
///
/// An animated source contributes its first frame.
pub fn draw_background(qr: &RgbaImage, options: &BgImageOptions) -> Result<RgbaImage> {
    options.validate()?;
    let background = match &options.source {
        Background::Static(image) => image,
        Background::Animated(frames) => match frames.first() {
            Some(frame) => &frame.image,
            None => return Err(Error::invalid("animated background has no frames")),
        },
    };
    Ok(compose_frame(qr, background, options))
}

/// Composites `qr` with every frame of the background, keeping each frame's delay and order.
pub fn draw_gif_background(qr: &RgbaImage, options: &BgImageOptions) -> Result<Vec<GifFrame>> {
    options.validate()?;
    let frames = match &options.source {
        Background::Animated(frames) => frames
            .iter()
            .map(|frame| GifFrame::new(compose_frame(qr, &frame.image, options), frame.delay_centis))
            .collect(),
        Background::Static(image) => vec![GifFrame::new(compose_frame(qr, image, options), 0)],
    };
    debug!(frames = frames.len(), style = ?options.style, "animated background composed");
    Ok(frames)
}

fn compose_frame(qr: &RgbaImage, background: &RgbaImage, options: &BgImageOptions) -> RgbaImage {
    let (qw, qh) = qr.dimensions();
    match options.style {
        BgStyle::Fill => {
            let sized = if options.width > 0 && options.height > 0 {
                resize_to(background, options.width, options.height)
            } else {
                background.clone()
            };
            let mut canvas = cover(
                sized,
                options.start_x.saturating_add(qw),
                options.start_y.saturating_add(qh),
            );
            blend_onto(
                &mut canvas,
                qr,
                i64::from(options.start_x),
                i64::from(options.start_y),
                1.0,
            );
            canvas
        }
        BgStyle::Override | BgStyle::Penetrate => {
            let tw = if options.width > 0 { options.width } else { qw };
            let th = if options.height > 0 { options.height } else { qh };
            let mut canvas = cover(resize_to(background, tw, th), qw, qh);
            let x = i64::from((canvas.width() - qw) / 2);
            let y = i64::from((canvas.height() - qh) / 2);
            let opacity = if options.style == BgStyle::Override {
                options.opacity
            } else {
                1.0
            };
            blend_onto(&mut canvas, qr, x, y, opacity);
            canvas
        }
    }
}

fn resize_to(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width, height, FilterType::Triangle)
    }
}

/// Grows `image`, keeping its aspect ratio, until it is at least `min_w` x `min_h`.
fn cover(image: RgbaImage, min_w: u32, min_h: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w >= min_w && h >= min_h {
        return image;
    }
    let scale = (f64::from(min_w) / f64::from(w)).max(f64::from(min_h) / f64::from(h));
    let new_w = ((f64::from(w) * scale).ceil() as u32).max(min_w);
    let new_h = ((f64::from(h) * scale).ceil() as u32).max(min_h);
    imageops::resize(&image, new_w, new_h, FilterType::Triangle)
}

/// Source-over blend of `top` onto `bottom` at `(x, y)`, scaling `top`'s alpha by `opacity`.
/// Pixels falling outside `bottom` are clipped.
pub(crate) fn blend_onto(bottom: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64, opacity: f32) {
    let (bw, bh) = (i64::from(bottom.width()), i64::from(bottom.height()));
    for (tx, ty, pixel) in top.enumerate_pixels() {
        let (ix, iy) = (x + i64::from(tx), y + i64::from(ty));
        if ix < 0 || iy < 0 || ix >= bw || iy >= bh {
            continue;
        }
        let dst = bottom.get_pixel_mut(ix as u32, iy as u32);
        *dst = alpha_blend(dst, pixel, opacity);
    }
}

fn alpha_blend(bg: &Rgba<u8>, fg: &Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fa = f64::from(fg[3]) / 255.0 * f64::from(opacity);
    if fa <= 0.0 {
        return *bg;
    }
    let ba = f64::from(bg[3]) / 255.0;
    let out_a = fa + ba * (1.0 - fa);
    let channel = |i: usize| {
        ((f64::from(fg[i]) * fa + f64::from(bg[i]) * ba * (1.0 - fa)) / out_a).round() as u8
    };
    Rgba([channel(0), channel(1), channel(2), (out_a * 255.0).round() as u8])
}

/// Clears every pixel outside a rounded rectangle of corner `radius`.
fn round_corners(image: &mut RgbaImage, radius: u32) {
    let (w, h) = image.dimensions();
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if !is_inside_rounded_rect(x, y, w, h, radius) {
            pixel[3] = 0;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn fill_rounded_rect(
    canvas: &mut RgbaImage,
    x: i64,
    y: i64,
    w: u32,
    h: u32,
    radius: u32,
    color: Rgba<u8>,
    opacity: f32,
) {
    let (cw, ch) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for dy in 0..h {
        for dx in 0..w {
            let (ix, iy) = (x + i64::from(dx), y + i64::from(dy));
            if ix < 0 || iy < 0 || ix >= cw || iy >= ch || !is_inside_rounded_rect(dx, dy, w, h, radius) {
                continue;
            }
            let dst = canvas.get_pixel_mut(ix as u32, iy as u32);
            *dst = alpha_blend(dst, &color, opacity);
        }
    }
}

/// Whether pixel `(x, y)` of a `w` x `h` box lies inside its rounded outline.
fn is_inside_rounded_rect(x: u32, y: u32, w: u32, h: u32, r: u32) -> bool {
    let r = r.min(w / 2).min(h / 2);
    if r == 0 {
        return true;
    }
    let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
    let rf = f64::from(r);
    let cx = if px < rf {
        rf
    } else if px > f64::from(w) - rf {
        f64::from(w) - rf
    } else {
        return true;
    };
    let cy = if py < rf {
        rf
    } else if py > f64::from(h) - rf {
        f64::from(h) - rf
    } else {
        return true;
    };
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= rf * rf
}
