//! One-call rendering of a styled QR code.
//!
//! [`generate`] runs the whole pipeline: content is transcoded and encoded into a
//! [`BitMatrix`], painted, then combined with the configured background and logo.
//!
//! When the background style is [`BgStyle::Fill`] the logo is burned into the QR raster before
//! the background is applied, since the fill offset places the finished raster. For every other
//! style the logo goes on last and is centered on the composited canvas.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::RgbaImage;
use tracing::{debug, info, instrument};

use crate::codec;
use crate::compose::{draw_background, draw_gif_background, draw_logo};
use crate::error::Result;
use crate::matrix::BitMatrix;
use crate::options::{BgStyle, DrawOptions, GifFrame, OutputFormat, QrCodeOptions, TRANSPARENT};
use crate::render::paint;

/// A rendered QR code: a still image or, when the background was animated, a frame sequence.
#[derive(Clone, Debug)]
pub enum QrImage {
    Still { image: RgbaImage, format: OutputFormat },
    Animated(Vec<GifFrame>),
}

impl QrImage {
    /// Encoded format of [`to_bytes`](Self::to_bytes).
    pub fn format(&self) -> OutputFormat {
        match self {
            QrImage::Still { format, .. } => *format,
            QrImage::Animated(_) => OutputFormat::Gif,
        }
    }

    /// The still image, if this is not an animation.
    pub fn as_image(&self) -> Option<&RgbaImage> {
        match self {
            QrImage::Still { image, .. } => Some(image),
            QrImage::Animated(_) => None,
        }
    }

    pub fn into_image(self) -> Option<RgbaImage> {
        match self {
            QrImage::Still { image, .. } => Some(image),
            QrImage::Animated(_) => None,
        }
    }

    /// Animation frames; empty for a still image.
    pub fn frames(&self) -> &[GifFrame] {
        match self {
            QrImage::Still { .. } => &[],
            QrImage::Animated(frames) => frames,
        }
    }

    /// Encodes the image in its format, or the frames as an animated GIF.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            QrImage::Still { image, format } => codec::encode_image(image, *format),
            QrImage::Animated(frames) => codec::encode_gif(frames),
        }
    }

    /// Writes [`to_bytes`](Self::to_bytes) to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_bytes()?)?;
        info!(path = %path.display(), "QR code saved");
        Ok(())
    }

    /// `data:` URI with the base64-encoded bytes, ready for an `<img src>`.
    pub fn to_data_uri(&self) -> Result<String> {
        let bytes = self.to_bytes()?;
        Ok(format!("data:{};base64,{}", self.format().mime_type(), BASE64.encode(bytes)))
    }
}

/// Renders a QR code from `options`.
///
/// # Errors
///
/// * [`Error::InvalidArgument`](crate::error::Error::InvalidArgument) for a rejected
///   configuration.
/// * [`Error::Encoding`](crate::error::Error::Encoding) when the content does not fit.
///
/// # Example
///
/// ```rust
/// use qrstyle::options::QrCodeOptions;
/// use qrstyle::qrcode::generate;
///
/// let options = QrCodeOptions::builder("HELLO").build().unwrap();
/// let image = generate(&options).unwrap().into_image().unwrap();
/// assert_eq!(image.dimensions(), (200, 200));
/// ```
#[instrument(skip_all, fields(width = options.width, height = options.height, style = ?options.draw.style))]
pub fn generate(options: &QrCodeOptions) -> Result<QrImage> {
    options.validate()?;
    let bytes = options.charset.encode(&options.content)?;
    let matrix = BitMatrix::encode(
        &bytes,
        options.error_correction,
        options.margin,
        options.width,
        options.height,
    )?;

    let penetrated;
    let draw = match &options.background {
        Some(background) if background.style == BgStyle::Penetrate => {
            penetrated = DrawOptions {
                foreground: TRANSPARENT,
                ..options.draw.clone()
            };
            &penetrated
        }
        _ => &options.draw,
    };
    let mut qr = paint(&matrix, draw, &options.detect);

    let Some(background) = &options.background else {
        if let Some(logo) = &options.logo {
            qr = draw_logo(&qr, logo);
        }
        info!("QR code rendered");
        return Ok(QrImage::Still {
            image: qr,
            format: options.format,
        });
    };

    let logo_first = background.style == BgStyle::Fill;
    if logo_first {
        if let Some(logo) = &options.logo {
            qr = draw_logo(&qr, logo);
        }
    }
    debug!(style = ?background.style, logo_first, animated = background.is_animated(), "compositing background");
    let finish = |canvas: RgbaImage| match &options.logo {
        Some(logo) if !logo_first => draw_logo(&canvas, logo),
        _ => canvas,
    };

    let rendered = if background.is_animated() {
        let frames = draw_gif_background(&qr, background)?
            .into_iter()
            .map(|frame| GifFrame::new(finish(frame.image), frame.delay_centis))
            .collect();
        QrImage::Animated(frames)
    } else {
        QrImage::Still {
            image: finish(draw_background(&qr, background)?),
            format: options.format,
        }
    };
    info!("QR code rendered");
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::options::{BgImageOptions, DotSize, DrawStyle, LogoOptions, QrCodeEcc, BLACK, WHITE};
    use image::{DynamicImage, Rgba};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn decode(image: &RgbaImage) -> String {
        let gray = DynamicImage::ImageRgba8(image.clone()).to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            gray.width() as usize,
            gray.height() as usize,
            |x, y| gray.get_pixel(x as u32, y as u32)[0],
        );
        let grids = prepared.detect_grids();
        assert!(!grids.is_empty(), "no QR code found");
        let (_, content) = grids[0].decode().unwrap();
        content
    }

    fn still(options: &QrCodeOptions) -> RgbaImage {
        generate(options).unwrap().into_image().unwrap()
    }

    fn bbox(image: &RgbaImage, color: Rgba<u8>) -> (u32, u32, u32, u32) {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == color)
            .fold((u32::MAX, u32::MAX, 0, 0), |(a, b, c, d), (x, y, _)| {
                (a.min(x), b.min(y), c.max(x), d.max(y))
            })
    }

    #[test]
    fn test_hello_round_trip() {
        let options = QrCodeOptions::builder("HELLO")
            .size(200, 200)
            .error_correction(QrCodeEcc::High)
            .margin(1)
            .draw_style(DrawStyle::Rectangle)
            .build()
            .unwrap();
        let image = still(&options);
        assert_eq!(image.dimensions(), (200, 200));
        assert_eq!(decode(&image), "HELLO");
    }

    #[test]
    fn test_round_trip_with_merging_and_circles() {
        for (style, merge) in [
            (DrawStyle::Rectangle, true),
            (DrawStyle::Circular, false),
            (DrawStyle::Circular, true),
        ] {
            let options = QrCodeOptions::builder("HELLO")
                .size(240, 240)
                .draw_style(style)
                .cell_merge(merge)
                .build()
                .unwrap();
            assert_eq!(decode(&still(&options)), "HELLO", "{style:?} merge={merge}");
        }
    }

    #[test]
    fn test_round_trip_every_shape_style() {
        let styles = [
            DrawStyle::Rectangle,
            DrawStyle::Circular,
            DrawStyle::Triangle,
            DrawStyle::Pentagon,
            DrawStyle::Hexagon,
            DrawStyle::Octagon,
        ];
        for style in styles {
            for merge in [false, true] {
                for size in [240, 300] {
                    let options = QrCodeOptions::builder("HELLO")
                        .size(size, size)
                        .draw_style(style)
                        .cell_merge(merge)
                        .build()
                        .unwrap();
                    assert_eq!(decode(&still(&options)), "HELLO", "{style:?} merge={merge} size={size}");
                }
            }
        }
    }

    #[test]
    fn test_round_trip_image_style() {
        let options = QrCodeOptions::builder("HELLO")
            .size(240, 240)
            .draw_style(DrawStyle::Image)
            .dot_image(DotSize::ONE, RgbaImage::from_pixel(4, 4, BLACK))
            .dot_image(DotSize::TWO, RgbaImage::from_pixel(8, 8, BLACK))
            .build()
            .unwrap();
        assert_eq!(decode(&still(&options)), "HELLO");
    }

    #[test]
    fn test_round_trip_penetrate_and_fill_backgrounds() {
        let penetrate = QrCodeOptions::builder("HELLO")
            .background(BgImageOptions::new(RgbaImage::from_pixel(50, 50, BLACK)).with_style(BgStyle::Penetrate))
            .build()
            .unwrap();
        assert_eq!(decode(&still(&penetrate)), "HELLO");

        let fill = QrCodeOptions::builder("HELLO")
            .background(
                BgImageOptions::new(RgbaImage::from_pixel(400, 400, WHITE))
                    .with_style(BgStyle::Fill)
                    .with_offset(50, 60),
            )
            .build()
            .unwrap();
        assert_eq!(decode(&still(&fill)), "HELLO");
    }

    #[test]
    fn test_round_trip_longer_content() {
        let content = "https://github.com/ashaffah/qirust?ref=styled-render";
        let options = QrCodeOptions::builder(content)
            .size(300, 300)
            .error_correction(QrCodeEcc::Medium)
            .cell_merge(true)
            .build()
            .unwrap();
        assert_eq!(decode(&still(&options)), content);
    }

    #[test]
    fn test_output_always_has_requested_size() {
        for (w, h) in [(64, 64), (60, 60), (150, 150), (200, 200), (333, 333), (300, 200), (120, 260)] {
            let options = QrCodeOptions::builder("HELLO").size(w, h).build().unwrap();
            assert_eq!(still(&options).dimensions(), (w, h));
        }
    }

    #[test]
    fn test_margin_clamp_matches_bounds() {
        let render = |margin| still(&QrCodeOptions::builder("HELLO").margin(margin).build().unwrap());
        assert_eq!(render(-1), render(0));
        assert_eq!(render(10), render(4));
    }

    #[test]
    fn test_animated_override_background() {
        let frames = [230u8, 180, 210]
            .iter()
            .zip([10u32, 20, 10])
            .map(|(&shade, delay)| {
                GifFrame::new(RgbaImage::from_pixel(100, 100, Rgba([shade, shade, shade, 255])), delay)
            })
            .collect();
        let options = QrCodeOptions::builder("HELLO")
            .background(BgImageOptions::animated(frames))
            .build()
            .unwrap();
        let rendered = generate(&options).unwrap();
        assert_eq!(rendered.format(), OutputFormat::Gif);
        let frames = rendered.frames();
        assert_eq!(frames.len(), 3);
        let delays: Vec<u32> = frames.iter().map(|f| f.delay_centis).collect();
        assert_eq!(delays, vec![10, 20, 10]);
        for frame in frames {
            assert_eq!(frame.image.dimensions(), (200, 200));
            assert_eq!(decode(&frame.image), "HELLO");
        }

        let gif = codec::decode_gif_frames(&rendered.to_bytes().unwrap()).unwrap();
        let delays: Vec<u32> = gif.iter().map(|f| f.delay_centis).collect();
        assert_eq!(delays, vec![10, 20, 10]);
    }

    #[test]
    fn test_logo_bounded_and_centered() {
        let options = QrCodeOptions::builder("HELLO")
            .logo(LogoOptions::new(RgbaImage::from_pixel(90, 90, RED)).with_rate(12))
            .build()
            .unwrap();
        let image = still(&options);
        let (x0, y0, x1, y1) = bbox(&image, RED);
        assert!(x1 - x0 + 1 <= 33 && y1 - y0 + 1 <= 33);
        assert!((f64::from(x0 + x1 + 1) / 2.0 - 100.0).abs() <= 1.0);
        assert!((f64::from(y0 + y1 + 1) / 2.0 - 100.0).abs() <= 1.0);
        assert_eq!(decode(&image), "HELLO");
    }

    #[test]
    fn test_fill_background_burns_logo_first() {
        let options = QrCodeOptions::builder("HELLO")
            .logo(LogoOptions::new(RgbaImage::from_pixel(40, 40, RED)))
            .background(
                BgImageOptions::new(RgbaImage::from_pixel(400, 400, WHITE))
                    .with_style(BgStyle::Fill)
                    .with_offset(50, 60),
            )
            .build()
            .unwrap();
        let image = still(&options);
        assert_eq!(image.dimensions(), (400, 400));
        let (x0, y0, x1, y1) = bbox(&image, RED);
        // Logo sized from the 200px QR and centered on it, not on the 400px background.
        assert!(x1 - x0 + 1 <= 33);
        assert!((f64::from(x0 + x1 + 1) / 2.0 - 150.0).abs() <= 1.0);
        assert!((f64::from(y0 + y1 + 1) / 2.0 - 160.0).abs() <= 1.0);
    }

    #[test]
    fn test_override_background_burns_logo_last() {
        let options = QrCodeOptions::builder("HELLO")
            .logo(LogoOptions::new(RgbaImage::from_pixel(80, 80, RED)))
            .background(BgImageOptions::new(RgbaImage::from_pixel(10, 10, WHITE)).with_size(300, 300))
            .build()
            .unwrap();
        let image = still(&options);
        let (x0, y0, x1, y1) = bbox(&image, RED);
        // Sized from the 300px canvas and drawn opaque over the blended QR.
        assert!(x1 - x0 + 1 > 33 && x1 - x0 + 1 <= 50);
        assert!((f64::from(x0 + x1 + 1) / 2.0 - 150.0).abs() <= 1.0);
        assert!((f64::from(y0 + y1 + 1) / 2.0 - 150.0).abs() <= 1.0);
    }

    #[test]
    fn test_penetrate_shows_background_in_modules() {
        let options = QrCodeOptions::builder("HELLO")
            .background(BgImageOptions::new(RgbaImage::from_pixel(50, 50, RED)).with_style(BgStyle::Penetrate))
            .build()
            .unwrap();
        let image = still(&options);
        let matrix = BitMatrix::encode(b"HELLO", QrCodeEcc::High, 1, 200, 200).unwrap();
        let (px, py) = matrix.module_origin(0, 0);
        let m = matrix.multiple() / 2;
        assert_eq!(*image.get_pixel(px + m, py + m), RED);
        let (px, py) = matrix.module_origin(1, 1);
        assert_eq!(*image.get_pixel(px + m, py + m), WHITE);
    }

    #[test]
    fn test_content_too_long_is_encoding_error() {
        let options = QrCodeOptions::builder("A".repeat(4000)).build().unwrap();
        assert!(matches!(generate(&options), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_hand_built_options_are_validated() {
        let mut options = QrCodeOptions::builder("HELLO").build().unwrap();
        options.content.clear();
        assert!(matches!(generate(&options), Err(Error::InvalidArgument(_))));
        options.content.push('A');
        options.height = 0;
        assert!(matches!(generate(&options), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_outputs() {
        let options = QrCodeOptions::builder("HELLO").build().unwrap();
        let rendered = generate(&options).unwrap();
        let png = rendered.to_bytes().unwrap();
        assert_eq!(codec::decode_image(&png).unwrap().dimensions(), (200, 200));
        assert!(rendered.to_data_uri().unwrap().starts_with("data:image/png;base64,"));
        assert!(rendered.frames().is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hello.png");
        rendered.save(&path).unwrap();
        assert_eq!(codec::load_image(&path).unwrap().dimensions(), (200, 200));
    }

    #[test]
    fn test_jpeg_output() {
        let options = QrCodeOptions::builder("HELLO")
            .format(OutputFormat::Jpeg)
            .build()
            .unwrap();
        let bytes = generate(&options).unwrap().to_bytes().unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
