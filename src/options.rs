//! Rendering options.
//!
//! Every knob of the renderer lives in [`QrCodeOptions`], a single flat value built through
//! [`QrCodeOptions::builder`]. The sub-option structs ([`DrawOptions`], [`DetectOptions`],
//! [`LogoOptions`], [`BgImageOptions`]) carry their own documented defaults. Rendering only ever
//! borrows the options, so one built value can be shared by any number of render calls.

use std::collections::BTreeMap;
use std::str::FromStr;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Default requested output edge, in pixels.
pub const DEFAULT_SIZE: u32 = 200;

/// Default quiet-zone margin, in modules.
pub const DEFAULT_MARGIN: i32 = 1;

/// Largest quiet-zone margin honoured; larger values are clamped.
pub const MAX_MARGIN: i32 = 4;

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Largest accepted Fill-style offset, in pixels, on either axis.
pub const MAX_BACKGROUND_OFFSET: u32 = 1 << 16;

/// Footprint, in modules, of one painted shape or image.
///
/// `row` is the number of module rows covered (height) and `col` the number of module columns
/// (width). Equality is structural.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DotSize {
    pub row: u32,
    pub col: u32,
}

impl DotSize {
    /// A single module.
    pub const ONE: DotSize = DotSize::new(1, 1);
    /// One row, two columns: a horizontal pair.
    pub const ONE_TWO: DotSize = DotSize::new(1, 2);
    /// Two rows, one column: a vertical pair.
    pub const TWO_ONE: DotSize = DotSize::new(2, 1);
    /// A 2×2 block.
    pub const TWO: DotSize = DotSize::new(2, 2);

    /// Creates a footprint of `row` × `col` modules.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub const fn new(row: u32, col: u32) -> Self {
        assert!(row > 0 && col > 0, "DotSize dimensions must be positive");
        Self { row, col }
    }

    /// Number of modules covered.
    pub const fn area(self) -> u32 {
        self.row * self.col
    }

    /// Pixel `(width, height)` of this footprint at the given scale factor.
    pub const fn pixel_size(self, multiple: u32) -> (u32, u32) {
        (self.col * multiple, self.row * multiple)
    }
}

/// A multi-module merge a draw style may permit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MergeKind {
    /// Four modules forming a 2×2 block.
    Square,
    /// The module and its right neighbour.
    Horizontal,
    /// The module and the one below it.
    Vertical,
}

impl MergeKind {
    /// Footprint painted for this merge.
    pub const fn dot_size(self) -> DotSize {
        match self {
            MergeKind::Square => DotSize::TWO,
            MergeKind::Horizontal => DotSize::ONE_TWO,
            MergeKind::Vertical => DotSize::TWO_ONE,
        }
    }
}

/// Shape used for the data modules.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DrawStyle {
    #[default]
    Rectangle,
    Circular,
    Triangle,
    Pentagon,
    Hexagon,
    Octagon,
    /// Custom images registered per [`DotSize`] in [`DrawOptions::images`].
    Image,
}

impl DrawStyle {
    /// Merges this style is allowed to perform. Triangles never merge: a stretched triangle
    /// leaves too much whitespace for a scanner.
    pub const fn merges(self) -> &'static [MergeKind] {
        use MergeKind::*;
        match self {
            DrawStyle::Rectangle | DrawStyle::Image => &[Square, Horizontal, Vertical],
            DrawStyle::Circular | DrawStyle::Pentagon | DrawStyle::Hexagon | DrawStyle::Octagon => {
                &[Square]
            }
            DrawStyle::Triangle => &[],
        }
    }

    pub fn permits(self, kind: MergeKind) -> bool {
        self.merges().contains(&kind)
    }

    pub fn supports_merge(self) -> bool {
        !self.merges().is_empty()
    }
}

impl FromStr for DrawStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rect" | "rectangle" | "square" => Ok(DrawStyle::Rectangle),
            "circle" | "circular" | "dots" => Ok(DrawStyle::Circular),
            "triangle" => Ok(DrawStyle::Triangle),
            "pentagon" => Ok(DrawStyle::Pentagon),
            "hexagon" => Ok(DrawStyle::Hexagon),
            "octagon" => Ok(DrawStyle::Octagon),
            "image" => Ok(DrawStyle::Image),
            other => Err(Error::invalid(format!("unknown draw style: {other}"))),
        }
    }
}

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    #[default]
    High,
}

impl QrCodeEcc {
    pub(crate) fn ec_level(self) -> qrcode::EcLevel {
        match self {
            QrCodeEcc::Low => qrcode::EcLevel::L,
            QrCodeEcc::Medium => qrcode::EcLevel::M,
            QrCodeEcc::Quartile => qrcode::EcLevel::Q,
            QrCodeEcc::High => qrcode::EcLevel::H,
        }
    }
}

impl FromStr for QrCodeEcc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(QrCodeEcc::Low),
            "M" | "MEDIUM" => Ok(QrCodeEcc::Medium),
            "Q" | "QUARTILE" => Ok(QrCodeEcc::Quartile),
            "H" | "HIGH" => Ok(QrCodeEcc::High),
            other => Err(Error::invalid(format!("unknown error correction level: {other}"))),
        }
    }
}

/// Character encoding applied to the content before it reaches the encoder.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Iso8859_1,
}

impl Charset {
    /// Transcodes `text` into the bytes handed to the matrix encoder.
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Charset::Utf8 => Ok(text.as_bytes().to_vec()),
            Charset::Iso8859_1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        Error::invalid(format!("character {c:?} is not representable in ISO-8859-1"))
                    })
                })
                .collect(),
        }
    }
}

/// Encoded format of a still image.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Gif,
}

impl OutputFormat {
    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Gif => ImageFormat::Gif,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Gif => "gif",
        }
    }
}

/// How the data modules are painted.
#[derive(Clone, Debug)]
pub struct DrawOptions {
    pub style: DrawStyle,
    pub foreground: Rgba<u8>,
    pub background: Rgba<u8>,
    /// Images for [`DrawStyle::Image`], keyed by footprint. The 1×1 entry is the fallback and
    /// is required when that style is selected.
    pub images: BTreeMap<DotSize, RgbaImage>,
    /// Stamped on every unset module outside the eyes, when present.
    pub background_tile: Option<RgbaImage>,
    pub cell_merge: bool,
    /// When `true`, transparent pixels of stamped images show the background color; otherwise
    /// they are copied through unchanged.
    pub transparency_fill: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            style: DrawStyle::Rectangle,
            foreground: BLACK,
            background: WHITE,
            images: BTreeMap::new(),
            background_tile: None,
            cell_merge: false,
            transparency_fill: false,
        }
    }
}

impl DrawOptions {
    pub fn image_for(&self, size: DotSize) -> Option<&RgbaImage> {
        self.images.get(&size)
    }

    /// The 1×1 image used when no larger footprint has a registered image.
    pub fn default_image(&self) -> Option<&RgbaImage> {
        self.images.get(&DotSize::ONE)
    }

    fn validate(&self) -> Result<()> {
        if self.images.keys().any(|size| size.row == 0 || size.col == 0) {
            return Err(Error::invalid("dot image footprints must be positive"));
        }
        if self.style == DrawStyle::Image && self.default_image().is_none() {
            return Err(Error::invalid("image draw style requires a 1x1 dot image"));
        }
        Ok(())
    }
}

/// One of the three position markers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EyeLocation {
    TopLeft,
    TopRight,
    BottomLeft,
}

/// Colors and images for the position markers ("eyes").
#[derive(Clone, Debug, Default)]
pub struct DetectOptions {
    /// Outer ring color; the foreground color when unset.
    pub outer_color: Option<Rgba<u8>>,
    /// Center color; the foreground color when unset.
    pub inner_color: Option<Rgba<u8>>,
    /// Used for any eye without its own image.
    pub image: Option<RgbaImage>,
    pub top_left: Option<RgbaImage>,
    pub top_right: Option<RgbaImage>,
    pub bottom_left: Option<RgbaImage>,
}

impl DetectOptions {
    /// Location-specific image first, then the generic one.
    pub fn image_for(&self, location: EyeLocation) -> Option<&RgbaImage> {
        let specific = match location {
            EyeLocation::TopLeft => self.top_left.as_ref(),
            EyeLocation::TopRight => self.top_right.as_ref(),
            EyeLocation::BottomLeft => self.bottom_left.as_ref(),
        };
        specific.or(self.image.as_ref())
    }

    pub fn outer_color_or(&self, foreground: Rgba<u8>) -> Rgba<u8> {
        self.outer_color.unwrap_or(foreground)
    }

    pub fn inner_color_or(&self, foreground: Rgba<u8>) -> Rgba<u8> {
        self.inner_color.unwrap_or(foreground)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum LogoStyle {
    #[default]
    Normal,
    /// Corners rounded with a radius of a quarter of the logo width.
    Round,
}

/// Logo burned into the center of the code.
#[derive(Clone, Debug)]
pub struct LogoOptions {
    pub image: RgbaImage,
    pub style: LogoStyle,
    pub border: bool,
    pub border_color: Rgba<u8>,
    /// Second, outer border; only drawn when `border` is set.
    pub outer_border_color: Option<Rgba<u8>>,
    /// Each logo edge is at most `2 * canvas edge / rate`.
    pub rate: u32,
    pub opacity: f32,
}

impl LogoOptions {
    pub const DEFAULT_RATE: u32 = 12;

    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            style: LogoStyle::Normal,
            border: false,
            border_color: WHITE,
            outer_border_color: None,
            rate: Self::DEFAULT_RATE,
            opacity: 1.0,
        }
    }

    pub fn with_style(mut self, style: LogoStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_border(mut self, color: Rgba<u8>) -> Self {
        self.border = true;
        self.border_color = color;
        self
    }

    pub fn with_outer_border(mut self, color: Rgba<u8>) -> Self {
        self.outer_border_color = Some(color);
        self
    }

    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.rate == 0 {
            return Err(Error::invalid("logo rate must be positive"));
        }
        check_opacity("logo", self.opacity)?;
        if self.image.width() == 0 || self.image.height() == 0 {
            return Err(Error::invalid("logo image is empty"));
        }
        Ok(())
    }
}

/// How the QR raster is combined with a background image.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BgStyle {
    /// QR centered on the background, drawn at the configured opacity.
    #[default]
    Override,
    /// QR drawn opaque at an explicit offset on the background.
    Fill,
    /// Modules painted transparent so the background shows through them.
    Penetrate,
}

/// One frame of an animated background or output.
#[derive(Clone, Debug)]
pub struct GifFrame {
    pub image: RgbaImage,
    /// Display time in hundredths of a second.
    pub delay_centis: u32,
}

impl GifFrame {
    pub fn new(image: RgbaImage, delay_centis: u32) -> Self {
        Self { image, delay_centis }
    }
}

#[derive(Clone, Debug)]
pub enum Background {
    Static(RgbaImage),
    Animated(Vec<GifFrame>),
}

/// Background composited behind (or under) the QR raster.
#[derive(Clone, Debug)]
pub struct BgImageOptions {
    pub source: Background,
    pub style: BgStyle,
    /// Target background width; `0` means the QR width for Override/Penetrate and the image's
    /// own width for Fill.
    pub width: u32,
    pub height: u32,
    /// Opacity of the QR raster over the background (Override only).
    pub opacity: f32,
    /// QR offset on the background (Fill only).
    pub start_x: u32,
    pub start_y: u32,
}

impl BgImageOptions {
    pub const DEFAULT_OPACITY: f32 = 0.85;

    pub fn new(image: RgbaImage) -> Self {
        Self::with_source(Background::Static(image))
    }

    pub fn animated(frames: Vec<GifFrame>) -> Self {
        Self::with_source(Background::Animated(frames))
    }

    fn with_source(source: Background) -> Self {
        Self {
            source,
            style: BgStyle::Override,
            width: 0,
            height: 0,
            opacity: Self::DEFAULT_OPACITY,
            start_x: 0,
            start_y: 0,
        }
    }

    pub fn with_style(mut self, style: BgStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_offset(mut self, start_x: u32, start_y: u32) -> Self {
        self.start_x = start_x;
        self.start_y = start_y;
        self
    }

    pub fn is_animated(&self) -> bool {
        matches!(self.source, Background::Animated(_))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_opacity("background", self.opacity)?;
        if self.start_x > MAX_BACKGROUND_OFFSET || self.start_y > MAX_BACKGROUND_OFFSET {
            return Err(Error::invalid(format!(
                "background offset ({}, {}) exceeds {MAX_BACKGROUND_OFFSET}",
                self.start_x, self.start_y
            )));
        }
        match &self.source {
            Background::Animated(frames) if frames.is_empty() => {
                Err(Error::invalid("animated background has no frames"))
            }
            Background::Static(image) if image.width() == 0 || image.height() == 0 => {
                Err(Error::invalid("background image is empty"))
            }
            _ => Ok(()),
        }
    }
}

fn check_opacity(what: &str, opacity: f32) -> Result<()> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(())
    } else {
        Err(Error::invalid(format!("{what} opacity {opacity} is outside [0, 1]")))
    }
}

/// Complete configuration of one render.
#[derive(Clone, Debug)]
pub struct QrCodeOptions {
    pub content: String,
    pub width: u32,
    pub height: u32,
    pub charset: Charset,
    pub error_correction: QrCodeEcc,
    /// Quiet-zone width in modules; clamped to `[0, 4]` when encoding.
    pub margin: i32,
    pub format: OutputFormat,
    pub draw: DrawOptions,
    pub detect: DetectOptions,
    pub logo: Option<LogoOptions>,
    pub background: Option<BgImageOptions>,
}

impl QrCodeOptions {
    /// Starts a builder with every default in place.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrstyle::options::{DrawStyle, QrCodeEcc, QrCodeOptions};
    ///
    /// let options = QrCodeOptions::builder("https://example.com")
    ///     .size(300, 300)
    ///     .error_correction(QrCodeEcc::Medium)
    ///     .draw_style(DrawStyle::Circular)
    ///     .cell_merge(true)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(options.width, 300);
    /// ```
    pub fn builder(content: impl Into<String>) -> QrCodeOptionsBuilder {
        QrCodeOptionsBuilder {
            options: QrCodeOptions {
                content: content.into(),
                width: DEFAULT_SIZE,
                height: DEFAULT_SIZE,
                charset: Charset::Utf8,
                error_correction: QrCodeEcc::High,
                margin: DEFAULT_MARGIN,
                format: OutputFormat::Png,
                draw: DrawOptions::default(),
                detect: DetectOptions::default(),
                logo: None,
                background: None,
            },
        }
    }

    /// Quiet-zone margin clamped to `[0, 4]`.
    pub fn quiet_zone(&self) -> u32 {
        self.margin.clamp(0, MAX_MARGIN) as u32
    }

    /// Checks everything that can be rejected before encoding starts.
    pub fn validate(&self) -> Result<()> {
        if self.content.is_empty() {
            return Err(Error::invalid("content must not be empty"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::invalid(format!(
                "output size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        self.draw.validate()?;
        if let Some(logo) = &self.logo {
            logo.validate()?;
        }
        if let Some(background) = &self.background {
            background.validate()?;
        }
        Ok(())
    }
}

/// Builder for [`QrCodeOptions`].
#[derive(Clone, Debug)]
pub struct QrCodeOptionsBuilder {
    options: QrCodeOptions,
}

impl QrCodeOptionsBuilder {
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.options.width = width;
        self.options.height = height;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.options.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.options.height = height;
        self
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.options.charset = charset;
        self
    }

    pub fn error_correction(mut self, ecc: QrCodeEcc) -> Self {
        self.options.error_correction = ecc;
        self
    }

    pub fn margin(mut self, margin: i32) -> Self {
        self.options.margin = margin;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.options.format = format;
        self
    }

    pub fn draw_options(mut self, draw: DrawOptions) -> Self {
        self.options.draw = draw;
        self
    }

    pub fn draw_style(mut self, style: DrawStyle) -> Self {
        self.options.draw.style = style;
        self
    }

    pub fn foreground(mut self, color: Rgba<u8>) -> Self {
        self.options.draw.foreground = color;
        self
    }

    pub fn background_color(mut self, color: Rgba<u8>) -> Self {
        self.options.draw.background = color;
        self
    }

    pub fn cell_merge(mut self, enabled: bool) -> Self {
        self.options.draw.cell_merge = enabled;
        self
    }

    pub fn transparency_fill(mut self, enabled: bool) -> Self {
        self.options.draw.transparency_fill = enabled;
        self
    }

    /// Registers an image for one footprint of the image draw style.
    pub fn dot_image(mut self, size: DotSize, image: RgbaImage) -> Self {
        self.options.draw.images.insert(size, image);
        self
    }

    pub fn background_tile(mut self, image: RgbaImage) -> Self {
        self.options.draw.background_tile = Some(image);
        self
    }

    pub fn detect_options(mut self, detect: DetectOptions) -> Self {
        self.options.detect = detect;
        self
    }

    pub fn detect_colors(mut self, outer: Rgba<u8>, inner: Rgba<u8>) -> Self {
        self.options.detect.outer_color = Some(outer);
        self.options.detect.inner_color = Some(inner);
        self
    }

    pub fn detect_image(mut self, image: RgbaImage) -> Self {
        self.options.detect.image = Some(image);
        self
    }

    pub fn detect_corner_image(mut self, location: EyeLocation, image: RgbaImage) -> Self {
        let slot = match location {
            EyeLocation::TopLeft => &mut self.options.detect.top_left,
            EyeLocation::TopRight => &mut self.options.detect.top_right,
            EyeLocation::BottomLeft => &mut self.options.detect.bottom_left,
        };
        *slot = Some(image);
        self
    }

    pub fn logo(mut self, logo: LogoOptions) -> Self {
        self.options.logo = Some(logo);
        self
    }

    pub fn background(mut self, background: BgImageOptions) -> Self {
        self.options.background = Some(background);
        self
    }

    /// Validates and returns the finished options.
    pub fn build(self) -> Result<QrCodeOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_size_structural_equality() {
        assert_eq!(DotSize::new(2, 2), DotSize::TWO);
        assert_ne!(DotSize::ONE_TWO, DotSize::TWO_ONE);
        assert_eq!(DotSize::new(3, 5).area(), 15);
        assert_eq!(DotSize::ONE_TWO.pixel_size(4), (8, 4));
        assert_eq!(DotSize::TWO_ONE.pixel_size(4), (4, 8));
    }

    #[test]
    fn test_merge_table() {
        assert!(DrawStyle::Rectangle.permits(MergeKind::Horizontal));
        assert!(DrawStyle::Image.permits(MergeKind::Vertical));
        assert!(DrawStyle::Circular.permits(MergeKind::Square));
        assert!(!DrawStyle::Circular.permits(MergeKind::Horizontal));
        assert!(!DrawStyle::Octagon.permits(MergeKind::Vertical));
        assert!(!DrawStyle::Triangle.supports_merge());
    }

    #[test]
    fn test_parse_style_and_ecc() {
        assert_eq!("circle".parse::<DrawStyle>().unwrap(), DrawStyle::Circular);
        assert_eq!(" RECT ".parse::<DrawStyle>().unwrap(), DrawStyle::Rectangle);
        assert!("star".parse::<DrawStyle>().is_err());
        assert_eq!("q".parse::<QrCodeEcc>().unwrap(), QrCodeEcc::Quartile);
        assert!("x".parse::<QrCodeEcc>().is_err());
    }

    #[test]
    fn test_defaults() {
        let options = QrCodeOptions::builder("HELLO").build().unwrap();
        assert_eq!((options.width, options.height), (200, 200));
        assert_eq!(options.error_correction, QrCodeEcc::High);
        assert_eq!(options.margin, 1);
        assert_eq!(options.draw.style, DrawStyle::Rectangle);
        assert_eq!(options.draw.foreground, BLACK);
        assert_eq!(options.draw.background, WHITE);
        assert!(!options.draw.cell_merge);
        assert!(options.logo.is_none());
        assert!(options.background.is_none());
    }

    #[test]
    fn test_quiet_zone_clamp() {
        let low = QrCodeOptions::builder("A").margin(-1).build().unwrap();
        let high = QrCodeOptions::builder("A").margin(10).build().unwrap();
        assert_eq!(low.quiet_zone(), 0);
        assert_eq!(high.quiet_zone(), 4);
    }

    #[test]
    fn test_rejects_invalid_arguments() {
        let empty = QrCodeOptions::builder("").build();
        assert!(matches!(empty, Err(Error::InvalidArgument(_))));

        let zero = QrCodeOptions::builder("A").size(0, 100).build();
        assert!(matches!(zero, Err(Error::InvalidArgument(_))));

        let image_style = QrCodeOptions::builder("A").draw_style(DrawStyle::Image).build();
        assert!(matches!(image_style, Err(Error::InvalidArgument(_))));

        let no_frames = QrCodeOptions::builder("A")
            .background(BgImageOptions::animated(Vec::new()))
            .build();
        assert!(matches!(no_frames, Err(Error::InvalidArgument(_))));

        let bad_rate = QrCodeOptions::builder("A")
            .logo(LogoOptions::new(RgbaImage::new(4, 4)).with_rate(0))
            .build();
        assert!(matches!(bad_rate, Err(Error::InvalidArgument(_))));

        let far_offset = QrCodeOptions::builder("A")
            .background(
                BgImageOptions::new(RgbaImage::new(4, 4))
                    .with_style(BgStyle::Fill)
                    .with_offset(u32::MAX - 10, 0),
            )
            .build();
        assert!(matches!(far_offset, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_detect_image_precedence() {
        let generic = RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 255]));
        let corner = RgbaImage::from_pixel(1, 1, Rgba([9, 9, 9, 255]));
        let detect = DetectOptions {
            image: Some(generic),
            top_right: Some(corner),
            ..DetectOptions::default()
        };
        assert_eq!(detect.image_for(EyeLocation::TopRight).unwrap().get_pixel(0, 0)[0], 9);
        assert_eq!(detect.image_for(EyeLocation::TopLeft).unwrap().get_pixel(0, 0)[0], 1);
        assert_eq!(DetectOptions::default().outer_color_or(BLACK), BLACK);
    }

    #[test]
    fn test_latin1_charset() {
        assert_eq!(Charset::Iso8859_1.encode("é").unwrap(), vec![0xE9]);
        assert!(Charset::Iso8859_1.encode("€").is_err());
        assert_eq!(Charset::Utf8.encode("é").unwrap(), vec![0xC3, 0xA9]);
    }
}
