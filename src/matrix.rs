//! Module matrix and render geometry.
//!
//! [`BitMatrix`] wraps the boolean module grid produced by the `qrcode` encoder together with the
//! pixel layout the painter needs: the integer scale factor, the padding that centers the grid
//! and the canvas size.

use qrcode::{Color, QrCode};
use tracing::debug;

use crate::error::{Error, Result};
use crate::options::{QrCodeEcc, MAX_MARGIN};

/// Quiet-zone width, in modules, the whitespace trimming is proportioned against.
const QUIET_ZONE_SIZE: u32 = 4;

/// Extra whitespace, as a share of the shorter requested edge, tolerated before the canvas is
/// shrunk to a whole multiple of the code size.
const WHITESPACE_RATIO: f64 = 0.15;

/// A grid of dark (`true`) and light (`false`) modules plus its pixel layout.
///
/// Invariants: `multiple >= 1`, `output_width >= width * multiple + 2 * left_padding` and the
/// same for the vertical axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMatrix {
    width: u32,
    height: u32,
    modules: Vec<bool>,
    quiet_zone: u32,
    left_padding: u32,
    top_padding: u32,
    multiple: u32,
    output_width: u32,
    output_height: u32,
    target_width: u32,
    target_height: u32,
}

impl BitMatrix {
    /// Encodes `content` and lays the resulting grid out for a `width` x `height` output.
    ///
    /// `quiet_zone` is clamped to `[0, 4]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] when the content does not fit at the chosen level.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrstyle::matrix::BitMatrix;
    /// use qrstyle::options::QrCodeEcc;
    ///
    /// let matrix = BitMatrix::encode(b"HELLO", QrCodeEcc::High, 1, 200, 200).unwrap();
    /// assert_eq!(matrix.width(), 21);
    /// assert_eq!(matrix.multiple(), 8);
    /// ```
    pub fn encode(
        content: &[u8],
        ecc: QrCodeEcc,
        quiet_zone: i32,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let code = QrCode::with_error_correction_level(content, ecc.ec_level())
            .map_err(|err| Error::Encoding(err.to_string()))?;
        let size = code.width() as u32;
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();
        debug!(modules = size, ?ecc, bytes = content.len(), "content encoded");
        Ok(Self::from_modules(size, size, modules, quiet_zone, width, height))
    }

    /// Builds a matrix from an explicit row-major module grid.
    ///
    /// Grids too small for full position markers are accepted; the painter
    /// shrinks the eye blocks to at most half of each dimension so they never
    /// overlap or leave the grid.
    ///
    /// # Panics
    ///
    /// Panics if `modules.len() != width * height` or either dimension is zero.
    pub fn from_modules(
        width: u32,
        height: u32,
        modules: Vec<bool>,
        quiet_zone: i32,
        target_width: u32,
        target_height: u32,
    ) -> Self {
        assert!(width > 0 && height > 0, "Module grid must not be empty");
        assert_eq!(
            modules.len(),
            (width * height) as usize,
            "Module count does not match grid size"
        );
        let quiet_zone = quiet_zone.clamp(0, MAX_MARGIN) as u32;
        let layout = Layout::compute(width, height, quiet_zone, target_width, target_height);
        debug!(
            multiple = layout.multiple,
            left_padding = layout.left_padding,
            top_padding = layout.top_padding,
            canvas_width = layout.output_width,
            canvas_height = layout.output_height,
            "matrix layout computed"
        );
        Self {
            width,
            height,
            modules,
            quiet_zone,
            left_padding: layout.left_padding,
            top_padding: layout.top_padding,
            multiple: layout.multiple,
            output_width: layout.output_width,
            output_height: layout.output_height,
            target_width,
            target_height,
        }
    }

    /// Width of the grid, in modules.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid, in modules.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` for a dark module. Coordinates outside the grid return `false`.
    ///
    /// # Arguments
    ///
    /// * `x` - Column (0 is left).
    /// * `y` - Row (0 is top).
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.modules[self.index(x, y)]
    }

    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Clamped quiet-zone margin, in modules.
    pub fn quiet_zone(&self) -> u32 {
        self.quiet_zone
    }

    pub fn left_padding(&self) -> u32 {
        self.left_padding
    }

    pub fn top_padding(&self) -> u32 {
        self.top_padding
    }

    /// Pixel edge of one module on the canvas.
    pub fn multiple(&self) -> u32 {
        self.multiple
    }

    /// Canvas width the painter draws on.
    pub fn output_width(&self) -> u32 {
        self.output_width
    }

    pub fn output_height(&self) -> u32 {
        self.output_height
    }

    /// Requested final width; the painted canvas is resized to it when they differ.
    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    pub fn target_height(&self) -> u32 {
        self.target_height
    }

    /// Top-left pixel of the module at `(x, y)`.
    pub fn module_origin(&self, x: u32, y: u32) -> (u32, u32) {
        (
            self.left_padding + x * self.multiple,
            self.top_padding + y * self.multiple,
        )
    }
}

struct Layout {
    left_padding: u32,
    top_padding: u32,
    multiple: u32,
    output_width: u32,
    output_height: u32,
}

impl Layout {
    fn compute(width: u32, height: u32, quiet_zone: u32, req_width: u32, req_height: u32) -> Self {
        let qr_width = width + 2 * quiet_zone;
        let qr_height = height + 2 * quiet_zone;
        let (mut out_width, mut out_height) = (req_width, req_height);

        // Too much whitespace: shrink to a whole multiple of the code and let the painter
        // resize up to the requested size afterwards.
        let min_size = req_width.min(req_height);
        let qr_size = qr_width.max(qr_height);
        let scale = calculate_scale(qr_size, min_size);
        if scale > 0 {
            let padding = (min_size - qr_size * scale) / QUIET_ZONE_SIZE * quiet_zone;
            let natural = qr_size * scale + padding;
            if req_width == req_height {
                out_width = natural;
                out_height = natural;
            } else if req_width > req_height {
                out_width = (u64::from(req_width) * u64::from(natural) / u64::from(req_height)) as u32;
                out_height = natural;
            } else {
                out_height = (u64::from(req_height) * u64::from(natural) / u64::from(req_width)) as u32;
                out_width = natural;
            }
        }

        let output_width = out_width.max(qr_width);
        let output_height = out_height.max(qr_height);
        let multiple = (output_width / qr_width).min(output_height / qr_height).max(1);
        Self {
            left_padding: (output_width - width * multiple) / 2,
            top_padding: (output_height - height * multiple) / 2,
            multiple,
            output_width,
            output_height,
        }
    }
}

/// Whole-number upscale of the code that fills `expect_size`, or `0` when the leftover
/// whitespace is already small enough.
fn calculate_scale(qr_size: u32, expect_size: u32) -> u32 {
    if qr_size >= expect_size {
        return 0;
    }
    let scale = expect_size / qr_size;
    let leftover = expect_size - scale * qr_size;
    if f64::from(leftover) < f64::from(expect_size) * WHITESPACE_RATIO {
        0
    } else {
        scale
    }
}
