//! Rasterization of a [`BitMatrix`] into a styled image.
//!
//! The painter walks the module grid row by row. Every module receives exactly one terminal
//! decision: painted as part of a shape, stamped as part of an image, filled as an eye module, or
//! left as background. Modules covered by a merged shape or a stamped eye image are recorded in a
//! separate painted mask so later visits skip them; the matrix itself is never modified.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_ellipse_mut, draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use tracing::debug;

use crate::matrix::BitMatrix;
use crate::options::{DetectOptions, DotSize, DrawOptions, DrawStyle, EyeLocation, MergeKind};

/// Eye edge, in modules, for a standard code.
const EYE_SIZE: u32 = 7;
/// Eye edge used when the matrix carries the compact marker.
const COMPACT_EYE_SIZE: u32 = 5;

/// A pixel rectangle on the canvas.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct CellRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CellRect {
    fn to_rect(self) -> Rect {
        Rect::at(self.x as i32, self.y as i32).of_size(self.width.max(1), self.height.max(1))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Location {
    Eye(EyeLocation),
    Plain,
}

impl DrawStyle {
    /// Fills `rect` with this style's shape in `color`. Cells too small to hold a polygon are
    /// filled solid.
    pub(crate) fn fill_shape(self, canvas: &mut RgbaImage, rect: CellRect, color: Rgba<u8>) {
        if rect.width < 3 || rect.height < 3 {
            draw_filled_rect_mut(canvas, rect.to_rect(), color);
            return;
        }
        match self {
            DrawStyle::Rectangle | DrawStyle::Image => {
                draw_filled_rect_mut(canvas, rect.to_rect(), color);
            }
            DrawStyle::Circular => {
                let center = (
                    (rect.x + rect.width / 2) as i32,
                    (rect.y + rect.height / 2) as i32,
                );
                let rx = ((rect.width - 1) / 2) as i32;
                let ry = ((rect.height - 1) / 2) as i32;
                draw_filled_ellipse_mut(canvas, center, rx, ry, color);
            }
            DrawStyle::Triangle => {
                let right = (rect.x + rect.width - 1) as i32;
                let bottom = (rect.y + rect.height - 1) as i32;
                let points = [
                    Point::new((rect.x + rect.width / 2) as i32, rect.y as i32),
                    Point::new(right, bottom),
                    Point::new(rect.x as i32, bottom),
                ];
                draw_polygon_mut(canvas, &points, color);
            }
            DrawStyle::Pentagon => fill_regular_polygon(canvas, rect, 5, -90.0, color),
            DrawStyle::Hexagon => fill_regular_polygon(canvas, rect, 6, 0.0, color),
            DrawStyle::Octagon => fill_regular_polygon(canvas, rect, 8, 22.5, color),
        }
    }
}

/// Polygon with `sides` vertices inscribed in `rect`, first vertex at `start_degrees`.
fn fill_regular_polygon(
    canvas: &mut RgbaImage,
    rect: CellRect,
    sides: u32,
    start_degrees: f32,
    color: Rgba<u8>,
) {
    let rx = (rect.width - 1) as f32 / 2.0;
    let ry = (rect.height - 1) as f32 / 2.0;
    let cx = rect.x as f32 + rx;
    let cy = rect.y as f32 + ry;

    let mut points: Vec<Point<i32>> = Vec::with_capacity(sides as usize);
    for i in 0..sides {
        let angle = (start_degrees + 360.0 * i as f32 / sides as f32).to_radians();
        let point = Point::new(
            (cx + rx * angle.cos()).round() as i32,
            (cy + ry * angle.sin()).round() as i32,
        );
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        draw_filled_rect_mut(canvas, rect.to_rect(), color);
    } else {
        draw_polygon_mut(canvas, &points, color);
    }
}

/// Bookkeeping collected during one paint pass.
#[derive(Clone, Debug, Default)]
pub(crate) struct PaintTrace {
    /// Terminal decisions per module, row-major. Always 1 after a complete pass.
    pub visits: Vec<u8>,
    /// Shapes spanning more than one module.
    pub merged: usize,
    /// Eye blocks drawn from an image.
    pub eyes_stamped: usize,
    /// Dot images stamped in the image style.
    pub images_stamped: usize,
}

/// Paints `matrix` onto a canvas of its output size, then resizes to the target size when the
/// layout shrank the canvas.
///
/// # Example
///
/// ```rust
/// use qrstyle::matrix::BitMatrix;
/// use qrstyle::options::{DetectOptions, DrawOptions, QrCodeEcc};
/// use qrstyle::render::paint;
///
/// let matrix = BitMatrix::encode(b"HELLO", QrCodeEcc::High, 1, 200, 200).unwrap();
/// let image = paint(&matrix, &DrawOptions::default(), &DetectOptions::default());
/// assert_eq!(image.dimensions(), (200, 200));
/// ```
pub fn paint(matrix: &BitMatrix, draw: &DrawOptions, detect: &DetectOptions) -> RgbaImage {
    paint_traced(matrix, draw, detect).0
}

pub(crate) fn paint_traced(
    matrix: &BitMatrix,
    draw: &DrawOptions,
    detect: &DetectOptions,
) -> (RgbaImage, PaintTrace) {
    Painter::new(matrix, draw, detect).run()
}

struct Painter<'a> {
    matrix: &'a BitMatrix,
    draw: &'a DrawOptions,
    detect: &'a DetectOptions,
    canvas: RgbaImage,
    painted: Vec<bool>,
    eye_size: u32,
    trace: PaintTrace,
}

impl<'a> Painter<'a> {
    fn new(matrix: &'a BitMatrix, draw: &'a DrawOptions, detect: &'a DetectOptions) -> Self {
        let cells = (matrix.width() * matrix.height()) as usize;
        let eye_size = if matrix.get(0, 5) { EYE_SIZE } else { COMPACT_EYE_SIZE };
        // The three eye blocks must stay disjoint and inside the grid.
        let eye_size = eye_size
            .min(matrix.width() / 2)
            .min(matrix.height() / 2);
        Self {
            matrix,
            draw,
            detect,
            canvas: RgbaImage::from_pixel(
                matrix.output_width(),
                matrix.output_height(),
                draw.background,
            ),
            painted: vec![false; cells],
            eye_size,
            trace: PaintTrace {
                visits: vec![0; cells],
                ..PaintTrace::default()
            },
        }
    }

    fn run(mut self) -> (RgbaImage, PaintTrace) {
        let draw = self.draw;
        for y in 0..self.matrix.height() {
            for x in 0..self.matrix.width() {
                if self.painted[self.matrix.index(x, y)] {
                    continue;
                }
                match self.locate(x, y) {
                    Location::Eye(location) => self.paint_eye(x, y, location),
                    Location::Plain if !self.matrix.get(x, y) => self.paint_unset(x, y),
                    Location::Plain if draw.style == DrawStyle::Image => self.paint_image_dot(x, y),
                    Location::Plain => self.paint_shape(x, y),
                }
            }
        }
        debug!(
            style = ?draw.style,
            merged = self.trace.merged,
            eyes_stamped = self.trace.eyes_stamped,
            images_stamped = self.trace.images_stamped,
            "modules painted"
        );

        let (target_w, target_h) = (self.matrix.target_width(), self.matrix.target_height());
        let canvas = if self.canvas.dimensions() != (target_w, target_h) {
            debug!(
                from_w = self.canvas.width(),
                from_h = self.canvas.height(),
                target_w,
                target_h,
                "resizing painted canvas"
            );
            imageops::resize(&self.canvas, target_w, target_h, FilterType::Triangle)
        } else {
            self.canvas
        };
        (canvas, self.trace)
    }

    fn locate(&self, x: u32, y: u32) -> Location {
        let eye = self.eye_size;
        let (width, height) = (self.matrix.width(), self.matrix.height());
        if x < eye && y < eye {
            Location::Eye(EyeLocation::TopLeft)
        } else if x >= width.saturating_sub(eye) && y < eye {
            Location::Eye(EyeLocation::TopRight)
        } else if x < eye && y >= height.saturating_sub(eye) {
            Location::Eye(EyeLocation::BottomLeft)
        } else {
            Location::Plain
        }
    }

    fn eye_origin(&self, location: EyeLocation) -> (u32, u32) {
        match location {
            EyeLocation::TopLeft => (0, 0),
            EyeLocation::TopRight => (self.matrix.width() - self.eye_size, 0),
            EyeLocation::BottomLeft => (0, self.matrix.height() - self.eye_size),
        }
    }

    /// A dark, not yet painted module outside every eye.
    fn usable(&self, x: u32, y: u32) -> bool {
        self.matrix.get(x, y)
            && !self.painted[self.matrix.index(x, y)]
            && self.locate(x, y) == Location::Plain
    }

    fn block_usable(&self, x: u32, y: u32, size: DotSize) -> bool {
        (0..size.row).all(|r| (0..size.col).all(|c| self.usable(x + c, y + r)))
    }

    fn cell_rect(&self, x: u32, y: u32, size: DotSize) -> CellRect {
        let (px, py) = self.matrix.module_origin(x, y);
        let (width, height) = size.pixel_size(self.matrix.multiple());
        CellRect { x: px, y: py, width, height }
    }

    fn mark(&mut self, x: u32, y: u32, size: DotSize) {
        let rows = size.row.min(self.matrix.height().saturating_sub(y));
        let cols = size.col.min(self.matrix.width().saturating_sub(x));
        for r in 0..rows {
            for c in 0..cols {
                let index = self.matrix.index(x + c, y + r);
                if self.painted[index] {
                    continue;
                }
                self.painted[index] = true;
                self.trace.visits[index] += 1;
            }
        }
    }

    fn stamp(&mut self, image: &RgbaImage, rect: CellRect) {
        let scaled;
        let source = if image.dimensions() == (rect.width, rect.height) {
            image
        } else {
            scaled = imageops::resize(image, rect.width, rect.height, FilterType::Triangle);
            &scaled
        };
        if self.draw.transparency_fill {
            imageops::overlay(&mut self.canvas, source, i64::from(rect.x), i64::from(rect.y));
        } else {
            imageops::replace(&mut self.canvas, source, i64::from(rect.x), i64::from(rect.y));
        }
    }

    fn paint_eye(&mut self, x: u32, y: u32, location: EyeLocation) {
        let detect = self.detect;
        let (bx, by) = self.eye_origin(location);
        let block = DotSize::new(self.eye_size, self.eye_size);

        if let Some(image) = detect.image_for(location) {
            // Row-major order reaches the block's top-left module first.
            let rect = self.cell_rect(bx, by, block);
            self.stamp(image, rect);
            self.mark(bx, by, block);
            self.trace.eyes_stamped += 1;
            return;
        }

        if self.matrix.get(x, y) {
            let (lx, ly) = (x - bx, y - by);
            let last = self.eye_size - 1;
            let foreground = self.draw.foreground;
            let color = if lx == 0 || ly == 0 || lx == last || ly == last {
                detect.outer_color_or(foreground)
            } else {
                detect.inner_color_or(foreground)
            };
            let rect = self.cell_rect(x, y, DotSize::ONE);
            draw_filled_rect_mut(&mut self.canvas, rect.to_rect(), color);
        }
        self.mark(x, y, DotSize::ONE);
    }

    fn paint_unset(&mut self, x: u32, y: u32) {
        let draw = self.draw;
        if let Some(tile) = &draw.background_tile {
            let rect = self.cell_rect(x, y, DotSize::ONE);
            self.stamp(tile, rect);
        }
        self.mark(x, y, DotSize::ONE);
    }

    fn paint_shape(&mut self, x: u32, y: u32) {
        let draw = self.draw;
        let size = if draw.cell_merge && draw.style.supports_merge() {
            self.merge_footprint(x, y, draw.style)
        } else {
            DotSize::ONE
        };
        if size != DotSize::ONE {
            self.trace.merged += 1;
        }
        let rect = self.cell_rect(x, y, size);
        draw.style.fill_shape(&mut self.canvas, rect, draw.foreground);
        self.mark(x, y, size);
    }

    fn merge_footprint(&self, x: u32, y: u32, style: DrawStyle) -> DotSize {
        let right = self.usable(x + 1, y);
        let down = self.usable(x, y + 1);
        let diagonal = self.usable(x + 1, y + 1);
        if right && down && diagonal && style.permits(MergeKind::Square) {
            MergeKind::Square.dot_size()
        } else if right && style.permits(MergeKind::Horizontal) {
            MergeKind::Horizontal.dot_size()
        } else if down && style.permits(MergeKind::Vertical) {
            MergeKind::Vertical.dot_size()
        } else {
            DotSize::ONE
        }
    }

    fn paint_image_dot(&mut self, x: u32, y: u32) {
        let draw = self.draw;
        let max_col = (0..).take_while(|&c| self.usable(x + c, y)).count() as u32;
        let max_row = (0..).take_while(|&r| self.usable(x, y + r)).count() as u32;

        // Only footprints with a registered image can win, so walk those instead of every
        // rectangle inside the runs. Largest area first, taller first on ties.
        let mut candidates: Vec<DotSize> = draw
            .images
            .keys()
            .copied()
            .filter(|size| size.row <= max_row && size.col <= max_col)
            .collect();
        candidates.sort_by(|a, b| b.area().cmp(&a.area()).then(b.row.cmp(&a.row)));
        let size = candidates
            .into_iter()
            .find(|size| self.block_usable(x, y, *size))
            .unwrap_or(DotSize::ONE);

        let rect = self.cell_rect(x, y, size);
        match draw.image_for(size).or_else(|| draw.default_image()) {
            Some(image) => {
                self.stamp(image, rect);
                self.trace.images_stamped += 1;
            }
            None => draw_filled_rect_mut(&mut self.canvas, rect.to_rect(), draw.foreground),
        }
        if size != DotSize::ONE {
            self.trace.merged += 1;
        }
        self.mark(x, y, size);
    }
}
