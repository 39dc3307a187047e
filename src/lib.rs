//! # qrstyle
//!
//! A Rust library for rendering styled QR codes.
//!
//! `qrstyle` takes the boolean module grid of a QR code and paints it as a styled raster while
//! keeping it machine-readable. Error correction encoding is delegated to the `qrcode` crate and
//! image formats to the `image` crate; this crate owns the layout, painting and composition.
//!
//! ## Features
//!
//! - Seven module shapes: rectangle, circle, triangle, pentagon, hexagon, octagon or custom images.
//! - Merging of neighbouring modules into larger shapes or multi-cell images.
//! - Colored or image-based position markers, globally or per corner.
//! - Logos with rounded corners, borders and opacity.
//! - Static or animated GIF backgrounds in override, fill or penetrate style.
//! - PNG, JPEG and GIF output, as bytes, files or `data:` URIs.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrstyle = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Render a circular-module QR code with a logo:
//!
//! ```rust
//! use image::{Rgba, RgbaImage};
//! use qrstyle::options::{DrawStyle, LogoOptions, LogoStyle, QrCodeEcc, QrCodeOptions};
//! use qrstyle::qrcode::generate;
//!
//! let logo = RgbaImage::from_pixel(64, 64, Rgba([255, 165, 0, 255]));
//! let options = QrCodeOptions::builder("https://example.com")
//!     .size(300, 300)
//!     .error_correction(QrCodeEcc::High)
//!     .draw_style(DrawStyle::Circular)
//!     .cell_merge(true)
//!     .logo(LogoOptions::new(logo).with_style(LogoStyle::Round))
//!     .build()
//!     .unwrap();
//! let png = generate(&options).unwrap().to_bytes().unwrap();
//! assert!(!png.is_empty());
//! ```
//!
//! Generate an in-memory image buffer with default options:
//!
//! ```rust
//! use qrstyle::helper::generate_image_buffer;
//!
//! let img = generate_image_buffer("Hello, World!").unwrap();
//! assert_eq!(img.dimensions(), (200, 200));
//! ```
//!
//! ## Modules
//!
//! - [`options`]: Rendering configuration and its builder.
//! - [`matrix`]: Module grid and pixel layout.
//! - [`render`]: Painting of modules and position markers.
//! - [`compose`]: Logo and background composition.
//! - [`codec`]: Image decoding and encoding.
//! - [`qrcode`]: The end-to-end [`generate`](crate::qrcode::generate) entry point.
//! - [`helper`]: Convenience functions and text/SVG renderings.

#![forbid(unsafe_code)]

pub mod codec;
pub mod compose;
pub mod error;
pub mod helper;
pub mod matrix;
pub mod options;
pub mod qrcode;
pub mod render;

pub use crate::error::{Error, Result};
pub use crate::qrcode::{generate, QrImage};
