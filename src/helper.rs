use crate::error::{Error, Result};
use crate::matrix::BitMatrix;
use crate::options::QrCodeOptions;
use crate::qrcode::generate;

use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/*---- Utilities ----*/

// Returns a string of SVG code for an image depicting the given matrix, with its quiet
// zone as border. The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(matrix: &BitMatrix, foreground: Rgba<u8>, background: Rgba<u8>) -> String {
	let border = matrix.quiet_zone();
	let width = matrix.width() + border * 2;
	let height = matrix.height() + border * 2;
	let mut result = String::new();
	result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
	result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
	result += &format!(
		"<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {} {}\" stroke=\"none\">\n",
		width, height);
	result += &format!("\t<rect width=\"100%\" height=\"100%\"{}/>\n", svg_fill(background));
	result += "\t<path d=\"";
	let mut first = true;
	for y in 0 .. matrix.height() {
		for x in 0 .. matrix.width() {
			if matrix.get(x, y) {
				if !first {
					result += " ";
				}
				first = false;
				result += &format!("M{},{}h1v1h-1z", x + border, y + border);
			}
		}
	}
	result += &format!("\"{}/>\n", svg_fill(foreground));
	result += "</svg>\n";
	result
}

fn svg_fill(color: Rgba<u8>) -> String {
	let [r, g, b, a] = color.0;
	let mut attr = format!(" fill=\"#{:02X}{:02X}{:02X}\"", r, g, b);
	if a < 255 {
		attr += &format!(" fill-opacity=\"{:.3}\"", f32::from(a) / 255.0);
	}
	attr
}

/// Renders the matrix as text, two characters per module, quiet zone included.
pub fn to_text_string(matrix: &BitMatrix) -> String {
	let border = matrix.quiet_zone() as i64;
	let mut result = String::new();
	for y in -border .. i64::from(matrix.height()) + border {
		for x in -border .. i64::from(matrix.width()) + border {
			let dark = x >= 0 && y >= 0 && matrix.get(x as u32, y as u32);
			let c: char = if dark { '█' } else { ' ' };
			result.push(c);
			result.push(c);
		}
		result.push('\n');
	}
	result
}

/// Parses `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
///
/// # Example
///
/// ```rust
/// use image::Rgba;
/// use qrstyle::helper::parse_hex_color;
///
/// assert_eq!(parse_hex_color("#FF8000").unwrap(), Rgba([255, 128, 0, 255]));
/// ```
pub fn parse_hex_color(hex: &str) -> Result<Rgba<u8>> {
	let digits = hex.trim().trim_start_matches('#');
	if (digits.len() != 6 && digits.len() != 8) || !digits.is_ascii() {
		return Err(Error::InvalidArgument(format!("invalid hex color: {}", hex)));
	}
	let channel = |i: usize| {
		u8::from_str_radix(&digits[i * 2 .. i * 2 + 2], 16)
			.map_err(|_| Error::InvalidArgument(format!("invalid hex color: {}", hex)))
	};
	let alpha = if digits.len() == 8 { channel(3)? } else { 255 };
	Ok(Rgba([channel(0)?, channel(1)?, channel(2)?, alpha]))
}

/// Generates a QR Code image buffer from the provided content with every default option.
///
/// # Arguments
///
/// * `content` - The content to encode into the QR Code.
///
/// # Returns
///
/// A 200x200 `RgbaImage`, black modules on white.
///
/// # Example
///
/// ```
/// use qrstyle::helper::generate_image_buffer;
///
/// let img_buffer = generate_image_buffer("Hello, World!").unwrap();
/// assert_eq!(img_buffer.dimensions(), (200, 200));
/// ```
pub fn generate_image_buffer(content: &str) -> Result<RgbaImage> {
	let options = QrCodeOptions::builder(content).build()?;
	generate(&options)?
		.into_image()
		.ok_or_else(|| Error::InvalidArgument("default options produced an animation".into()))
}

/// Generates a QR Code image from the provided options and saves it to a file.
///
/// # Arguments
///
/// * `options` - The rendering options; the file extension follows the output format.
/// * `directory` - Optional. The directory path where the image will be saved. If not provided, the default directory is "generated".
/// * `filename` - Optional. The file name without extension. If not provided, a timestamp-based filename will be used.
///
/// # Returns
///
/// The path of the written file.
///
/// # Example
///
/// ```no_run
/// use qrstyle::helper::generate_image;
/// use qrstyle::options::QrCodeOptions;
///
/// let options = QrCodeOptions::builder("Hello, World!").build().unwrap();
/// let path = generate_image(&options, Some("images"), Some("qr_code")).unwrap();
/// println!("{}", path.display());
/// ```
pub fn generate_image(options: &QrCodeOptions, directory: Option<&str>, filename: Option<&str>) -> Result<PathBuf> {
	let rendered = generate(options)?;

	let directory = directory.unwrap_or("generated");
	let filename = match filename {
		Some(name) => name.to_string(),
		None => {
			let millis = SystemTime::now()
				.duration_since(UNIX_EPOCH)
				.map(|d| d.as_millis())
				.unwrap_or_default();
			format!("qr_{}", millis)
		},
	};

	// Check if the directory exists, create it if it doesn't
	if !Path::new(directory).exists() {
		fs::create_dir_all(directory)?;
	}

	let file_path = Path::new(directory).join(format!("{}.{}", filename, rendered.format().extension()));
	rendered.save(&file_path)?;
	info!(path = %file_path.display(), "QR image generated");
	Ok(file_path)
}
