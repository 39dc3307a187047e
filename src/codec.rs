//! Raster codec boundary: decoding option images and encoding rendered output.
//!
//! All format work is delegated to the `image` crate; errors surface as [`Error::Image`] or
//! [`Error::Io`].

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, DynamicImage, Frame, ImageFormat, RgbaImage};
use tracing::debug;

use crate::compose::blend_onto;
use crate::error::{Error, Result};
use crate::options::{GifFrame, OutputFormat, WHITE};

/// Decodes PNG, JPEG or any other still format the `image` crate recognizes.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Opens an image file, guessing the format from its extension and contents.
pub fn load_image(path: impl AsRef<Path>) -> Result<RgbaImage> {
    Ok(image::open(path.as_ref())?.to_rgba8())
}

/// Decodes an animated GIF into full-canvas frames, in file order.
pub fn decode_gif_frames(bytes: &[u8]) -> Result<Vec<GifFrame>> {
    collect_frames(GifDecoder::new(Cursor::new(bytes))?)
}

pub fn load_gif_frames(path: impl AsRef<Path>) -> Result<Vec<GifFrame>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    collect_frames(GifDecoder::new(reader)?)
}

fn collect_frames<'a>(decoder: impl AnimationDecoder<'a>) -> Result<Vec<GifFrame>> {
    let frames: Vec<GifFrame> = decoder
        .into_frames()
        .collect_frames()?
        .into_iter()
        .map(|frame| {
            let delay_centis = delay_to_centis(frame.delay());
            GifFrame::new(frame.into_buffer(), delay_centis)
        })
        .collect();
    if frames.is_empty() {
        return Err(Error::invalid("GIF contains no frames"));
    }
    debug!(frames = frames.len(), "GIF decoded");
    Ok(frames)
}

fn delay_to_centis(delay: Delay) -> u32 {
    let (numer, denom) = delay.numer_denom_ms();
    (u64::from(numer) / u64::from(denom.max(1)) / 10) as u32
}

/// Encodes a still image in the given format. JPEG output is flattened onto white first.
pub fn encode_image(image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        OutputFormat::Jpeg => {
            let mut flat = RgbaImage::from_pixel(image.width(), image.height(), WHITE);
            blend_onto(&mut flat, image, 0, 0, 1.0);
            DynamicImage::ImageRgba8(flat)
                .to_rgb8()
                .write_to(&mut buf, ImageFormat::Jpeg)?;
        }
        OutputFormat::Png | OutputFormat::Gif => {
            image.write_to(&mut buf, format.image_format())?;
        }
    }
    Ok(buf.into_inner())
}

/// Encodes frames as an endlessly looping animated GIF.
pub fn encode_gif(frames: &[GifFrame]) -> Result<Vec<u8>> {
    if frames.is_empty() {
        return Err(Error::invalid("cannot encode a GIF without frames"));
    }
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder.set_repeat(Repeat::Infinite)?;
        encoder.encode_frames(frames.iter().map(|frame| {
            let delay = Delay::from_numer_denom_ms(frame.delay_centis * 10, 1);
            Frame::from_parts(frame.image.clone(), 0, 0, delay)
        }))?;
    }
    Ok(bytes)
}
