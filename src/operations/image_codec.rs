//! Pixel codec backed by the `image` crate.
//!
//! Decodes any format `image` recognizes, applies the planned transform and
//! re-encodes. Resize, thumbnail and filter outputs are JPEG; `convert`
//! writes the requested format.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError, ImageFormat};

use super::render::{Codec, FilterKind, PngCompression, RenderPlan};
use crate::error::OperationError;

/// JPEG quality for outputs that do not carry their own.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Largest output, in pixels, a resize or thumbnail may produce.
pub const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

/// Blur and sharpen radii are capped here.
const MAX_SIGMA: f32 = 100.0;

// == Image Codec ==
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl Codec for ImageCodec {
    fn render(&self, input: &[u8], plan: &RenderPlan) -> Result<Vec<u8>, OperationError> {
        let img = image::load_from_memory(input)
            .map_err(|e| OperationError::Decode(e.to_string()))?;

        match plan {
            RenderPlan::Resize { width, height } => {
                encode_jpeg(&resize(&img, *width, *height)?, DEFAULT_JPEG_QUALITY)
            }
            RenderPlan::Thumbnail { size } => {
                check_output_size("size", *size, *size)?;
                let thumb = img.resize_to_fill(*size, *size, FilterType::Lanczos3);
                encode_jpeg(&thumb, DEFAULT_JPEG_QUALITY)
            }
            RenderPlan::Filter { kind, intensity } => {
                encode_jpeg(&apply_filter(img, *kind, *intensity), DEFAULT_JPEG_QUALITY)
            }
            RenderPlan::Convert {
                format,
                quality,
                png,
            } => match format.as_str() {
                "jpeg" | "jpg" => encode_jpeg(&img, jpeg_quality(*quality)),
                "png" => encode_png(&img, png.unwrap_or(PngCompression::Default)),
                "gif" => encode_as(&img, ImageFormat::Gif),
                "bmp" => encode_as(&img, ImageFormat::Bmp),
                "tiff" => encode_as(&img, ImageFormat::Tiff),
                other => Err(OperationError::Save(format!("unsupported format: {other}"))),
            },
        }
    }
}

// == Transforms ==

/// Exact resize; a zero side is derived from the other keeping the aspect
/// ratio.
fn resize(img: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage, OperationError> {
    let (src_w, src_h) = GenericImageView::dimensions(img);
    let (src_w, src_h) = (src_w.max(1), src_h.max(1));
    let (width, height) = match (width, height) {
        (0, 0) => (src_w, src_h),
        (0, h) => (scale(src_w, h, src_h), h),
        (w, 0) => (w, scale(src_h, w, src_w)),
        (w, h) => (w, h),
    };
    check_output_size("width", width, height)?;
    Ok(img.resize_exact(width, height, FilterType::Lanczos3))
}

/// `side * target / reference`, rounded, never below one.
fn scale(side: u32, target: u32, reference: u32) -> u32 {
    let reference = u64::from(reference);
    let scaled = (u64::from(side) * u64::from(target) + reference / 2) / reference;
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

fn check_output_size(name: &str, width: u32, height: u32) -> Result<(), OperationError> {
    if u64::from(width) * u64::from(height) > MAX_OUTPUT_PIXELS {
        return Err(OperationError::InvalidParameterValue {
            name: name.to_string(),
            reason: format!("{width}x{height} exceeds {MAX_OUTPUT_PIXELS} pixels"),
        });
    }
    Ok(())
}

/// Zero intensity leaves blur and sharpen as a no-op.
fn apply_filter(img: DynamicImage, kind: FilterKind, intensity: f64) -> DynamicImage {
    let sigma = (intensity as f32).min(MAX_SIGMA);
    match kind {
        FilterKind::Blur if sigma > 0.0 => img.blur(sigma),
        FilterKind::Sharpen if sigma > 0.0 => img.unsharpen(sigma, 0),
        FilterKind::Grayscale => img.grayscale(),
        FilterKind::Blur | FilterKind::Sharpen => img,
    }
}

// == Encoders ==

fn jpeg_quality(quality: i64) -> u8 {
    quality.clamp(1, 100) as u8
}

fn save_error(err: ImageError) -> OperationError {
    OperationError::Save(err.to_string())
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, OperationError> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    // JPEG has no alpha channel and only 8-bit samples
    let written = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img.write_with_encoder(encoder),
        _ => DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder),
    };
    written.map_err(save_error)?;
    Ok(out)
}

fn encode_png(img: &DynamicImage, level: PngCompression) -> Result<Vec<u8>, OperationError> {
    // `image` has no uncompressed PNG mode; the fastest level is the closest.
    let compression = match level {
        PngCompression::BestCompression => CompressionType::Best,
        PngCompression::Default => CompressionType::Default,
        PngCompression::BestSpeed | PngCompression::None => CompressionType::Fast,
    };

    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, compression, PngFilter::Adaptive);
    let written = match img {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba16(img.to_rgba16()).write_with_encoder(encoder)
        }
        _ => img.write_with_encoder(encoder),
    };
    written.map_err(save_error)?;
    Ok(out)
}

fn encode_as(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, OperationError> {
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img.to_rgba8())
        .write_to(&mut Cursor::new(&mut out), format)
        .map_err(save_error)?;
    Ok(out)
}
