use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageEncoder, ImageFormat, Rgb, RgbImage};
use std::fmt;
use std::io::Cursor;
use thiserror::Error;

/// Image formats the gallery accepts. Variants are always re-encoded in the
/// format of their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl ImageKind {
    /// Detects the format from magic bytes. The declared MIME type and the
    /// filename are never consulted.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        infer::get(bytes).and_then(|kind| Self::from_mime(kind.mime_type()))
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::WebP => "webp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Gif => ImageFormat::Gif,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Gif => "GIF",
            Self::WebP => "WebP",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecStage {
    Detect,
    Decode,
    Encode,
    Worker,
}

impl fmt::Display for CodecStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Detect => "detect",
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::Worker => "worker",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode {format} image: {reason}")]
    Decode { format: ImageKind, reason: String },

    #[error("failed to encode {format} image: {reason}")]
    Encode { format: ImageKind, reason: String },

    #[error("codec worker aborted: {0}")]
    Worker(String),
}

impl CodecError {
    pub fn stage(&self) -> CodecStage {
        match self {
            Self::UnsupportedFormat(_) => CodecStage::Detect,
            Self::Decode { .. } => CodecStage::Decode,
            Self::Encode { .. } => CodecStage::Encode,
            Self::Worker(_) => CodecStage::Worker,
        }
    }
}

/// Header-level facts about a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct EncodedVariant {
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Decode + resize + re-encode capability. Implementations must be pure:
/// they never touch the filesystem.
pub trait VariantCodec: Send + Sync {
    fn probe(&self, source: &[u8]) -> Result<SourceInfo, CodecError>;

    fn derive(
        &self,
        source: &[u8],
        max_width: u32,
        max_height: u32,
        quality: u8,
    ) -> Result<EncodedVariant, CodecError>;
}

/// Computes the largest size fitting inside `max_width` x `max_height` that
/// keeps the aspect ratio. Never upscales; each axis is at least 1px.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width.max(1), height.max(1));
    }
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let (w, h) = (width as u64, height as u64);
    let (mw, mh) = (max_width.max(1) as u64, max_height.max(1) as u64);

    // scale = min(mw / w, mh / h), compared without division
    if mw * h <= mh * w {
        (mw as u32, ((h * mw) / w).max(1) as u32)
    } else {
        (((w * mh) / h).max(1) as u32, mh as u32)
    }
}

/// Maps a 0-100 quality onto the 0-9 zlib level scale (higher quality means
/// less compression effort), then onto the encoder's presets.
fn png_compression(quality: u8) -> CompressionType {
    let level = (9.0 - (quality.min(100) as f32 / 100.0) * 9.0) as u8;
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let a = a as u16;
        let blend = |c: u8| ((c as u16 * a + 255 * (255 - a)) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

/// `VariantCodec` backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageCodec {
    fn detect(source: &[u8]) -> Result<ImageKind, CodecError> {
        ImageKind::sniff(source).ok_or_else(|| {
            CodecError::UnsupportedFormat("no JPEG, PNG, GIF or WebP signature".to_string())
        })
    }

    fn decode(kind: ImageKind, source: &[u8]) -> Result<DynamicImage, CodecError> {
        image::load_from_memory_with_format(source, kind.image_format()).map_err(|e| {
            CodecError::Decode {
                format: kind,
                reason: e.to_string(),
            }
        })
    }

    fn encode(kind: ImageKind, img: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        let (width, height) = (img.width(), img.height());
        let mut out = Vec::new();

        let result = match kind {
            ImageKind::Jpeg => {
                let rgb = if img.color().has_alpha() {
                    flatten_onto_white(img)
                } else {
                    img.to_rgb8()
                };
                JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ColorType::Rgb8,
                )
            }
            ImageKind::Png => {
                // PNG takes 8 and 16 bit integer layouts as-is; float buffers are narrowed
                let img = match img.color() {
                    ColorType::Rgb32F | ColorType::Rgba32F => {
                        DynamicImage::ImageRgba8(img.to_rgba8())
                    }
                    _ => img.clone(),
                };
                PngEncoder::new_with_quality(
                    &mut out,
                    png_compression(quality),
                    PngFilter::Adaptive,
                )
                .write_image(img.as_bytes(), width, height, img.color())
            }
            ImageKind::Gif => {
                let rgba = img.to_rgba8();
                // The trailer is written when the encoder drops
                let mut encoder = GifEncoder::new(&mut out);
                encoder.encode(rgba.as_raw(), width, height, ColorType::Rgba8)
            }
            ImageKind::WebP => {
                if img.color().has_alpha() {
                    let rgba = img.to_rgba8();
                    WebPEncoder::new_lossless(&mut out).write_image(
                        rgba.as_raw(),
                        width,
                        height,
                        ColorType::Rgba8,
                    )
                } else {
                    let rgb = img.to_rgb8();
                    WebPEncoder::new_lossless(&mut out).write_image(
                        rgb.as_raw(),
                        width,
                        height,
                        ColorType::Rgb8,
                    )
                }
            }
        };

        result.map_err(|e| CodecError::Encode {
            format: kind,
            reason: e.to_string(),
        })?;
        Ok(out)
    }
}

impl VariantCodec for ImageCodec {
    fn probe(&self, source: &[u8]) -> Result<SourceInfo, CodecError> {
        let kind = Self::detect(source)?;
        let reader = image::io::Reader::with_format(Cursor::new(source), kind.image_format());
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| CodecError::UnsupportedFormat(e.to_string()))?;

        if width == 0 || height == 0 {
            return Err(CodecError::UnsupportedFormat(
                "image has no pixels".to_string(),
            ));
        }

        Ok(SourceInfo {
            kind,
            width,
            height,
        })
    }

    fn derive(
        &self,
        source: &[u8],
        max_width: u32,
        max_height: u32,
        quality: u8,
    ) -> Result<EncodedVariant, CodecError> {
        let kind = Self::detect(source)?;
        let img = Self::decode(kind, source)?;

        let (width, height) = fit_within(img.width(), img.height(), max_width, max_height);
        let resized = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::CatmullRom)
        };

        let bytes = Self::encode(kind, &resized, quality)?;

        Ok(EncodedVariant {
            kind,
            width,
            height,
            bytes,
        })
    }
}
