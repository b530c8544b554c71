#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use image::codecs::gif::GifEncoder;
use image::codecs::webp::WebPEncoder;
use image::{
    ColorType, DynamicImage, ImageBuffer, ImageEncoder, ImageFormat, Rgb, Rgba, RgbaImage,
};
use std::io::Cursor;
use std::path::Path;

pub const BOUNDARY: &str = "gallery-test-boundary";

/// Gradient fixture in the requested format. Non-JPEG fixtures carry a
/// transparent right half; GIF uses two flat colours so the palette keeps it.
pub fn sample_image(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    if format == ImageFormat::Gif {
        return two_tone_gif(width, height);
    }

    let img = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    } else {
        DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 90, if x < width / 2 { 255 } else { 0 }])
        }))
    };

    let mut out = Vec::new();
    if format == ImageFormat::WebP {
        let rgba = img.to_rgba8();
        WebPEncoder::new_lossless(&mut out)
            .write_image(rgba.as_raw(), width, height, ColorType::Rgba8)
            .unwrap();
    } else {
        img.write_to(&mut Cursor::new(&mut out), format).unwrap();
    }
    out
}

fn two_tone_gif(width: u32, height: u32) -> Vec<u8> {
    let img: RgbaImage = ImageBuffer::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([200, 30, 30, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        encoder
            .encode(img.as_raw(), width, height, ColorType::Rgba8)
            .unwrap();
    }
    out
}

pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((mime, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"image\"; filename=\"upload\"\r\n\
                 Content-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(method: &str, uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Number of regular files across the thumb/medium/original directories.
pub fn count_files(upload_dir: &Path) -> usize {
    ["thumb", "medium", "original"]
        .iter()
        .filter_map(|class| std::fs::read_dir(upload_dir.join(class)).ok())
        .flat_map(|entries| entries.filter_map(Result::ok))
        .filter(|entry| entry.path().is_file())
        .count()
}
