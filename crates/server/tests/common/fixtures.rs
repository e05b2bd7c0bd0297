//! Test fixtures: credentials and sample fragment bodies.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Credentials of the first test user in `AuthConfig::for_testing()`.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub const USER1: (&str, &str) = ("user1@email.com", "password1");

/// Credentials of the second test user.
#[allow(dead_code)]
pub const USER2: (&str, &str) = ("user2@email.com", "password2");

/// `Authorization` header value for Basic credentials.
#[allow(dead_code)]
pub fn basic_auth((email, password): (&str, &str)) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{password}")))
}

/// A small PNG image.
#[allow(dead_code)]
pub fn png_bytes(width: u32, height: u32) -> Bytes {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 40) as u8, (y * 40) as u8, 120, 255])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .expect("failed to encode png fixture");
    Bytes::from(out.into_inner())
}
