//! Format conversion between supported fragment types.
//!
//! Text conversions:
//! - markdown -> html via CommonMark rendering
//! - markdown -> plain text by rendering to html, then to wrapped text
//! - html -> plain text
//! - json -> plain text as pretty-printed JSON
//!
//! Image conversions re-encode between png, jpeg, webp and gif.

use crate::error::{FragmentError, FragmentResult};
use bytes::Bytes;
use fragments_core::media_type::{
    APPLICATION_JSON, IMAGE_GIF, IMAGE_JPEG, IMAGE_PNG, IMAGE_WEBP, TEXT_HTML, TEXT_MARKDOWN,
    TEXT_PLAIN, is_image,
};
use fragments_core::{base_type, can_convert, resolve_target};
use image::{DynamicImage, ImageFormat};
use pulldown_cmark::{Options, Parser};
use std::io::Cursor;

/// Line width for text rendered from markdown.
const MARKDOWN_TEXT_WIDTH: usize = 150;
/// Line width for text rendered from html.
const HTML_TEXT_WIDTH: usize = 130;

/// Convert `data` of type `source_type` into `target`.
///
/// `target` may be a media type (`"text/html"`) or an extension (`"html"`).
/// Legality is checked against the conversion table before any work is done;
/// converting a type to itself returns the input unchanged.
pub fn convert(data: Bytes, source_type: &str, target: &str) -> FragmentResult<Bytes> {
    let source = base_type(source_type)?;
    let target_type = check_conversion(&source, target)?;

    if source == target_type {
        return Ok(data);
    }

    match (source.as_str(), target_type) {
        (TEXT_MARKDOWN, TEXT_HTML) => Ok(Bytes::from(markdown_to_html(&data))),
        (TEXT_MARKDOWN, TEXT_PLAIN) => {
            let html = markdown_to_html(&data);
            html_to_text(html.as_bytes(), MARKDOWN_TEXT_WIDTH)
        }
        (TEXT_HTML, TEXT_PLAIN) => html_to_text(&data, HTML_TEXT_WIDTH),
        (APPLICATION_JSON, TEXT_PLAIN) => pretty_json(&data),
        (from, to) if is_image(from) && is_image(to) => reencode_image(&data, to),
        (from, to) => Err(FragmentError::UnsupportedConversion {
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}

/// Resolve `target` and verify a fragment of base type `source` may be
/// rendered as it. Returns the resolved target media type.
pub fn check_conversion(source: &str, target: &str) -> FragmentResult<&'static str> {
    let unsupported = || FragmentError::UnsupportedConversion {
        from: source.to_string(),
        to: target.to_string(),
    };
    let target_type = resolve_target(target).ok_or_else(unsupported)?;
    if !can_convert(source, target_type) {
        return Err(unsupported());
    }
    Ok(target_type)
}

fn markdown_to_html(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut html = String::with_capacity(text.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, Parser::new_ext(&text, options));
    html
}

fn html_to_text(html: &[u8], width: usize) -> FragmentResult<Bytes> {
    html2text::from_read(html, width)
        .map(Bytes::from)
        .map_err(|e| FragmentError::Conversion(format!("failed to render html as text: {e}")))
}

fn pretty_json(data: &[u8]) -> FragmentResult<Bytes> {
    let value: serde_json::Value = serde_json::from_slice(data)
        .map_err(|e| FragmentError::Conversion(format!("invalid JSON: {e}")))?;
    serde_json::to_vec_pretty(&value)
        .map(Bytes::from)
        .map_err(|e| FragmentError::Conversion(e.to_string()))
}

fn image_format(media_type: &str) -> Option<ImageFormat> {
    match media_type {
        IMAGE_PNG => Some(ImageFormat::Png),
        IMAGE_JPEG => Some(ImageFormat::Jpeg),
        IMAGE_WEBP => Some(ImageFormat::WebP),
        IMAGE_GIF => Some(ImageFormat::Gif),
        _ => None,
    }
}

fn reencode_image(data: &[u8], target: &str) -> FragmentResult<Bytes> {
    let format = image_format(target).ok_or_else(|| {
        FragmentError::Conversion(format!("no image encoder for {target}"))
    })?;
    let decoded = image::load_from_memory(data)
        .map_err(|e| FragmentError::Conversion(format!("failed to decode image: {e}")))?;

    // JPEG has no alpha channel; the webp and gif encoders want RGBA.
    let prepared = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        ImageFormat::WebP | ImageFormat::Gif => DynamicImage::ImageRgba8(decoded.to_rgba8()),
        _ => decoded,
    };

    let mut out = Cursor::new(Vec::new());
    prepared
        .write_to(&mut out, format)
        .map_err(|e| FragmentError::Conversion(format!("failed to encode {target}: {e}")))?;
    Ok(Bytes::from(out.into_inner()))
}
