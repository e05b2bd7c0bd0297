//! Media type policy: which fragment types are accepted, what each type
//! can be converted into, and how URL extensions map to media types.

use crate::error::{Error, Result};
use mime::Mime;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_MARKDOWN: &str = "text/markdown";
pub const TEXT_HTML: &str = "text/html";
pub const APPLICATION_JSON: &str = "application/json";
pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_WEBP: &str = "image/webp";
pub const IMAGE_GIF: &str = "image/gif";

const TEXT_TYPES: [&str; 4] = [TEXT_PLAIN, TEXT_MARKDOWN, TEXT_HTML, APPLICATION_JSON];
const IMAGE_TYPES: [&str; 4] = [IMAGE_PNG, IMAGE_JPEG, IMAGE_WEBP, IMAGE_GIF];

/// Extension table used when a conversion target is given as `.ext`.
const EXTENSIONS: [(&str, &str); 9] = [
    ("txt", TEXT_PLAIN),
    ("md", TEXT_MARKDOWN),
    ("html", TEXT_HTML),
    ("json", APPLICATION_JSON),
    ("png", IMAGE_PNG),
    ("jpg", IMAGE_JPEG),
    ("jpeg", IMAGE_JPEG),
    ("webp", IMAGE_WEBP),
    ("gif", IMAGE_GIF),
];

/// Return the media type with parameters stripped and lower-cased.
///
/// `"text/plain; charset=utf-8"` becomes `"text/plain"`. Optional whitespace
/// around each `;` is accepted.
pub fn base_type(value: &str) -> Result<String> {
    let normalized = value
        .split(';')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("; ");
    let parsed: Mime = normalized
        .parse()
        .map_err(|_| Error::InvalidMediaType(value.to_string()))?;
    Ok(parsed.essence_str().to_ascii_lowercase())
}

/// Whether the default policy accepts `value` as a fragment type.
///
/// Malformed media types are never supported.
pub fn is_supported_type(value: &str) -> bool {
    TypePolicy::default().is_supported(value)
}

/// Target media types a fragment of `base` can be converted to.
///
/// Every supported type lists itself. Unknown types have no targets.
pub fn conversion_targets(base: &str) -> &'static [&'static str] {
    match base {
        TEXT_PLAIN => &[TEXT_PLAIN],
        TEXT_MARKDOWN => &[TEXT_MARKDOWN, TEXT_HTML, TEXT_PLAIN],
        TEXT_HTML => &[TEXT_HTML, TEXT_PLAIN],
        APPLICATION_JSON => &[APPLICATION_JSON, TEXT_PLAIN],
        IMAGE_PNG | IMAGE_JPEG | IMAGE_WEBP | IMAGE_GIF => &IMAGE_TYPES,
        _ => &[],
    }
}

/// Whether a fragment of type `base` may be rendered as `target`.
pub fn can_convert(base: &str, target: &str) -> bool {
    conversion_targets(base).contains(&target)
}

/// Map a URL extension (`"md"`, `".md"`, `"JPG"`) to its media type.
pub fn extension_media_type(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, media_type)| *media_type)
}

/// Resolve a conversion target given either as an extension or a media type.
///
/// Returns `None` when the target names nothing this service knows about.
pub fn resolve_target(target: &str) -> Option<&'static str> {
    if target.contains('/') {
        let essence = base_type(target).ok()?;
        TEXT_TYPES
            .iter()
            .chain(IMAGE_TYPES.iter())
            .find(|known| **known == essence)
            .copied()
    } else {
        extension_media_type(target)
    }
}

/// Whether the base type is one of the image types.
pub fn is_image(base: &str) -> bool {
    IMAGE_TYPES.contains(&base)
}

/// Decides which media types may be stored.
///
/// The default policy accepts text, JSON and image types. A text-only
/// policy can be configured for deployments without image support.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypePolicy {
    allow_images: bool,
}

impl Default for TypePolicy {
    fn default() -> Self {
        Self { allow_images: true }
    }
}

impl TypePolicy {
    pub fn new(allow_images: bool) -> Self {
        Self { allow_images }
    }

    /// A policy that rejects every image type.
    pub fn text_only() -> Self {
        Self {
            allow_images: false,
        }
    }

    pub fn allows_images(&self) -> bool {
        self.allow_images
    }

    /// Whether `value` (parameters allowed) is an accepted fragment type.
    pub fn is_supported(&self, value: &str) -> bool {
        match base_type(value) {
            Ok(base) => self.supported_types().any(|t| t == base),
            Err(_) => false,
        }
    }

    /// Iterate over every base type this policy accepts.
    pub fn supported_types(&self) -> impl Iterator<Item = &'static str> {
        let images: &'static [&'static str] = if self.allow_images {
            &IMAGE_TYPES
        } else {
            &[]
        };
        TEXT_TYPES.iter().chain(images.iter()).copied()
    }
}
