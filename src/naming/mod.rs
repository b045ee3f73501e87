//! Filename encoding and collision-free name resolution.
//!
//! Archive entries must be safe on common filesystems and unique within
//! their directory. This module provides the three pure operations the
//! rest of the crate builds on:
//!
//! - [`encode_name`] - escapes characters illegal on common filesystems by
//!   substituting full-width lookalikes, so the original title stays legible.
//! - [`encode_link`] - produces a percent-encoded form safe for `href`/`src`
//!   attributes in generated pages.
//! - [`disambiguate`] - appends a positional suffix when several entries
//!   share the same encoded base name.

use std::borrow::Cow;

/// Reserved URI characters percent-encoded by [`encode_link`].
const URI_RESERVED: [char; 11] = [';', ',', '/', '?', ':', '@', '&', '=', '+', '$', '#'];

/// Extensions rendered with an `<audio>` element.
const AUDIO_EXTENSIONS: [&str; 3] = [".mp3", ".m4a", ".ogg"];

/// Extensions rendered with an `<img>` element.
const IMAGE_EXTENSIONS: [&str; 11] = [
    ".apng", ".avif", ".gif", ".jpg", ".jpeg", ".jfif", ".pjpeg", ".pjp", ".png", ".svg", ".webp",
];

/// Extensions rendered with a `<video>` element.
const VIDEO_EXTENSIONS: [&str; 3] = [".mp4", ".webm", ".ogv"];

/// Media classification of a file name, derived from its extension.
///
/// Drives which link tag a post page embeds for the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Playable audio (`.mp3`, `.m4a`, `.ogg`).
    Audio,
    /// Displayable image (`.png`, `.jpg`, `.webp`, ...).
    Image,
    /// Playable video (`.mp4`, `.webm`, `.ogv`).
    Video,
    /// Anything else; rendered as a plain download link.
    Other,
}

/// Escapes characters illegal on common filesystems.
///
/// Each of `/ \ , : * " < > |` is replaced with a distinct full-width
/// lookalike, then leading/trailing whitespace is trimmed. The function is
/// total and deterministic; encoding an already-encoded name changes
/// nothing further because the lookalikes are not in the reserved set.
#[must_use]
pub fn encode_name(raw: &str) -> String {
    let encoded: String = raw
        .chars()
        .map(|c| match c {
            '/' => '／',
            '\\' => '＼',
            ',' => '，',
            ':' => '：',
            '*' => '＊',
            '"' => '“',
            '<' => '＜',
            '>' => '＞',
            '|' => '｜',
            c => c,
        })
        .collect();
    encoded.trim().to_string()
}

/// Produces a URI-safe form of a name for use in `href`/`src` attributes.
///
/// Applies [`encode_name`], then percent-encodes each of the reserved URI
/// characters `; , / ? : @ & = + $ #` individually. Everything else is
/// passed through unchanged, so already-emitted archive entry names and
/// the links that reference them stay in sync byte-for-byte.
#[must_use]
pub fn encode_link(raw: &str) -> String {
    let mut out = String::new();
    for ch in encode_name(raw).chars() {
        if URI_RESERVED.contains(&ch) {
            let literal = ch.to_string();
            match urlencoding::encode(&literal) {
                Cow::Borrowed(_) => out.push(ch),
                Cow::Owned(escaped) => out.push_str(&escaped),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Resolves a unique name for one member of a same-name bucket.
///
/// A bucket of size 1 keeps the bare `base + extension`. Larger buckets
/// get a `_<n>` suffix before the extension, where `n = index + 1` when
/// `ascending` and `n = bucket_size - index` otherwise. File buckets use
/// the ascending direction; the post-title bucket uses descending, so the
/// most recently added duplicate title gets the smallest suffix. The
/// asymmetry is deliberate and matches the archive layout consumers
/// already rely on.
#[must_use]
pub fn disambiguate(
    base: &str,
    extension: &str,
    bucket_size: usize,
    index: usize,
    ascending: bool,
) -> String {
    if bucket_size <= 1 {
        return format!("{base}{extension}");
    }
    let n = if ascending {
        index + 1
    } else {
        bucket_size - index
    };
    format!("{base}_{n}{extension}")
}

/// Classifies a file name by its extension.
///
/// Matching is suffix-based and case-sensitive, mirroring how the archive
/// records extensions verbatim from the producer.
#[must_use]
pub fn media_kind(file_name: &str) -> MediaKind {
    if AUDIO_EXTENSIONS.iter().any(|ext| file_name.ends_with(ext)) {
        return MediaKind::Audio;
    }
    if IMAGE_EXTENSIONS.iter().any(|ext| file_name.ends_with(ext)) {
        return MediaKind::Image;
    }
    if VIDEO_EXTENSIONS.iter().any(|ext| file_name.ends_with(ext)) {
        return MediaKind::Video;
    }
    MediaKind::Other
}

/// Returns true when the file name carries an image extension.
///
/// Used by the root page to pick carousel thumbnails for posts without a
/// cover image.
#[must_use]
pub fn is_image(file_name: &str) -> bool {
    media_kind(file_name) == MediaKind::Image
}
