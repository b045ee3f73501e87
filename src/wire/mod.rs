//! Wire form of an archive and structural validation of untrusted input.
//!
//! The wire object is the flat, versionless JSON document handed from the
//! producer to the assembler. Names are already resolved at export time,
//! so a consumer never re-runs disambiguation: [`WirePost::encoded_name`]
//! and [`WireFile::encoded_name`] are the exact entry names the assembler
//! emits and the renderer links to.
//!
//! Input is untrusted. [`WireArchive::from_json`] performs an explicit
//! structural pass over the decoded JSON before any field is used, and
//! fails with a [`ValidationError`] naming the first offending field and
//! its value. There is no partial acceptance: any failure rejects the
//! whole document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Root wire object: the durable, transportable form of an archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireArchive {
    /// Posts in export order, each with pre-resolved names.
    pub posts: Vec<WirePost>,
    /// Creator/archive identifier; the ZIP and its root directory are named
    /// after its encoded form.
    pub id: String,
    /// Link back to the source page, used by the root index navbar.
    pub url: String,
    /// Tag union across all posts (or an explicit override set at export).
    pub tags: Vec<String>,
    /// Total number of regular files across all posts. Covers not included.
    pub file_count: usize,
    /// Total number of posts.
    pub post_count: usize,
}

/// One post in the wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePost {
    /// Title as the producer saw it.
    pub original_name: String,
    /// Resolved directory name (encoded title plus duplicate suffix).
    pub encoded_name: String,
    /// Free-form info text; emitted as `info.json` when it parses as JSON.
    pub information_text: String,
    /// Pre-rendered HTML body for the post page.
    pub html_text: String,
    /// Files in emission order, grouped by base-name bucket.
    pub files: Vec<WireFile>,
    /// Tags attached to this post.
    pub tags: Vec<String>,
    /// Optional cover image, addressed independently of the file list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<WireCover>,
}

/// One downloadable file in the wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFile {
    /// Source URL to fetch the bytes from.
    pub url: String,
    /// File name before encoding and disambiguation.
    pub original_name: String,
    /// Resolved archive entry name, unique within the post directory.
    pub encoded_name: String,
}

/// Cover image of a post. Resolved as a bucket of size 1, so its name
/// never carries a duplicate suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCover {
    /// Source URL to fetch the bytes from.
    pub url: String,
    /// Resolved archive entry name.
    pub name: String,
}

/// Structural failure of an untrusted wire document.
///
/// Fatal to the run: nothing is fetched or written once validation fails.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The input is not syntactically valid JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field is missing or has the wrong shape.
    #[error("invalid wire object: {field} must be {expected}, got {value}")]
    Field {
        /// Dotted path of the offending field, e.g. `posts[2].files[0].url`.
        field: String,
        /// Human-readable description of the expected shape.
        expected: &'static str,
        /// Compact rendering of the offending value.
        value: String,
    },
}

impl ValidationError {
    fn field(field: impl Into<String>, expected: &'static str, value: &Value) -> Self {
        Self::Field {
            field: field.into(),
            expected,
            value: render_value(value),
        }
    }
}

/// Compact, bounded rendering of a JSON value for diagnostics.
fn render_value(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() > 120 {
        let truncated: String = rendered.chars().take(120).collect();
        format!("{truncated}...")
    } else {
        rendered
    }
}

impl WireArchive {
    /// Parses and validates a wire document from its JSON text.
    ///
    /// The structural check runs over the decoded [`Value`] before any
    /// field is trusted and short-circuits on the first failure. Only a
    /// document that passes in full is deserialized.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the input is not valid JSON or any
    /// field fails the structural check.
    pub fn from_json(input: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(input)?;
        if let Err(err) = validate(&value) {
            warn!(error = %err, "rejecting wire object");
            return Err(err);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Serializes the archive back to its JSON wire text.
    ///
    /// # Errors
    ///
    /// Returns the underlying serializer error; cannot fail for values
    /// built through [`crate::model::ArchiveBuilder`].
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Structurally validates a decoded wire document.
///
/// # Errors
///
/// Returns a [`ValidationError::Field`] naming the first field that does
/// not match the expected shape.
pub fn validate(value: &Value) -> Result<(), ValidationError> {
    let root = value
        .as_object()
        .ok_or_else(|| ValidationError::field("$", "an object", value))?;

    require_count(root, "postCount")?;
    require_count(root, "fileCount")?;
    require_string(root, "id", "id")?;
    require_string(root, "url", "url")?;
    require_array(root, "tags", "tags")?;
    let posts = require_array(root, "posts", "posts")?;

    for (index, post) in posts.iter().enumerate() {
        validate_post(post, index)?;
    }
    Ok(())
}

fn validate_post(value: &Value, index: usize) -> Result<(), ValidationError> {
    let path = format!("posts[{index}]");
    let post = value
        .as_object()
        .ok_or_else(|| ValidationError::field(&path, "an object", value))?;

    require_string(post, "originalName", &format!("{path}.originalName"))?;
    require_string(post, "encodedName", &format!("{path}.encodedName"))?;
    require_string(post, "informationText", &format!("{path}.informationText"))?;
    require_string(post, "htmlText", &format!("{path}.htmlText"))?;
    require_array(post, "tags", &format!("{path}.tags"))?;
    let files = require_array(post, "files", &format!("{path}.files"))?;

    for (file_index, file) in files.iter().enumerate() {
        let file_path = format!("{path}.files[{file_index}]");
        let file_obj = file
            .as_object()
            .ok_or_else(|| ValidationError::field(&file_path, "an object", file))?;
        require_string(file_obj, "url", &format!("{file_path}.url"))?;
        require_string(file_obj, "originalName", &format!("{file_path}.originalName"))?;
        require_string(file_obj, "encodedName", &format!("{file_path}.encodedName"))?;
    }

    match post.get("cover") {
        None | Some(Value::Null) => Ok(()),
        Some(cover) => {
            let cover_path = format!("{path}.cover");
            let cover_obj = cover
                .as_object()
                .ok_or_else(|| ValidationError::field(&cover_path, "an object", cover))?;
            require_string(cover_obj, "url", &format!("{cover_path}.url"))?;
            require_string(cover_obj, "name", &format!("{cover_path}.name"))?;
            Ok(())
        }
    }
}

fn require_string<'a>(
    object: &'a serde_json::Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a str, ValidationError> {
    let value = object.get(key).unwrap_or(&Value::Null);
    value
        .as_str()
        .ok_or_else(|| ValidationError::field(path, "a string", value))
}

fn require_array<'a>(
    object: &'a serde_json::Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    let value = object.get(key).unwrap_or(&Value::Null);
    value
        .as_array()
        .ok_or_else(|| ValidationError::field(path, "an array", value))
}

fn require_count(
    object: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<u64, ValidationError> {
    let value = object.get(key).unwrap_or(&Value::Null);
    value
        .as_u64()
        .ok_or_else(|| ValidationError::field(key, "an unsigned integer", value))
}
