//! Post entity: file buckets, cover handling, and link-tag generation.

use crate::naming::{MediaKind, disambiguate, encode_link, encode_name, media_kind};
use crate::wire::{WireCover, WireFile, WirePost};

use super::error::ModelError;

/// Identity handle to a file added to a post.
///
/// Returned by [`Post::add_file`] and [`Post::set_cover`] so the producer
/// can later ask the post for link tags referencing exactly the archive
/// entry name the file will be emitted under. Two handles denote the same
/// file when their `(original name, url)` pairs match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    name: String,
    extension: String,
    url: String,
}

impl FileRef {
    fn new(name: &str, extension: &str, url: &str) -> Self {
        let extension = if extension.is_empty() {
            String::new()
        } else {
            format!(".{extension}")
        };
        Self {
            name: name.to_string(),
            extension,
            url: url.to_string(),
        }
    }

    /// File name as the producer supplied it.
    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.name
    }

    /// Extension including its leading dot, or empty when absent.
    #[must_use]
    pub fn original_extension(&self) -> &str {
        &self.extension
    }

    /// Source URL of the file.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Filesystem-safe form of the name.
    #[must_use]
    pub fn encoded_name(&self) -> String {
        encode_name(&self.name)
    }

    /// Filesystem-safe form of the extension.
    #[must_use]
    pub fn encoded_extension(&self) -> String {
        encode_name(&self.extension)
    }

    /// Identity comparison: same original name and same URL.
    #[must_use]
    pub fn is_same_file(&self, other: &FileRef) -> bool {
        self.name == other.name && self.url == other.url
    }
}

/// One bucket of files sharing an encoded base name within a post.
#[derive(Debug, Clone)]
struct FileBucket {
    key: String,
    files: Vec<FileRef>,
}

/// A post under construction: title, body, tags, files, optional cover.
///
/// Insertions are append-only. Files land in base-name buckets in
/// bucket-insertion order; duplicates within a bucket are distinguished
/// by position and receive ascending suffixes at export.
#[derive(Debug, Clone)]
pub struct Post {
    name: String,
    info: String,
    html: String,
    tags: Vec<String>,
    buckets: Vec<FileBucket>,
    cover: Option<FileRef>,
}

impl Post {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            info: String::new(),
            html: String::new(),
            tags: Vec::new(),
            buckets: Vec::new(),
            cover: None,
        }
    }

    /// Original title of the post.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tags attached to this post.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Sets the free-form info text emitted alongside the post page.
    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    /// Sets the pre-rendered HTML body of the post page.
    pub fn set_html(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }

    /// Replaces the post's tag list.
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    /// Appends a file to the post and returns its identity handle.
    ///
    /// `extension` is given without its leading dot; an empty string means
    /// no extension. Files whose names encode to the same base name share
    /// a bucket and are disambiguated by insertion position at export.
    pub fn add_file(&mut self, name: &str, extension: &str, url: &str) -> FileRef {
        let file = FileRef::new(name, extension, url);
        let key = file.encoded_name();
        match self.buckets.iter_mut().find(|bucket| bucket.key == key) {
            Some(bucket) => bucket.files.push(file.clone()),
            None => self.buckets.push(FileBucket {
                key,
                files: vec![file.clone()],
            }),
        }
        file
    }

    /// Records the post's cover image and returns its identity handle.
    ///
    /// The cover lives outside the regular file buckets and is always
    /// resolved as a bucket of size 1, so it never collides with
    /// same-named regular files.
    pub fn set_cover(&mut self, name: &str, extension: &str, url: &str) -> FileRef {
        let file = FileRef::new(name, extension, url);
        self.cover = Some(file.clone());
        file
    }

    /// Number of regular files held by the post. Covers not counted.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.files.len()).sum()
    }

    /// Relative link target (`./<name>`) for a file previously added to
    /// this post, matching the archive entry name the assembler will emit.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the handle's identity cannot be located
    /// in this post; unreachable for handles returned by [`Post::add_file`]
    /// or [`Post::set_cover`] on the same post.
    pub fn file_path(&self, file: &FileRef) -> Result<String, ModelError> {
        if self.cover.as_ref().is_some_and(|cover| cover.is_same_file(file)) {
            let name = disambiguate(&file.encoded_name(), &file.encoded_extension(), 1, 0, true);
            return Ok(format!("./{}", encode_link(&name)));
        }
        let key = file.encoded_name();
        let bucket = self
            .buckets
            .iter()
            .find(|bucket| bucket.key == key)
            .ok_or_else(|| ModelError::FileBucketMissing {
                name: file.name.clone(),
            })?;
        let index = bucket
            .files
            .iter()
            .position(|candidate| candidate.is_same_file(file))
            .ok_or_else(|| ModelError::FileNotInBucket {
                name: file.name.clone(),
            })?;
        let name = disambiguate(
            &key,
            &file.encoded_extension(),
            bucket.files.len(),
            index,
            true,
        );
        Ok(format!("./{}", encode_link(&name)))
    }

    /// Link tag chosen by the file's media kind: audio and video players,
    /// inline images, or a plain download card for everything else.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the handle does not belong to this post.
    pub fn link_tag(&self, file: &FileRef) -> Result<String, ModelError> {
        let encoded = format!("{}{}", file.encoded_name(), file.encoded_extension());
        match media_kind(&encoded) {
            MediaKind::Audio => self.audio_link_tag(file),
            MediaKind::Image => self.image_link_tag(file),
            MediaKind::Video => self.video_link_tag(file),
            MediaKind::Other => self.file_link_tag(file),
        }
    }

    /// Audio card with an inline player.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the handle does not belong to this post.
    pub fn audio_link_tag(&self, file: &FileRef) -> Result<String, ModelError> {
        let path = self.file_path(file)?;
        let download = format!("{}{}", file.encoded_name(), file.encoded_extension());
        Ok(format!(
            "<a class=\"hl\" href=\"{path}\" download=\"{download}\"><div class=\"post card\">\n\
             <div class=\"card-header\">{header}</div>\n\
             <audio class=\"card-img-top\" src=\"{path}\" controls/>\n</div></a>",
            header = file.original_name(),
        ))
    }

    /// Image card showing the file inline.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the handle does not belong to this post.
    pub fn image_link_tag(&self, file: &FileRef) -> Result<String, ModelError> {
        let path = self.file_path(file)?;
        let download = format!("{}{}", file.encoded_name(), file.encoded_extension());
        Ok(format!(
            "<a class=\"hl\" href=\"{path}\" download=\"{download}\"><div class=\"post card\">\n\
             <img class=\"card-img-top\" src=\"{path}\" alt=\"{alt}\"/>\n</div></a>",
            alt = file.original_name(),
        ))
    }

    /// Video card with an inline player.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the handle does not belong to this post.
    pub fn video_link_tag(&self, file: &FileRef) -> Result<String, ModelError> {
        let path = self.file_path(file)?;
        let download = format!("{}{}", file.encoded_name(), file.encoded_extension());
        Ok(format!(
            "<a class=\"hl\" href=\"{path}\" download=\"{download}\"><div class=\"post card\">\n\
             <video class=\"card-img-top\" src=\"{path}\" controls/>\n</div></a>",
        ))
    }

    /// Plain download card for files without an inline representation.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the handle does not belong to this post.
    pub fn file_link_tag(&self, file: &FileRef) -> Result<String, ModelError> {
        let path = self.file_path(file)?;
        let download = format!("{}{}", file.encoded_name(), file.encoded_extension());
        let label = format!("{}{}", file.original_name(), file.original_extension());
        Ok(format!(
            "<a class=\"hl\" href=\"{path}\" download=\"{download}\">\
             <div class=\"post card text-center\"><p class=\"pt-2\">\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"16\" height=\"16\" fill=\"currentColor\" class=\"bi bi-download\" viewBox=\"0 0 16 16\">\n\
             <path d=\"M.5 9.9a.5.5 0 0 1 .5.5v2.5a1 1 0 0 0 1 1h12a1 1 0 0 0 1-1v-2.5a.5.5 0 0 1 1 0v2.5a2 2 0 0 1-2 2H2a2 2 0 0 1-2-2v-2.5a.5.5 0 0 1 .5-.5z\"/>\n\
             <path d=\"M7.646 11.854a.5.5 0 0 0 .708 0l3-3a.5.5 0 0 0-.708-.708L8.5 10.293V1.5a.5.5 0 0 0-1 0v8.793L5.354 8.146a.5.5 0 1 0-.708.708l3 3z\"/>\n\
             </svg> {label}</p></div></a>",
        ))
    }

    /// Card linking out to an external URL, used for content that stays
    /// remote (e.g. embedded third-party pages).
    #[must_use]
    pub fn external_link_tag(url: &str, title: &str) -> String {
        format!(
            "<a class=\"hl\" href=\"{url}\"><div class=\"post card text-center\"><p class=\"pt-2\">\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"16\" height=\"16\" fill=\"currentColor\" class=\"bi bi-box-arrow-up-left\" viewBox=\"0 0 16 16\">\n\
             <path fill-rule=\"evenodd\" d=\"M7.364 3.5a.5.5 0 0 1 .5-.5H14.5A1.5 1.5 0 0 1 16 4.5v10a1.5 1.5 0 0 1-1.5 1.5h-10A1.5 1.5 0 0 1 3 14.5V7.864a.5.5 0 1 1 1 0V14.5a.5.5 0 0 0 .5.5h10a.5.5 0 0 0 .5-.5v-10a.5.5 0 0 0-.5-.5H7.864a.5.5 0 0 1-.5-.5z\"/>\n\
             <path fill-rule=\"evenodd\" d=\"M0 .5A.5.5 0 0 1 .5 0h5a.5.5 0 0 1 0 1H1.707l8.147 8.146a.5.5 0 0 1-.708.708L1 1.707V5.5a.5.5 0 0 1-1 0v-5z\"/>\n\
             </svg> {title}</p></div></a>"
        )
    }

    /// Builds the wire form of this post under its resolved directory name.
    pub(super) fn to_wire(&self, encoded_name: String) -> WirePost {
        WirePost {
            original_name: self.name.clone(),
            encoded_name,
            information_text: self.info.clone(),
            html_text: self.html.clone(),
            files: self.wire_files(),
            tags: self.tags.clone(),
            cover: self.cover.as_ref().map(|cover| WireCover {
                url: cover.url.clone(),
                name: disambiguate(&cover.encoded_name(), &cover.encoded_extension(), 1, 0, true),
            }),
        }
    }

    /// Flattens file buckets in bucket-insertion order, resolving names
    /// with ascending suffixes inside each bucket.
    fn wire_files(&self) -> Vec<WireFile> {
        let mut files = Vec::with_capacity(self.file_count());
        for bucket in &self.buckets {
            for (index, file) in bucket.files.iter().enumerate() {
                files.push(WireFile {
                    url: file.url.clone(),
                    original_name: file.name.clone(),
                    encoded_name: disambiguate(
                        &bucket.key,
                        &file.encoded_extension(),
                        bucket.files.len(),
                        index,
                        true,
                    ),
                });
            }
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_file_returns_handle_with_identity() {
        let mut post = Post::new("A");
        let file = post.add_file("x", "png", "https://host/x.png");
        assert_eq!(file.original_name(), "x");
        assert_eq!(file.original_extension(), ".png");
        assert_eq!(file.url(), "https://host/x.png");
    }

    #[test]
    fn empty_extension_stays_empty() {
        let mut post = Post::new("A");
        let file = post.add_file("README", "", "https://host/readme");
        assert_eq!(file.original_extension(), "");
        assert_eq!(post.file_path(&file).unwrap(), "./README");
    }

    #[test]
    fn file_path_singleton_bucket_has_no_suffix() {
        let mut post = Post::new("A");
        let file = post.add_file("x", "png", "https://host/x.png");
        assert_eq!(post.file_path(&file).unwrap(), "./x.png");
    }

    #[test]
    fn file_path_duplicate_bucket_uses_ascending_suffixes() {
        let mut post = Post::new("A");
        let first = post.add_file("x", "png", "https://host/1.png");
        let second = post.add_file("x", "png", "https://host/2.png");
        assert_eq!(post.file_path(&first).unwrap(), "./x_1.png");
        assert_eq!(post.file_path(&second).unwrap(), "./x_2.png");
    }

    #[test]
    fn file_path_cover_is_resolved_as_singleton_even_with_same_named_files() {
        let mut post = Post::new("A");
        let _regular = post.add_file("cover", "png", "https://host/r1.png");
        let _also = post.add_file("cover", "png", "https://host/r2.png");
        let cover = post.set_cover("cover", "png", "https://host/c.png");
        assert_eq!(post.file_path(&cover).unwrap(), "./cover.png");
    }

    #[test]
    fn file_path_percent_encodes_link_reserved_characters() {
        let mut post = Post::new("A");
        let file = post.add_file("a&b", "png", "https://host/ab.png");
        assert_eq!(post.file_path(&file).unwrap(), "./a%26b.png");
    }

    #[test]
    fn file_path_unknown_handle_is_an_invariant_violation() {
        let post = Post::new("A");
        let foreign = FileRef::new("ghost", "png", "https://host/ghost.png");
        assert_eq!(
            post.file_path(&foreign),
            Err(ModelError::FileBucketMissing {
                name: "ghost".to_string()
            })
        );
    }

    #[test]
    fn file_path_same_bucket_different_url_is_not_found() {
        let mut post = Post::new("A");
        let _file = post.add_file("x", "png", "https://host/real.png");
        let foreign = FileRef::new("x", "png", "https://host/other.png");
        assert_eq!(
            post.file_path(&foreign),
            Err(ModelError::FileNotInBucket {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn wire_files_group_buckets_in_first_insertion_order() {
        let mut post = Post::new("A");
        post.add_file("x", "png", "https://host/x1.png");
        post.add_file("y", "png", "https://host/y.png");
        post.add_file("x", "png", "https://host/x2.png");
        let names: Vec<String> = post
            .to_wire("A".to_string())
            .files
            .into_iter()
            .map(|file| file.encoded_name)
            .collect();
        assert_eq!(names, ["x_1.png", "x_2.png", "y.png"]);
    }

    #[test]
    fn wire_cover_name_is_encoded_and_unsuffixed() {
        let mut post = Post::new("A");
        post.set_cover("co:ver", "png", "https://host/c.png");
        let wire = post.to_wire("A".to_string());
        assert_eq!(wire.cover.unwrap().name, "co：ver.png");
    }

    #[test]
    fn link_tag_picks_element_by_media_kind() {
        let mut post = Post::new("A");
        let audio = post.add_file("song", "mp3", "https://host/s.mp3");
        let image = post.add_file("pic", "png", "https://host/p.png");
        let video = post.add_file("clip", "mp4", "https://host/v.mp4");
        let other = post.add_file("doc", "pdf", "https://host/d.pdf");

        assert!(post.link_tag(&audio).unwrap().contains("<audio"));
        assert!(post.link_tag(&image).unwrap().contains("<img"));
        assert!(post.link_tag(&video).unwrap().contains("<video"));
        let card = post.link_tag(&other).unwrap();
        assert!(card.contains("bi-download"));
        assert!(card.contains("doc.pdf"));
    }

    #[test]
    fn image_link_tag_references_resolved_path_twice() {
        let mut post = Post::new("A");
        let first = post.add_file("x", "png", "https://host/1.png");
        post.add_file("x", "png", "https://host/2.png");
        let tag = post.image_link_tag(&first).unwrap();
        assert_eq!(tag.matches("./x_1.png").count(), 2);
    }

    #[test]
    fn external_link_tag_embeds_url_and_title() {
        let tag = Post::external_link_tag("https://elsewhere/", "Somewhere else");
        assert!(tag.contains("href=\"https://elsewhere/\""));
        assert!(tag.contains("Somewhere else"));
    }
}
