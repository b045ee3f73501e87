//! In-memory post/file tree built incrementally by a producer.
//!
//! The Content Model is append-only: posts and files are added, never
//! removed or rewritten. [`ArchiveBuilder::export`] walks the tree once,
//! resolves every collision-prone name through the disambiguation policy,
//! and produces the flat wire form the assembler consumes. Posts sharing
//! an encoded title form a bucket and receive descending suffixes (newest
//! duplicate gets `_1`); files inside a post use ascending suffixes. That
//! asymmetry is preserved behavior, not an accident to be fixed.

mod error;
mod post;

pub use error::ModelError;
pub use post::{FileRef, Post};

use tracing::debug;

use crate::naming::{disambiguate, encode_name};
use crate::wire::WireArchive;

/// Default root link target when the producer never set a source URL.
const DEFAULT_URL: &str = "#main";

/// Handle to a post added to an [`ArchiveBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostId(usize);

/// One bucket of posts sharing an encoded title.
#[derive(Debug, Clone)]
struct PostBucket {
    key: String,
    members: Vec<usize>,
}

/// Root of the Content Model: the archive under construction.
///
/// Built once by the producer through [`ArchiveBuilder::add_post`] and the
/// mutators on [`Post`], then exported exactly once; after export the
/// builder may be discarded, the wire form is the durable artifact.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    id: String,
    url: String,
    tags: Option<Vec<String>>,
    posts: Vec<Post>,
    buckets: Vec<PostBucket>,
}

impl ArchiveBuilder {
    /// Creates an empty archive for the given creator/archive id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: DEFAULT_URL.to_string(),
            tags: None,
            posts: Vec::new(),
            buckets: Vec::new(),
        }
    }

    /// Sets the link back to the source page shown on the root index.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Overrides the archive tag set. When never called, the export uses
    /// the union of all post tags instead.
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = Some(tags);
    }

    /// Appends a post with the given title and returns its handle.
    ///
    /// Posts whose titles encode to the same string share a bucket and are
    /// disambiguated at export with descending suffixes.
    pub fn add_post(&mut self, name: &str) -> PostId {
        let index = self.posts.len();
        self.posts.push(Post::new(name));
        let key = encode_name(name);
        match self.buckets.iter_mut().find(|bucket| bucket.key == key) {
            Some(bucket) => bucket.members.push(index),
            None => self.buckets.push(PostBucket {
                key,
                members: vec![index],
            }),
        }
        PostId(index)
    }

    /// Borrows a post for reading.
    ///
    /// # Panics
    ///
    /// Panics when `id` was not returned by this builder's
    /// [`ArchiveBuilder::add_post`].
    #[must_use]
    pub fn post(&self, id: PostId) -> &Post {
        &self.posts[id.0]
    }

    /// Borrows a post for mutation.
    ///
    /// # Panics
    ///
    /// Panics when `id` was not returned by this builder's
    /// [`ArchiveBuilder::add_post`].
    pub fn post_mut(&mut self, id: PostId) -> &mut Post {
        &mut self.posts[id.0]
    }

    /// Number of posts in the tree, recomputed from the live tree.
    #[must_use]
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// Number of regular files across all posts, recomputed from the live
    /// tree. Covers not counted.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.posts.iter().map(Post::file_count).sum()
    }

    /// Union of all post tags, first-seen order, duplicates removed.
    fn collect_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for post in &self.posts {
            for tag in post.tags() {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
        tags
    }

    /// Exports the tree to its canonical wire form.
    ///
    /// Posts are walked in insertion order; each post's title is resolved
    /// against its bucket with descending suffixes, and each post resolves
    /// its own files with ascending suffixes.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::PostNotInBucket`] when a post's identity
    /// cannot be located in the title bucket table; unreachable under the
    /// append-only discipline this type enforces.
    pub fn export(&self) -> Result<WireArchive, ModelError> {
        let mut posts = Vec::with_capacity(self.posts.len());
        for (index, post) in self.posts.iter().enumerate() {
            let key = encode_name(post.name());
            let bucket = self
                .buckets
                .iter()
                .find(|bucket| bucket.key == key)
                .ok_or_else(|| ModelError::PostNotInBucket {
                    name: post.name().to_string(),
                })?;
            let position = bucket
                .members
                .iter()
                .position(|&member| member == index)
                .ok_or_else(|| ModelError::PostNotInBucket {
                    name: post.name().to_string(),
                })?;
            let encoded_name = disambiguate(&key, "", bucket.members.len(), position, false);
            posts.push(post.to_wire(encoded_name));
        }

        let archive = WireArchive {
            posts,
            id: self.id.clone(),
            url: self.url.clone(),
            tags: self.tags.clone().unwrap_or_else(|| self.collect_tags()),
            file_count: self.file_count(),
            post_count: self.post_count(),
        };
        debug!(
            id = %archive.id,
            posts = archive.post_count,
            files = archive.file_count,
            "exported archive tree"
        );
        Ok(archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::validate;

    #[test]
    fn export_empty_archive_uses_defaults() {
        let builder = ArchiveBuilder::new("creator");
        let archive = builder.export().unwrap();
        assert_eq!(archive.id, "creator");
        assert_eq!(archive.url, "#main");
        assert_eq!(archive.post_count, 0);
        assert_eq!(archive.file_count, 0);
        assert!(archive.tags.is_empty());
    }

    #[test]
    fn export_counts_are_recomputed_from_the_tree() {
        let mut builder = ArchiveBuilder::new("creator");
        let a = builder.add_post("A");
        builder.post_mut(a).add_file("x", "png", "https://host/x.png");
        builder.post_mut(a).add_file("y", "png", "https://host/y.png");
        let archive = builder.export().unwrap();
        assert_eq!(archive.post_count, 1);
        assert_eq!(archive.file_count, 2);
        let names: Vec<&str> = archive.posts[0]
            .files
            .iter()
            .map(|file| file.encoded_name.as_str())
            .collect();
        // Distinct base names are singleton buckets: no suffixes.
        assert_eq!(names, ["x.png", "y.png"]);
    }

    #[test]
    fn export_cover_is_not_counted_as_a_file() {
        let mut builder = ArchiveBuilder::new("creator");
        let a = builder.add_post("A");
        builder.post_mut(a).set_cover("cover", "png", "https://host/c.png");
        let archive = builder.export().unwrap();
        assert_eq!(archive.file_count, 0);
        assert!(archive.posts[0].cover.is_some());
    }

    #[test]
    fn export_duplicate_titles_get_descending_suffixes() {
        let mut builder = ArchiveBuilder::new("creator");
        builder.add_post("Diary");
        builder.add_post("Diary");
        let archive = builder.export().unwrap();
        assert_eq!(archive.posts[0].encoded_name, "Diary_2");
        assert_eq!(archive.posts[1].encoded_name, "Diary_1");
    }

    #[test]
    fn export_unique_title_keeps_bare_encoded_name() {
        let mut builder = ArchiveBuilder::new("creator");
        builder.add_post("My:Day");
        let archive = builder.export().unwrap();
        assert_eq!(archive.posts[0].encoded_name, "My：Day");
        assert_eq!(archive.posts[0].original_name, "My:Day");
    }

    #[test]
    fn export_preserves_post_insertion_order() {
        let mut builder = ArchiveBuilder::new("creator");
        builder.add_post("B");
        builder.add_post("A");
        builder.add_post("B");
        let archive = builder.export().unwrap();
        let titles: Vec<&str> = archive
            .posts
            .iter()
            .map(|post| post.original_name.as_str())
            .collect();
        assert_eq!(titles, ["B", "A", "B"]);
        assert_eq!(archive.posts[0].encoded_name, "B_2");
        assert_eq!(archive.posts[1].encoded_name, "A");
        assert_eq!(archive.posts[2].encoded_name, "B_1");
    }

    #[test]
    fn export_tags_default_to_union_of_post_tags() {
        let mut builder = ArchiveBuilder::new("creator");
        let a = builder.add_post("A");
        builder.post_mut(a).set_tags(vec!["art".into(), "daily".into()]);
        let b = builder.add_post("B");
        builder.post_mut(b).set_tags(vec!["daily".into(), "wip".into()]);
        let archive = builder.export().unwrap();
        assert_eq!(archive.tags, ["art", "daily", "wip"]);
    }

    #[test]
    fn export_explicit_tags_override_the_union() {
        let mut builder = ArchiveBuilder::new("creator");
        let a = builder.add_post("A");
        builder.post_mut(a).set_tags(vec!["art".into()]);
        builder.set_tags(vec!["only-this".into()]);
        let archive = builder.export().unwrap();
        assert_eq!(archive.tags, ["only-this"]);
    }

    #[test]
    fn export_then_validate_round_trips_for_any_built_tree() {
        let mut builder = ArchiveBuilder::new("creator");
        builder.set_url("https://host/@creator");
        let a = builder.add_post("Dia:ry");
        builder.post_mut(a).set_info("{\"id\": 1}");
        builder.post_mut(a).set_html("<p>hello</p>");
        builder.post_mut(a).set_tags(vec!["daily".into()]);
        builder.post_mut(a).add_file("x", "png", "https://host/x.png");
        builder.post_mut(a).set_cover("cover", "png", "https://host/c.png");
        builder.add_post("Dia:ry");

        let archive = builder.export().unwrap();
        let value = serde_json::to_value(&archive).unwrap();
        assert!(validate(&value).is_ok());

        let reparsed = WireArchive::from_json(&archive.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, archive);
    }
}
