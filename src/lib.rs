//! Archiver Core Library
//!
//! This library turns a description of a remote creator's posts (titles,
//! HTML bodies, file and cover URLs) into a single portable offline
//! archive: a ZIP file containing per-post HTML pages, a navigable root
//! index, and all referenced media, with collision-free file names.
//!
//! # Architecture
//!
//! - [`naming`] - filesystem/URI-safe name encoding and disambiguation
//! - [`model`] - append-only in-memory post/file tree built by a producer
//! - [`wire`] - flat JSON transport form and structural validation
//! - [`fetch`] - bounded-retry HTTP fetch layer where absence, not error,
//!   signals failure
//! - [`assemble`] - single-pass driver emitting archive entries with
//!   progress/ETA reporting
//! - [`render`] - static HTML page generation sharing the resolved names

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assemble;
pub mod fetch;
pub mod model;
pub mod naming;
pub mod render;
pub mod wire;

// Re-export commonly used types
pub use assemble::{
    ArchiveSink, AssembleError, Assembler, DEFAULT_THROTTLE, Reporter, RunStats, TracingReporter,
    ZipSink,
};
pub use fetch::{DEFAULT_RETRY_BUDGET, DEFAULT_RETRY_DELAY, FetchClient};
pub use model::{ArchiveBuilder, FileRef, ModelError, Post, PostId};
pub use naming::{MediaKind, disambiguate, encode_link, encode_name};
pub use wire::{ValidationError, WireArchive, WireCover, WireFile, WirePost};
