//! Archive assembly: the single-pass driver over a validated wire object.
//!
//! One logical worker performs the entire run. For each post, in wire
//! order, the assembler emits the info file and the rendered page, fetches
//! the cover and the regular files with a small retry budget, and writes
//! every successful fetch straight into the sink. At most one file's bytes
//! are held in memory at a time, entries appear in a deterministic order
//! derived solely from the wire object, and a file that cannot be fetched
//! is skipped and logged rather than aborting the run.

mod error;
mod progress;
mod sink;

pub use error::AssembleError;
pub use progress::{Reporter, TracingReporter, format_eta};
pub use sink::{ArchiveSink, ZipSink};

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};

use crate::fetch::{DEFAULT_RETRY_BUDGET, FetchClient};
use crate::naming::encode_name;
use crate::render;
use crate::wire::WireArchive;

/// Fixed throttle applied after every file attempt (100 ms).
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(100);

/// Outcome counters for one assembly run.
///
/// Owned by a single run and threaded through the driver; nothing here is
/// global or shared between runs.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Total regular files announced by the wire object.
    pub total_files: usize,
    /// File attempts finished, successful or not.
    pub completed: usize,
    /// Regular files actually written into the archive.
    pub emitted: usize,
    /// Entry names that were skipped after exhausting their retry budget,
    /// covers included.
    pub skipped: Vec<String>,
}

impl RunStats {
    fn new(total_files: usize) -> Self {
        Self {
            total_files,
            completed: 0,
            emitted: 0,
            skipped: Vec::new(),
        }
    }
}

/// Single-pass archive assembler.
#[derive(Debug, Clone)]
pub struct Assembler {
    fetcher: FetchClient,
    retry_budget: u32,
    throttle: Duration,
}

impl Assembler {
    /// Creates an assembler with the default retry budget and throttle.
    #[must_use]
    pub fn new(fetcher: FetchClient) -> Self {
        Self {
            fetcher,
            retry_budget: DEFAULT_RETRY_BUDGET,
            throttle: DEFAULT_THROTTLE,
        }
    }

    /// Overrides the per-file retry budget (extra attempts after the first).
    #[must_use]
    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    /// Overrides the inter-file throttle. Tests set this to zero.
    #[must_use]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Validates a JSON wire document and assembles it into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`AssembleError::Validation`] before any I/O when the
    /// document fails the structural check, or [`AssembleError::Sink`]
    /// when the destination fails mid-run.
    pub async fn run_json<S, R>(
        &self,
        input: &str,
        sink: &mut S,
        reporter: &mut R,
    ) -> Result<RunStats, AssembleError>
    where
        S: ArchiveSink,
        R: Reporter,
    {
        let archive = WireArchive::from_json(input)?;
        self.run(&archive, sink, reporter).await
    }

    /// Assembles a validated wire object into `sink`.
    ///
    /// Entry order is deterministic: root index first, then per post the
    /// info file, the post page, the cover (when fetched), and the regular
    /// files in wire order. The run survives any number of fetch failures;
    /// each skipped entry is logged exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`AssembleError::Sink`] when the destination fails; fetch
    /// failures are absorbed as skips.
    pub async fn run<S, R>(
        &self,
        archive: &WireArchive,
        sink: &mut S,
        reporter: &mut R,
    ) -> Result<RunStats, AssembleError>
    where
        S: ArchiveSink,
        R: Reporter,
    {
        let encoded_id = encode_name(&archive.id);
        let started = Instant::now();
        let mut stats = RunStats::new(archive.file_count);

        reporter.log(&format!(
            "@{} Post Count:{} File Count:{}",
            archive.id, archive.post_count, archive.file_count
        ));

        sink.write_entry(
            &format!("{encoded_id}/index.html"),
            render::root_page(archive).as_bytes(),
        )?;

        for (post_index, post) in archive.posts.iter().enumerate() {
            reporter.log(&format!(
                "{} ({}/{})",
                post.original_name,
                post_index + 1,
                archive.post_count
            ));

            let info = information_file(&post.information_text);
            sink.write_entry(
                &format!("{encoded_id}/{}/{}", post.encoded_name, info.name),
                &info.content,
            )?;
            sink.write_entry(
                &format!("{encoded_id}/{}/index.html", post.encoded_name),
                render::post_page(post).as_bytes(),
            )?;

            if let Some(cover) = &post.cover {
                reporter.log(&format!("download {}", cover.name));
                match self
                    .fetcher
                    .fetch(&cover.url, &cover.name, self.retry_budget)
                    .await
                {
                    Some(bytes) => sink.write_entry(
                        &format!("{encoded_id}/{}/{}", post.encoded_name, cover.name),
                        &bytes,
                    )?,
                    None => {
                        warn!(cover = %cover.name, url = %cover.url, "cover skipped, post renders with placeholder");
                        reporter.log(&format!("{} Failed to download", cover.name));
                        stats.skipped.push(cover.name.clone());
                    }
                }
            }

            for (file_index, file) in post.files.iter().enumerate() {
                reporter.log(&format!(
                    "download {} ({}/{})",
                    file.encoded_name,
                    file_index + 1,
                    post.files.len()
                ));
                match self
                    .fetcher
                    .fetch(&file.url, &file.encoded_name, self.retry_budget)
                    .await
                {
                    Some(bytes) => {
                        sink.write_entry(
                            &format!("{encoded_id}/{}/{}", post.encoded_name, file.encoded_name),
                            &bytes,
                        )?;
                        stats.emitted += 1;
                    }
                    None => {
                        reporter.log(&format!("{} Failed to download", file.encoded_name));
                        stats.skipped.push(file.encoded_name.clone());
                    }
                }
                stats.completed += 1;
                report_progress(&stats, started.elapsed(), reporter);
                tokio::time::sleep(self.throttle).await;
            }
        }

        sink.finish()?;
        let summary = format!(
            "done: {} of {} files archived, {} skipped",
            stats.emitted,
            stats.total_files,
            stats.skipped.len()
        );
        reporter.log(&summary);
        info!(
            emitted = stats.emitted,
            total = stats.total_files,
            skipped = stats.skipped.len(),
            "archive complete"
        );
        Ok(stats)
    }
}

/// Pushes progress and ETA after one file attempt.
///
/// Both are recomputed from scratch; the estimate is volatile early and
/// stabilizes as `completed` grows. Division by zero is guarded: nothing
/// is pushed before the first completed attempt.
#[allow(clippy::cast_possible_truncation)]
fn report_progress<R: Reporter>(stats: &RunStats, elapsed: Duration, reporter: &mut R) {
    if stats.completed == 0 || stats.total_files == 0 {
        return;
    }
    let completed = stats.completed as u64;
    let total = stats.total_files as u64;
    let remaining_files = total.saturating_sub(completed);
    let remaining_secs = elapsed.as_secs() * remaining_files / completed;
    reporter.eta(&format_eta(remaining_secs));
    let percent = (completed * 100 / total).min(100);
    reporter.progress(percent as u8);
}

/// The per-post info entry: `info.json` when the text parses as JSON
/// (re-emitted pretty-printed with tab indentation), `info.txt` verbatim
/// otherwise.
struct InformationFile {
    name: &'static str,
    content: Vec<u8>,
}

fn information_file(text: &str) -> InformationFile {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        let mut pretty = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut pretty, formatter);
        if value.serialize(&mut serializer).is_ok() {
            return InformationFile {
                name: "info.json",
                content: pretty,
            };
        }
    }
    InformationFile {
        name: "info.txt",
        content: text.as_bytes().to_vec(),
    }
}
