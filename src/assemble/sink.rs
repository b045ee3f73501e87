//! Streaming archive sinks.
//!
//! The assembler emits entries one at a time and never seeks backward over
//! entry data, so a sink only needs to accept `(name, bytes)` pairs in
//! order and a final close. [`ZipSink`] is the production implementation.

use std::io::{self, Seek, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Destination for archive entries, written strictly in emission order.
pub trait ArchiveSink {
    /// Appends one named entry with the given bytes.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the underlying destination fails; such
    /// errors are fatal to the run.
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> io::Result<()>;

    /// Finalizes the archive. No entries may be written afterwards.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the destination fails to flush or close.
    fn finish(&mut self) -> io::Result<()>;
}

/// ZIP-file sink over any `Write + Seek` destination.
///
/// Entries are Deflate-compressed. The writer patches entry headers in
/// place, which is why the destination must seek; entry data itself is
/// still written exactly once, in order.
pub struct ZipSink<W: Write + Seek> {
    writer: Option<ZipWriter<W>>,
}

impl<W: Write + Seek> ZipSink<W> {
    /// Wraps a destination in a ZIP writer.
    #[must_use]
    pub fn new(destination: W) -> Self {
        Self {
            writer: Some(ZipWriter::new(destination)),
        }
    }

    fn writer(&mut self) -> io::Result<&mut ZipWriter<W>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::other("archive sink already finished"))
    }
}

impl<W: Write + Seek> ArchiveSink for ZipSink<W> {
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> io::Result<()> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let writer = self.writer()?;
        writer.start_file(path, options).map_err(io::Error::other)?;
        writer.write_all(bytes)
    }

    fn finish(&mut self) -> io::Result<()> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| io::Error::other("archive sink already finished"))?;
        writer.finish().map_err(io::Error::other)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Read;

    #[test]
    fn zip_sink_round_trips_entries_in_order() {
        let mut buffer = Vec::new();
        {
            let mut sink = ZipSink::new(Cursor::new(&mut buffer));
            sink.write_entry("id/index.html", b"<html/>").unwrap();
            sink.write_entry("id/post/info.txt", b"hello").unwrap();
            sink.finish().unwrap();
        }

        let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();
        assert_eq!(archive.len(), 2);

        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["id/index.html", "id/post/info.txt"]);

        let mut content = String::new();
        archive
            .by_name("id/post/info.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn zip_sink_rejects_writes_after_finish() {
        let mut buffer = Vec::new();
        let mut sink = ZipSink::new(Cursor::new(&mut buffer));
        sink.finish().unwrap();
        assert!(sink.write_entry("late.txt", b"no").is_err());
        assert!(sink.finish().is_err());
    }
}
