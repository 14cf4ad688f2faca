//! File writers for filtered events.

use crate::records::EventRecord;
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use trackfilter_core::event::Event;

/// Writer for event files.
///
/// Writes one JSON document per line. Subset collections are marked with
/// `"subset": true`; their elements are written in full.
pub struct EventFileWriter {
    writer: BufWriter<File>,
    events_written: usize,
}

impl EventFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self {
            writer,
            events_written: 0,
        })
    }

    /// Writes one event.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn write_event(&mut self, event: &Event) -> Result<()> {
        let record = EventRecord::from_event(event)?;
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.events_written += 1;
        Ok(())
    }

    /// Number of events written so far.
    #[must_use]
    pub fn events_written(&self) -> usize {
        self.events_written
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
