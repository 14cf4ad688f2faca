//! Streaming event readers.
//!

use crate::records::EventRecord;
use crate::Result;
use log::debug;
use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use trackfilter_core::event::Event;

/// Reads a whitespace-separated sequence of JSON events.
///
/// Events are decoded lazily, one per iteration, so a file never has to be
/// held in memory as a whole.
pub struct EventReader<R: Read> {
    stream: StreamDeserializer<'static, IoRead<R>, EventRecord>,
}

impl<R: Read> EventReader<R> {
    /// Wraps a reader.
    pub fn new(reader: R) -> Self {
        Self {
            stream: Deserializer::from_reader(reader).into_iter(),
        }
    }

    /// Reads all remaining events.
    ///
    /// # Errors
    /// Returns the first read or decode error.
    pub fn read_all(self) -> Result<Vec<Event>> {
        self.collect()
    }
}

impl<R: Read> Iterator for EventReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.stream.next()?;
        Some(record.map_err(Into::into).and_then(EventRecord::into_event))
    }
}

/// Event reader over a file on disk.
pub struct EventFileReader {
    inner: EventReader<BufReader<File>>,
    path: PathBuf,
}

impl EventFileReader {
    /// Opens an event file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        debug!("Opened event file {}", path.as_ref().display());
        Ok(Self {
            inner: EventReader::new(BufReader::new(file)),
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Path of the file being read.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all remaining events.
    ///
    /// # Errors
    /// Returns the first read or decode error.
    pub fn read_all(self) -> Result<Vec<Event>> {
        self.inner.read_all()
    }
}

impl Iterator for EventFileReader {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use trackfilter_core::EventError;

    #[test]
    fn test_read_sequence() {
        let data = r#"{"run": 1, "event": 1, "collections": {}}
{"run": 1, "event": 2, "collections": {"Rels": {"type": "LCRelation", "elements": []}}}
  {"run": 1, "event": 3}"#;
        let events = EventReader::new(data.as_bytes()).read_all().unwrap();
        let numbers: Vec<u32> = events.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(events[1].collection("Rels").is_ok());
    }

    #[test]
    fn test_truncated_input() {
        let data = r#"{"run": 1, "event": 1} {"run": 1, "ev"#;
        let mut reader = EventReader::new(data.as_bytes());
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(reader.next(), Some(Err(Error::Json(_)))));
    }

    #[test]
    fn test_repeated_collection_name() {
        let data = r#"{"run": 1, "event": 1, "collections": {
            "Rels": {"type": "LCRelation", "elements": [{"from": 1, "to": 2, "weight": 1.0}]},
            "Rels": {"type": "LCRelation", "elements": []}
        }}"#;
        let err = EventReader::new(data.as_bytes()).next().unwrap().unwrap_err();
        assert!(
            matches!(
                &err,
                Error::CoreError(trackfilter_core::Error::Event(
                    EventError::DuplicateCollection(name)
                )) if name == "Rels"
            ),
            "{err}"
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(EventReader::new(&b""[..]).next().is_none());
    }
}
