//! trackfilter-io: File I/O for trackfilter.
//!
//! Events are stored as JSON documents, one event per document. Steering
//! parameters are read from a flat JSON object keyed by parameter name.
//!

mod error;
mod reader;
mod records;
pub mod steering;
mod writer;

pub use error::{Error, Result};
pub use reader::{EventFileReader, EventReader};
pub use steering::{load_parameters, parameters_from_json};
pub use writer::EventFileWriter;
