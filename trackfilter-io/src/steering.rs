//! Steering files.
//!
//! A steering file is a flat JSON object keyed by parameter name. List
//! parameters accept either an array (of strings or numbers) or a single
//! whitespace-separated string:
//!
//! ```json
//! {
//!   "DetectorType": "Barrel",
//!   "InputRanges": "0.0 0.7 1.4 3.15",
//!   "ClusterSize": [3, 4, 3],
//!   "Layers": ["0"],
//!   "InTrackerHitCollection": "VBTrackerHits",
//!   "InRelationCollection": "VBTrackerHitsRelations"
//! }
//! ```
//!
//! Parameters that are absent keep their defaults. Values are passed on as
//! text; numeric validation happens in [`FilterParameters::validate`].

use crate::Result;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use trackfilter_core::config::FilterParameters;

// Intermediate structs for the steering schema
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "PascalCase", deny_unknown_fields)]
struct JsonSteering {
    detector_type: Option<String>,
    input_ranges: Option<JsonList>,
    cluster_size: Option<JsonList>,
    layers: Option<JsonList>,
    in_tracker_hit_collection: Option<String>,
    in_relation_collection: Option<String>,
    out_tracker_hit_collection: Option<String>,
    out_relation_collection: Option<String>,
    cell_id_encoding: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonList {
    Joined(String),
    Items(Vec<JsonScalar>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonScalar {
    Text(String),
    Number(serde_json::Number),
}

impl JsonList {
    fn into_strings(self) -> Vec<String> {
        match self {
            Self::Joined(text) => text.split_whitespace().map(str::to_string).collect(),
            Self::Items(items) => items
                .into_iter()
                .map(|item| match item {
                    JsonScalar::Text(text) => text,
                    JsonScalar::Number(number) => number.to_string(),
                })
                .collect(),
        }
    }
}

impl JsonSteering {
    fn into_parameters(self) -> FilterParameters {
        let mut params = FilterParameters::default();
        if let Some(value) = self.detector_type {
            params.detector_type = value;
        }
        if let Some(list) = self.input_ranges {
            params.input_ranges = list.into_strings();
        }
        if let Some(list) = self.cluster_size {
            params.cluster_size = list.into_strings();
        }
        if let Some(list) = self.layers {
            params.layers = list.into_strings();
        }
        if let Some(value) = self.in_tracker_hit_collection {
            params.in_tracker_hit_collection = value;
        }
        if let Some(value) = self.in_relation_collection {
            params.in_relation_collection = value;
        }
        if let Some(value) = self.out_tracker_hit_collection {
            params.out_tracker_hit_collection = value;
        }
        if let Some(value) = self.out_relation_collection {
            params.out_relation_collection = value;
        }
        if let Some(value) = self.cell_id_encoding {
            params.cell_id_encoding = value;
        }
        params
    }
}

/// Load steering parameters from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid steering
/// object (unknown keys are rejected).
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<FilterParameters> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let steering: JsonSteering = serde_json::from_reader(reader)?;
    Ok(steering.into_parameters())
}

/// Load steering parameters from a JSON string.
///
/// # Errors
/// Returns an error if the string is not a valid steering object.
pub fn parameters_from_json(json: &str) -> Result<FilterParameters> {
    let steering: JsonSteering = serde_json::from_str(json)?;
    Ok(steering.into_parameters())
}
