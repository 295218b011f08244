use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{LayError, Result};
use crate::resync::SampleTimeTable;

/// String-valued header fields keyed by lowercased field name.
///
/// Lay headers carry loosely specified key sets, so fields stay untyped
/// until a consumer needs one. `require`/`require_parsed` are the typed
/// accessors for keys a consumer cannot do without.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: HashMap<String, String>,
}

impl FieldMap {
    pub(crate) fn insert(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns the value for `key`, failing with the key's name if absent.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| LayError::MissingField(key.to_string()))
    }

    /// Returns the value for `key` parsed as `T`.
    pub fn require_parsed<T: FromStr>(&self, key: &str) -> Result<T> {
        let value = self.require(key)?;
        value.trim().parse().map_err(|_| LayError::InvalidField {
            field: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Montage definitions, grouped by montage name.
///
/// Group order and member order both follow the header file; montage
/// members compose traces, so their ordering is significant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Montage {
    groups: Vec<(String, Vec<(String, String)>)>,
}

impl Montage {
    pub(crate) fn push(&mut self, name: String, members: Vec<(String, String)>) {
        self.groups.push((name, members));
    }

    pub fn get(&self, name: &str) -> Option<&[(String, String)]> {
        self.groups
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, members)| members.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[(String, String)])> {
        self.groups.iter().map(|(n, m)| (n.as_str(), m.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// One annotated event, decoded from the `[Comments]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Absolute timestamp, formatted `%d-%b-%Y %H:%M:%S`.
    pub time: String,
    /// Absolute sample index of the event onset.
    pub sample: i64,
    /// Event duration in seconds.
    pub duration: f64,
    /// Free text, as written in the file. For CRLF headers this keeps the
    /// trailing carriage return; see [`clean_annotations`].
    ///
    /// [`clean_annotations`]: crate::annotations::clean_annotations
    pub text: String,
}

/// The untyped header sections, retained alongside the typed fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawHeader {
    pub file_info: FieldMap,
    pub patient: FieldMap,
    pub sample_times: SampleTimeTable,
    /// Channel labels in acquisition order; position defines channel index.
    pub channel_map: Vec<String>,
    /// Raw comment lines, trimmed, in file order.
    pub comments: Vec<String>,
    pub montage: Montage,
}

/// Parsed metadata for one lay/dat recording.
#[derive(Debug, Clone, PartialEq)]
pub struct LayHeader {
    /// Sampling rate in Hz.
    pub sampling_rate: u32,
    /// Number of channels in the data file.
    pub waveform_count: usize,
    /// Recording start, formatted `%d-%b-%Y %H:%M:%S`.
    pub start_time: String,
    /// Resolved path of the binary data file.
    pub data_file: PathBuf,
    /// Decoded events, in file order.
    pub annotations: Vec<Annotation>,
    pub raw: RawHeader,
}
