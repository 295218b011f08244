use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{LayError, Result};

/// One `key=value` entry of a lay header, qualified by the `[section]`
/// (and optional `[[subsection]]`) it appeared under.
///
/// Rows are kept as an ordered sequence rather than collapsed into a map:
/// section/key pairs repeat (montage member rows in particular), and the
/// montage grouping relies on file order being preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub section: String,
    pub subsection: String,
    pub key: String,
    pub value: String,
}

/// Scans an entire lay header file into its ordered rows.
///
/// Section, subsection and key names are lowercased; values are kept as
/// written, except that an empty bracket pair (`[]`) is normalized to the
/// empty string. Lines that are neither a heading nor a `key=value` pair
/// (comment records, stray text) are skipped, never fatal.
pub fn parse_lay_file<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let file = File::open(&path)
        .map_err(|e| LayError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;
    parse_rows(BufReader::new(file))
}

fn parse_rows<R: BufRead>(input: R) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    let mut section = String::new();
    let mut subsection = String::new();

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(name) = heading(line, "[[", "]]") {
            subsection = name.trim().to_lowercase();
        } else if let Some(name) = heading(line, "[", "]") {
            section = name.trim().to_lowercase();
            subsection.clear();
        } else if let Some((key, value)) = line.split_once('=') {
            rows.push(Row {
                section: section.clone(),
                subsection: subsection.clone(),
                key: key.trim().to_lowercase(),
                value: normalize_value(value.trim()),
            });
        }
    }

    Ok(rows)
}

fn heading<'a>(line: &'a str, open: &str, close: &str) -> Option<&'a str> {
    line.strip_prefix(open)?.strip_suffix(close)
}

/// An empty bracket pair stands for "no value" in lay headers.
fn normalize_value(value: &str) -> String {
    if value == "[]" {
        String::new()
    } else {
        value.to_string()
    }
}
