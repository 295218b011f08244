//! Annotation post-processing for downstream consumers.

use crate::types::{Annotation, LayHeader};

/// Event texts produced by the recorder itself rather than a reviewer.
/// `clean_annotations` drops these.
pub const IGNORED_EVENTS: [&str; 11] = [
    "XLEvent",
    "XLSpike",
    "Video Recording ON",
    "Video Recording OFF",
    "Stop Recording",
    "Start Recording",
    "Recording Analyzer - XLSpike - Intracranial",
    "Recording Analyzer - XLEvent - Intracranial",
    "Recording Analyzer - CSA",
    "Started Analyzer - XLSpike - Intracranial",
    "Started Analyzer - CSA",
];

/// Returns the header's interesting annotations, in order.
///
/// Each annotation's text is first stripped of one trailing character in
/// place (the line-ending artifact lay files leave on the last comment
/// field; headers with Unix line endings lose a real character instead, a
/// known fragility of the format). Annotations whose stripped text is a
/// recorder-generated event from [`IGNORED_EVENTS`] are excluded.
///
/// # Examples
///
/// ```rust
/// use persyst::{clean_annotations, LayReader};
///
/// # persyst::doctest_utils::create_test_recording("annotated")?;
/// let mut header = LayReader::open("annotated.lay")?.into_header();
/// let total = header.annotations.len();
///
/// let interesting = clean_annotations(&mut header);
/// assert!(interesting.len() <= total);
/// assert!(interesting.iter().all(|a| a.text != "XLSpike"));
/// # persyst::doctest_utils::remove_test_recording("annotated");
/// # Ok::<(), persyst::LayError>(())
/// ```
pub fn clean_annotations(header: &mut LayHeader) -> Vec<Annotation> {
    for annotation in &mut header.annotations {
        annotation.text.pop();
    }
    header
        .annotations
        .iter()
        .filter(|annotation| !IGNORED_EVENTS.contains(&annotation.text.as_str()))
        .cloned()
        .collect()
}
