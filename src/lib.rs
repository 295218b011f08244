//! # Persyst lay/dat Library for Rust
//!
//! A pure Rust reader for Persyst lay/dat EEG recordings. A recording is a
//! pair of files: a text `.lay` header (INI-like sections describing the
//! acquisition, the patient, the channel map, montages and annotated
//! events) and a raw binary `.dat` file of channel-interleaved integer
//! samples.
//!
//! ## Quick Start
//!
//! ```rust
//! use persyst::{read, Result};
//!
//! fn main() -> Result<()> {
//!     # persyst::doctest_utils::create_test_recording("quickstart")?;
//!     // Parse the header and decode the whole data file
//!     let (header, record) = read("quickstart.lay")?;
//!
//!     println!("Start time: {}", header.start_time);
//!     println!("Sampling rate: {} Hz", header.sampling_rate);
//!     println!("Channels: {}", header.waveform_count);
//!
//!     // `record` is channel x time, in calibrated physical units
//!     assert_eq!(record.nrows(), header.waveform_count);
//!     for (index, label) in header.raw.channel_map.iter().enumerate() {
//!         println!("{}: {} samples", label, record.row(index).len());
//!     }
//!
//!     # persyst::doctest_utils::remove_test_recording("quickstart");
//!     Ok(())
//! }
//! ```
//!
//! ## Reading a bounded time window
//!
//! The whole record is decoded at once; for long recordings, bound the
//! decode with a time offset and length (in time steps):
//!
//! ```rust
//! use persyst::LayReader;
//!
//! # persyst::doctest_utils::create_test_recording("window")?;
//! let reader = LayReader::open("window.lay")?;
//!
//! // Time steps 4..8 of every channel
//! let record = reader.read_record(4, 4)?;
//! assert_eq!(record.nrows(), reader.header().waveform_count);
//! # persyst::doctest_utils::remove_test_recording("window");
//! # Ok::<(), persyst::LayError>(())
//! ```
//!
//! ## Working with annotations
//!
//! Event onsets in the header are seconds from the start of the file. The
//! `[SampleTimes]` section records the recorder's periodic sample-to-time
//! resynchronizations; annotation timestamps are decoded through that
//! table, so they land on the recorder's clock:
//!
//! ```rust
//! use persyst::{clean_annotations, LayReader};
//!
//! # persyst::doctest_utils::create_test_recording("events")?;
//! let mut header = LayReader::open("events.lay")?.into_header();
//!
//! // Strip line-ending artifacts and drop recorder-generated noise
//! // events (XLSpike, Start Recording, ...)
//! for event in clean_annotations(&mut header) {
//!     println!("{}, {}: sample={}, dur={}",
//!         event.text, event.time, event.sample, event.duration);
//! }
//! # persyst::doctest_utils::remove_test_recording("events");
//! # Ok::<(), persyst::LayError>(())
//! ```

pub mod annotations;
pub mod error;
pub mod ini;
pub mod reader;
pub mod resync;
pub mod types;

#[doc(hidden)]
pub mod doctest_utils; // For internal doctest support

// Re-export main types for convenience
pub use annotations::{clean_annotations, IGNORED_EVENTS};
pub use error::{LayError, Result};
pub use ini::Row;
pub use reader::{read, read_bounded, LayReader};
pub use resync::{SampleTime, SampleTimeTable};
pub use types::{Annotation, FieldMap, LayHeader, Montage, RawHeader};

/// Library version
///
/// Returns the current version of the persyst library.
///
/// # Examples
///
/// ```rust
/// let version = persyst::version();
/// assert!(!version.is_empty());
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
