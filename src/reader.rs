use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ndarray::Array2;

use crate::error::{LayError, Result};
use crate::ini::{self, Row};
use crate::resync::{SampleTime, SampleTimeTable};
use crate::types::{Annotation, FieldMap, LayHeader, Montage, RawHeader};

/// Timestamp display format shared by `start_time` and annotation times.
const TIMESTAMP_FORMAT: &str = "%d-%b-%Y %H:%M:%S";

/// Reader for Persyst lay/dat EEG recordings
///
/// A recording is a pair of files: a text `.lay` header carrying
/// acquisition metadata, channel layout and event annotations, and a
/// binary `.dat` file of interleaved integer samples. `LayReader::open`
/// parses the header in full; [`read_record`](LayReader::read_record)
/// decodes a time window of the sample data.
///
/// # Examples
///
/// ```rust
/// use persyst::LayReader;
///
/// # persyst::doctest_utils::create_test_recording("recording")?;
/// let reader = LayReader::open("recording.lay")?;
///
/// let header = reader.header();
/// println!("Start: {}", header.start_time);
/// println!("Channels: {}", header.waveform_count);
/// println!("Annotations: {}", header.annotations.len());
///
/// // Decode the whole data file into a channel x time matrix
/// let record = reader.read_record(0, -1)?;
/// assert_eq!(record.nrows(), header.waveform_count);
///
/// # persyst::doctest_utils::remove_test_recording("recording");
/// # Ok::<(), persyst::LayError>(())
/// ```
pub struct LayReader {
    header: LayHeader,
}

impl LayReader {
    /// Opens a lay header, assuming the data file shares the header's
    /// directory and stem with a `.dat` extension.
    ///
    /// # Errors
    ///
    /// * `LayError::FileNotFound` - header file doesn't exist or can't be opened
    /// * `LayError::MissingField` - a required field (`samplingrate`,
    ///   `waveformcount`, `testdate`, `testtime`) is absent
    /// * `LayError::InvalidField` / `LayError::InvalidTimestamp` - a required
    ///   field is present but unparseable
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persyst::{LayReader, LayError};
    ///
    /// # persyst::doctest_utils::create_test_recording("session")?;
    /// let reader = LayReader::open("session.lay")?;
    /// assert!(reader.header().data_file.ends_with("session.dat"));
    ///
    /// match LayReader::open("nonexistent.lay") {
    ///     Err(LayError::FileNotFound(msg)) => println!("missing: {}", msg),
    ///     other => panic!("expected FileNotFound, got {:?}", other.map(|_| ())),
    /// }
    /// # persyst::doctest_utils::remove_test_recording("session");
    /// # Ok::<(), persyst::LayError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(lay_path: P) -> Result<Self> {
        let dat_path = default_dat_path(lay_path.as_ref());
        Self::open_with_data(lay_path, dat_path)
    }

    /// Opens a lay header with an explicitly located data file.
    ///
    /// The data file is not touched here; it is only opened by
    /// [`read_record`](LayReader::read_record).
    pub fn open_with_data<P: AsRef<Path>, Q: AsRef<Path>>(lay_path: P, dat_path: Q) -> Result<Self> {
        let lay_path = lay_path.as_ref();
        let dat_path = dat_path.as_ref();

        let mut rows = ini::parse_lay_file(lay_path)?;

        // Point every file reference at the resolved data file before any
        // grouping happens, so the raw header agrees with what gets read.
        for row in &mut rows {
            if row.key == "file" {
                row.value = dat_path.to_string_lossy().into_owned();
            }
        }

        let mut raw = build_raw_header(&rows)?;

        let sampling_rate: u32 = raw.file_info.require_parsed("samplingrate")?;
        let waveform_count: usize = raw.file_info.require_parsed("waveformcount")?;
        let test_date = parse_test_date(&raw.patient)?;
        let start_time = build_start_time(&raw.patient, test_date)?;

        let (annotations, comments) = decode_annotations(
            lay_path,
            f64::from(sampling_rate),
            test_date,
            &raw.sample_times,
        )?;
        raw.comments = comments;

        Ok(LayReader {
            header: LayHeader {
                sampling_rate,
                waveform_count,
                start_time,
                data_file: dat_path.to_path_buf(),
                annotations,
                raw,
            },
        })
    }

    /// Gets the parsed header.
    pub fn header(&self) -> &LayHeader {
        &self.header
    }

    /// Consumes the reader, returning the parsed header.
    pub fn into_header(self) -> LayHeader {
        self.header
    }

    /// Decodes a window of the binary data file into a channel-major
    /// `channels x time` matrix of calibrated values.
    ///
    /// `time_offset` time steps are skipped, then `time_length` time steps
    /// are read; `time_length = -1` reads to end of file. Samples are
    /// little-endian signed integers, 4 bytes wide when the header's
    /// `datatype` is `7` and 2 bytes otherwise, interleaved across channels
    /// per time step. Each raw value is scaled by the header's
    /// `calibration` factor; results are stored as `f32`, which carries the
    /// scaled precision comfortably.
    ///
    /// A data file shorter than requested is not an error: the matrix just
    /// has fewer time columns (trailing partial time steps are dropped).
    /// Multi-gigabyte recordings are decoded in one blocking read and can
    /// take minutes.
    ///
    /// # Errors
    ///
    /// * `LayError::FileNotFound` - data file doesn't exist or can't be opened
    /// * `LayError::MissingField` / `LayError::InvalidField` - `calibration`
    ///   or `datatype` absent or unparseable
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persyst::LayReader;
    ///
    /// # persyst::doctest_utils::create_test_recording("windowed")?;
    /// let reader = LayReader::open("windowed.lay")?;
    ///
    /// // Skip the first 2 time steps, read the next 4
    /// let record = reader.read_record(2, 4)?;
    /// assert_eq!(record.nrows(), reader.header().waveform_count);
    /// assert!(record.ncols() <= 4);
    ///
    /// // Reading past end of file yields an empty window, not an error
    /// let empty = reader.read_record(1_000_000, -1)?;
    /// assert_eq!(empty.ncols(), 0);
    /// # persyst::doctest_utils::remove_test_recording("windowed");
    /// # Ok::<(), persyst::LayError>(())
    /// ```
    pub fn read_record(&self, time_offset: u64, time_length: i64) -> Result<Array2<f32>> {
        let channels = self.header.waveform_count;
        let calibration: f64 = self.header.raw.file_info.require_parsed("calibration")?;
        let datatype: i64 = self.header.raw.file_info.require_parsed("datatype")?;
        let width: usize = if datatype == 7 { 4 } else { 2 };

        let mut file = File::open(&self.header.data_file).map_err(|e| {
            LayError::FileNotFound(format!("{}: {}", self.header.data_file.display(), e))
        })?;

        if channels == 0 {
            return Ok(Array2::zeros((0, 0)));
        }

        file.seek(SeekFrom::Current(
            (channels * width) as i64 * time_offset as i64,
        ))?;

        let mut bytes = Vec::new();
        if time_length < 0 {
            file.read_to_end(&mut bytes)?;
        } else {
            let limit = time_length as u64 * (channels * width) as u64;
            file.take(limit).read_to_end(&mut bytes)?;
        }

        // Only whole time steps survive; a truncated trailing column is
        // dropped, matching the short-read contract.
        let columns = bytes.len() / width / channels;
        let mut record = Array2::<f32>::zeros((channels, columns));
        let chunks = bytes.chunks_exact(width).take(channels * columns);
        for (k, chunk) in chunks.enumerate() {
            let raw = match width {
                4 => f64::from(LittleEndian::read_i32(chunk)),
                _ => f64::from(LittleEndian::read_i16(chunk)),
            };
            // Consecutive elements run down a column: one time step's worth
            // of channels, then the next time step.
            record[(k % channels, k / channels)] = (raw * calibration) as f32;
        }

        Ok(record)
    }
}

/// Parses a lay/dat recording in one shot, decoding the whole data file.
///
/// Equivalent to [`LayReader::open`] followed by a full
/// [`read_record`](LayReader::read_record).
///
/// # Examples
///
/// ```rust
/// use persyst::read;
///
/// # persyst::doctest_utils::create_test_recording("oneshot")?;
/// let (header, record) = read("oneshot.lay")?;
/// assert_eq!(record.nrows(), header.waveform_count);
/// # persyst::doctest_utils::remove_test_recording("oneshot");
/// # Ok::<(), persyst::LayError>(())
/// ```
pub fn read<P: AsRef<Path>>(lay_path: P) -> Result<(LayHeader, Array2<f32>)> {
    read_bounded(lay_path, None::<&Path>, 0, -1)
}

/// Parses a lay/dat recording, decoding a bounded time window.
///
/// `dat_path` defaults to the lay file's directory and stem with a `.dat`
/// extension; `time_length = -1` reads to end of file.
pub fn read_bounded<P: AsRef<Path>, Q: AsRef<Path>>(
    lay_path: P,
    dat_path: Option<Q>,
    time_offset: u64,
    time_length: i64,
) -> Result<(LayHeader, Array2<f32>)> {
    let reader = match dat_path {
        Some(dat_path) => LayReader::open_with_data(lay_path, dat_path)?,
        None => LayReader::open(lay_path)?,
    };
    let record = reader.read_record(time_offset, time_length)?;
    Ok((reader.into_header(), record))
}

fn default_dat_path(lay_path: &Path) -> PathBuf {
    lay_path.with_extension("dat")
}

/// Groups parsed rows into the raw header sections.
fn build_raw_header(rows: &[Row]) -> Result<RawHeader> {
    let mut file_info = FieldMap::default();
    let mut patient = FieldMap::default();
    let mut channel_map = Vec::new();
    let mut sample_times = SampleTimeTable::default();

    for row in rows {
        match row.section.as_str() {
            "fileinfo" => file_info.insert(&row.key, &row.value),
            "patient" => patient.insert(&row.key, &row.value),
            "channelmap" => channel_map.push(row.key.clone()),
            "sampletimes" => sample_times.push(SampleTime {
                sample: parse_field(&row.key, "sampletimes sample")?,
                time: parse_field(&row.value, "sampletimes time")?,
            }),
            _ => {}
        }
    }

    Ok(RawHeader {
        file_info,
        patient,
        sample_times,
        channel_map,
        comments: Vec::new(),
        montage: build_montage(rows),
    })
}

/// Reconstructs montage groups: each `[montage]` row declares a group
/// whose members live under a section named after the row's key.
///
/// Two passes, so membership checks are a map lookup instead of a rescan
/// per group.
fn build_montage(rows: &[Row]) -> Montage {
    let group_names: Vec<&str> = rows
        .iter()
        .filter(|row| row.section == "montage")
        .map(|row| row.key.as_str())
        .collect();

    let index: HashMap<&str, usize> = group_names
        .iter()
        .enumerate()
        .map(|(i, &name)| (name, i))
        .collect();

    let mut members: Vec<Vec<(String, String)>> = vec![Vec::new(); group_names.len()];
    for row in rows {
        if let Some(&i) = index.get(row.section.as_str()) {
            members[i].push((row.key.clone(), row.value.clone()));
        }
    }

    let mut montage = Montage::default();
    for (name, group) in group_names.into_iter().zip(members) {
        montage.push(name.to_string(), group);
    }
    montage
}

fn parse_field<T: std::str::FromStr>(value: &str, field: &str) -> Result<T> {
    value.trim().parse().map_err(|_| LayError::InvalidField {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Parses the patient's `testdate` (`MM.DD.YY` or `MM/DD/YY`).
fn parse_test_date(patient: &FieldMap) -> Result<NaiveDate> {
    let date = patient.require("testdate")?.replace('.', "/");
    NaiveDate::parse_from_str(&date, "%m/%d/%y")
        .map_err(|e| LayError::InvalidTimestamp(format!("testdate '{}': {}", date, e)))
}

/// Builds the canonical start-of-recording timestamp from the patient's
/// `testdate` and `testtime` fields.
fn build_start_time(patient: &FieldMap, test_date: NaiveDate) -> Result<String> {
    let time = patient.require("testtime")?.replace('.', ":");
    let time = NaiveTime::parse_from_str(&time, "%H:%M:%S")
        .map_err(|e| LayError::InvalidTimestamp(format!("testtime '{}': {}", time, e)))?;
    Ok(NaiveDateTime::new(test_date, time)
        .format(TIMESTAMP_FORMAT)
        .to_string())
}

/// Decodes the `[Comments]` section into annotations, and collects the raw
/// comment lines for the raw header.
///
/// The section starts after a line whose first 9 bytes are `[Comments`
/// (prefix comparison tolerates line-ending variance). Each comment line
/// has at least 5 comma-separated fields; extra commas belong to the free
/// text and are rejoined. The first shorter line ends the section.
fn decode_annotations(
    lay_path: &Path,
    sampling_rate: f64,
    test_date: NaiveDate,
    sample_times: &SampleTimeTable,
) -> Result<(Vec<Annotation>, Vec<String>)> {
    let file = File::open(lay_path)
        .map_err(|e| LayError::FileNotFound(format!("{}: {}", lay_path.display(), e)))?;
    let mut reader = BufReader::new(file);

    let mut annotations = Vec::new();
    let mut comments = Vec::new();
    let mut in_comments = false;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        if !in_comments {
            in_comments = line.starts_with("[Comments");
            continue;
        }

        // Strip only the newline; a carriage return stays part of the text
        // field, as written.
        let record = line.strip_suffix('\n').unwrap_or(&line);
        let fields: Vec<&str> = record.split(',').collect();
        if fields.len() < 5 {
            break; // there are no more comments
        }
        let text = fields[4..].join(",");
        comments.push(record.trim().to_string());

        let onset: f64 = parse_field(fields[0], "comment onset")?;
        let duration: f64 = parse_field(fields[1], "comment duration")?;

        let raw_sample = onset * sampling_rate;
        let event_seconds = sample_times.seconds_at(raw_sample, sampling_rate)?;
        let time = NaiveDateTime::new(test_date, time_of_day(event_seconds))
            .format(TIMESTAMP_FORMAT)
            .to_string();

        annotations.push(Annotation {
            time,
            sample: raw_sample.round() as i64,
            duration,
            text,
        });
    }

    Ok((annotations, comments))
}

/// Wraps elapsed seconds onto a 24-hour clock.
fn time_of_day(event_seconds: f64) -> NaiveTime {
    let seconds = (event_seconds as i64).rem_euclid(86_400) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .unwrap_or(NaiveTime::MIN)
}
