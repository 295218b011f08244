use persyst::{clean_annotations, LayError, LayReader, IGNORED_EVENTS};
use std::fs;
use std::path::Path;

fn cleanup_test_files(stem: &str) {
    for ext in ["lay", "dat"] {
        let name = format!("{stem}.{ext}");
        if Path::new(&name).exists() {
            fs::remove_file(&name).ok();
        }
    }
}

// Header preamble shared by the annotation fixtures; comment lines are
// appended by each test. CRLF endings, as Persyst writes them.
fn write_lay_with_comments(stem: &str, sample_times: &[&str], comments: &[&str]) {
    let mut lines = vec![
        "[FileInfo]".to_string(),
        format!("File={stem}.dat"),
        "SamplingRate=256".to_string(),
        "WaveformCount=2".to_string(),
        "Calibration=0.5".to_string(),
        "DataType=0".to_string(),
        "[Patient]".to_string(),
        "TestDate=01.02.20".to_string(),
        "TestTime=00.00.00".to_string(),
        "[SampleTimes]".to_string(),
    ];
    lines.extend(sample_times.iter().map(|s| s.to_string()));
    lines.push("[Comments]".to_string());
    lines.extend(comments.iter().map(|s| s.to_string()));
    fs::write(format!("{stem}.lay"), lines.join("\r\n") + "\r\n").unwrap();
    fs::write(format!("{stem}.dat"), []).unwrap();
}

#[test]
fn test_annotation_decoded_through_resync_table() {
    let stem = "test_resync_decode";
    write_lay_with_comments(
        stem,
        &["0=0.0", "1000=10.0"],
        &["5.0,0.0,0,100,XLSpike"],
    );

    let reader = LayReader::open(format!("{stem}.lay")).unwrap();
    let annotations = &reader.header().annotations;
    assert_eq!(annotations.len(), 1);

    // onset 5.0 s at 256 Hz = raw sample 1280, past the second breakpoint:
    // 280 samples / 256 Hz + 10.0 s = 11.09375 s on the recorder clock
    let annotation = &annotations[0];
    assert_eq!(annotation.sample, 1280);
    assert_eq!(annotation.duration, 0.0);
    assert_eq!(annotation.text, "XLSpike\r");
    assert_eq!(annotation.time, "02-Jan-2020 00:00:11");

    cleanup_test_files(stem);
}

#[test]
fn test_annotation_before_first_resync_uses_breakpoint_zero() {
    let stem = "test_breakpoint_zero";
    write_lay_with_comments(
        stem,
        &["0=100.0", "1000=110.0"],
        &["1.0,0.0,0,100,Early event"],
    );

    let reader = LayReader::open(format!("{stem}.lay")).unwrap();
    let annotation = &reader.header().annotations[0];
    // raw sample 256 < 1000: mapped through breakpoint 0 (time 100 s)
    assert_eq!(annotation.sample, 256);
    assert_eq!(annotation.time, "02-Jan-2020 00:01:41");

    cleanup_test_files(stem);
}

#[test]
fn test_event_seconds_wrap_on_24_hour_clock() {
    let stem = "test_day_wrap";
    // Breakpoint time near the end of the day pushes the event past 24 h
    write_lay_with_comments(
        stem,
        &["0=86399.0"],
        &["2.0,0.0,0,100,Past midnight"],
    );

    let reader = LayReader::open(format!("{stem}.lay")).unwrap();
    assert_eq!(reader.header().annotations[0].time, "02-Jan-2020 00:00:01");

    cleanup_test_files(stem);
}

#[test]
fn test_commas_in_free_text_are_preserved() {
    let stem = "test_comma_rejoin";
    write_lay_with_comments(
        stem,
        &["0=0.0"],
        &["1.0,0.0,0,100,Spike, left temporal, sharp"],
    );

    let reader = LayReader::open(format!("{stem}.lay")).unwrap();
    assert_eq!(
        reader.header().annotations[0].text,
        "Spike, left temporal, sharp\r"
    );

    cleanup_test_files(stem);
}

#[test]
fn test_short_line_ends_comment_section() {
    let stem = "test_section_end";
    write_lay_with_comments(
        stem,
        &["0=0.0"],
        &[
            "1.0,0.0,0,100,First",
            "2.0,0.0,0,100,Second",
            "trailing junk",
            "3.0,0.0,0,100,Never reached",
        ],
    );

    let reader = LayReader::open(format!("{stem}.lay")).unwrap();
    let texts: Vec<&str> = reader
        .header()
        .annotations
        .iter()
        .map(|a| a.text.as_str())
        .collect();
    assert_eq!(texts, ["First\r", "Second\r"]);

    cleanup_test_files(stem);
}

#[test]
fn test_header_without_comments_section_has_no_annotations() {
    let stem = "test_no_comments";
    let text = "[FileInfo]\r\n\
                SamplingRate=256\r\n\
                WaveformCount=2\r\n\
                Calibration=0.5\r\n\
                DataType=0\r\n\
                [Patient]\r\n\
                TestDate=01.02.20\r\n\
                TestTime=00.00.00\r\n";
    fs::write(format!("{stem}.lay"), text).unwrap();
    fs::write(format!("{stem}.dat"), []).unwrap();

    let reader = LayReader::open(format!("{stem}.lay")).unwrap();
    assert!(reader.header().annotations.is_empty());
    assert!(reader.header().raw.comments.is_empty());

    cleanup_test_files(stem);
}

#[test]
fn test_comments_with_empty_resync_table_fail_fast() {
    let stem = "test_empty_resync";
    write_lay_with_comments(stem, &[], &["1.0,0.0,0,100,Event"]);

    assert!(matches!(
        LayReader::open(format!("{stem}.lay")),
        Err(LayError::EmptySampleTimes)
    ));

    cleanup_test_files(stem);
}

#[test]
fn test_no_comments_tolerates_empty_resync_table() {
    let stem = "test_empty_resync_ok";
    let text = "[FileInfo]\r\n\
                SamplingRate=256\r\n\
                WaveformCount=2\r\n\
                [Patient]\r\n\
                TestDate=01.02.20\r\n\
                TestTime=00.00.00\r\n";
    fs::write(format!("{stem}.lay"), text).unwrap();

    let reader = LayReader::open(format!("{stem}.lay")).unwrap();
    assert!(reader.header().raw.sample_times.is_empty());

    cleanup_test_files(stem);
}

#[test]
fn test_unparseable_onset_fails_parse() {
    let stem = "test_bad_onset";
    write_lay_with_comments(stem, &["0=0.0"], &["oops,0.0,0,100,Event"]);

    assert!(matches!(
        LayReader::open(format!("{stem}.lay")),
        Err(LayError::InvalidField { .. })
    ));

    cleanup_test_files(stem);
}

#[test]
fn test_raw_comment_lines_retained_in_order() {
    let stem = "test_raw_comments";
    write_lay_with_comments(
        stem,
        &["0=0.0"],
        &["1.0,0.0,0,100,First", "2.0,2.5,0,100,Second"],
    );

    let reader = LayReader::open(format!("{stem}.lay")).unwrap();
    assert_eq!(
        reader.header().raw.comments,
        vec!["1.0,0.0,0,100,First", "2.0,2.5,0,100,Second"]
    );
    assert_eq!(reader.header().annotations[1].duration, 2.5);

    cleanup_test_files(stem);
}

#[test]
fn test_clean_annotations_filters_recorder_noise() {
    let stem = "test_clean";
    write_lay_with_comments(
        stem,
        &["0=0.0"],
        &[
            "0.0,0.0,0,100,Start Recording",
            "1.0,0.0,0,100,Eyes closed",
            "2.0,0.0,0,100,XLSpike",
            "3.0,0.0,0,100,Recording Analyzer - CSA",
            "4.0,0.0,0,100,Seizure onset",
            "5.0,0.0,0,100,Stop Recording",
        ],
    );

    let mut header = LayReader::open(format!("{stem}.lay")).unwrap().into_header();
    let clean = clean_annotations(&mut header);

    let texts: Vec<&str> = clean.iter().map(|a| a.text.as_str()).collect();
    assert_eq!(texts, ["Eyes closed", "Seizure onset"]);

    // Strip happened in place on the header too
    assert_eq!(header.annotations[0].text, "Start Recording");
    for text in texts {
        assert!(!IGNORED_EVENTS.contains(&text));
    }

    cleanup_test_files(stem);
}
