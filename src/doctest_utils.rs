// Internal utilities for documentation tests
// This file contains helper functions to generate fixture recordings for doctests

use std::fs;
use std::path::PathBuf;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::Result;

/// Creates a small matching `.lay`/`.dat` pair for documentation examples.
///
/// The recording has 2 channels at 256 Hz, 16-bit samples with a 0.5
/// calibration factor, two resync breakpoints and a handful of comments
/// (including recorder-generated noise events). Lay files are CRLF, as
/// Persyst writes them.
pub fn create_test_recording(stem: &str) -> Result<()> {
    let lay = [
        "[FileInfo]",
        "File=placeholder.dat",
        "FileType=Interleaved",
        "SamplingRate=256",
        "WaveformCount=2",
        "Calibration=0.5",
        "DataType=0",
        "[Patient]",
        "First=Test",
        "Last=Patient",
        "MiddleName=[]",
        "TestDate=01.02.20",
        "TestTime=09.15.00",
        "[ChannelMap]",
        "Fp1=1",
        "Fp2=2",
        "[SampleTimes]",
        "0=0.0",
        "1000=10.0",
        "[Montage]",
        "AvgRef=\\Montages\\AvgRef.mtg",
        "[AvgRef]",
        "Fp1-Ref=0",
        "Fp2-Ref=1",
        "[Comments]",
        "0.000,0.000,0,100,Start Recording",
        "2.500,0.000,0,100,Eyes closed",
        "5.000,1.500,0,100,Spike, left temporal",
        "10.000,0.000,0,100,XLSpike",
    ]
    .join("\r\n")
        + "\r\n";
    fs::write(lay_path(stem), lay)?;

    // 8 time steps of 2 interleaved channels; values encode position so
    // decoded layout is easy to assert against.
    let mut dat = Vec::new();
    for step in 0..8i16 {
        for channel in 0..2i16 {
            dat.write_i16::<LittleEndian>(step * 10 + channel)?;
        }
    }
    fs::write(dat_path(stem), dat)?;
    Ok(())
}

/// Removes the files written by `create_test_recording`.
pub fn remove_test_recording(stem: &str) {
    let _ = fs::remove_file(lay_path(stem));
    let _ = fs::remove_file(dat_path(stem));
}

fn lay_path(stem: &str) -> PathBuf {
    PathBuf::from(format!("{stem}.lay"))
}

fn dat_path(stem: &str) -> PathBuf {
    PathBuf::from(format!("{stem}.dat"))
}
