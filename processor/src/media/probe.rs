use std::ffi::OsStr;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use api::segment::VideoInfo;

use super::tool::run;
use crate::config::Tools;

#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

// ffprobe prints most numbers as strings, and "N/A" when it does not know.
#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    #[serde(default)]
    duration: Option<Value>,
    #[serde(default)]
    size: Option<Value>,
    #[serde(default)]
    bit_rate: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    codec_name: Option<String>,
    #[serde(default)]
    width: Option<Value>,
    #[serde(default)]
    height: Option<Value>,
    #[serde(default)]
    r_frame_rate: Option<String>,
}

/// Runs `ffprobe` on `input` and extracts what the metadata API wants.
pub async fn probe(tools: &Tools, input: &Path) -> Result<VideoInfo> {
    let args = [
        OsStr::new("-v"),
        OsStr::new("quiet"),
        OsStr::new("-print_format"),
        OsStr::new("json"),
        OsStr::new("-show_format"),
        OsStr::new("-show_streams"),
        input.as_os_str(),
    ];
    let output = run(&tools.ffprobe, args, tools.timeout()).await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_probe(&stdout).context("unexpected ffprobe output")
}

/// Reads ffprobe's JSON. Only malformed JSON is an error; missing fields and
/// a missing video stream just leave zeros.
pub fn parse_probe(json: &str) -> Result<VideoInfo, serde_json::Error> {
    let probe: ProbeOutput = serde_json::from_str(json)?;
    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    Ok(VideoInfo {
        duration: number(&probe.format.duration).unwrap_or(0.0),
        size: integer(&probe.format.size),
        bitrate: integer(&probe.format.bit_rate),
        width: video.map(|v| dimension(&v.width)).unwrap_or(0),
        height: video.map(|v| dimension(&v.height)).unwrap_or(0),
        codec: video
            .and_then(|v| v.codec_name.clone())
            .unwrap_or_default(),
        fps: video
            .and_then(|v| v.r_frame_rate.as_deref())
            .map(parse_frame_rate)
            .unwrap_or(0.0),
    })
}

/// Parses `num/den` or a plain number. Anything else, including a zero
/// denominator, is 0.
pub fn parse_frame_rate(rate: &str) -> f64 {
    let rate = rate.trim();
    let value = match rate.split_once('/') {
        Some((num, den)) => match (num.trim().parse::<f64>(), den.trim().parse::<f64>()) {
            (Ok(num), Ok(den)) if den != 0.0 => num / den,
            _ => 0.0,
        },
        None => rate.parse::<f64>().unwrap_or(0.0),
    };
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn number<T: FromStr>(value: &Option<Value>) -> Option<T> {
    match value.as_ref()? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

fn integer(value: &Option<Value>) -> u64 {
    number::<u64>(value)
        .or_else(|| number::<f64>(value).filter(|f| *f >= 0.0).map(|f| f as u64))
        .unwrap_or(0)
}

/// Out of range dimensions are unknown, not wrapped.
fn dimension(value: &Option<Value>) -> u32 {
    u32::try_from(integer(value)).unwrap_or(0)
}
