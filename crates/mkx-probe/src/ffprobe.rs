//! FFprobe-backed container prober.
//!
//! Shells out to `ffprobe -print_format json -show_format -show_streams
//! -show_chapters` and maps the JSON output into a [`Container`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mkx_av::{ToolCommand, ToolRegistry};
use mkx_core::TrackType;
use serde::Deserialize;

use crate::types::{Chapter, Container, ContainerFormat, Track, TrackFlags};

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    /// Path to the ffprobe binary.
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    /// Create a new prober using the given ffprobe path.
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self { ffprobe_path }
    }

    /// Create a prober that finds ffprobe on `PATH`.
    pub fn from_path() -> Option<Self> {
        which::which("ffprobe").ok().map(Self::new)
    }

    /// Create a prober from a [`ToolRegistry`].
    pub fn from_registry(registry: &ToolRegistry) -> mkx_core::Result<Self> {
        Ok(Self::new(registry.require("ffprobe")?.path.clone()))
    }

    /// Probe a media file and return a populated, bound [`Container`].
    ///
    /// # Errors
    ///
    /// - [`mkx_core::Error::Tool`] if ffprobe cannot read the file (exit
    ///   status and stderr are included).
    /// - [`mkx_core::Error::Probe`] if the JSON output cannot be parsed.
    pub fn probe(&self, path: &Path) -> mkx_core::Result<Container> {
        mkx_av::block_on("ffprobe", self.probe_async(path))
    }

    async fn probe_async(&self, path: &Path) -> mkx_core::Result<Container> {
        tracing::debug!(path = %path.display(), "probing container");

        let output = ToolCommand::new(self.ffprobe_path.clone())
            .args([
                "-hide_banner",
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-show_chapters",
            ])
            .arg(path.to_string_lossy().as_ref())
            .timeout(Duration::from_secs(120))
            .execute()
            .await?;

        let ff: FfprobeOutput = serde_json::from_str(&output.stdout)
            .map_err(|e| mkx_core::Error::Probe(format!("ffprobe JSON parse error: {e}")))?;

        parse_ffprobe_output(path, ff)
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    chapters: Vec<FfprobeChapter>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    nb_streams: Option<u32>,
    format_name: Option<String>,
    format_long_name: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    profile: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    channels: Option<u32>,
    color_transfer: Option<String>,
    #[serde(default)]
    disposition: FfprobeDisposition,
    #[serde(default)]
    tags: FfprobeStreamTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    default: u8,
    #[serde(default)]
    forced: u8,
    #[serde(default)]
    hearing_impaired: u8,
    #[serde(default)]
    visual_impaired: u8,
    #[serde(default)]
    descriptions: u8,
    #[serde(default)]
    original: u8,
    #[serde(default)]
    comment: u8,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeStreamTags {
    #[serde(alias = "LANGUAGE")]
    language: Option<String>,
    #[serde(alias = "TITLE")]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeChapter {
    id: i64,
    start: Option<i64>,
    end: Option<i64>,
    start_time: Option<String>,
    end_time: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn parse_ffprobe_output(path: &Path, output: FfprobeOutput) -> mkx_core::Result<Container> {
    let mut tracks = Vec::with_capacity(output.streams.len());
    for stream in output.streams {
        match parse_stream(stream) {
            Some(track) => tracks.push(track),
            None => continue,
        }
    }

    let chapters = output
        .chapters
        .into_iter()
        .map(|ch| Chapter {
            id: ch.id,
            start: ch.start.unwrap_or(0),
            end: ch.end.unwrap_or(0),
            start_time: ch.start_time,
            end_time: ch.end_time,
            tags: ch.tags,
        })
        .collect();

    let format = ContainerFormat {
        filename: path.to_path_buf(),
        format_name: output.format.format_name.unwrap_or_default(),
        format_long_name: output.format.format_long_name.unwrap_or_default(),
        tracks_count: output.format.nb_streams.unwrap_or(tracks.len() as u32),
        size: output
            .format
            .size
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0),
        duration: output.format.duration.and_then(|s| s.parse::<f64>().ok()),
        bit_rate: output.format.bit_rate.and_then(|s| s.parse::<u64>().ok()),
        tags: output.format.tags,
    };

    let mut container = Container {
        format,
        tracks,
        chapters,
    };
    container.bind_tracks();

    Ok(container)
}

fn parse_stream(stream: FfprobeStream) -> Option<Track> {
    let track_type = match stream.codec_type.as_deref() {
        Some("video") => TrackType::Video,
        Some("audio") => TrackType::Audio,
        Some("subtitle") => TrackType::Subtitle,
        Some("attachment") => TrackType::Attachment,
        other => {
            tracing::warn!(codec_type = ?other, index = stream.index, "skipping unrecognized stream type");
            return None;
        }
    };

    let mut track = Track::new(stream.index, track_type);
    track.codec_name = stream.codec_name.unwrap_or_default();
    track.profile = stream.profile;
    track.language = stream.tags.language;
    track.name = stream.tags.title;
    track.width = stream.width;
    track.height = stream.height;
    track.frame_rate = stream.avg_frame_rate.as_deref().and_then(parse_frame_rate);
    track.channels = stream.channels;
    track.color_transfer = stream.color_transfer;
    track.flags = TrackFlags {
        default: stream.disposition.default == 1,
        forced: stream.disposition.forced == 1,
        hearing_impaired: stream.disposition.hearing_impaired == 1,
        visual_impaired: stream.disposition.visual_impaired == 1,
        text_descriptions: stream.disposition.descriptions == 1,
        original_language: stream.disposition.original == 1,
        commentary: stream.disposition.comment == 1,
    };

    Some(track)
}

fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let parts: Vec<&str> = rate_str.split('/').collect();
    if parts.len() == 2 {
        let num: f64 = parts[0].parse().ok()?;
        let den: f64 = parts[1].parse().ok()?;
        if den != 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate_str.parse().ok()
}
