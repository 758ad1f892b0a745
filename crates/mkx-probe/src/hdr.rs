//! HDR format detection for video tracks.
//!
//! HDR10 and HLG fall out of the stream's color transfer. Dolby Vision and
//! HDR10+ only show up in per-frame side data, which requires a second
//! ffprobe pass over the first few frames; callers reach this through
//! [`Track::hdr_formats`](crate::Track::hdr_formats), which memoizes the
//! result so the pass runs at most once per track.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mkx_core::HdrFormat;
use once_cell::sync::Lazy;
use serde::Deserialize;

use mkx_av::ToolCommand;

/// Frame side-data type emitted for Dolby Vision RPUs.
const SIDE_DATA_DOVI_RPU: &str = "Dolby Vision RPU Data";
/// Frame side-data type emitted for HDR10+ dynamic metadata.
const SIDE_DATA_HDR10PLUS: &str = "HDR Dynamic Metadata SMPTE2094-40 (HDR10+)";

/// How many frames the secondary scan reads.
const SCAN_FRAME_COUNT: u32 = 10;

static FFPROBE: Lazy<Option<PathBuf>> = Lazy::new(|| which::which("ffprobe").ok());

/// Classify HDR formats from a stream's color transfer plus the side-data
/// type strings collected from its first frames.
pub(crate) fn classify(color_transfer: Option<&str>, side_data_types: &[String]) -> BTreeSet<HdrFormat> {
    let mut formats = BTreeSet::new();

    match color_transfer {
        Some("smpte2084") => {
            formats.insert(HdrFormat::Hdr10);
        }
        Some("arib-std-b67") => {
            formats.insert(HdrFormat::Hlg);
        }
        _ => {}
    }

    for side_data_type in side_data_types {
        if side_data_type == SIDE_DATA_DOVI_RPU {
            formats.insert(HdrFormat::DolbyVision);
        }
        if side_data_type == SIDE_DATA_HDR10PLUS {
            formats.insert(HdrFormat::Hdr10Plus);
        }
    }

    formats
}

/// Probe the first frames of the given video stream and return the side-data
/// type strings found.
///
/// `video_rank` is the stream's rank among video streams (ffprobe's `v:N`
/// stream specifier), not its absolute index.
pub(crate) fn scan_frame_side_data(file: &Path, video_rank: u32) -> mkx_core::Result<Vec<String>> {
    let ffprobe = FFPROBE.as_deref().ok_or_else(|| {
        mkx_core::Error::tool("ffprobe", "ffprobe not found; is it installed and in PATH?")
    })?;

    tracing::debug!(file = %file.display(), video_rank, "scanning frame side data");

    let output = ToolCommand::new(ffprobe.to_path_buf())
        .args([
            "-hide_banner",
            "-loglevel",
            "warning",
            "-select_streams",
        ])
        .arg(format!("v:{video_rank}"))
        .args(["-print_format", "json", "-show_frames", "-read_intervals"])
        .arg(format!("%+#{SCAN_FRAME_COUNT}"))
        .args([
            "-show_entries",
            "frame=color_space,color_primaries,color_transfer,side_data_list,pix_fmt",
            "-i",
        ])
        .arg(file.to_string_lossy().as_ref())
        .timeout(Duration::from_secs(120))
        .execute_blocking()?;

    let scan: FrameScan = serde_json::from_str(&output.stdout)
        .map_err(|e| mkx_core::Error::Probe(format!("frame scan JSON parse error: {e}")))?;

    Ok(scan
        .frames
        .into_iter()
        .flat_map(|frame| frame.side_data_list)
        .filter_map(|sd| sd.side_data_type)
        .collect())
}

#[derive(Debug, Deserialize)]
struct FrameScan {
    #[serde(default)]
    frames: Vec<Frame>,
}

#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(default)]
    side_data_list: Vec<FrameSideData>,
}

#[derive(Debug, Deserialize)]
struct FrameSideData {
    side_data_type: Option<String>,
}
