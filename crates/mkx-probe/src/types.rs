//! Core types for probed media containers.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use mkx_core::{HdrFormat, TrackType};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::hdr;

/// Subtitle codecs that are image-based formats.
pub const SUBTITLE_IMAGE_CODECS: &[&str] = &["hdmv_pgs_subtitle", "dvd_subtitle"];

/// Boolean disposition flags of a track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackFlags {
    /// This track is eligible to be played by default.
    pub default: bool,
    /// This track contains onscreen text or foreign-language dialogue.
    pub forced: bool,
    /// This track is suitable for users with hearing impairments.
    pub hearing_impaired: bool,
    /// This track is suitable for users with visual impairments.
    pub visual_impaired: bool,
    /// This track contains textual descriptions of video content.
    pub text_descriptions: bool,
    /// This track is in the content's original language (not a translation).
    pub original_language: bool,
    /// This track contains commentary.
    pub commentary: bool,
}

/// Identity of a track: the owning container's path plus the track's probe
/// index. Two tracks with the same index in different containers are
/// distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackKey {
    /// Path of the owning container (empty when unbound).
    pub source: PathBuf,
    /// Probe-order index within the container.
    pub index: u32,
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.source.display(), self.index)
    }
}

/// A single track within a container.
///
/// Tracks are created by the prober when a [`Container`] is opened and are
/// immutable afterward; selection and option accumulation never mutate them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Probe-order index, stable within the container.
    pub index: u32,
    /// Base type of the track.
    pub track_type: TrackType,
    /// Codec name as reported by the probe (empty when unknown).
    pub codec_name: String,
    /// Codec profile (e.g. "DTS-HD MA"), when reported.
    pub profile: Option<String>,
    /// Language tag, when present.
    pub language: Option<String>,
    /// Name/title tag, when present.
    pub name: Option<String>,
    /// Disposition flags.
    pub flags: TrackFlags,
    /// Video width in pixels.
    pub width: Option<u32>,
    /// Video height in pixels.
    pub height: Option<u32>,
    /// Video frame rate in frames per second.
    pub frame_rate: Option<f64>,
    /// Audio channel count.
    pub channels: Option<u32>,
    /// Video color transfer characteristics, used for HDR detection.
    pub color_transfer: Option<String>,
    /// Rank among same-type tracks in the container, fixed at bind time.
    pub type_index: u32,
    /// Path of the owning container. Empty until the container binds the
    /// track at open time.
    pub source: PathBuf,

    #[serde(skip)]
    hdr_cache: OnceCell<BTreeSet<HdrFormat>>,
}

impl Track {
    /// Create an empty track of the given index and type. The prober fills
    /// in the remaining fields before the owning container binds it.
    pub fn new(index: u32, track_type: TrackType) -> Self {
        Self {
            index,
            track_type,
            codec_name: String::new(),
            profile: None,
            language: None,
            name: None,
            flags: TrackFlags::default(),
            width: None,
            height: None,
            frame_rate: None,
            channels: None,
            color_transfer: None,
            type_index: 0,
            source: PathBuf::new(),
            hdr_cache: OnceCell::new(),
        }
    }

    /// Identity key of this track.
    pub fn key(&self) -> TrackKey {
        TrackKey {
            source: self.source.clone(),
            index: self.index,
        }
    }

    /// Rendered identity for error messages.
    pub fn ident(&self) -> String {
        if self.is_bound() {
            self.key().to_string()
        } else {
            format!("<unbound>#{}", self.index)
        }
    }

    /// Whether this track has been bound to an owning container.
    pub fn is_bound(&self) -> bool {
        !self.source.as_os_str().is_empty()
    }

    /// The set of HDR formats detected in this track.
    ///
    /// Only meaningful for video tracks; other types yield an empty set
    /// without probing. The first access on a bound video track reads the
    /// color transfer and runs a secondary ffprobe scan over the first few
    /// frames' side data; the result is cached so the scan runs at most
    /// once per track instance.
    ///
    /// # Errors
    ///
    /// - [`mkx_core::Error::TrackUnbound`] for a video track with no
    ///   container bound.
    /// - [`mkx_core::Error::Tool`] / [`mkx_core::Error::Probe`] if the
    ///   secondary scan fails.
    pub fn hdr_formats(&self) -> mkx_core::Result<&BTreeSet<HdrFormat>> {
        self.hdr_cache.get_or_try_init(|| {
            if self.track_type != TrackType::Video {
                return Ok(BTreeSet::new());
            }
            if !self.is_bound() {
                return Err(mkx_core::Error::TrackUnbound {
                    track: self.ident(),
                });
            }
            let side_data = hdr::scan_frame_side_data(&self.source, self.type_index)?;
            Ok(hdr::classify(self.color_transfer.as_deref(), &side_data))
        })
    }

    /// Pre-populate the HDR format cache, e.g. when the formats are already
    /// known from an earlier probe. The first write wins; later calls are
    /// no-ops.
    pub fn prime_hdr_formats(&self, formats: BTreeSet<HdrFormat>) {
        let _ = self.hdr_cache.set(formats);
    }

    /// Whether the track is encoded in any HDR format. Triggers the same
    /// lazy probe as [`Track::hdr_formats`].
    pub fn is_hdr(&self) -> mkx_core::Result<bool> {
        Ok(!self.hdr_formats()?.is_empty())
    }
}

/// A single chapter defined within a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    pub start: i64,
    pub end: i64,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Chapter {
    /// The chapter's title tag, when present.
    pub fn title(&self) -> Option<&str> {
        self.tags.get("title").map(String::as_str)
    }
}

/// Format metadata of a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerFormat {
    /// Path of the container file.
    pub filename: PathBuf,
    /// Short format identifier (e.g. "matroska,webm").
    pub format_name: String,
    /// Long-form format description.
    pub format_long_name: String,
    /// Number of streams reported by the probe.
    pub tracks_count: u32,
    /// File size in bytes.
    pub size: u64,
    /// Duration in seconds, if determinable.
    pub duration: Option<f64>,
    /// Overall bit rate in bits per second, if determinable.
    pub bit_rate: Option<u64>,
    /// Format-level tags.
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// A probed media container: format metadata, an ordered list of tracks
/// (probe order = on-disk stream order) and chapters.
///
/// Produced by [`FfprobeProber`](crate::FfprobeProber); read-only afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub format: ContainerFormat,
    pub tracks: Vec<Track>,
    pub chapters: Vec<Chapter>,
}

impl Container {
    /// Open a media container using ffprobe found on `PATH`.
    pub fn open(path: &Path) -> mkx_core::Result<Container> {
        let prober = crate::FfprobeProber::from_path().ok_or_else(|| {
            mkx_core::Error::tool("ffprobe", "ffprobe not found; is it installed and in PATH?")
        })?;
        prober.probe(path)
    }

    /// Open a media container using ffprobe from a tool registry.
    pub fn open_with(path: &Path, registry: &mkx_av::ToolRegistry) -> mkx_core::Result<Container> {
        crate::FfprobeProber::from_registry(registry)?.probe(path)
    }

    /// Path of the container file.
    pub fn path(&self) -> &Path {
        &self.format.filename
    }

    /// Group tracks by their type, preserving relative order.
    pub fn tracks_by_type(&self) -> HashMap<TrackType, Vec<&Track>> {
        let mut groups: HashMap<TrackType, Vec<&Track>> = HashMap::new();
        for track in &self.tracks {
            groups.entry(track.track_type).or_default().push(track);
        }
        groups
    }

    /// Whether this container is a Matroska file.
    pub fn is_matroska(&self) -> bool {
        self.format.format_name.to_lowercase().contains("matroska")
    }

    /// Fail with a descriptive error unless this container is Matroska.
    /// Edit and extract operations are gated on this.
    pub fn require_matroska(&self) -> mkx_core::Result<()> {
        if self.is_matroska() {
            return Ok(());
        }
        Err(mkx_core::Error::NotMatroska {
            path: self.format.filename.display().to_string(),
            format: self.format.format_name.clone(),
        })
    }

    /// Whether the given track belongs to this container.
    pub fn contains_track(&self, track: &Track) -> bool {
        track.source == self.format.filename
            && self.tracks.iter().any(|t| t.index == track.index)
    }

    /// Bind every track to this container: stamp the owning path and the
    /// per-type rank. Called once by the prober; container contents are
    /// immutable afterward, so both values are fixed for the track's life.
    pub(crate) fn bind_tracks(&mut self) {
        let path = self.format.filename.clone();
        let mut type_counts: HashMap<TrackType, u32> = HashMap::new();
        for track in &mut self.tracks {
            track.source = path.clone();
            let rank = type_counts.entry(track.track_type).or_insert(0);
            track.type_index = *rank;
            *rank += 1;
        }
    }
}
