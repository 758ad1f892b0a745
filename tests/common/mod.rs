//! Shared builders for integration tests.
//!
//! Containers are normally produced by the ffprobe prober; these builders
//! construct the same bound shape by hand so selector and mux behavior can
//! be exercised without media files or external tools.

// Each test binary compiles this module separately and uses a subset of it.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use mkx::{Container, ContainerFormat, Track, TrackType};

/// Everything needed to describe one test track.
pub struct TrackSpec {
    pub track_type: TrackType,
    pub codec: &'static str,
    pub language: Option<&'static str>,
    pub name: Option<&'static str>,
    pub forced: bool,
    pub commentary: bool,
    pub hearing_impaired: bool,
}

impl TrackSpec {
    pub fn new(track_type: TrackType, codec: &'static str) -> Self {
        Self {
            track_type,
            codec,
            language: None,
            name: None,
            forced: false,
            commentary: false,
            hearing_impaired: false,
        }
    }

    pub fn lang(mut self, language: &'static str) -> Self {
        self.language = Some(language);
        self
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    pub fn commentary(mut self) -> Self {
        self.commentary = true;
        self
    }
}

/// Build a bound Matroska container from track specs, indexed in order.
pub fn make_container(path: &str, specs: Vec<TrackSpec>) -> Container {
    let mut tracks = Vec::new();
    let mut type_counts: HashMap<TrackType, u32> = HashMap::new();

    for (i, spec) in specs.into_iter().enumerate() {
        let mut track = Track::new(i as u32, spec.track_type);
        track.codec_name = spec.codec.to_string();
        track.language = spec.language.map(str::to_string);
        track.name = spec.name.map(str::to_string);
        track.flags.forced = spec.forced;
        track.flags.commentary = spec.commentary;
        track.flags.hearing_impaired = spec.hearing_impaired;
        track.source = PathBuf::from(path);
        let rank = type_counts.entry(spec.track_type).or_insert(0);
        track.type_index = *rank;
        *rank += 1;
        tracks.push(track);
    }

    Container {
        format: ContainerFormat {
            filename: PathBuf::from(path),
            format_name: "matroska,webm".to_string(),
            format_long_name: "Matroska / WebM".to_string(),
            tracks_count: tracks.len() as u32,
            size: 0,
            duration: None,
            bit_rate: None,
            tags: HashMap::new(),
        },
        tracks,
        chapters: vec![],
    }
}

/// Indices of a selection, for terse assertions.
pub fn indices(selection: &[&Track]) -> Vec<u32> {
    selection.iter().map(|t| t.index).collect()
}
