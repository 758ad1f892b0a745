//! Shared helpers for unit tests.

use std::collections::HashMap;
use std::path::PathBuf;

use mkx_core::TrackType;
use mkx_probe::{Container, ContainerFormat, Track};

/// Build a bound Matroska container with one track per `(type, language)`
/// spec, indexed in order. An empty language leaves the tag unset.
pub(crate) fn make_container(path: &str, specs: &[(TrackType, &str)]) -> Container {
    let mut tracks = Vec::new();
    for (i, (track_type, lang)) in specs.iter().enumerate() {
        let mut track = Track::new(i as u32, *track_type);
        if !lang.is_empty() {
            track.language = Some(lang.to_string());
        }
        tracks.push(track);
    }

    let mut container = Container {
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
    };

    // Binding is normally done by the prober.
    let source = container.format.filename.clone();
    let mut counts: HashMap<TrackType, u32> = HashMap::new();
    for track in &mut container.tracks {
        track.source = source.clone();
        let rank = counts.entry(track.track_type).or_insert(0);
        track.type_index = *rank;
        *rank += 1;
    }

    container
}
