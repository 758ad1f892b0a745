//! mkvmerge argument generation.
//!
//! Walks a job's accumulated state and produces the exact ordered argument
//! vector mkvmerge expects: output options first, then per-container track
//! selection flags, per-track options and the container path, and finally
//! the global `--track-order` encoding the job's add order.

use std::collections::HashMap;
use std::path::PathBuf;

use mkx_core::TrackType;
use mkx_probe::Track;

use super::MuxJob;

/// Track-selection flags per type bucket: the "select" flag takes a
/// comma-joined index list, the "exclude" flag drops the type entirely.
fn bucket_flags(track_type: TrackType) -> (&'static str, &'static str) {
    match track_type {
        TrackType::Video => ("--video-tracks", "--no-video"),
        TrackType::Audio => ("--audio-tracks", "--no-audio"),
        TrackType::Subtitle => ("--subtitle-tracks", "--no-subtitles"),
        // Attachments are never emitted as mux sources.
        TrackType::Attachment => unreachable!("attachments have no selection flags"),
    }
}

pub(crate) fn generate(job: &MuxJob) -> mkx_core::Result<Vec<String>> {
    if job.track_order.is_empty() {
        return Err(mkx_core::Error::EmptyJob);
    }
    for track in &job.track_order {
        if !track.is_bound() {
            return Err(mkx_core::Error::TrackUnbound {
                track: track.ident(),
            });
        }
    }

    let mut arguments = vec!["--output".to_string(), job.output.display().to_string()];
    for (option, value) in &job.output_options {
        arguments.extend(option.format_args(value)?);
    }

    // Group the job's tracks by their source container, in order of first
    // appearance.
    let mut container_order: Vec<PathBuf> = Vec::new();
    let mut tracks_by_container: HashMap<PathBuf, Vec<&Track>> = HashMap::new();
    for track in &job.track_order {
        if !tracks_by_container.contains_key(&track.source) {
            container_order.push(track.source.clone());
        }
        tracks_by_container
            .entry(track.source.clone())
            .or_default()
            .push(track);
    }

    for source in &container_order {
        let tracks = &tracks_by_container[source];

        for bucket_type in TrackType::MUXABLE {
            let (select_flag, exclude_flag) = bucket_flags(bucket_type);
            let bucket: Vec<&Track> = tracks
                .iter()
                .filter(|t| t.track_type == bucket_type)
                .copied()
                .collect();

            if bucket.is_empty() {
                arguments.push(exclude_flag.to_string());
                continue;
            }

            arguments.push(select_flag.to_string());
            arguments.push(
                bucket
                    .iter()
                    .map(|t| t.index.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            );

            for track in bucket {
                for (option, value) in &job.track_options(track) {
                    arguments.extend(option.format_args(value, track.index)?);
                }
            }
        }

        if let Some(options) = job.container_options.get(source) {
            for (option, value) in options {
                arguments.extend(option.format_args(value));
            }
        }

        arguments.push(source.display().to_string());
    }

    // Encode the job's add order across containers.
    let order_pairs: Vec<String> = job
        .track_order
        .iter()
        .map(|track| {
            let rank = container_order
                .iter()
                .position(|path| path == &track.source)
                .expect("every job track's container was grouped above");
            format!("{rank}:{}", track.index)
        })
        .collect();
    arguments.push("--track-order".to_string());
    arguments.push(order_pairs.join(","));

    Ok(arguments)
}
