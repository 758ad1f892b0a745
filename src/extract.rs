//! Track and chapter extraction via mkvextract.
//!
//! Extraction only works on Matroska containers; the gate runs before
//! mkvextract is invoked.

use std::path::{Path, PathBuf};

use mkx_av::{ToolCommand, ToolRegistry};
use mkx_probe::{Container, Track};

/// Generate the mkvextract argument vector for extracting the given tracks.
///
/// # Errors
///
/// - [`mkx_core::Error::NotMatroska`] for non-Matroska containers.
/// - [`mkx_core::Error::ForeignTrack`] if any track does not belong to the
///   container.
pub fn extract_tracks_args(
    container: &Container,
    pairs: &[(&Track, PathBuf)],
) -> mkx_core::Result<Vec<String>> {
    container.require_matroska()?;

    let mut arguments = vec![
        container.path().display().to_string(),
        "tracks".to_string(),
    ];

    for (track, destination) in pairs {
        if !container.contains_track(track) {
            return Err(mkx_core::Error::ForeignTrack {
                track: track.ident(),
                container: container.path().display().to_string(),
            });
        }
        arguments.push(format!("{}:{}", track.index, destination.display()));
    }

    Ok(arguments)
}

/// Extract one or more tracks from a Matroska container, each to its own
/// destination file.
pub fn extract_tracks(
    container: &Container,
    pairs: &[(&Track, PathBuf)],
    registry: &ToolRegistry,
    foreground: bool,
) -> mkx_core::Result<()> {
    let arguments = extract_tracks_args(container, pairs)?;
    run_mkvextract(registry, arguments, foreground)
}

/// Extract a single track from a Matroska container.
pub fn extract_track(
    container: &Container,
    track: &Track,
    destination: impl Into<PathBuf>,
    registry: &ToolRegistry,
    foreground: bool,
) -> mkx_core::Result<()> {
    extract_tracks(container, &[(track, destination.into())], registry, foreground)
}

/// Generate the mkvextract argument vector for extracting chapters.
///
/// With `simple` the output is the OGM-style flat chapter format instead of
/// Matroska XML.
pub fn extract_chapters_args(
    container: &Container,
    destination: &Path,
    simple: bool,
) -> mkx_core::Result<Vec<String>> {
    container.require_matroska()?;

    let mut arguments = vec![
        container.path().display().to_string(),
        "chapters".to_string(),
    ];
    if simple {
        arguments.push("--simple".to_string());
    }
    arguments.push(destination.display().to_string());

    Ok(arguments)
}

/// Extract all chapters of a Matroska container to a file.
pub fn extract_chapters(
    container: &Container,
    destination: &Path,
    simple: bool,
    registry: &ToolRegistry,
    foreground: bool,
) -> mkx_core::Result<()> {
    let arguments = extract_chapters_args(container, destination, simple)?;
    run_mkvextract(registry, arguments, foreground)
}

fn run_mkvextract(
    registry: &ToolRegistry,
    arguments: Vec<String>,
    foreground: bool,
) -> mkx_core::Result<()> {
    let mkvextract = registry.require("mkvextract")?;

    tracing::info!(args = ?arguments, "running mkvextract");

    let mut cmd = ToolCommand::new(mkvextract.path.clone());
    cmd.args(arguments);
    if foreground {
        cmd.execute_foreground_blocking()?;
    } else {
        cmd.execute_blocking()?;
    }
    Ok(())
}
