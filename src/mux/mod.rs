//! Mux job definition and execution.
//!
//! A [`MuxJob`] collects tracks (possibly from several containers) into one
//! output file, accumulating per-output, per-container and per-track options
//! along the way. Nothing is validated against mkvmerge until
//! [`MuxJob::generate_args`] runs; the accumulation API itself only enforces
//! identity invariants (no duplicate tracks, no removal of unknown tracks).

mod args;
pub mod auto;
mod options;

pub use options::{
    ContainerOption, ContainerOptions, OptionValue, OutputOption, OutputOptions, TrackOption,
    TrackOptions,
};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mkx_av::{CharsetGuess, ToolCommand, ToolRegistry};
use mkx_probe::{Container, Track, TrackKey};

/// A media mux operation resulting in a single output file.
#[derive(Debug, Clone)]
pub struct MuxJob {
    output: PathBuf,
    output_options: OutputOptions,
    container_options: HashMap<PathBuf, ContainerOptions>,
    track_options: HashMap<TrackKey, TrackOptions>,
    track_order: Vec<Track>,
}

impl MuxJob {
    /// Create a new mux job writing to the given output path.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            output_options: OutputOptions::new(),
            container_options: HashMap::new(),
            track_options: HashMap::new(),
            track_order: Vec::new(),
        }
    }

    /// The output path of this job.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// The job's tracks in add order.
    pub fn tracks(&self) -> &[Track] {
        &self.track_order
    }

    // -- output options ----------------------------------------------------

    /// Set the output options, replacing any previously stored values.
    pub fn set_output_options(&mut self, options: OutputOptions) {
        self.output_options = options;
    }

    /// Merge the given output options in-place, overwriting only the
    /// supplied keys.
    pub fn update_output_options(&mut self, options: OutputOptions) {
        self.output_options.extend(options);
    }

    /// Return the stored output options.
    pub fn output_options(&self) -> &OutputOptions {
        &self.output_options
    }

    // -- container options -------------------------------------------------

    /// Set options for the given container, replacing any previously stored
    /// values.
    pub fn set_container_options(&mut self, container: &Container, options: ContainerOptions) {
        self.container_options
            .insert(container.path().to_path_buf(), options);
    }

    /// Merge options for the given container in-place.
    pub fn update_container_options(&mut self, container: &Container, options: ContainerOptions) {
        self.container_options
            .entry(container.path().to_path_buf())
            .or_default()
            .extend(options);
    }

    /// Return the stored options for the given container (empty if none).
    pub fn container_options(&self, container: &Container) -> ContainerOptions {
        self.container_options
            .get(container.path())
            .cloned()
            .unwrap_or_default()
    }

    /// Delete any stored options for the given container.
    pub fn delete_container_options(&mut self, container: &Container) {
        self.container_options.remove(container.path());
    }

    // -- track options -----------------------------------------------------

    /// Set options for the given track, replacing any previously stored
    /// values.
    pub fn set_track_options(&mut self, track: &Track, options: TrackOptions) {
        self.track_options.insert(track.key(), options);
    }

    /// Merge options for the given track in-place.
    pub fn update_track_options(&mut self, track: &Track, options: TrackOptions) {
        self.track_options
            .entry(track.key())
            .or_default()
            .extend(options);
    }

    /// Return the stored options for the given track (empty if none).
    pub fn track_options(&self, track: &Track) -> TrackOptions {
        self.track_options
            .get(&track.key())
            .cloned()
            .unwrap_or_default()
    }

    /// Delete any stored options for the given track.
    pub fn delete_track_options(&mut self, track: &Track) {
        self.track_options.remove(&track.key());
    }

    // -- track order -------------------------------------------------------

    fn is_track_referenced(&self, track: &Track) -> bool {
        let key = track.key();
        self.track_order.iter().any(|t| t.key() == key)
    }

    fn is_container_referenced(&self, path: &Path) -> bool {
        self.track_order.iter().any(|t| t.source == path)
    }

    /// Append a track to the output, optionally applying `options` to it.
    ///
    /// # Errors
    ///
    /// [`mkx_core::Error::DuplicateTrack`] if the track is already part of
    /// this job.
    pub fn append_track(
        &mut self,
        track: &Track,
        options: Option<TrackOptions>,
    ) -> mkx_core::Result<()> {
        if self.is_track_referenced(track) {
            return Err(mkx_core::Error::DuplicateTrack {
                track: track.ident(),
            });
        }
        self.track_order.push(track.clone());
        if let Some(options) = options {
            self.set_track_options(track, options);
        }
        Ok(())
    }

    /// Append all tracks from a container into the output.
    ///
    /// `common_track_options` apply to every appended track. To add
    /// per-track options afterwards use [`MuxJob::update_track_options`],
    /// not `set_track_options`, or the common options will be lost.
    pub fn append_all_tracks(
        &mut self,
        container: &Container,
        container_options: Option<ContainerOptions>,
        common_track_options: Option<TrackOptions>,
    ) -> mkx_core::Result<()> {
        if let Some(options) = container_options {
            self.set_container_options(container, options);
        }
        for track in &container.tracks {
            self.append_track(track, common_track_options.clone())?;
        }
        Ok(())
    }

    /// Append the single subtitle track of a text-subtitle container,
    /// guessing its character set so mkvmerge can convert it to UTF-8.
    ///
    /// Strictly limited to SRT containers.
    ///
    /// # Errors
    ///
    /// - [`mkx_core::Error::Precondition`] if the container is not SRT.
    /// - [`mkx_core::Error::Charset`] if detection confidence is too low
    ///   and `charset_guess` does not allow a fallback.
    pub fn append_srt_track(
        &mut self,
        container: &Container,
        options: Option<TrackOptions>,
        charset_guess: &CharsetGuess,
    ) -> mkx_core::Result<()> {
        if container.format.format_name != "srt" {
            return Err(mkx_core::Error::Precondition(format!(
                "expected an srt container, found '{}' ({})",
                container.format.format_name,
                container.path().display()
            )));
        }
        let track = container.tracks.first().ok_or_else(|| {
            mkx_core::Error::Precondition(format!(
                "srt container has no tracks: {}",
                container.path().display()
            ))
        })?;

        let charset = mkx_av::guess_subtitle_charset(container.path(), charset_guess)?;

        let mut options = options.unwrap_or_default();
        options.insert(TrackOption::Charset, OptionValue::Str(charset));
        self.append_track(track, Some(options))
    }

    /// Insert a track at a specific position in the output order.
    ///
    /// # Errors
    ///
    /// [`mkx_core::Error::DuplicateTrack`] if the track is already part of
    /// this job.
    pub fn insert_track(&mut self, position: usize, track: &Track) -> mkx_core::Result<()> {
        if self.is_track_referenced(track) {
            return Err(mkx_core::Error::DuplicateTrack {
                track: track.ident(),
            });
        }
        self.track_order.insert(position, track.clone());
        Ok(())
    }

    /// Remove a track from the output, cleaning up its stored options and,
    /// if this was the container's last referenced track, the container's
    /// options too.
    ///
    /// # Errors
    ///
    /// [`mkx_core::Error::TrackNotFound`] if the track was never added.
    pub fn remove_track(&mut self, track: &Track) -> mkx_core::Result<()> {
        self.remove_track_with(track, true, true)
    }

    /// Remove a track with explicit control over option cleanup.
    ///
    /// `cleanup_track_options` drops the track's stored options so a later
    /// re-add starts clean. `cleanup_container_options` drops the source
    /// container's options if and only if no other job track still
    /// references that container.
    pub fn remove_track_with(
        &mut self,
        track: &Track,
        cleanup_track_options: bool,
        cleanup_container_options: bool,
    ) -> mkx_core::Result<()> {
        let key = track.key();
        let position = self
            .track_order
            .iter()
            .position(|t| t.key() == key)
            .ok_or_else(|| mkx_core::Error::TrackNotFound {
                track: track.ident(),
            })?;
        self.track_order.remove(position);

        if cleanup_track_options {
            self.track_options.remove(&key);
        }

        if cleanup_container_options
            && track.is_bound()
            && !self.is_container_referenced(&track.source)
        {
            self.container_options.remove(&track.source);
        }

        Ok(())
    }

    // -- generation + execution --------------------------------------------

    /// Generate the full mkvmerge argument vector for this job.
    ///
    /// Deterministic and side-effect free: calling this twice on an
    /// unmodified job yields identical vectors.
    pub fn generate_args(&self) -> mkx_core::Result<Vec<String>> {
        args::generate(self)
    }

    /// Run mkvmerge for this job.
    ///
    /// With `foreground` the tool's own progress output is streamed to the
    /// terminal; otherwise output is captured and only surfaces in errors.
    pub fn run(&self, registry: &ToolRegistry, foreground: bool) -> mkx_core::Result<()> {
        let arguments = self.generate_args()?;
        let mkvmerge = registry.require("mkvmerge")?;

        tracing::info!(
            output = %self.output.display(),
            tracks = self.track_order.len(),
            "running mkvmerge"
        );

        let mut cmd = ToolCommand::new(mkvmerge.path.clone());
        cmd.args(arguments);
        if foreground {
            cmd.execute_foreground_blocking()?;
        } else {
            cmd.execute_blocking()?;
        }
        Ok(())
    }
}
