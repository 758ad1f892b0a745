//! # mkx
//!
//! Track selection and Matroska re-authoring on top of the ffprobe and
//! mkvtoolnix CLIs.
//!
//! The workflow: probe a container with [`mkx_probe`], pick tracks with the
//! [selector mini-language](selector), accumulate per-output / per-container
//! / per-track options on a [`MuxJob`](mux::MuxJob), optionally let the
//! [auto-assignment passes](mux::auto) settle disposition flags and names,
//! then generate and run the mkvmerge invocation. Header edits go through
//! [`EditJob`](edit::EditJob) (mkvpropedit) and track/chapter extraction
//! through [`extract`] (mkvextract).
//!
//! ```no_run
//! use mkx::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> mkx::Result<()> {
//! let movie = Container::open(Path::new("movie.mkv"))?;
//! let subs = Container::open(Path::new("subs.mkv"))?;
//!
//! let mut job = MuxJob::new("remux.mkv");
//! for track in movie.select_tracks("+isVideo:+isAudio and isEnglish")? {
//!     job.append_track(track, None)?;
//! }
//! for track in subs.select_tracks("s0")? {
//!     job.append_track(track, None)?;
//! }
//! job.infer_flags_from_name();
//! job.assign_default_flags();
//! job.assign_sensible_names();
//!
//! let tools = ToolRegistry::from_path();
//! job.run(&tools, true)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Selector variables
//!
//! Expression fragments evaluate per track with these variables bound:
//! `track` (field access only), `index`, `typeIndex`, `lang`, `name`,
//! `codec`, `isVideo`, `isAudio`, `isSubtitle`, `isEnglish`, `isDefault`,
//! `isForced`, `isHI`, `isCommentary`, `isHEVC`, `isAVC`, `isHDR`,
//! `isDoVi`, `isHDR10Plus`, `isAAC`, `isAC3`, `isEAC3`, `isDTS`, `isDTSHD`,
//! `isTrueHD`, `isText`, `isImage`. The HDR variables trigger a lazy,
//! cached ffprobe frame scan on first use per track.

pub mod edit;
pub mod extract;
pub mod mux;
pub mod selector;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export the foundational crates' key types at the root.
pub use mkx_core::{Error, HdrFormat, Result, TrackType};
pub use mkx_probe::{Chapter, Container, ContainerFormat, FfprobeProber, Track, TrackFlags};

pub use edit::{EditJob, TagSelector, TrackFlag, TrackProperty};
pub use mux::{
    ContainerOption, ContainerOptions, MuxJob, OptionValue, OutputOption, OutputOptions,
    TrackOption, TrackOptions,
};
pub use selector::{select, select_from, SelectTracks};

/// Commonly used imports, bundled.
pub mod prelude {
    pub use crate::edit::{EditJob, TagSelector, TrackFlag, TrackProperty};
    pub use crate::mux::{
        ContainerOption, MuxJob, OptionValue, OutputOption, TrackOption, TrackOptions,
    };
    pub use crate::selector::SelectTracks;
    pub use mkx_av::{CharsetGuess, ToolRegistry};
    pub use mkx_core::{HdrFormat, TrackType};
    pub use mkx_probe::{Container, Track};
}
