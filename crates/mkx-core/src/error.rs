//! Unified error type for the mkx crates.
//!
//! All crates funnel their failures into [`Error`]. Selector and identity
//! errors carry enough context (the offending fragment, the track's rendered
//! identity) to be actionable without a stack trace.

/// Unified error type covering all failure modes in mkx.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A track selector string could not be parsed or evaluated.
    #[error("Selector error in '{fragment}': {message}")]
    Selector {
        /// The selector fragment that failed.
        fragment: String,
        /// Human-readable error description.
        message: String,
    },

    /// The same track was added to a job twice.
    #[error("Track already present in job: {track}")]
    DuplicateTrack {
        /// Rendered identity of the track (source path + index).
        track: String,
    },

    /// A track was removed from (or looked up in) a job that never held it.
    #[error("Track not found in job: {track}")]
    TrackNotFound {
        /// Rendered identity of the track.
        track: String,
    },

    /// A track has no owning container bound and cannot be used.
    #[error("Track has no container bound: {track}")]
    TrackUnbound {
        /// Rendered identity of the track.
        track: String,
    },

    /// A track belongs to a different container than the operation expects.
    #[error("Track {track} does not belong to container {container}")]
    ForeignTrack {
        /// Rendered identity of the track.
        track: String,
        /// Path of the container the operation was invoked on.
        container: String,
    },

    /// An edit/extract operation was attempted on a non-Matroska container.
    #[error("'{path}' is not a Matroska container (format: {format})")]
    NotMatroska {
        /// Path of the offending container.
        path: String,
        /// The container's probed format name.
        format: String,
    },

    /// A mux job with no tracks was executed.
    #[error("Mux job has no tracks")]
    EmptyJob,

    /// A domain precondition was violated, checked before any subprocess
    /// ran.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// An option value does not fit the option it was stored under.
    #[error("Invalid value for option {option}: {message}")]
    InvalidOption {
        /// Name of the offending option.
        option: String,
        /// Human-readable error description.
        message: String,
    },

    /// Character set detection failed or was not confident enough.
    #[error("Charset detection failed for '{path}': {message}")]
    Charset {
        /// Path of the file that was analyzed.
        path: String,
        /// Human-readable error description.
        message: String,
    },

    /// An external tool (ffprobe, mkvmerge, etc.) returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Media probing failed.
    #[error("Probe error: {0}")]
    Probe(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Convenience constructor for [`Error::Selector`].
    pub fn selector(fragment: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Selector {
            fragment: fragment.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::InvalidOption`].
    pub fn invalid_option(option: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidOption {
            option: option.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
