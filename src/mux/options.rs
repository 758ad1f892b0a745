//! Mux option kinds and their CLI argument formatting.
//!
//! Every option variant carries its mkvmerge flag name and a formatting
//! style (bare flag, id-only, `index:0|1`, or `index:value`). Options are
//! stored in `BTreeMap`s keyed by these enums, so iterating a scope's map
//! emits options in the canonical order: strings, then booleans, then
//! id-only flags.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Accepted value types for mux options.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Str(String),
    Bool(bool),
    Path(PathBuf),
}

impl OptionValue {
    /// Truthiness used by bare-flag and id-only options: an explicit
    /// `Bool(false)` suppresses the flag, anything else emits it.
    fn is_truthy(&self) -> bool {
        !matches!(self, OptionValue::Bool(false))
    }

    fn as_text(&self) -> Option<String> {
        match self {
            OptionValue::Str(s) => Some(s.clone()),
            OptionValue::Path(p) => Some(p.display().to_string()),
            OptionValue::Bool(_) => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<PathBuf> for OptionValue {
    fn from(value: PathBuf) -> Self {
        OptionValue::Path(value)
    }
}

/// Options for the output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputOption {
    /// General title for the output file, e.g. the movie name.
    Title,
}

impl OutputOption {
    /// The mkvmerge flag for this option.
    pub fn flag(&self) -> &'static str {
        match self {
            OutputOption::Title => "--title",
        }
    }

    pub(crate) fn format_args(&self, value: &OptionValue) -> mkx_core::Result<Vec<String>> {
        let text = value.as_text().ok_or_else(|| {
            mkx_core::Error::invalid_option(self.flag(), "expected a string value")
        })?;
        Ok(vec![self.flag().to_string(), text])
    }
}

/// Options for source containers used as mux input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContainerOption {
    /// Don't copy chapters from this file.
    NoChapters,
    /// Don't copy attachments from this file.
    NoAttachments,
    /// Don't copy global tags from this file.
    NoGlobalTags,
    /// Don't copy any track specific tags from this file.
    NoTrackTags,
}

impl ContainerOption {
    /// The mkvmerge flag for this option.
    pub fn flag(&self) -> &'static str {
        match self {
            ContainerOption::NoChapters => "--no-chapters",
            ContainerOption::NoAttachments => "--no-attachments",
            ContainerOption::NoGlobalTags => "--no-global-tags",
            ContainerOption::NoTrackTags => "--no-track-tags",
        }
    }

    pub(crate) fn format_args(&self, value: &OptionValue) -> Vec<String> {
        if value.is_truthy() {
            vec![self.flag().to_string()]
        } else {
            Vec::new()
        }
    }
}

/// Options for muxed tracks.
///
/// Declaration order is the canonical emission order: string options, then
/// boolean flags, then id-only options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackOption {
    // String track attributes
    /// Track name.
    Name,
    /// Track language. Both ISO 639-2 language codes and ISO 639-1 country
    /// codes are allowed; mkvmerge converts country codes automatically.
    Language,
    /// Read tags for the track from the given file.
    Tags,
    /// Character set for the conversion to UTF-8 for text subtitles.
    Charset,

    // Boolean track flags
    /// This track is eligible to be played by default.
    Default,
    /// Legacy option for compatibility. Best not to be used.
    Enabled,
    /// This track contains onscreen text or foreign-language dialogue.
    Forced,
    /// This track is suitable for users with hearing impairments.
    HearingImpaired,
    /// This track is suitable for users with visual impairments.
    VisualImpaired,
    /// This track contains textual descriptions of video content.
    TextDescriptions,
    /// This track is in the content's original language (not a translation).
    OriginalLanguage,
    /// This track contains commentary.
    Commentary,

    // Id-only flags
    /// Drop all HD extensions from an audio track and keep only its lossy
    /// core. Only works for DTS tracks.
    ReduceToCore,
}

/// How a [`TrackOption`]'s value renders into CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackOptionStyle {
    /// `--flag index:value`
    String,
    /// `--flag index:0|1`
    Boolean,
    /// `--flag index`
    IdOnly,
}

impl TrackOption {
    /// The mkvmerge flag for this option.
    pub fn flag(&self) -> &'static str {
        match self {
            TrackOption::Name => "--track-name",
            TrackOption::Language => "--language",
            TrackOption::Tags => "--tags",
            TrackOption::Charset => "--sub-charset",
            TrackOption::Default => "--default-track-flag",
            TrackOption::Enabled => "--track-enabled-flag",
            TrackOption::Forced => "--forced-display-flag",
            TrackOption::HearingImpaired => "--hearing-impaired-flag",
            TrackOption::VisualImpaired => "--visual-impaired-flag",
            TrackOption::TextDescriptions => "--text-descriptions-flag",
            TrackOption::OriginalLanguage => "--original-flag",
            TrackOption::Commentary => "--commentary-flag",
            TrackOption::ReduceToCore => "--reduce-to-core",
        }
    }

    fn style(&self) -> TrackOptionStyle {
        match self {
            TrackOption::Name | TrackOption::Language | TrackOption::Tags | TrackOption::Charset => {
                TrackOptionStyle::String
            }
            TrackOption::Default
            | TrackOption::Enabled
            | TrackOption::Forced
            | TrackOption::HearingImpaired
            | TrackOption::VisualImpaired
            | TrackOption::TextDescriptions
            | TrackOption::OriginalLanguage
            | TrackOption::Commentary => TrackOptionStyle::Boolean,
            TrackOption::ReduceToCore => TrackOptionStyle::IdOnly,
        }
    }

    pub(crate) fn format_args(
        &self,
        value: &OptionValue,
        track_index: u32,
    ) -> mkx_core::Result<Vec<String>> {
        match self.style() {
            TrackOptionStyle::String => {
                let text = value.as_text().ok_or_else(|| {
                    mkx_core::Error::invalid_option(self.flag(), "expected a string value")
                })?;
                Ok(vec![self.flag().to_string(), format!("{track_index}:{text}")])
            }
            TrackOptionStyle::Boolean => match value {
                OptionValue::Bool(b) => Ok(vec![
                    self.flag().to_string(),
                    format!("{track_index}:{}", *b as u8),
                ]),
                _ => Err(mkx_core::Error::invalid_option(
                    self.flag(),
                    "expected a boolean value",
                )),
            },
            TrackOptionStyle::IdOnly => {
                if value.is_truthy() {
                    Ok(vec![self.flag().to_string(), track_index.to_string()])
                } else {
                    Ok(Vec::new())
                }
            }
        }
    }
}

/// Accumulated output-scope options.
pub type OutputOptions = BTreeMap<OutputOption, OptionValue>;
/// Accumulated container-scope options.
pub type ContainerOptions = BTreeMap<ContainerOption, OptionValue>;
/// Accumulated track-scope options.
pub type TrackOptions = BTreeMap<TrackOption, OptionValue>;
