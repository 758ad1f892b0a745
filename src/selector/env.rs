//! Per-track variable environment for selector expressions.
//!
//! The variable names are part of the selector contract; scripts written
//! against one version of the tool must keep selecting the same tracks.

use mkx_core::{HdrFormat, TrackType};
use mkx_probe::{Track, SUBTITLE_IMAGE_CODECS};

use super::expr::Value;

/// Evaluation environment binding one track's values to the selector
/// variable names.
pub(crate) struct Env<'a> {
    track: &'a Track,
}

impl<'a> Env<'a> {
    pub(crate) fn new(track: &'a Track) -> Self {
        Self { track }
    }

    fn lang(&self) -> String {
        self.track.language.clone().unwrap_or_default()
    }

    fn codec_lower(&self) -> String {
        self.track.codec_name.to_lowercase()
    }

    fn profile_lower(&self) -> String {
        self.track
            .profile
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
    }

    fn has_hdr_format(&self, format: HdrFormat) -> Result<bool, String> {
        self.track
            .hdr_formats()
            .map(|formats| formats.contains(&format))
            .map_err(|e| e.to_string())
    }

    /// Resolve a selector variable by name.
    pub(crate) fn lookup(&self, name: &str) -> Result<Value, String> {
        let track = self.track;
        let value = match name {
            // Convenience values
            "index" => Value::Int(track.index as i64),
            "typeIndex" => Value::Int(track.type_index as i64),
            "lang" => Value::Str(self.lang()),
            "name" => Value::Str(track.name.clone().unwrap_or_default()),
            "codec" => Value::Str(track.codec_name.clone()),

            // Convenience flags
            "isVideo" => Value::Bool(track.track_type == TrackType::Video),
            "isAudio" => Value::Bool(track.track_type == TrackType::Audio),
            "isSubtitle" => Value::Bool(track.track_type == TrackType::Subtitle),
            "isEnglish" => {
                let lang = self.lang().to_lowercase();
                Value::Bool(lang == "en" || lang == "eng")
            }

            // Disposition flags
            "isDefault" => Value::Bool(track.flags.default),
            "isForced" => Value::Bool(track.flags.forced),
            "isHI" => Value::Bool(track.flags.hearing_impaired),
            "isCommentary" => Value::Bool(track.flags.commentary),

            // Video track flags
            "isHEVC" => Value::Bool(self.codec_lower().contains("hevc")),
            "isAVC" => Value::Bool(self.codec_lower().contains("avc")),
            "isHDR" => Value::Bool(track.is_hdr().map_err(|e| e.to_string())?),
            "isDoVi" => Value::Bool(self.has_hdr_format(HdrFormat::DolbyVision)?),
            "isHDR10Plus" => Value::Bool(self.has_hdr_format(HdrFormat::Hdr10Plus)?),

            // Audio track flags
            "isAAC" => Value::Bool(self.codec_lower().contains("aac")),
            "isAC3" => {
                let codec = self.codec_lower();
                Value::Bool(codec.contains("ac3") && !codec.contains("eac3"))
            }
            "isEAC3" => Value::Bool(self.codec_lower().contains("eac3")),
            "isDTS" => Value::Bool(self.codec_lower().contains("dts")),
            "isDTSHD" => Value::Bool(
                self.codec_lower().contains("dts") && self.profile_lower().contains("hd"),
            ),
            "isTrueHD" => Value::Bool(self.codec_lower().contains("truehd")),

            // Subtitle track flags
            "isImage" => {
                Value::Bool(SUBTITLE_IMAGE_CODECS.contains(&track.codec_name.as_str()))
            }
            "isText" => {
                Value::Bool(!SUBTITLE_IMAGE_CODECS.contains(&track.codec_name.as_str()))
            }

            "track" => {
                return Err(
                    "'track' must be used with a field access, e.g. track.channels".to_string(),
                );
            }
            _ => return Err(format!("unknown variable '{name}'")),
        };
        Ok(value)
    }

    /// Resolve a `track.<field>` access.
    pub(crate) fn field(&self, name: &str) -> Result<Value, String> {
        let track = self.track;
        let value = match name {
            "index" => Value::Int(track.index as i64),
            "typeIndex" => Value::Int(track.type_index as i64),
            "type" => Value::Str(track.track_type.to_string()),
            "codec" => Value::Str(track.codec_name.clone()),
            "lang" => Value::Str(self.lang()),
            "name" => Value::Str(track.name.clone().unwrap_or_default()),
            "profile" => Value::Str(track.profile.clone().unwrap_or_default()),
            "channels" => Value::Int(track.channels.unwrap_or(0) as i64),
            "width" => Value::Int(track.width.unwrap_or(0) as i64),
            "height" => Value::Int(track.height.unwrap_or(0) as i64),
            _ => return Err(format!("unknown track field '{name}'")),
        };
        Ok(value)
    }
}
