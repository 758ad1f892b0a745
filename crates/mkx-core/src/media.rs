//! Media-domain enums shared across the mkx crates.
//!
//! All enums serialize in lowercase (via `serde(rename_all = "lowercase")`)
//! and implement `Display` manually for consistent string representation.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TrackType
// ---------------------------------------------------------------------------

/// Base type of a track within a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Video,
    Audio,
    Subtitle,
    Attachment,
}

impl TrackType {
    /// The three types that can be carried as mux sources, in the canonical
    /// bucket order used by command generation.
    pub const MUXABLE: [TrackType; 3] = [TrackType::Video, TrackType::Audio, TrackType::Subtitle];
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
            Self::Subtitle => write!(f, "subtitle"),
            Self::Attachment => write!(f, "attachment"),
        }
    }
}

// ---------------------------------------------------------------------------
// HdrFormat
// ---------------------------------------------------------------------------

/// Recognized HDR formats. A video track may carry several at once
/// (e.g. HDR10 base layer plus Dolby Vision enhancement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HdrFormat {
    Hdr10,
    #[serde(rename = "hdr10plus")]
    Hdr10Plus,
    #[serde(rename = "dolbyvision")]
    DolbyVision,
    Hlg,
}

impl fmt::Display for HdrFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hdr10 => write!(f, "hdr10"),
            Self::Hdr10Plus => write!(f, "hdr10plus"),
            Self::DolbyVision => write!(f, "dolbyvision"),
            Self::Hlg => write!(f, "hlg"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_type_display_and_serde() {
        assert_eq!(TrackType::Video.to_string(), "video");
        assert_eq!(TrackType::Subtitle.to_string(), "subtitle");
        let json = serde_json::to_string(&TrackType::Attachment).unwrap();
        assert_eq!(json, r#""attachment""#);
        let back: TrackType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TrackType::Attachment);
    }

    #[test]
    fn muxable_bucket_order() {
        assert_eq!(
            TrackType::MUXABLE,
            [TrackType::Video, TrackType::Audio, TrackType::Subtitle]
        );
    }

    #[test]
    fn hdr_format_display_and_serde() {
        assert_eq!(HdrFormat::Hdr10Plus.to_string(), "hdr10plus");
        assert_eq!(HdrFormat::DolbyVision.to_string(), "dolbyvision");

        let json = serde_json::to_string(&HdrFormat::Hdr10Plus).unwrap();
        assert_eq!(json, r#""hdr10plus""#);
        let back: HdrFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HdrFormat::Hdr10Plus);
    }

    #[test]
    fn enum_equality_and_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(TrackType::Video);
        set.insert(TrackType::Audio);
        assert!(set.contains(&TrackType::Video));
        assert_eq!(set.len(), 2);
    }
}
