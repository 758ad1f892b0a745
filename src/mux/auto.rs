//! Automatic flag and name assignment for mux jobs.
//!
//! Three composable passes over a job's pending track options. They only
//! ever touch the option maps; probed [`Track`] values are read as
//! fallbacks but never mutated. The *effective* value of a flag, name or
//! language is the pending option override when present, else the track's
//! probed value.

use std::collections::HashMap;

use mkx_core::TrackType;
use mkx_probe::{Track, TrackKey};

use super::{MuxJob, OptionValue, TrackOption, TrackOptions};

impl MuxJob {
    fn effective_flag(&self, track: &Track, option: TrackOption, probed: bool) -> bool {
        match self
            .track_options
            .get(&track.key())
            .and_then(|options| options.get(&option))
        {
            Some(OptionValue::Bool(value)) => *value,
            _ => probed,
        }
    }

    fn effective_text(&self, track: &Track, option: TrackOption) -> Option<String> {
        match self
            .track_options
            .get(&track.key())
            .and_then(|options| options.get(&option))
        {
            Some(OptionValue::Str(value)) => Some(value.clone()),
            _ => None,
        }
    }

    fn effective_name(&self, track: &Track) -> String {
        self.effective_text(track, TrackOption::Name)
            .or_else(|| track.name.clone())
            .unwrap_or_default()
    }

    /// Effective language with the Matroska "undetermined" fallback.
    fn effective_language(&self, track: &Track) -> String {
        self.effective_language_raw(track)
            .unwrap_or_else(|| "und".to_string())
    }

    /// Effective language without any fallback: `None` when neither an
    /// override nor a probed tag exists.
    fn effective_language_raw(&self, track: &Track) -> Option<String> {
        self.effective_text(track, TrackOption::Language)
            .or_else(|| track.language.clone())
            .filter(|lang| !lang.is_empty())
    }

    fn update_one(&mut self, key: TrackKey, option: TrackOption, value: OptionValue) {
        self.track_options
            .entry(key)
            .or_default()
            .insert(option, value);
    }

    /// Infer disposition flags from each track's effective name.
    ///
    /// Case-insensitively: "forced" sets the forced flag, "sdh" the
    /// hearing-impaired flag, "descriptive"/"descriptions" the
    /// text-descriptions flag and "commentary" the commentary flag. The
    /// inferred flags are merged into the pending options; unrelated keys
    /// are left alone.
    pub fn infer_flags_from_name(&mut self) {
        let mut pending: Vec<(TrackKey, TrackOptions)> = Vec::new();

        for track in &self.track_order {
            let name = self.effective_name(track).to_lowercase();
            let mut updates = TrackOptions::new();
            if name.contains("forced") {
                updates.insert(TrackOption::Forced, OptionValue::Bool(true));
            }
            if name.contains("sdh") {
                updates.insert(TrackOption::HearingImpaired, OptionValue::Bool(true));
            }
            if name.contains("descriptive") || name.contains("descriptions") {
                updates.insert(TrackOption::TextDescriptions, OptionValue::Bool(true));
            }
            if name.contains("commentary") {
                updates.insert(TrackOption::Commentary, OptionValue::Bool(true));
            }
            if !updates.is_empty() {
                pending.push((track.key(), updates));
            }
        }

        for (key, updates) in pending {
            self.track_options.entry(key).or_default().extend(updates);
        }
    }

    /// Assign default-track flags by a priority policy, partitioned by
    /// (effective language, track type).
    ///
    /// Within each partition, scanning in job order: tracks that are
    /// effectively forced, hearing-impaired, commentary, or whose effective
    /// name contains "compatibility" are disqualified and explicitly set
    /// default=false. The first qualified track becomes default=true; every
    /// later qualified track gets default=false. A partition where every
    /// track was disqualified promotes its first hearing-impaired or
    /// "compatibility" track as an alternate of last resort.
    ///
    /// # Panics
    ///
    /// Panics if a non-empty partition ends up with no default track at
    /// all. That state cannot be reached through the policy above without
    /// an implementation bug, so it fails loudly instead of producing an
    /// output with no default track.
    pub fn assign_default_flags(&mut self) {
        #[derive(Default)]
        struct PartitionState {
            found_default: bool,
            fallback: Option<TrackKey>,
            tracks: usize,
        }

        let mut partitions: HashMap<(String, TrackType), PartitionState> = HashMap::new();
        let mut assignments: Vec<(TrackKey, bool)> = Vec::new();

        for track in &self.track_order {
            if !TrackType::MUXABLE.contains(&track.track_type) {
                continue;
            }

            let partition_key = (self.effective_language(track), track.track_type);
            let name = self.effective_name(track).to_lowercase();
            let forced = self.effective_flag(track, TrackOption::Forced, track.flags.forced);
            let hearing_impaired = self.effective_flag(
                track,
                TrackOption::HearingImpaired,
                track.flags.hearing_impaired,
            );
            let commentary =
                self.effective_flag(track, TrackOption::Commentary, track.flags.commentary);
            let compatibility = name.contains("compatibility");

            let state = partitions.entry(partition_key).or_default();
            state.tracks += 1;

            if forced || hearing_impaired || commentary || compatibility {
                assignments.push((track.key(), false));
                if state.fallback.is_none() && (hearing_impaired || compatibility) {
                    state.fallback = Some(track.key());
                }
            } else {
                assignments.push((track.key(), !state.found_default));
                state.found_default = true;
            }
        }

        for (key, value) in assignments {
            self.update_one(key, TrackOption::Default, OptionValue::Bool(value));
        }

        for ((language, track_type), state) in partitions {
            if state.found_default || state.tracks == 0 {
                continue;
            }
            match state.fallback {
                Some(key) => {
                    self.update_one(key, TrackOption::Default, OptionValue::Bool(true));
                }
                None => panic!(
                    "no default track candidate in partition ({language}/{track_type}); \
                     flag assignment policy is broken"
                ),
            }
        }
    }

    /// Assign sensible track names after flags have settled.
    ///
    /// A lone video track gets an empty name. Default audio/subtitle
    /// tracks with an explicit language get their name cleared (players
    /// render the language instead). Commentary audio tracks with no name
    /// are called "Commentary", and hearing-impaired subtitle tracks are
    /// called "SDH" regardless of any prior name.
    pub fn assign_sensible_names(&mut self) {
        let video_count = self
            .track_order
            .iter()
            .filter(|t| t.track_type == TrackType::Video)
            .count();

        let mut pending: Vec<(TrackKey, String)> = Vec::new();

        for track in &self.track_order {
            match track.track_type {
                TrackType::Video => {
                    if video_count <= 1 {
                        pending.push((track.key(), String::new()));
                    }
                }
                TrackType::Audio | TrackType::Subtitle => {
                    let default =
                        self.effective_flag(track, TrackOption::Default, track.flags.default);
                    let commentary =
                        self.effective_flag(track, TrackOption::Commentary, track.flags.commentary);
                    let hearing_impaired = self.effective_flag(
                        track,
                        TrackOption::HearingImpaired,
                        track.flags.hearing_impaired,
                    );

                    if default && self.effective_language_raw(track).is_some() {
                        pending.push((track.key(), String::new()));
                    }
                    if track.track_type == TrackType::Audio
                        && commentary
                        && self.effective_name(track).is_empty()
                    {
                        pending.push((track.key(), "Commentary".to_string()));
                    }
                    if track.track_type == TrackType::Subtitle && hearing_impaired {
                        pending.push((track.key(), "SDH".to_string()));
                    }
                }
                TrackType::Attachment => {}
            }
        }

        for (key, name) in pending {
            self.update_one(key, TrackOption::Name, OptionValue::Str(name));
        }
    }
}
