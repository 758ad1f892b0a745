//! Matroska header editing via mkvpropedit.
//!
//! An [`EditJob`] collects tag, chapter, container-title and per-track
//! property changes, then renders and runs one mkvpropedit invocation.
//! Only Matroska containers can be edited; the gate runs at construction,
//! before any change is staged.

use std::path::{Path, PathBuf};

use mkx_av::{ToolCommand, ToolRegistry};
use mkx_probe::{Container, Track};

/// Selector for tags in a container that aren't bound to one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSelector {
    /// The tags of all tracks in the container.
    All,
    /// The global container tags.
    Global,
}

impl TagSelector {
    fn as_str(&self) -> &'static str {
        match self {
            TagSelector::All => "all",
            TagSelector::Global => "global",
        }
    }
}

/// Boolean track flags editable through mkvpropedit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackFlag {
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
}

impl TrackFlag {
    /// The mkvpropedit property name for this flag.
    pub fn property_name(&self) -> &'static str {
        match self {
            TrackFlag::Default => "flag-default",
            TrackFlag::Enabled => "flag-enabled",
            TrackFlag::Forced => "flag-forced",
            TrackFlag::HearingImpaired => "flag-hearing-impaired",
            TrackFlag::VisualImpaired => "flag-visual-impaired",
            TrackFlag::TextDescriptions => "flag-text-descriptions",
            TrackFlag::OriginalLanguage => "flag-original",
            TrackFlag::Commentary => "flag-commentary",
        }
    }
}

/// Common string track properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackProperty {
    Name,
    Language,
    LanguageIetf,
}

impl TrackProperty {
    /// The mkvpropedit property name for this property.
    pub fn property_name(&self) -> &'static str {
        match self {
            TrackProperty::Name => "name",
            TrackProperty::Language => "language",
            TrackProperty::LanguageIetf => "language-ietf",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyAction {
    Add,
    Set,
    Delete,
}

#[derive(Debug, Clone)]
enum TagTarget {
    Selector(TagSelector),
    Track(u32),
}

#[derive(Debug, Clone)]
struct TrackEdit {
    property: String,
    action: PropertyAction,
    value: Option<String>,
}

/// A staged set of header edits against one Matroska container.
#[derive(Debug, Clone)]
pub struct EditJob {
    container_path: PathBuf,
    tag_actions: Vec<(PropertyAction, TagTarget, Option<PathBuf>)>,
    chapter_action: Option<(PropertyAction, Option<PathBuf>)>,
    container_title_action: Option<(PropertyAction, Option<String>)>,
    track_actions: Vec<(u32, Vec<TrackEdit>)>,
}

/// Render a track's mkvpropedit edit selector. mkvpropedit numbers tracks
/// from 1.
fn track_selector(track: &Track) -> String {
    format!("track:{}", track.index + 1)
}

fn property_arguments(
    action: PropertyAction,
    property_name: &str,
    property_value: Option<&str>,
) -> Vec<String> {
    match action {
        PropertyAction::Add => vec![
            "--add".to_string(),
            format!("{property_name}={}", property_value.unwrap_or_default()),
        ],
        PropertyAction::Set => vec![
            "--set".to_string(),
            format!("{property_name}={}", property_value.unwrap_or_default()),
        ],
        PropertyAction::Delete => vec!["--delete".to_string(), property_name.to_string()],
    }
}

impl EditJob {
    /// Stage a new edit job for the given container.
    ///
    /// # Errors
    ///
    /// [`mkx_core::Error::NotMatroska`] for any other container format.
    pub fn new(container: &Container) -> mkx_core::Result<Self> {
        container.require_matroska()?;
        Ok(Self {
            container_path: container.path().to_path_buf(),
            tag_actions: Vec::new(),
            chapter_action: None,
            container_title_action: None,
            track_actions: Vec::new(),
        })
    }

    fn check_track(&self, track: &Track) -> mkx_core::Result<()> {
        if track.source != self.container_path {
            return Err(mkx_core::Error::ForeignTrack {
                track: track.ident(),
                container: self.container_path.display().to_string(),
            });
        }
        Ok(())
    }

    fn track_edits(&mut self, track: &Track) -> &mut Vec<TrackEdit> {
        let position = self
            .track_actions
            .iter()
            .position(|(index, _)| *index == track.index);
        match position {
            Some(position) => &mut self.track_actions[position].1,
            None => {
                self.track_actions.push((track.index, Vec::new()));
                &mut self.track_actions.last_mut().unwrap().1
            }
        }
    }

    // -- tags ---------------------------------------------------------------

    /// Set tags from a file; globally, for all tracks, or for one track.
    pub fn set_tags(&mut self, selector: TagSelector, path: impl Into<PathBuf>) {
        self.tag_actions
            .push((PropertyAction::Set, TagTarget::Selector(selector), Some(path.into())));
    }

    /// Set tags from a file for a single track.
    pub fn set_track_tags(&mut self, track: &Track, path: impl Into<PathBuf>) -> mkx_core::Result<()> {
        self.check_track(track)?;
        self.tag_actions.push((
            PropertyAction::Set,
            TagTarget::Track(track.index),
            Some(path.into()),
        ));
        Ok(())
    }

    /// Delete tags; globally or for all tracks.
    pub fn delete_tags(&mut self, selector: TagSelector) {
        self.tag_actions
            .push((PropertyAction::Delete, TagTarget::Selector(selector), None));
    }

    /// Delete the tags of a single track.
    pub fn delete_track_tags(&mut self, track: &Track) -> mkx_core::Result<()> {
        self.check_track(track)?;
        self.tag_actions
            .push((PropertyAction::Delete, TagTarget::Track(track.index), None));
        Ok(())
    }

    // -- chapters -----------------------------------------------------------

    /// Set the container's chapters from a file. Mutually exclusive with
    /// [`EditJob::delete_chapters`]; the last call wins.
    pub fn set_chapters(&mut self, path: impl Into<PathBuf>) {
        self.chapter_action = Some((PropertyAction::Set, Some(path.into())));
    }

    /// Remove all chapters from the container.
    pub fn delete_chapters(&mut self) {
        self.chapter_action = Some((PropertyAction::Delete, None));
    }

    // -- container title ----------------------------------------------------

    /// Set a new title for the container.
    pub fn set_container_title(&mut self, title: impl Into<String>) {
        self.container_title_action = Some((PropertyAction::Set, Some(title.into())));
    }

    /// Delete the container's title property.
    pub fn delete_container_title(&mut self) {
        self.container_title_action = Some((PropertyAction::Delete, None));
    }

    // -- track flags and properties -----------------------------------------

    /// Set a boolean flag on a track.
    pub fn set_track_flag(
        &mut self,
        track: &Track,
        flag: TrackFlag,
        value: bool,
    ) -> mkx_core::Result<()> {
        self.check_track(track)?;
        self.track_edits(track).push(TrackEdit {
            property: flag.property_name().to_string(),
            action: PropertyAction::Set,
            value: Some((value as u8).to_string()),
        });
        Ok(())
    }

    /// Delete a flag from a track.
    pub fn delete_track_flag(&mut self, track: &Track, flag: TrackFlag) -> mkx_core::Result<()> {
        self.check_track(track)?;
        self.track_edits(track).push(TrackEdit {
            property: flag.property_name().to_string(),
            action: PropertyAction::Delete,
            value: None,
        });
        Ok(())
    }

    /// Set a string property on a track.
    pub fn set_track_property(
        &mut self,
        track: &Track,
        property: TrackProperty,
        value: impl Into<String>,
    ) -> mkx_core::Result<()> {
        self.set_track_property_named(track, property.property_name(), value)
    }

    /// Set an arbitrary named property on a track.
    pub fn set_track_property_named(
        &mut self,
        track: &Track,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> mkx_core::Result<()> {
        self.check_track(track)?;
        self.track_edits(track).push(TrackEdit {
            property: property.into(),
            action: PropertyAction::Set,
            value: Some(value.into()),
        });
        Ok(())
    }

    /// Add a value to a multi-value track property. Only certain properties
    /// support multiple values; for everything else use
    /// [`EditJob::set_track_property`].
    pub fn add_track_property(
        &mut self,
        track: &Track,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> mkx_core::Result<()> {
        self.check_track(track)?;
        self.track_edits(track).push(TrackEdit {
            property: property.into(),
            action: PropertyAction::Add,
            value: Some(value.into()),
        });
        Ok(())
    }

    /// Delete a property from a track.
    pub fn delete_track_property(
        &mut self,
        track: &Track,
        property: TrackProperty,
    ) -> mkx_core::Result<()> {
        self.check_track(track)?;
        self.track_edits(track).push(TrackEdit {
            property: property.property_name().to_string(),
            action: PropertyAction::Delete,
            value: None,
        });
        Ok(())
    }

    // -- generation + execution ---------------------------------------------

    /// Generate the full mkvpropedit argument vector for this job.
    pub fn generate_args(&self) -> Vec<String> {
        let mut arguments = vec![self.container_path.display().to_string()];

        for (action, target, path) in &self.tag_actions {
            let selector = match target {
                TagTarget::Selector(selector) => selector.as_str().to_string(),
                TagTarget::Track(index) => format!("track:{}", index + 1),
            };
            match action {
                PropertyAction::Set => {
                    let path = path.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
                    arguments.push("--tags".to_string());
                    arguments.push(format!("{selector}:{path}"));
                }
                PropertyAction::Delete => {
                    arguments.push("--tags".to_string());
                    arguments.push(format!("{selector}:"));
                }
                PropertyAction::Add => {}
            }
        }

        if let Some((action, path)) = &self.chapter_action {
            arguments.push("--chapters".to_string());
            match action {
                PropertyAction::Set => {
                    arguments.push(path.as_ref().map(|p| p.display().to_string()).unwrap_or_default());
                }
                _ => arguments.push(String::new()),
            }
        }

        if let Some((action, title)) = &self.container_title_action {
            arguments.push("--edit".to_string());
            arguments.push("info".to_string());
            arguments.extend(property_arguments(*action, "title", title.as_deref()));
        }

        for (index, edits) in &self.track_actions {
            arguments.push("--edit".to_string());
            arguments.push(format!("track:{}", index + 1));
            for edit in edits {
                arguments.extend(property_arguments(
                    edit.action,
                    &edit.property,
                    edit.value.as_deref(),
                ));
            }
        }

        arguments
    }

    /// Run mkvpropedit for this job.
    pub fn run(&self, registry: &ToolRegistry, foreground: bool) -> mkx_core::Result<()> {
        let arguments = self.generate_args();
        let mkvpropedit = registry.require("mkvpropedit")?;

        tracing::info!(
            container = %self.container_path.display(),
            "running mkvpropedit"
        );

        let mut cmd = ToolCommand::new(mkvpropedit.path.clone());
        cmd.args(arguments);
        if foreground {
            cmd.execute_foreground_blocking()?;
        } else {
            cmd.execute_blocking()?;
        }
        Ok(())
    }

    /// Path of the container this job edits.
    pub fn container_path(&self) -> &Path {
        &self.container_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::make_container;
    use assert_matches::assert_matches;
    use mkx_core::TrackType;

    fn matroska() -> Container {
        make_container(
            "/films/movie.mkv",
            &[
                (TrackType::Video, "eng"),
                (TrackType::Audio, "eng"),
                (TrackType::Subtitle, "eng"),
            ],
        )
    }

    #[test]
    fn non_matroska_is_rejected() {
        let mut container = matroska();
        container.format.format_name = "mov,mp4,m4a,3gp".to_string();
        assert_matches!(
            EditJob::new(&container),
            Err(mkx_core::Error::NotMatroska { .. })
        );
    }

    #[test]
    fn foreign_track_is_rejected() {
        let container = matroska();
        let other = make_container("/films/other.mkv", &[(TrackType::Audio, "jpn")]);
        let mut job = EditJob::new(&container).unwrap();
        let err = job
            .set_track_flag(&other.tracks[0], TrackFlag::Default, true)
            .unwrap_err();
        assert_matches!(err, mkx_core::Error::ForeignTrack { .. });
    }

    #[test]
    fn filename_leads_the_arguments() {
        let container = matroska();
        let job = EditJob::new(&container).unwrap();
        let args = job.generate_args();
        assert_eq!(args, vec!["/films/movie.mkv"]);
    }

    #[test]
    fn track_selector_is_one_based() {
        let container = matroska();
        let mut job = EditJob::new(&container).unwrap();
        job.set_track_flag(&container.tracks[2], TrackFlag::Forced, true)
            .unwrap();

        let args = job.generate_args();
        assert_eq!(
            args,
            vec![
                "/films/movie.mkv",
                "--edit",
                "track:3",
                "--set",
                "flag-forced=1",
            ]
        );
    }

    #[test]
    fn flag_values_render_as_zero_one() {
        let container = matroska();
        let mut job = EditJob::new(&container).unwrap();
        job.set_track_flag(&container.tracks[1], TrackFlag::Default, false)
            .unwrap();
        let args = job.generate_args();
        assert!(args.contains(&"flag-default=0".to_string()));
    }

    #[test]
    fn multiple_edits_to_one_track_share_a_selector() {
        let container = matroska();
        let mut job = EditJob::new(&container).unwrap();
        job.set_track_property(&container.tracks[1], TrackProperty::Name, "Surround 5.1")
            .unwrap();
        job.set_track_flag(&container.tracks[1], TrackFlag::Default, true)
            .unwrap();

        let args = job.generate_args();
        let edit_count = args.iter().filter(|a| *a == "--edit").count();
        assert_eq!(edit_count, 1);
        assert_eq!(
            args,
            vec![
                "/films/movie.mkv",
                "--edit",
                "track:2",
                "--set",
                "name=Surround 5.1",
                "--set",
                "flag-default=1",
            ]
        );
    }

    #[test]
    fn container_title_edit() {
        let container = matroska();
        let mut job = EditJob::new(&container).unwrap();
        job.set_container_title("A Movie");
        assert_eq!(
            job.generate_args(),
            vec!["/films/movie.mkv", "--edit", "info", "--set", "title=A Movie"]
        );

        job.delete_container_title();
        assert_eq!(
            job.generate_args(),
            vec!["/films/movie.mkv", "--edit", "info", "--delete", "title"]
        );
    }

    #[test]
    fn chapter_actions() {
        let container = matroska();
        let mut job = EditJob::new(&container).unwrap();
        job.set_chapters("/tmp/chapters.xml");
        assert_eq!(
            job.generate_args(),
            vec!["/films/movie.mkv", "--chapters", "/tmp/chapters.xml"]
        );

        job.delete_chapters();
        assert_eq!(
            job.generate_args(),
            vec!["/films/movie.mkv", "--chapters", ""]
        );
    }

    #[test]
    fn tag_actions() {
        let container = matroska();
        let mut job = EditJob::new(&container).unwrap();
        job.set_tags(TagSelector::Global, "/tmp/tags.xml");
        job.delete_tags(TagSelector::All);
        job.delete_track_tags(&container.tracks[0]).unwrap();

        assert_eq!(
            job.generate_args(),
            vec![
                "/films/movie.mkv",
                "--tags",
                "global:/tmp/tags.xml",
                "--tags",
                "all:",
                "--tags",
                "track:1:",
            ]
        );
    }

    #[test]
    fn delete_then_set_language_property() {
        let container = matroska();
        let mut job = EditJob::new(&container).unwrap();
        job.delete_track_property(&container.tracks[1], TrackProperty::LanguageIetf)
            .unwrap();
        job.set_track_property(&container.tracks[1], TrackProperty::Language, "jpn")
            .unwrap();

        assert_eq!(
            job.generate_args(),
            vec![
                "/films/movie.mkv",
                "--edit",
                "track:2",
                "--delete",
                "language-ietf",
                "--set",
                "language=jpn",
            ]
        );
    }

    #[test]
    fn edit_order_is_stable() {
        let container = matroska();
        let mut job = EditJob::new(&container).unwrap();
        job.set_container_title("Title");
        job.set_track_flag(&container.tracks[0], TrackFlag::Default, true)
            .unwrap();
        job.set_tags(TagSelector::Global, "/tmp/tags.xml");
        job.set_chapters("/tmp/ch.xml");

        // Tags, then chapters, then container info, then tracks, regardless
        // of staging order.
        let args = job.generate_args();
        let tags_pos = args.iter().position(|a| a == "--tags").unwrap();
        let chapters_pos = args.iter().position(|a| a == "--chapters").unwrap();
        let info_pos = args.iter().position(|a| a == "info").unwrap();
        let track_pos = args.iter().position(|a| a == "track:1").unwrap();
        assert!(tags_pos < chapters_pos);
        assert!(chapters_pos < info_pos);
        assert!(info_pos < track_pos);
    }
}
