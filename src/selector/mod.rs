//! The track selector mini-language.
//!
//! A selector string chooses a subset of an ordered track list. Results are
//! always a subsequence of the input: original order, no duplicates.
//!
//! Three forms, tried in order:
//!
//! 1. **Constants** — `none` (or an empty selector) selects nothing; `all`
//!    selects every track.
//! 2. **Index/slice lists** — comma-delimited, no whitespace: `0,2`,
//!    `v0,a1:3`, `:-1`. A leading `v`/`a`/`s` confines the fragment to that
//!    type's sublist; indices and slice bounds wrap negative values like
//!    array slices.
//! 3. **Expression chains** — colon-delimited boolean expressions, each
//!    optionally prefixed with `+` (add matching tracks, the default) or
//!    `-` (remove matching tracks), applied left to right:
//!    `+isAudio:-isEnglish`, `+isTrueHD:+'commentary' in name`. The literal
//!    `all` is valid as a fragment. See [`expr`] for the expression
//!    language; the per-track variables are listed in the crate docs.
//!
//! All parse and evaluation failures surface as
//! [`Error::Selector`](mkx_core::Error::Selector) naming the offending
//! fragment.

mod env;
mod expr;
mod index;

use mkx_probe::{Container, Track};

use env::Env;

/// Select tracks from a list using a selector string.
///
/// See the [module docs](self) for the selector syntax.
pub fn select<'a>(tracks: &'a [Track], selector: &str) -> mkx_core::Result<Vec<&'a Track>> {
    let refs: Vec<&Track> = tracks.iter().collect();
    select_from(&refs, selector)
}

/// Select tracks from a list of references using a selector string.
pub fn select_from<'a>(tracks: &[&'a Track], selector: &str) -> mkx_core::Result<Vec<&'a Track>> {
    // "none" and the empty selector return nothing.
    if selector.is_empty() || selector == "none" {
        return Ok(Vec::new());
    }

    // ... and "all" returns every track passed in.
    if selector == "all" {
        return Ok(tracks.to_vec());
    }

    // A comma-delimited list of indices and slices.
    if let Some(fragments) = index::parse_list(selector) {
        return index::resolve(tracks, &fragments);
    }

    // Otherwise: a colon-delimited chain of boolean expressions.
    select_by_expressions(tracks, selector)
}

fn select_by_expressions<'a>(
    tracks: &[&'a Track],
    selector: &str,
) -> mkx_core::Result<Vec<&'a Track>> {
    // Selection state per input position. Position-keyed membership keeps
    // the output in original order and free of duplicates.
    let mut selected = vec![false; tracks.len()];

    for fragment in selector.split(':') {
        let (additive, expression) = match fragment.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => match fragment.strip_prefix('-') {
                Some(rest) => (false, rest),
                None => (true, fragment),
            },
        };

        let filtered: Vec<bool> = if expression == "all" {
            vec![true; tracks.len()]
        } else {
            let ast = expr::parse(expression)
                .map_err(|message| mkx_core::Error::selector(fragment, message))?;
            tracks
                .iter()
                .map(|track| expr::eval_bool(&ast, &Env::new(track)))
                .collect::<Result<_, _>>()
                .map_err(|message| mkx_core::Error::selector(fragment, message))?
        };

        for (state, matched) in selected.iter_mut().zip(&filtered) {
            if additive {
                *state = *state || *matched;
            } else {
                *state = *state && !*matched;
            }
        }
    }

    Ok(tracks
        .iter()
        .zip(&selected)
        .filter(|(_, &keep)| keep)
        .map(|(&track, _)| track)
        .collect())
}

/// Selector methods on [`Container`].
pub trait SelectTracks {
    /// Select tracks from this container using a selector string.
    fn select_tracks(&self, selector: &str) -> mkx_core::Result<Vec<&Track>>;

    /// Select tracks of a single type using a selector string. Indices in
    /// the selector address the type-filtered sublist.
    fn select_tracks_by_type(
        &self,
        track_type: mkx_core::TrackType,
        selector: &str,
    ) -> mkx_core::Result<Vec<&Track>>;
}

impl SelectTracks for Container {
    fn select_tracks(&self, selector: &str) -> mkx_core::Result<Vec<&Track>> {
        select(&self.tracks, selector)
    }

    fn select_tracks_by_type(
        &self,
        track_type: mkx_core::TrackType,
        selector: &str,
    ) -> mkx_core::Result<Vec<&Track>> {
        let filtered: Vec<&Track> = self
            .tracks
            .iter()
            .filter(|t| t.track_type == track_type)
            .collect();
        select_from(&filtered, selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkx_core::TrackType;
    use std::path::PathBuf;

    // [v0, a1(eng), a2(jpn), s3(eng, forced)]
    fn make_tracks() -> Vec<Track> {
        let mut video = Track::new(0, TrackType::Video);
        video.codec_name = "hevc".to_string();
        video.language = Some("eng".to_string());

        let mut audio_en = Track::new(1, TrackType::Audio);
        audio_en.codec_name = "truehd".to_string();
        audio_en.language = Some("eng".to_string());

        let mut audio_jp = Track::new(2, TrackType::Audio);
        audio_jp.codec_name = "aac".to_string();
        audio_jp.language = Some("jpn".to_string());

        let mut subs = Track::new(3, TrackType::Subtitle);
        subs.codec_name = "subrip".to_string();
        subs.language = Some("eng".to_string());
        subs.flags.forced = true;

        let mut tracks = vec![video, audio_en, audio_jp, subs];
        for (rank, track) in tracks.iter_mut().enumerate() {
            // Bind manually; each type appears the expected number of times.
            track.source = PathBuf::from("/films/movie.mkv");
            track.type_index = match track.track_type {
                TrackType::Audio => (rank as u32).saturating_sub(1),
                _ => 0,
            };
        }
        tracks
    }

    fn indices(selection: &[&Track]) -> Vec<u32> {
        selection.iter().map(|t| t.index).collect()
    }

    #[test]
    fn constant_forms() {
        let tracks = make_tracks();
        assert!(select(&tracks, "none").unwrap().is_empty());
        assert!(select(&tracks, "").unwrap().is_empty());
        assert_eq!(indices(&select(&tracks, "all").unwrap()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn index_list_keeps_original_order() {
        let tracks = make_tracks();
        // Request order does not matter; output is input order.
        assert_eq!(indices(&select(&tracks, "1,0").unwrap()), vec![0, 1]);
        assert_eq!(indices(&select(&tracks, "2,2,0").unwrap()), vec![0, 2]);
    }

    #[test]
    fn negative_index_wraps() {
        let tracks = make_tracks();
        assert_eq!(indices(&select(&tracks, "-1").unwrap()), vec![3]);
        assert_eq!(indices(&select(&tracks, "a-1").unwrap()), vec![2]);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let tracks = make_tracks();
        assert!(select(&tracks, "9").is_err());
        assert!(select(&tracks, "v1").is_err());
        assert!(select(&tracks, "-5").is_err());
    }

    #[test]
    fn typed_index_addresses_sublist() {
        let tracks = make_tracks();
        assert_eq!(indices(&select(&tracks, "a0").unwrap()), vec![1]);
        assert_eq!(indices(&select(&tracks, "a1").unwrap()), vec![2]);
        assert_eq!(indices(&select(&tracks, "s0").unwrap()), vec![3]);
        assert_eq!(indices(&select(&tracks, "v:0").unwrap()), vec![0]);
    }

    #[test]
    fn slices() {
        let tracks = make_tracks();
        assert_eq!(indices(&select(&tracks, "1:3").unwrap()), vec![1, 2]);
        assert_eq!(indices(&select(&tracks, ":-1").unwrap()), vec![0, 1, 2]);
        assert_eq!(indices(&select(&tracks, "a0:2").unwrap()), vec![1, 2]);
        // Out-of-range slice bounds clamp instead of erroring.
        assert_eq!(indices(&select(&tracks, "2:99").unwrap()), vec![2, 3]);
    }

    #[test]
    fn expression_chain_add_then_remove() {
        let tracks = make_tracks();
        let selected = select(&tracks, "+isAudio:-isEnglish").unwrap();
        assert_eq!(indices(&selected), vec![2]);
    }

    #[test]
    fn implicit_positive_polarity() {
        let tracks = make_tracks();
        assert_eq!(indices(&select(&tracks, "isAudio").unwrap()), vec![1, 2]);
    }

    #[test]
    fn all_as_expression_fragment() {
        let tracks = make_tracks();
        assert_eq!(
            indices(&select(&tracks, "+all:-isForced").unwrap()),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn chain_result_keeps_original_order() {
        let tracks = make_tracks();
        // Subtitles match first, then audio is added; order stays 1, 2, 3.
        let selected = select(&tracks, "+isSubtitle:+isAudio").unwrap();
        assert_eq!(indices(&selected), vec![1, 2, 3]);
    }

    #[test]
    fn selecting_twice_is_idempotent() {
        let tracks = make_tracks();
        let first = select(&tracks, "+isAudio").unwrap();
        let owned: Vec<Track> = first.iter().map(|&t| t.clone()).collect();
        let second = select(&owned, "all").unwrap();
        assert_eq!(indices(&first), indices(&second));
    }

    #[test]
    fn bad_expression_names_the_fragment() {
        let tracks = make_tracks();
        let err = select(&tracks, "+isAudio:-isBogus").unwrap_err();
        match err {
            mkx_core::Error::Selector { fragment, .. } => assert_eq!(fragment, "-isBogus"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_boolean_expression_is_an_error() {
        let tracks = make_tracks();
        assert!(select(&tracks, "lang").is_err());
        assert!(select(&tracks, "index").is_err());
    }

    #[test]
    fn select_from_filtered_refs() {
        let tracks = make_tracks();
        let audio: Vec<&Track> = tracks
            .iter()
            .filter(|t| t.track_type == TrackType::Audio)
            .collect();
        // Index 0 of the filtered list is track 1 of the container.
        assert_eq!(indices(&select_from(&audio, "0").unwrap()), vec![1]);
    }
}
