//! Selector engine integration tests.
//!
//! Exercises the documented selection properties end to end: constant
//! forms, index/slice lists, typed sublists, and expression chains over a
//! realistic container shape.

mod common;

use common::{indices, make_container, TrackSpec};
use mkx::{select, SelectTracks, TrackType};

/// [v0(eng), a1(eng, "Commentary"), a2(jpn)]
fn commentary_movie() -> mkx::Container {
    make_container(
        "/films/movie.mkv",
        vec![
            TrackSpec::new(TrackType::Video, "hevc").lang("eng"),
            TrackSpec::new(TrackType::Audio, "ac3")
                .lang("eng")
                .named("Commentary by the director")
                .commentary(),
            TrackSpec::new(TrackType::Audio, "truehd").lang("jpn"),
        ],
    )
}

/// [v0, a1, v2, s3(forced)] for typed-sublist addressing.
fn two_video_movie() -> mkx::Container {
    make_container(
        "/films/dual.mkv",
        vec![
            TrackSpec::new(TrackType::Video, "hevc").lang("eng"),
            TrackSpec::new(TrackType::Audio, "aac").lang("eng"),
            TrackSpec::new(TrackType::Video, "h264").lang("eng"),
            TrackSpec::new(TrackType::Subtitle, "subrip").lang("eng").forced(),
        ],
    )
}

#[test]
fn all_returns_every_track_in_order() {
    let container = commentary_movie();
    let selected = container.select_tracks("all").unwrap();
    assert_eq!(indices(&selected), vec![0, 1, 2]);
}

#[test]
fn none_and_empty_return_nothing() {
    let container = commentary_movie();
    assert!(container.select_tracks("none").unwrap().is_empty());
    assert!(container.select_tracks("").unwrap().is_empty());
}

#[test]
fn selection_is_idempotent_under_all() {
    let container = commentary_movie();
    let first = container.select_tracks("+isAudio").unwrap();
    let owned: Vec<mkx::Track> = first.iter().map(|&t| t.clone()).collect();
    let again = select(&owned, "all").unwrap();
    assert_eq!(indices(&first), indices(&again));
}

#[test]
fn index_list_ignores_request_order() {
    let container = commentary_movie();
    let selected = container.select_tracks("1,0").unwrap();
    assert_eq!(indices(&selected), vec![0, 1]);
}

#[test]
fn typed_slice_and_typed_index() {
    let container = two_video_movie();
    // `v:0` addresses video sublist position 0 -> the first video track.
    assert_eq!(indices(&container.select_tracks("v:0").unwrap()), vec![0]);
    // `v1` is a literal index within the video-only sublist.
    assert_eq!(indices(&container.select_tracks("v1").unwrap()), vec![2]);
    // Slice of the video sublist.
    assert_eq!(indices(&container.select_tracks("v0:2").unwrap()), vec![0, 2]);
}

#[test]
fn expression_chain_narrows_selection() {
    let container = two_video_movie();
    let selected = container.select_tracks("+isEnglish:-isForced").unwrap();
    assert_eq!(indices(&selected), vec![0, 1, 2]);
}

#[test]
fn commentary_flag_expression() {
    let container = commentary_movie();
    let selected = container.select_tracks("+isAudio:-isCommentary").unwrap();
    assert_eq!(indices(&selected), vec![2]);
}

#[test]
fn end_to_end_commentary_scenario() {
    // fragment 1 `+isAudio`   -> selected = [a1, a2]
    // fragment 2 `-isEnglish` -> removes v0 and a1 matches; a2 remains.
    let container = commentary_movie();
    let selected = container.select_tracks("+isAudio:-isEnglish").unwrap();
    assert_eq!(indices(&selected), vec![2]);
}

#[test]
fn name_containment_expression() {
    let container = commentary_movie();
    let selected = container
        .select_tracks("+'commentary' in name")
        .unwrap();
    assert_eq!(indices(&selected), vec![1]);
}

#[test]
fn select_tracks_by_type_uses_sublist_indices() {
    let container = two_video_movie();
    let selected = container
        .select_tracks_by_type(TrackType::Video, "1")
        .unwrap();
    assert_eq!(indices(&selected), vec![2]);
}

#[test]
fn invalid_expression_is_a_selector_error() {
    let container = commentary_movie();
    let err = container.select_tracks("+lang").unwrap_err();
    assert!(matches!(err, mkx::Error::Selector { .. }));

    let err = container.select_tracks("+undefinedName").unwrap_err();
    match err {
        mkx::Error::Selector { fragment, .. } => assert_eq!(fragment, "+undefinedName"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn out_of_range_index_is_a_selector_error() {
    let container = commentary_movie();
    assert!(matches!(
        container.select_tracks("7"),
        Err(mkx::Error::Selector { .. })
    ));
}
