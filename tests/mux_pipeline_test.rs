//! End-to-end mux pipeline tests: select tracks, accumulate options, run
//! the heuristic passes, and check the exact mkvmerge argument vector.

mod common;

use common::{make_container, TrackSpec};
use mkx::prelude::*;
use mkx::{OptionValue, TrackOption, TrackOptions};

fn remux_source() -> Container {
    make_container(
        "/films/movie.mkv",
        vec![
            TrackSpec::new(TrackType::Video, "hevc").lang("eng").named("Feature"),
            TrackSpec::new(TrackType::Audio, "truehd").lang("eng"),
            TrackSpec::new(TrackType::Audio, "ac3")
                .lang("eng")
                .named("Director's Commentary"),
            TrackSpec::new(TrackType::Audio, "aac").lang("jpn"),
            TrackSpec::new(TrackType::Subtitle, "subrip").lang("eng").named("English SDH"),
            TrackSpec::new(TrackType::Subtitle, "subrip").lang("eng"),
        ],
    )
}

#[test]
fn select_then_mux_produces_expected_arguments() {
    let container = remux_source();

    // Keep video plus English audio that is not commentary.
    let selected = container
        .select_tracks("+isVideo:+isAudio and isEnglish:-'commentary' in name")
        .unwrap();
    let picked: Vec<u32> = selected.iter().map(|t| t.index).collect();
    assert_eq!(picked, vec![0, 1]);

    let mut job = MuxJob::new("/out/movie.mkv");
    for track in &selected {
        job.append_track(track, None).unwrap();
    }

    let args = job.generate_args().unwrap();
    assert_eq!(
        args,
        vec![
            "--output",
            "/out/movie.mkv",
            "--video-tracks",
            "0",
            "--audio-tracks",
            "1",
            "--no-subtitles",
            "/films/movie.mkv",
            "--track-order",
            "0:0,0:1",
        ]
    );
}

#[test]
fn heuristic_passes_shape_the_final_arguments() {
    let container = remux_source();
    let mut job = MuxJob::new("/out/movie.mkv");
    for track in container.select_tracks("all").unwrap() {
        job.append_track(track, None).unwrap();
    }

    job.infer_flags_from_name();
    job.assign_default_flags();
    job.assign_sensible_names();

    let args = job.generate_args().unwrap();

    // The plain TrueHD track wins default among English audio; the
    // commentary track is pushed out and labelled by its existing name.
    assert!(args.contains(&"--default-track-flag".to_string()));
    let joined = args.join(" ");
    assert!(joined.contains("--default-track-flag 1:1"), "args: {joined}");
    assert!(joined.contains("--default-track-flag 2:0"), "args: {joined}");
    assert!(joined.contains("--commentary-flag 2:1"), "args: {joined}");
    // Japanese audio is its own partition, so it defaults too.
    assert!(joined.contains("--default-track-flag 3:1"), "args: {joined}");
    // The SDH subtitle picked up the hearing-impaired flag and the fixed
    // name, and the plain English subtitle won the subtitle default.
    assert!(joined.contains("--hearing-impaired-flag 4:1"), "args: {joined}");
    assert!(joined.contains("--track-name 4:SDH"), "args: {joined}");
    assert!(joined.contains("--default-track-flag 5:1"), "args: {joined}");
    // Lone video track loses its probed name.
    assert!(joined.contains("--track-name 0:"), "args: {joined}");
}

#[test]
fn multi_container_remux_keeps_add_order() {
    let movie = remux_source();
    let extra_subs = make_container(
        "/subs/movie.eng.mkv",
        vec![TrackSpec::new(TrackType::Subtitle, "subrip").lang("eng")],
    );

    let mut job = MuxJob::new("/out/movie.mkv");
    job.append_track(&movie.tracks[0], None).unwrap();
    job.append_track(&extra_subs.tracks[0], None).unwrap();
    job.append_track(&movie.tracks[1], None).unwrap();

    let args = job.generate_args().unwrap();
    let order_pos = args.iter().position(|a| a == "--track-order").unwrap();
    assert_eq!(args[order_pos + 1], "0:0,1:0,0:1");

    // Containers appear in first-use order.
    let movie_pos = args.iter().position(|a| a == "/films/movie.mkv").unwrap();
    let subs_pos = args.iter().position(|a| a == "/subs/movie.eng.mkv").unwrap();
    assert!(movie_pos < subs_pos);
}

#[test]
fn explicit_options_override_heuristics() {
    let container = remux_source();
    let mut job = MuxJob::new("/out/movie.mkv");
    for track in container.select_tracks("+isAudio and isEnglish").unwrap() {
        job.append_track(track, None).unwrap();
    }

    // Force the commentary track to be treated as plain audio.
    let mut overrides = TrackOptions::new();
    overrides.insert(TrackOption::Commentary, OptionValue::Bool(false));
    overrides.insert(TrackOption::Name, OptionValue::Str(String::new()));
    job.update_track_options(&container.tracks[2], overrides);

    job.infer_flags_from_name();
    job.assign_default_flags();

    // The name override hid "commentary" from the inference pass, so the
    // track competes for default and loses only by order.
    let joined = job.generate_args().unwrap().join(" ");
    assert!(joined.contains("--default-track-flag 1:1"), "args: {joined}");
    assert!(joined.contains("--default-track-flag 2:0"), "args: {joined}");
    assert!(joined.contains("--commentary-flag 2:0"), "args: {joined}");
}

#[test]
fn generation_does_not_consume_the_job() {
    let container = remux_source();
    let mut job = MuxJob::new("/out/movie.mkv");
    job.append_track(&container.tracks[0], None).unwrap();

    let first = job.generate_args().unwrap();
    let second = job.generate_args().unwrap();
    assert_eq!(first, second);

    // The job can keep accumulating after generation.
    job.append_track(&container.tracks[1], None).unwrap();
    let third = job.generate_args().unwrap();
    assert_ne!(first, third);
}
