//! Index and slice list selectors.
//!
//! A selector like `0,2` or `v0,a1:3,s:-1` addresses tracks positionally:
//! each comma-separated fragment is an index or slice, optionally confined
//! to one track type's sublist. Indices and slices wrap negative values the
//! way array slices do; slices clamp, bare indices out of range are errors.

use mkx_core::TrackType;
use mkx_probe::Track;

/// Which list a fragment indexes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypePrefix {
    Full,
    Video,
    Audio,
    Subtitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Spec {
    Index(i64),
    Slice(Option<i64>, Option<i64>),
}

/// One parsed fragment of an index-list selector.
#[derive(Debug, Clone)]
pub(crate) struct Fragment {
    text: String,
    prefix: TypePrefix,
    spec: Spec,
}

/// Try to parse an entire selector as a comma-delimited index/slice list.
/// Returns `None` when the string does not match this form at all, in which
/// case the caller falls through to the expression-chain form.
pub(crate) fn parse_list(selector: &str) -> Option<Vec<Fragment>> {
    if selector.is_empty() {
        return None;
    }
    selector.split(',').map(parse_fragment).collect()
}

fn parse_fragment(text: &str) -> Option<Fragment> {
    let (prefix, rest) = match text.chars().next()? {
        'v' => (TypePrefix::Video, &text[1..]),
        'a' => (TypePrefix::Audio, &text[1..]),
        's' => (TypePrefix::Subtitle, &text[1..]),
        _ => (TypePrefix::Full, text),
    };

    // A colon directly after the type letter separates it from a bare
    // index: `v:0` addresses video track 0, same as `v0`.
    let rest = match rest.strip_prefix(':') {
        Some(stripped) if prefix != TypePrefix::Full && parse_int(stripped).is_some() => stripped,
        _ => rest,
    };

    let spec = if let Some(value) = parse_int(rest) {
        Spec::Index(value)
    } else {
        let (start, end) = rest.split_once(':')?;
        if start.is_empty() && end.is_empty() {
            return None;
        }
        let start = if start.is_empty() {
            None
        } else {
            Some(parse_int(start)?)
        };
        let end = if end.is_empty() {
            None
        } else {
            Some(parse_int(end)?)
        };
        Spec::Slice(start, end)
    };

    Some(Fragment {
        text: text.to_string(),
        prefix,
        spec,
    })
}

/// Strict signed integer: an optional `-` followed by one or more digits,
/// nothing else (no whitespace, no `+`).
fn parse_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Resolve parsed fragments against the track list. The result is emitted
/// in the original full-list order, deduplicated.
pub(crate) fn resolve<'a>(
    tracks: &[&'a Track],
    fragments: &[Fragment],
) -> mkx_core::Result<Vec<&'a Track>> {
    let mut chosen = vec![false; tracks.len()];

    for fragment in fragments {
        let positions: Vec<usize> = match fragment.prefix {
            TypePrefix::Full => (0..tracks.len()).collect(),
            TypePrefix::Video => positions_of(tracks, TrackType::Video),
            TypePrefix::Audio => positions_of(tracks, TrackType::Audio),
            TypePrefix::Subtitle => positions_of(tracks, TrackType::Subtitle),
        };
        let len = positions.len() as i64;

        match fragment.spec {
            Spec::Index(raw) => {
                let index = if raw < 0 { raw + len } else { raw };
                if index < 0 || index >= len {
                    return Err(mkx_core::Error::selector(
                        &fragment.text,
                        format!("index {raw} out of range for {len} track(s)"),
                    ));
                }
                chosen[positions[index as usize]] = true;
            }
            Spec::Slice(start, end) => {
                let start = clamp_bound(start.unwrap_or(0), len);
                let end = clamp_bound(end.unwrap_or(len), len);
                for &position in positions.iter().take(end).skip(start) {
                    chosen[position] = true;
                }
            }
        }
    }

    Ok(tracks
        .iter()
        .zip(&chosen)
        .filter(|(_, &keep)| keep)
        .map(|(&track, _)| track)
        .collect())
}

fn positions_of(tracks: &[&Track], track_type: TrackType) -> Vec<usize> {
    tracks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.track_type == track_type)
        .map(|(i, _)| i)
        .collect()
}

/// Wrap a negative slice bound and clamp into `[0, len]`.
fn clamp_bound(bound: i64, len: i64) -> usize {
    let wrapped = if bound < 0 { bound + len } else { bound };
    wrapped.clamp(0, len) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_indices() {
        let fragments = parse_list("0,2,-1").unwrap();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0].spec, Spec::Index(0));
        assert_eq!(fragments[2].spec, Spec::Index(-1));
    }

    #[test]
    fn parses_typed_indices() {
        let fragments = parse_list("v0,a1,s-1").unwrap();
        assert_eq!(fragments[0].prefix, TypePrefix::Video);
        assert_eq!(fragments[1].prefix, TypePrefix::Audio);
        assert_eq!(fragments[2].prefix, TypePrefix::Subtitle);
        assert_eq!(fragments[2].spec, Spec::Index(-1));
    }

    #[test]
    fn parses_slices() {
        let fragments = parse_list("1:3,:2,2:,:-1").unwrap();
        assert_eq!(fragments[0].spec, Spec::Slice(Some(1), Some(3)));
        assert_eq!(fragments[1].spec, Spec::Slice(None, Some(2)));
        assert_eq!(fragments[2].spec, Spec::Slice(Some(2), None));
        assert_eq!(fragments[3].spec, Spec::Slice(None, Some(-1)));
    }

    #[test]
    fn colon_after_type_letter_is_a_separator() {
        let fragments = parse_list("v:0").unwrap();
        assert_eq!(fragments[0].prefix, TypePrefix::Video);
        assert_eq!(fragments[0].spec, Spec::Index(0));

        // With digits on both sides it is a slice of the typed sublist.
        let fragments = parse_list("v0:2").unwrap();
        assert_eq!(fragments[0].spec, Spec::Slice(Some(0), Some(2)));
    }

    #[test]
    fn rejects_non_index_selectors() {
        assert!(parse_list("isEnglish").is_none());
        assert!(parse_list("+isAudio:-isEnglish").is_none());
        assert!(parse_list("all").is_none());
        assert!(parse_list("0, 1").is_none()); // no whitespace allowed
        assert!(parse_list(":").is_none());
        assert!(parse_list("1:2:3").is_none());
        assert!(parse_list("x0").is_none());
        assert!(parse_list("0,").is_none());
        assert!(parse_list("").is_none());
    }
}
