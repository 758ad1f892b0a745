//! Character set guessing for text subtitle files.
//!
//! Matroska assumes subtitle text is UTF-8, so a mux job appending an SRT
//! (or similar) file needs to know the source charset to request conversion.

use std::path::Path;

/// Tuning for [`guess_subtitle_charset`].
#[derive(Debug, Clone)]
pub struct CharsetGuess {
    /// Lower threshold of confidence when guessing the character set.
    /// At or below this value the guess is considered unreliable.
    pub confidence_threshold: f32,
    /// If `true`, an unreliable guess returns `default_charset` instead of
    /// an error.
    pub ignore_low_confidence: bool,
    /// Charset returned when the guess is unreliable and low confidence is
    /// ignored.
    pub default_charset: String,
}

impl Default for CharsetGuess {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            ignore_low_confidence: false,
            default_charset: "utf-8".to_string(),
        }
    }
}

/// Guess the charset of a text subtitle file.
///
/// # Errors
///
/// - [`mkx_core::Error::Io`] if the file cannot be read.
/// - [`mkx_core::Error::Charset`] if the detector's confidence is at or
///   below `opts.confidence_threshold` and `opts.ignore_low_confidence`
///   is `false`. There may simply not be enough text in the file for an
///   accurate assessment; callers can raise the threshold tolerance or
///   accept the default charset instead.
pub fn guess_subtitle_charset(path: &Path, opts: &CharsetGuess) -> mkx_core::Result<String> {
    let data = std::fs::read(path)?;
    let (charset, confidence, _language) = chardet::detect(&data);

    tracing::debug!(
        path = %path.display(),
        %charset,
        confidence,
        "charset detection"
    );

    if confidence <= opts.confidence_threshold {
        if opts.ignore_low_confidence {
            return Ok(opts.default_charset.clone());
        }
        return Err(mkx_core::Error::Charset {
            path: path.display().to_string(),
            message: format!(
                "low confidence ({confidence:.2}) guessing charset; \
                 set ignore_low_confidence to fall back to '{}'",
                opts.default_charset
            ),
        });
    }

    Ok(charset)
}
