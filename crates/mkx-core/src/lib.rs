//! mkx-core: shared error type and media-domain enums.
//!
//! This crate is the foundational dependency for all other mkx crates,
//! providing the unified error type and the track/HDR enums used throughout.

pub mod error;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use media::*;
