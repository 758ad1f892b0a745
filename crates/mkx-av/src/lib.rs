//! mkx-av: external tool plumbing.
//!
//! Command construction and execution for the CLI tools mkx shells out to,
//! tool discovery on `PATH`, and subtitle charset guessing.

pub mod charset;
pub mod command;
pub mod tools;

// Re-export key types at crate root for convenience.
pub use charset::{guess_subtitle_charset, CharsetGuess};
pub use command::{block_on, ToolCommand, ToolOutput};
pub use tools::{ToolConfig, ToolInfo, ToolPaths, ToolRegistry};
