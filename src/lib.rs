//! Workspace façade crate.
//!
//! Re-exports the workspace crates (`core-runtime`, `core-playback`,
//! `core-library`) so a host can depend on `songplayer-workspace` alone and
//! opt into audible output with the `rodio-output` feature.

pub use core_library as library;
pub use core_playback as playback;
pub use core_runtime as runtime;
