//! Wrappers around the `ffmpeg` and `ffprobe` binaries.

mod probe;
mod thumbnail;
mod tool;

pub use probe::{parse_frame_rate, parse_probe, probe};
pub use thumbnail::{thumbnail, thumbnail_args};
pub use tool::{run, ToolError};
