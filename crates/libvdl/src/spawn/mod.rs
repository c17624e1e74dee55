//! Module for spawning the external programs this library delegates to

pub mod ffmpeg;
pub mod multiplatform;
pub mod ytdl;
