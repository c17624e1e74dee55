//! Module that contains all logic for spawning the "ffmpeg" command
use std::{
	ffi::OsStr,
	path::{
		Path,
		PathBuf,
	},
	process::{
		Command,
		Output,
		Stdio,
	},
	sync::LazyLock,
};

use regex::Regex;

use crate::error::IOErrorToError;

/// Binary name to spawn for ffmpeg when no explicit path is given
pub const FFMPEG_BIN_NAME: &str = "ffmpeg";

/// Create a new ffmpeg [Command] instance for the given binary
#[inline]
#[must_use]
pub fn base_ffmpeg<B: AsRef<OsStr>>(binary: B) -> Command {
	let mut cmd = super::multiplatform::spawn_command(binary);

	// explicitly disable interactive mode
	cmd.arg("-nostdin");

	return cmd;
}

/// Regex to parse the version from a "ffmpeg -version" output
/// cap1: version
static FFMPEG_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	return Regex::new(r"(?mi)^ffmpeg version (\S+)").unwrap();
});

/// Get Version of the given `ffmpeg` binary
#[inline]
pub fn ffmpeg_version<B: AsRef<OsStr>>(binary: B) -> Result<String, crate::Error> {
	let mut cmd = base_ffmpeg(binary);
	cmd.arg("-version");

	let command_output: Output = cmd
		.stderr(Stdio::null())
		.stdout(Stdio::piped())
		.stdin(Stdio::null())
		.spawn()
		.attach_location_err("ffmpeg spawn")?
		.wait_with_output()
		.attach_location_err("ffmpeg wait_with_output")?;

	if !command_output.status.success() {
		return Err(crate::Error::command_unsuccessful("FFMPEG did not successfully exit!"));
	}

	let as_string = String::from_utf8(command_output.stdout)?;

	return ffmpeg_parse_version(&as_string);
}

/// Internal Function to parse the input to a ffmpeg version with regex
#[inline]
fn ffmpeg_parse_version(input: &str) -> Result<String, crate::Error> {
	return Ok(FFMPEG_VERSION_REGEX
		.captures_iter(input)
		.next()
		.ok_or_else(|| return crate::Error::no_captures("FFMPEG Version could not be determined"))?[1]
		.to_owned());
}

/// Where ffmpeg was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FfmpegLocation {
	/// A explicitly given binary path, which has to be given to yt-dlp
	Explicit(PathBuf),
	/// "ffmpeg" is reachable from "PATH", yt-dlp will find it on its own
	SystemPath,
	/// ffmpeg could not be found, downloads may still work but merging separate video and audio streams will fail
	Missing,
}

impl FfmpegLocation {
	/// Get the path that should be given to yt-dlp as "--ffmpeg-location"
	pub fn ytdl_location(&self) -> Option<&Path> {
		return match self {
			Self::Explicit(path) => Some(path),
			Self::SystemPath | Self::Missing => None,
		};
	}
}

/// Find a usable ffmpeg, preferring the explicitly given path
///
/// Not finding ffmpeg is not a error, only a warning is logged
pub fn locate_ffmpeg(explicit: Option<&Path>) -> FfmpegLocation {
	if let Some(path) = explicit {
		match ffmpeg_version(path) {
			Ok(version) => {
				debug!("Using ffmpeg \"{}\" version {}", path.display(), version);
				return FfmpegLocation::Explicit(path.to_owned());
			},
			Err(err) => {
				warn!(
					"Given ffmpeg path \"{}\" is not usable ({}), trying \"{}\" from PATH",
					path.display(),
					err,
					FFMPEG_BIN_NAME
				);
			},
		}
	}

	if let Ok(version) = ffmpeg_version(FFMPEG_BIN_NAME) {
		debug!("Using ffmpeg from PATH, version {}", version);
		return FfmpegLocation::SystemPath;
	}

	warn!("Could not find ffmpeg, merging high-quality video and audio streams or extracting audio might fail");

	return FfmpegLocation::Missing;
}
