use std::{
	ffi::OsStr,
	path::Path,
};

use crate::{
	playlist::PlaylistSelection,
	quality::Quality,
};

/// Options specific for the [`super::download_single`] function
pub trait DownloadOptions {
	/// Get the URL to download
	fn get_url(&self) -> &str;
	/// Get the quality the media should be downloaded in
	fn quality(&self) -> Quality;
	/// Get Download Path for the output media
	fn download_path(&self) -> &Path;
	/// Get which playlist entries to download
	/// [`None`] means the URL is handled as a single video, even if it contains a playlist
	fn playlist(&self) -> Option<&PlaylistSelection>;
	/// Get the ffmpeg binary path that should be given to yt-dlp, [`None`] to let yt-dlp search by itself
	fn ffmpeg_location(&self) -> Option<&Path>;
	/// Get Extra Arguments that should be added to the ytdl command
	fn extra_ytdl_arguments(&self) -> Vec<&OsStr>;
	/// Get whether the command output should be printed to the log
	fn print_command_log(&self) -> bool;
	/// Get whether the command output should be saved to a log file in the download path
	fn save_command_log(&self) -> bool;
	/// Get the yt-dlp version in use
	fn ytdl_version(&self) -> chrono::NaiveDate;
}
