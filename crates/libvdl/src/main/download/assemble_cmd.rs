use std::ffi::OsString;

use super::{
	MINIMAL_YTDL_VERSION,
	download_options::DownloadOptions,
};

/// Output template for single media, relative to the download path
pub const SINGLE_OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";
/// Output template for playlist entries, relative to the download path, each playlist gets its own directory
pub const PLAYLIST_OUTPUT_TEMPLATE: &str = "%(playlist_title)s/%(playlist_index)s - %(title)s.%(ext)s";

/// Audio format to extract to when downloading audio only
const AUDIO_FORMAT: &str = "mp3";
/// Audio quality to extract with when downloading audio only
const AUDIO_QUALITY: &str = "192K";
/// Container to merge separate video and audio streams into
const MERGE_FORMAT: &str = "mp4";

/// Internal Struct for easily adding various types that resolve to [`OsString`] and output a [`Vec<OsString>`]
/// exists because [std::process::Command] is too overkill to use for a argument collection for having to use [duct] later
#[derive(Debug)]
struct ArgsHelper(Vec<OsString>);
impl ArgsHelper {
	/// Create a new instance of ArgsHelper
	pub fn new() -> Self {
		return Self(Vec::default());
	}

	/// Add a new Argument to the list, added at the end and converted to a [`OsString`]
	/// Returns the input reference to "self" for chaining
	pub fn arg<U>(&mut self, arg: U) -> &mut Self
	where
		U: Into<OsString>,
	{
		self.0.push(arg.into());

		return self;
	}

	/// Convert Self to the inner value
	/// Consumes self
	pub fn into_inner(self) -> Vec<OsString> {
		return self.0;
	}
}

impl From<ArgsHelper> for Vec<OsString> {
	fn from(v: ArgsHelper) -> Self {
		return v.into_inner();
	}
}

/// Helper Function to assemble all ytdl command arguments
/// Returns a list of arguments for yt-dlp in order
///
/// The download path is expected to already exist
#[inline]
pub fn assemble_ytdl_command<A: DownloadOptions>(options: &A) -> Vec<OsString> {
	let mut ytdl_args = ArgsHelper::new();

	let output_dir = options.download_path();
	debug!("YTDL Output dir is \"{}\"", output_dir.to_string_lossy());

	let quality = options.quality();

	// set the format that should be downloaded
	ytdl_args.arg("-f").arg(quality.format_selector());

	if quality.is_audio() {
		// set ytdl to always extract the audio, if it is not already audio-only
		ytdl_args.arg("-x");
		// set the output audio format
		ytdl_args.arg("--audio-format").arg(AUDIO_FORMAT);
		ytdl_args.arg("--audio-quality").arg(AUDIO_QUALITY);
	} else {
		// set final consistent output format when video and audio are separate streams
		ytdl_args.arg("--merge-output-format").arg(MERGE_FORMAT);
	}

	let output_format = match options.playlist() {
		Some(selection) => {
			ytdl_args.arg("--yes-playlist");

			if let Some(items) = selection.ytdl_items_arg() {
				ytdl_args.arg("--playlist-items").arg(items);
			}

			output_dir.join(PLAYLIST_OUTPUT_TEMPLATE)
		},
		None => {
			// a video url may contain a "list=" parameter, which should not cause the whole list to be downloaded
			ytdl_args.arg("--no-playlist");

			output_dir.join(SINGLE_OUTPUT_TEMPLATE)
		},
	};

	// "--print" implies "--quiet", which would hide the post-processing and playlist lines
	if options.ytdl_version() >= MINIMAL_YTDL_VERSION {
		ytdl_args.arg("--no-quiet");
	}

	// continue ".part" files, which is how a paused download gets resumed
	ytdl_args.arg("--continue");
	ytdl_args.arg("--no-overwrites");
	ytdl_args.arg("--no-color");
	// dont stop a whole playlist because of one unavailable entry
	ytdl_args.arg("--ignore-errors");

	if let Some(ffmpeg) = options.ffmpeg_location() {
		ytdl_args.arg("--ffmpeg-location").arg(ffmpeg);
	}

	add_prints(&mut ytdl_args);

	// ensure ytdl is printing progress reports
	ytdl_args.arg("--progress");
	// ensure ytdl prints the progress reports on a new line
	ytdl_args.arg("--newline");

	// ensure it is not in simulate mode (for example set via extra arguments)
	ytdl_args.arg("--no-simulate");

	// set the output template for ytdl
	ytdl_args.arg("-o").arg(output_format);

	// apply all extra arguments
	for extra_arg in &options.extra_ytdl_arguments() {
		ytdl_args.arg(extra_arg);
	}

	// apply the url to download as the last argument
	ytdl_args.arg(options.get_url());

	return ytdl_args.into();
}

/// Add the custom print statements used for detecting different stages and information
fn add_prints(ytdl_args: &mut ArgsHelper) {
	// set custom ytdl logging for easy parsing

	// print playlist information when available
	ytdl_args
		.arg("--print")
		// print the amount of selected entries to get a sizehint, "playlist_count" would be the whole playlist
		.arg("before_dl:PLAYLIST '%(n_entries)s'");

	// print once before the video starts to download to get all information and to get a consistent start point
	// the title is last, because it is the only value that may contain spaces and quotes
	// "playlist_autonumber" is the position in the selected entries, matching "n_entries"
	ytdl_args
		.arg("--print")
		.arg("before_dl:PARSE_START '%(extractor)s' '%(id)s' '%(playlist_autonumber)s' '%(n_entries)s' %(title)s");
	// print once after the video got fully processed to get a consistent end point
	ytdl_args
		.arg("--print")
		// only "extractor" and "id" is required, because it can be safely assumed that when this is printed, the "PARSE_START" was also printed
		.arg("after_video:PARSE_END '%(extractor)s' '%(id)s'");

	// print after move to get the filepath of the final output file
	ytdl_args
		.arg("--print")
		// includes "extractor" and "id" for identifying which media the filepath is for
		.arg("after_move:MOVE '%(extractor)s' '%(id)s' %(filepath)s");
}
