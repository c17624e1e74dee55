//! Module for fetching information about a video or playlist without downloading it

use std::ffi::OsString;

use serde::Deserialize;

use crate::{
	error::IOErrorToError,
	spawn::ytdl::YTDL_BIN_NAME,
	url_kind::{
		UrlKind,
		canonical_playlist_url,
		playlist_id,
	},
};

/// Title used when a video has no title
pub const UNKNOWN_VIDEO: &str = "Unknown Video";
/// Channel used when a video has no uploader
pub const UNKNOWN_CHANNEL: &str = "Unknown Channel";
/// Title used when a playlist has no title
pub const UNKNOWN_PLAYLIST: &str = "Unknown Playlist";

/// The parts of the yt-dlp json output that are used
/// Playlists contain their entries with the same structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawInfo {
	#[serde(rename = "_type")]
	pub kind:        Option<String>,
	pub id:          Option<String>,
	pub title:       Option<String>,
	pub uploader:    Option<String>,
	pub channel:     Option<String>,
	/// yt-dlp gives the duration as a float for some extractors
	pub duration:    Option<f64>,
	pub thumbnail:   Option<String>,
	pub view_count:  Option<u64>,
	pub upload_date: Option<String>,
	pub is_live:     Option<bool>,
	pub webpage_url: Option<String>,
	pub url:         Option<String>,
	/// Unavailable entries are "null"
	#[serde(default)]
	pub entries:     Vec<Option<RawInfo>>,
}

impl RawInfo {
	/// Get whether yt-dlp reported this as a playlist
	pub fn is_playlist(&self) -> bool {
		return self.kind.as_deref() == Some("playlist");
	}

	/// Get the duration in full seconds, missing durations count as 0
	pub fn duration_secs(&self) -> u64 {
		return self
			.duration
			.filter(|v| return v.is_finite() && *v > 0.0)
			.map_or(0, |v| return v as u64);
	}
}

/// Information about a single video
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
	pub id:                 String,
	pub title:              String,
	pub channel:            String,
	/// Duration in seconds
	pub duration:           u64,
	pub duration_formatted: String,
	pub thumbnail:          Option<String>,
	pub view_count:         Option<u64>,
	/// Upload date as given by yt-dlp, "YYYYMMDD"
	pub upload_date:        Option<String>,
	pub is_live:            bool,
}

impl From<RawInfo> for VideoInfo {
	fn from(raw: RawInfo) -> Self {
		let duration = raw.duration_secs();

		return Self {
			id: raw.id.unwrap_or_default(),
			title: raw.title.unwrap_or_else(|| return UNKNOWN_VIDEO.to_owned()),
			channel: raw
				.uploader
				.or(raw.channel)
				.unwrap_or_else(|| return UNKNOWN_CHANNEL.to_owned()),
			duration,
			duration_formatted: format_duration(duration),
			thumbnail: raw.thumbnail,
			view_count: raw.view_count,
			upload_date: raw.upload_date,
			is_live: raw.is_live.unwrap_or(false),
		};
	}
}

/// A single entry of a playlist
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
	/// 1-based index inside the playlist, unavailable entries still take a index
	pub index:        usize,
	pub title:        String,
	pub id:           String,
	pub url:          String,
	/// Duration in seconds
	pub duration:     u64,
	pub duration_str: String,
}

/// Information about a playlist and its entries
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistInfo {
	pub title:              String,
	/// The count of all entries, including unavailable ones
	pub total_videos:       usize,
	/// Duration of all available entries in seconds
	pub total_duration:     u64,
	pub total_duration_str: String,
	pub videos:             Vec<PlaylistEntry>,
}

/// Either a video or a playlist
#[derive(Debug, Clone, PartialEq)]
pub enum MediaDetails {
	Video(VideoInfo),
	Playlist(PlaylistInfo),
}

/// Events reported while fetching information
#[derive(Debug, Clone, PartialEq)]
pub enum FetchProgress {
	/// Fetching has started, contains a status message
	Started(String),
	/// A playlist has been found
	Found { title: String, total: usize },
	/// A playlist entry has been processed
	Entry { current: usize, total: usize, title: String },
	/// Fetching is done
	Finished { total: usize },
}

/// Format a duration as "H:MM:SS", or "M:SS" when below a hour
pub fn format_duration(secs: u64) -> String {
	let (hours, remainder) = (secs / 3600, secs % 3600);
	let (minutes, seconds) = (remainder / 60, remainder % 60);

	if hours > 0 {
		return format!("{hours}:{minutes:02}:{seconds:02}");
	}

	return format!("{minutes}:{seconds:02}");
}

/// Format a total duration as "Xh Ym Zs", or "Ym Zs" when below a hour
pub fn format_total_duration(secs: u64) -> String {
	let (hours, remainder) = (secs / 3600, secs % 3600);
	let (minutes, seconds) = (remainder / 60, remainder % 60);

	if hours > 0 {
		return format!("{hours}h {minutes}m {seconds}s");
	}

	return format!("{minutes}m {seconds}s");
}

/// Format a remaining time as "Ns", "Xm Ys" or "Xh Ym Zs"
pub fn format_eta(secs: u64) -> String {
	if secs < 60 {
		return format!("{secs}s");
	}

	let (hours, remainder) = (secs / 3600, secs % 3600);
	let (minutes, seconds) = (remainder / 60, remainder % 60);

	if hours > 0 {
		return format!("{hours}h {minutes}m {seconds}s");
	}

	return format!("{minutes}m {seconds}s");
}

/// Parse the output of "yt-dlp -J"
pub fn parse_info_json(input: &str) -> Result<RawInfo, crate::Error> {
	return Ok(serde_json::from_str::<RawInfo>(input)?);
}

/// Convert a raw playlist into [`PlaylistInfo`], reporting every entry
pub fn playlist_from_raw<C: FnMut(FetchProgress)>(raw: RawInfo, mut pgcb: C) -> PlaylistInfo {
	let title = raw.title.unwrap_or_else(|| return UNKNOWN_PLAYLIST.to_owned());
	let total_videos = raw.entries.len();

	info!("Found playlist: {} with {} videos", title, total_videos);
	pgcb(FetchProgress::Found {
		title: title.clone(),
		total: total_videos,
	});

	let mut videos = Vec::with_capacity(total_videos);
	let mut total_duration = 0u64;

	for (i, entry) in raw.entries.into_iter().enumerate() {
		let index = i + 1;

		let Some(entry) = entry else {
			debug!("Playlist entry {index} is unavailable");
			pgcb(FetchProgress::Entry {
				current: index,
				total:   total_videos,
				title:   format!("Video {index}"),
			});
			continue;
		};

		let duration = entry.duration_secs();
		total_duration += duration;

		let entry_title = entry.title.unwrap_or_else(|| return format!("Video {index}"));

		pgcb(FetchProgress::Entry {
			current: index,
			total:   total_videos,
			title:   entry_title.clone(),
		});

		videos.push(PlaylistEntry {
			index,
			title: entry_title,
			id: entry.id.unwrap_or_default(),
			url: entry.webpage_url.or(entry.url).unwrap_or_default(),
			duration,
			duration_str: format_duration(duration),
		});
	}

	pgcb(FetchProgress::Finished { total: total_videos });

	return PlaylistInfo {
		title,
		total_videos,
		total_duration,
		total_duration_str: format_total_duration(total_duration),
		videos,
	};
}

/// Get the URL to retry with, when a playlist came back without entries
fn playlist_retry_url(raw: &RawInfo, url: &str) -> Option<String> {
	if !raw.is_playlist() || !raw.entries.is_empty() {
		return None;
	}

	let id = raw
		.id
		.clone()
		.filter(|v| return !v.is_empty())
		.or_else(|| return playlist_id(url))?;

	return Some(canonical_playlist_url(&id));
}

/// Assemble the arguments for fetching information
fn assemble_info_command(url: &str, flat: bool) -> Vec<OsString> {
	let mut args: Vec<OsString> = vec![
		"-J".into(),
		"--no-warnings".into(),
		"--no-color".into(),
		"--ignore-errors".into(),
		"--skip-download".into(),
	];

	if flat {
		// only list the entries instead of extracting every video
		args.push("--flat-playlist".into());
	} else {
		args.push("--no-playlist".into());
	}

	args.push(url.into());

	return args;
}

/// Run yt-dlp to get the json information for a url
fn run_info_command(url: &str, flat: bool) -> Result<RawInfo, crate::Error> {
	let output = duct::cmd(YTDL_BIN_NAME, assemble_info_command(url, flat))
		.stdout_capture()
		.stderr_capture()
		.unchecked()
		.run()
		.attach_location_err("duct ytdl info")?;

	// with "--ignore-errors" yt-dlp may exit unsuccessfully, but still output usable json
	if output.stdout.iter().all(u8::is_ascii_whitespace) {
		let stderr = String::from_utf8_lossy(&output.stderr);
		let reason = stderr
			.lines()
			.rev()
			.find(|v| return !v.trim().is_empty())
			.unwrap_or("no output");

		return Err(crate::Error::command_unsuccessful(format!(
			"{YTDL_BIN_NAME} could not get information: {reason}"
		)));
	}

	return parse_info_json(&String::from_utf8(output.stdout)?);
}

/// Fetch information about a URL
///
/// Playlists are only listed, not every video is extracted.
/// A playlist without entries is fetched again with its canonical URL.
pub fn fetch_info<C: FnMut(FetchProgress)>(url: &str, mut pgcb: C) -> Result<MediaDetails, crate::Error> {
	let as_playlist = UrlKind::classify(url) == UrlKind::YoutubePlaylist;

	pgcb(FetchProgress::Started(if as_playlist {
		"Fetching playlist info...".to_owned()
	} else {
		"Fetching video information...".to_owned()
	}));

	let mut raw = run_info_command(url, as_playlist)?;

	if let Some(retry_url) = playlist_retry_url(&raw, url) {
		info!("No entries found in first attempt, trying \"{}\"", retry_url);
		pgcb(FetchProgress::Started("Retrying with direct playlist URL...".to_owned()));
		raw = run_info_command(&retry_url, true)?;
	}

	if raw.is_playlist() {
		return Ok(MediaDetails::Playlist(playlist_from_raw(raw, pgcb)));
	}

	pgcb(FetchProgress::Finished { total: 1 });

	return Ok(MediaDetails::Video(VideoInfo::from(raw)));
}
