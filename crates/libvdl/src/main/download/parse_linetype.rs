use std::sync::LazyLock;

use regex::Regex;

use crate::data::media_info::MediaInfo;

/// Helper Enum for differentiating [`LineType::Custom`] types like "PARSE_START" and "PARSE_END"
#[derive(Debug, PartialEq, Clone)]
pub enum CustomParseType {
	/// values: (media, playlist_count)
	Start(MediaInfo, Option<usize>),
	End(MediaInfo),
	Playlist(usize),
	Move(MediaInfo),
}

/// Line type for a ytdl output line
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum LineType {
	/// Variant for post-processing lines (like merging video and audio or extracting audio)
	PostProcess,
	/// Variant for ytdl download progress lines
	Download,
	/// Variant for provider specific lines (like youtube counting website)
	ProviderSpecific,
	/// Variant for generic lines (like "Deleting original file")
	Generic,
	/// Variant for lines that are from "--print"
	Custom,
	/// Variant for lines that start with "ERROR:"
	Error,
	/// Variant for lines that start with "WARNING:"
	Warning,
}

/// Names of "[name]" prefixes that are emitted while post-processing the downloaded files
const POSTPROCESS_NAMES: &[&str] = &[
	"ffmpeg",
	"merger",
	"extractaudio",
	"videoconvertor",
	"videoremuxer",
	"fixupm3u8",
	"fixupm4a",
	"fixupstretched",
	"fixupduplicatemoov",
	"metadata",
];

impl LineType {
	/// Try to get the correct Variant for a input line
	/// Will return [`None`] if no type has been found
	pub fn try_from_line(input: &str) -> Option<Self> {
		/// basic regex to test if the line is "[something] something", and if it is, return what is inside "[]"
		static BASIC_TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?mi)^\[([\da-z:_]*)\]").unwrap();
		});
		/// regex to check for generic lines
		static GENERIC_TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?mi)^deleting original file").unwrap();
		});

		// check if the line is from a provider-like output
		if let Some(cap) = BASIC_TYPE_REGEX.captures(input) {
			let name = cap[1].to_lowercase();

			// this case is first, because it is the most common case
			if name == "download" {
				return Some(Self::Download);
			}

			if POSTPROCESS_NAMES.contains(&name.as_str()) {
				return Some(Self::PostProcess);
			}

			// everything that is not specially handled before, will get treated as being a provider
			return Some(Self::ProviderSpecific);
		}

		// matches both "PARSE_START" and "PARSE_END"
		if input.starts_with("PARSE_") || input.starts_with("PLAYLIST ") || input.starts_with("MOVE ") {
			return Some(Self::Custom);
		}

		// check for Generic lines that dont have a prefix
		if GENERIC_TYPE_REGEX.is_match(input) {
			return Some(Self::Generic);
		}

		if input.starts_with("ERROR:") || input.starts_with("yt-dlp: error:") {
			return Some(Self::Error);
		}

		if input.starts_with("WARNING:") {
			return Some(Self::Warning);
		}

		// if nothing above matches, return None, because no type has been found
		return None;
	}

	/// Try to get the download precent from input
	/// Returns [`None`] if not being of variant [`LineType::Download`] or if not percentage can be found or could not be parsed
	pub fn try_get_download_percent<I: AsRef<str>>(&self, input: I) -> Option<u8> {
		// this function only works with Download lines
		if self != &Self::Download {
			return None;
		}

		/// Regex to parse the download percentage from a line
		/// cap1: precentage(not decimal)
		static DOWNLOAD_PERCENTAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?mi)^\[download\]\s+(\d{1,3})(?:\.\d+)?%").unwrap();
		});

		let input = input.as_ref();

		if let Some(cap) = DOWNLOAD_PERCENTAGE_REGEX.captures(input) {
			// directly use the "Result" returned by "parse" and convert it to a "Option"
			return cap[1].parse::<u8>().ok().map(|v| return v.min(100));
		}

		return None;
	}

	/// Try to get the ETA in seconds from a download line like "[download]  50.0% of 78.44MiB at 526.19KiB/s ETA 01:16"
	/// Returns [`None`] if not being of variant [`LineType::Download`] or the ETA is unknown
	pub fn try_get_download_eta<I: AsRef<str>>(&self, input: I) -> Option<u64> {
		if self != &Self::Download {
			return None;
		}

		/// Regex to parse the ETA, either "MM:SS" or "HH:MM:SS"
		/// cap1: first, cap2: second, cap3: optional third
		static DOWNLOAD_ETA_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?m)ETA (\d{1,2}):(\d{2})(?::(\d{2}))?").unwrap();
		});

		let cap = DOWNLOAD_ETA_REGEX.captures(input.as_ref())?;

		let first = cap[1].parse::<u64>().ok()?;
		let second = cap[2].parse::<u64>().ok()?;

		return match cap.get(3) {
			Some(third) => Some(first * 3600 + second * 60 + third.as_str().parse::<u64>().ok()?),
			None => Some(first * 60 + second),
		};
	}

	/// Try to get the playlist size from lines like "[youtube:tab] Playlist Some Name: Downloading 4 items of 10"
	/// Returns [`None`] if not being of variant [`LineType::ProviderSpecific`] or the line is not a playlist line
	pub fn try_get_playlist_count<I: AsRef<str>>(&self, input: I) -> Option<usize> {
		if self != &Self::ProviderSpecific {
			return None;
		}

		/// regex to check for "[] Playlist ...: Downloading ... items of ..." lines
		/// cap1: items to download, cap2: items in the playlist
		static YTDL_PLAYLIST_COUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?m)^\[[\w:]+\] Playlist [^:]+: Downloading (\d+) items of (\d+)$").unwrap();
		});

		let cap = YTDL_PLAYLIST_COUNT_REGEX.captures(input.as_ref())?;

		return match cap[1].parse::<usize>() {
			Ok(count) => Some(count),
			Err(err) => {
				info!("Failed to parse \"[] Playlist ...: Downloading ... items of ...\" count, error: {err}");
				None
			},
		};
	}

	/// Try to parse the custom parse-helpers like "PARSE_START"
	/// Retruns [`None`] if not being of variant [`LineType::Custom`] or if no parse helper can be found
	pub fn try_get_parse_helper<I: AsRef<str>>(&self, input: I) -> Option<CustomParseType> {
		// this function only works with Custom lines
		if self != &Self::Custom {
			return None;
		}

		/// Regex to get all information from the Parsing helper "PARSE_START"
		/// cap1: provider, cap2: id, cap3: playlist index, cap4: playlist count, cap5: title
		static PARSE_START_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?mi)^PARSE_START '([^']+)' '([^']+)' '([^']*)' '([^']*)' (.+)$").unwrap();
		});
		/// Regex to get all information from the Parsing helper "PARSE_END"
		/// cap1: provider, cap2: id
		static PARSE_END_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?mi)^PARSE_END '([^']+)' '([^']+)'$").unwrap();
		});
		/// Regex to get all information from the Parsing helper "PLAYLIST"
		static PARSE_PLAYLIST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?mi)^PLAYLIST '(\d+)'$").unwrap();
		});
		/// Regex to get all information from the Parsing helper "MOVE"
		static PARSE_MOVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
			return Regex::new(r"(?mi)^MOVE '([^']+)' '([^']+)' (.+)$").unwrap();
		});

		let input = input.as_ref();

		if let Some(cap) = PARSE_START_REGEX.captures(input) {
			let playlist_index = parse_optional_number(&cap[3]);
			let playlist_count = parse_optional_number(&cap[4]);

			return Some(CustomParseType::Start(
				MediaInfo::new(&cap[2], &cap[1])
					.with_title(&cap[5])
					.with_playlist_index(playlist_index),
				playlist_count,
			));
		}

		if let Some(cap) = PARSE_END_REGEX.captures(input) {
			return Some(CustomParseType::End(MediaInfo::new(&cap[2], &cap[1])));
		}

		// handle "MOVE" lines
		// cannot be merged easily with "PARSE_END", because of https://github.com/yt-dlp/yt-dlp/issues/7197#issuecomment-1572066439
		if let Some(cap) = PARSE_MOVE_REGEX.captures(input) {
			return Some(CustomParseType::Move(
				MediaInfo::new(&cap[2], &cap[1]).with_filename(&cap[3]),
			));
		}

		if let Some(cap) = PARSE_PLAYLIST_REGEX.captures(input) {
			let count = cap[1].parse::<usize>().ok()?;

			return Some(CustomParseType::Playlist(count));
		}

		return None;
	}
}

/// Parse a number printed by yt-dlp, which prints "NA" for unavailable fields
fn parse_optional_number(input: &str) -> Option<usize> {
	return input.trim().parse::<usize>().ok();
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_try_from_line() {
		let input_youtube = "[youtube] -----------: Downloading webpage";
		assert_eq!(Some(LineType::ProviderSpecific), LineType::try_from_line(input_youtube));

		let input_download = "[download]  50.0% of 78.44MiB at 526.19KiB/s ETA 01:16";
		assert_eq!(Some(LineType::Download), LineType::try_from_line(input_download));

		let input_merger = "[Merger] Merging formats into \"/tmp/Some Title.mp4\"";
		assert_eq!(Some(LineType::PostProcess), LineType::try_from_line(input_merger));

		let input_extract = "[ExtractAudio] Destination: /tmp/Some Title.mp3";
		assert_eq!(Some(LineType::PostProcess), LineType::try_from_line(input_extract));

		let input_generic = "Deleting original file /tmp/Some Title.f137.mp4 (pass -k to keep)";
		assert_eq!(Some(LineType::Generic), LineType::try_from_line(input_generic));

		let input_custom = "PARSE_START 'youtube' '-----------' 'NA' 'NA' Some Title";
		assert_eq!(Some(LineType::Custom), LineType::try_from_line(input_custom));

		let input_playlist = "PLAYLIST '3'";
		assert_eq!(Some(LineType::Custom), LineType::try_from_line(input_playlist));

		let input_error = "ERROR: [youtube] -----------: Video unavailable";
		assert_eq!(Some(LineType::Error), LineType::try_from_line(input_error));

		let input_warning = "WARNING: [youtube] nsig extraction failed: Some formats may be missing";
		assert_eq!(Some(LineType::Warning), LineType::try_from_line(input_warning));

		assert_eq!(None, LineType::try_from_line("some random line"));
		assert_eq!(None, LineType::try_from_line(""));
	}

	#[test]
	fn test_try_get_download_percent() {
		let linetype = LineType::Download;

		assert_eq!(
			Some(0),
			linetype.try_get_download_percent("[download]   0.0% of 78.44MiB at 207.76KiB/s ETA 06:27")
		);
		assert_eq!(
			Some(57),
			linetype.try_get_download_percent("[download]  57.6% of 3.47MiB at  9.57MiB/s ETA 00:00")
		);
		assert_eq!(
			Some(100),
			linetype.try_get_download_percent("[download] 100% of 78.44MiB in 00:07")
		);
		assert_eq!(
			None,
			linetype.try_get_download_percent("[download] Destination: /tmp/Some Title.f137.mp4")
		);

		// other types are not parsed
		assert_eq!(
			None,
			LineType::Generic.try_get_download_percent("[download]  50.0% of 78.44MiB")
		);
	}

	#[test]
	fn test_try_get_download_eta() {
		let linetype = LineType::Download;

		assert_eq!(
			Some(387),
			linetype.try_get_download_eta("[download]   0.0% of 78.44MiB at 207.76KiB/s ETA 06:27")
		);
		assert_eq!(
			Some(3723),
			linetype.try_get_download_eta("[download]   1.0% of 1.44GiB at 207.76KiB/s ETA 01:02:03")
		);
		assert_eq!(
			None,
			linetype.try_get_download_eta("[download]   0.0% of ~78.44MiB at Unknown B/s ETA Unknown")
		);
		assert_eq!(None, linetype.try_get_download_eta("[download] 100% of 78.44MiB in 00:07"));
	}

	#[test]
	fn test_try_get_playlist_count() {
		let linetype = LineType::ProviderSpecific;

		assert_eq!(
			Some(3),
			linetype.try_get_playlist_count("[youtube:tab] Playlist Some Mix: Downloading 3 items of 25")
		);
		assert_eq!(
			None,
			linetype.try_get_playlist_count("[youtube:tab] PLxxxxxxxx: Downloading webpage")
		);
		assert_eq!(
			None,
			LineType::Download.try_get_playlist_count("[youtube:tab] Playlist Some Mix: Downloading 3 items of 25")
		);
	}

	#[test]
	fn test_try_get_parse_helper() {
		let linetype = LineType::Custom;

		assert_eq!(
			Some(CustomParseType::Start(
				MediaInfo::new("-----------", "youtube").with_title("Some Title Here"),
				None
			)),
			linetype.try_get_parse_helper("PARSE_START 'youtube' '-----------' 'NA' 'NA' Some Title Here")
		);

		assert_eq!(
			Some(CustomParseType::Start(
				MediaInfo::new("-----------", "youtube")
					.with_title("Some 'Quoted' Title")
					.with_playlist_index(Some(2)),
				Some(10)
			)),
			linetype.try_get_parse_helper("PARSE_START 'youtube' '-----------' '2' '10' Some 'Quoted' Title")
		);

		assert_eq!(
			Some(CustomParseType::End(MediaInfo::new("-----------", "youtube"))),
			linetype.try_get_parse_helper("PARSE_END 'youtube' '-----------'")
		);

		assert_eq!(
			Some(CustomParseType::Move(
				MediaInfo::new("-----------", "youtube").with_filename("/tmp/out/Some Title.mp4")
			)),
			linetype.try_get_parse_helper("MOVE 'youtube' '-----------' /tmp/out/Some Title.mp4")
		);

		assert_eq!(
			Some(CustomParseType::Playlist(12)),
			linetype.try_get_parse_helper("PLAYLIST '12'")
		);
		assert_eq!(None, linetype.try_get_parse_helper("PLAYLIST 'NA'"));

		// other types are not parsed
		assert_eq!(
			None,
			LineType::Download.try_get_parse_helper("PARSE_END 'youtube' '-----------'")
		);
	}
}
