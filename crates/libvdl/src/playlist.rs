//! Module for selecting which entries of a playlist should be downloaded

use std::sync::LazyLock;

use regex::Regex;

/// Which entries of a playlist to download
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaylistSelection {
	/// Download the whole playlist
	#[default]
	Full,
	/// Download specific entries, 1-based indexes in the order they were given
	Items(Vec<usize>),
	/// Download a inclusive range of entries, 1-based
	/// values: (start, end)
	Range(usize, usize),
}

/// Regex to validate a range input like "1-5"
/// cap1: start, cap2: end
static RANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	return Regex::new(r"^(\d+)-(\d+)$").unwrap();
});

impl PlaylistSelection {
	/// Parse a comma separated list of 1-based indexes, like "1,3,5"
	///
	/// Duplicate indexes are removed, keeping the first occurence
	pub fn parse_items(input: &str) -> Result<Self, crate::Error> {
		let mut items: Vec<usize> = Vec::new();

		for part in input.split(',') {
			let part = part.trim();

			if part.is_empty() {
				continue;
			}

			let index = part.parse::<usize>().map_err(|_| {
				return crate::Error::invalid_input(format!("Playlist item \"{part}\" is not a number"));
			})?;

			if index == 0 {
				return Err(crate::Error::invalid_input("Playlist items start at 1"));
			}

			if !items.contains(&index) {
				items.push(index);
			}
		}

		if items.is_empty() {
			return Err(crate::Error::invalid_input("No playlist items given"));
		}

		return Ok(Self::Items(items));
	}

	/// Parse a range like "1-5"
	///
	/// A start below 1 is clamped to 1
	pub fn parse_range(input: &str) -> Result<Self, crate::Error> {
		let input = input.trim();

		let Some(cap) = RANGE_REGEX.captures(input) else {
			return Err(crate::Error::invalid_input(format!(
				"Invalid range \"{input}\", use start-end (e.g. 1-5)"
			)));
		};

		let parse_num = |v: &str| {
			return v
				.parse::<usize>()
				.map_err(|err| return crate::Error::invalid_input(format!("Invalid range number \"{v}\": {err}")));
		};

		let start = parse_num(&cap[1])?.max(1);
		let end = parse_num(&cap[2])?;

		if end < start {
			return Err(crate::Error::invalid_input(format!(
				"Range end ({end}) is lower than the start ({start})"
			)));
		}

		return Ok(Self::Range(start, end));
	}

	/// Get the value for yt-dlp "--playlist-items", [`None`] when the whole playlist is selected
	pub fn ytdl_items_arg(&self) -> Option<String> {
		return match self {
			Self::Full => None,
			Self::Items(items) => Some(
				items
					.iter()
					.map(|v| return v.to_string())
					.collect::<Vec<String>>()
					.join(","),
			),
			Self::Range(start, end) => Some(format!("{start}-{end}")),
		};
	}

	/// Get how many entries are selected, if known without looking at the playlist
	pub fn count_hint(&self) -> Option<usize> {
		return match self {
			Self::Full => None,
			Self::Items(items) => Some(items.len()),
			Self::Range(start, end) => Some(end - start + 1),
		};
	}
}
