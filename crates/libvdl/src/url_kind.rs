//! Module for classifying input URLs

use url::Url;

/// Check if the input is a usable absolute URL (has a scheme and a host)
pub fn validate_url(input: &str) -> bool {
	let input = input.trim();

	if input.is_empty() {
		return false;
	}

	let Ok(parsed) = Url::parse(input) else {
		return false;
	};

	return !parsed.scheme().is_empty() && parsed.host_str().is_some_and(|v| return !v.is_empty());
}

/// Check if the URL points to youtube
pub fn is_youtube_url(input: &str) -> bool {
	return input.contains("youtube.com") || input.contains("youtu.be");
}

/// Check if the URL looks like a playlist
/// This does not check if the URL is from youtube, see [`UrlKind::classify`]
pub fn is_playlist_url(input: &str) -> bool {
	return input.contains("playlist") || input.contains("list=");
}

/// Get the playlist id from the "list=" parameter of a URL
pub fn playlist_id(input: &str) -> Option<String> {
	if let Ok(parsed) = Url::parse(input.trim()) {
		if let Some((_, value)) = parsed.query_pairs().find(|(key, _)| return key == "list") {
			if !value.is_empty() {
				return Some(value.into_owned());
			}
		}
	}

	// fallback for inputs "Url" could not parse
	let (_, after) = input.split_once("list=")?;
	let id = after.split('&').next().unwrap_or_default();

	if id.is_empty() {
		return None;
	}

	return Some(id.to_owned());
}

/// Build the canonical youtube playlist URL for a playlist id
pub fn canonical_playlist_url(id: &str) -> String {
	return format!("https://www.youtube.com/playlist?list={id}");
}

/// The kinds of URLs that are handled differently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
	/// A single youtube video, downloaded with yt-dlp
	YoutubeVideo,
	/// A youtube playlist, downloaded with yt-dlp in playlist mode
	YoutubePlaylist,
	/// Anything else, downloaded directly over HTTP
	Web,
}

impl UrlKind {
	/// Classify the given URL
	pub fn classify(input: &str) -> Self {
		if !is_youtube_url(input) {
			return Self::Web;
		}

		if is_playlist_url(input) {
			return Self::YoutubePlaylist;
		}

		return Self::YoutubeVideo;
	}

	/// Get whether this kind is downloaded with yt-dlp
	pub fn uses_ytdl(self) -> bool {
		return self != Self::Web;
	}
}

#[cfg(test)]
mod test {
	use super::*;

	mod validate_url {
		use super::*;

		#[test]
		fn test_valid() {
			assert!(validate_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
			assert!(validate_url("  http://example.com/video.mp4  "));
			assert!(validate_url("ftp://files.example.org/a"));
		}

		#[test]
		fn test_invalid() {
			assert!(!validate_url(""));
			assert!(!validate_url("   "));
			assert!(!validate_url("not a url"));
			assert!(!validate_url("example.com/video.mp4"));
			assert!(!validate_url("mailto:someone@example.com"));
			assert!(!validate_url("file:///tmp/video.mp4"));
		}
	}

	mod classify {
		use super::*;

		#[test]
		fn test_youtube_video() {
			assert_eq!(
				UrlKind::classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
				UrlKind::YoutubeVideo
			);
			assert_eq!(UrlKind::classify("https://youtu.be/dQw4w9WgXcQ"), UrlKind::YoutubeVideo);
		}

		#[test]
		fn test_youtube_playlist() {
			assert_eq!(
				UrlKind::classify("https://www.youtube.com/playlist?list=PL1234"),
				UrlKind::YoutubePlaylist
			);
			assert_eq!(
				UrlKind::classify("https://www.youtube.com/watch?v=abc&list=PL1234"),
				UrlKind::YoutubePlaylist
			);
		}

		#[test]
		fn test_web() {
			assert_eq!(UrlKind::classify("https://example.com/video.mp4"), UrlKind::Web);
			// playlist-looking urls that are not youtube are still plain web downloads
			assert_eq!(UrlKind::classify("https://example.com/playlist.m3u"), UrlKind::Web);
			assert!(!UrlKind::Web.uses_ytdl());
			assert!(UrlKind::YoutubePlaylist.uses_ytdl());
		}
	}

	mod playlist_id {
		use super::*;

		#[test]
		fn test_from_query() {
			assert_eq!(
				playlist_id("https://www.youtube.com/watch?v=abc&list=PL1234&index=2"),
				Some("PL1234".to_owned())
			);
			assert_eq!(
				playlist_id("https://www.youtube.com/playlist?list=PLxyz"),
				Some("PLxyz".to_owned())
			);
		}

		#[test]
		fn test_fallback_and_missing() {
			assert_eq!(playlist_id("youtube.com/playlist?list=PLabc&x=1"), Some("PLabc".to_owned()));
			assert_eq!(playlist_id("https://www.youtube.com/watch?v=abc"), None);
			assert_eq!(playlist_id("https://www.youtube.com/playlist?list="), None);
		}

		#[test]
		fn test_canonical() {
			assert_eq!(
				canonical_playlist_url("PL1234"),
				"https://www.youtube.com/playlist?list=PL1234"
			);
		}
	}
}
