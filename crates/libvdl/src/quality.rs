//! Module for the selectable download quality and its yt-dlp format selector

use std::{
	fmt::Display,
	str::FromStr,
};

/// The quality the user can select, from highest to lowest with audio-only last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
	P2160,
	P1440,
	P1080,
	P720,
	P480,
	P360,
	/// Best available video and audio
	#[default]
	Highest,
	/// Only download the audio and convert it to mp3
	AudioOnly,
}

impl Quality {
	/// All variants, in the order they should be presented in a menu
	pub const fn all() -> &'static [Self] {
		return &[
			Self::P2160,
			Self::P1440,
			Self::P1080,
			Self::P720,
			Self::P480,
			Self::P360,
			Self::Highest,
			Self::AudioOnly,
		];
	}

	/// Get the label for the current variant, the same label is accepted by [`Quality::from_str`]
	pub const fn label(self) -> &'static str {
		return match self {
			Self::P2160 => "2160p",
			Self::P1440 => "1440p",
			Self::P1080 => "1080p",
			Self::P720 => "720p",
			Self::P480 => "480p",
			Self::P360 => "360p",
			Self::Highest => "highest",
			Self::AudioOnly => "audio only",
		};
	}

	/// Get whether the output should be audio-only
	pub const fn is_audio(self) -> bool {
		return matches!(self, Self::AudioOnly);
	}

	/// Get the maximal video height, if the quality is limited
	pub const fn max_height(self) -> Option<u32> {
		return match self {
			Self::P2160 => Some(2160),
			Self::P1440 => Some(1440),
			Self::P1080 => Some(1080),
			Self::P720 => Some(720),
			Self::P480 => Some(480),
			Self::P360 => Some(360),
			Self::Highest | Self::AudioOnly => None,
		};
	}

	/// Get the yt-dlp format selector ("-f") for this quality
	pub fn format_selector(self) -> String {
		if self.is_audio() {
			return "bestaudio/best".to_owned();
		}

		return match self.max_height() {
			// prefer separate video+audio streams (merged by ffmpeg), fallback to the best combined stream
			Some(height) => format!("bv[height<={height}]+ba/b[height<={height}]"),
			None => "bv*+ba/b".to_owned(),
		};
	}
}

impl Display for Quality {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return f.write_str(self.label());
	}
}

impl FromStr for Quality {
	type Err = crate::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let lower = s.trim().to_lowercase();

		return match lower.as_str() {
			"2160p" | "2160" => Ok(Self::P2160),
			"1440p" | "1440" => Ok(Self::P1440),
			"1080p" | "1080" => Ok(Self::P1080),
			"720p" | "720" => Ok(Self::P720),
			"480p" | "480" => Ok(Self::P480),
			"360p" | "360" => Ok(Self::P360),
			"highest" | "best" => Ok(Self::Highest),
			"audio only" | "audio-only" | "audio" => Ok(Self::AudioOnly),
			_ => Err(crate::Error::invalid_input(format!(
				"Unknown quality \"{}\", expected one of: {}",
				s,
				Self::all().iter().map(|v| return v.label()).collect::<Vec<_>>().join(", ")
			))),
		};
	}
}
