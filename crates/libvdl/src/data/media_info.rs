//! Module containing [`MediaInfo`]

use std::path::{
	Path,
	PathBuf,
};

/// Provider name used for media downloaded directly over HTTP
pub const WEB_PROVIDER: &str = "web";

/// Contains Media Information collected while downloading, like the title and final file path
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
	/// The file-path of the media, set once the final file is known
	pub filename:       Option<PathBuf>,
	/// The title of the media, may differ from "filename"
	pub title:          Option<String>,
	/// The ID of the media
	pub id:             String,
	/// The Provider that provided this media (the yt-dlp extractor name)
	pub provider:       String,
	/// The 1-based position among the downloaded playlist entries, if downloaded as part of a playlist
	pub playlist_index: Option<usize>,
}

impl MediaInfo {
	/// Crate a new instance of [`MediaInfo`]
	pub fn new<I: AsRef<str>, P: AsRef<str>>(id: I, provider: P) -> Self {
		return Self {
			id:             id.as_ref().into(),
			provider:       provider.as_ref().into(),
			filename:       None,
			title:          None,
			playlist_index: None,
		};
	}

	/// Builder function to add a filename
	#[must_use]
	pub fn with_filename<F: AsRef<Path>>(mut self, filename: F) -> Self {
		self.filename = Some(filename.as_ref().into());

		return self;
	}

	/// Builder function to add a title
	#[must_use]
	pub fn with_title<T: AsRef<str>>(mut self, title: T) -> Self {
		self.title = Some(title.as_ref().into());

		return self;
	}

	/// Builder function to add a playlist index
	#[must_use]
	pub fn with_playlist_index(mut self, index: Option<usize>) -> Self {
		self.playlist_index = index;

		return self;
	}

	/// Set the filename of the current [`MediaInfo`]
	pub fn set_filename<F: AsRef<Path>>(&mut self, filename: F) {
		self.filename = Some(filename.as_ref().into());
	}

	/// Get the title, or the id if no title is known
	pub fn display_title(&self) -> &str {
		return self.title.as_deref().unwrap_or(&self.id);
	}
}
