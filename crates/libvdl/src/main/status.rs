//! Module for turning progress events into a percentage and a human readable status line

use crate::{
	info::format_eta,
	main::{
		download::DownloadProgress,
		downloader::Progress,
		web::WebProgress,
	},
};

/// A status to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
	/// Progress of the current item, 0 to 100
	pub percent: u8,
	pub message: String,
}

impl Status {
	fn new<M: Into<String>>(percent: u8, message: M) -> Self {
		return Self {
			percent,
			message: message.into(),
		};
	}
}

/// Tracks the events of a download to build status lines, which need information from earlier events
#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
	title:          Option<String>,
	playlist_index: Option<usize>,
	playlist_count: Option<usize>,
	last_percent:   u8,
}

impl StatusTracker {
	pub fn new() -> Self {
		return Self::default();
	}

	/// Get the "video i/n" position, if the current media is part of a playlist
	fn position(&self) -> Option<(usize, usize)> {
		let index = self.playlist_index.filter(|v| return *v > 0)?;
		let count = self.playlist_count.filter(|v| return *v > 0)?;

		return Some((index, count));
	}

	/// Get whether the current download is a playlist
	pub fn is_playlist(&self) -> bool {
		return self.playlist_count.is_some();
	}

	/// Process a event, returns the new status if the event changes it
	pub fn update(&mut self, progress: &Progress) -> Option<Status> {
		return match progress {
			Progress::Ytdl(v) => self.update_ytdl(v),
			Progress::Web(v) => self.update_web(v),
		};
	}

	fn update_ytdl(&mut self, progress: &DownloadProgress) -> Option<Status> {
		match progress {
			DownloadProgress::UrlStarting => {
				self.last_percent = 0;
				return Some(Status::new(0, "Preparing download..."));
			},
			DownloadProgress::PlaylistInfo(count) => {
				self.playlist_count = Some(*count);
				return None;
			},
			DownloadProgress::SingleStarting {
				title,
				playlist_index,
				playlist_count,
				..
			} => {
				self.title = Some(title.clone());
				self.playlist_index = *playlist_index;
				if playlist_count.is_some() {
					self.playlist_count = *playlist_count;
				}
				self.last_percent = 0;

				return Some(Status::new(0, self.downloading_message("0%", None)));
			},
			DownloadProgress::SingleProgress { percent, eta, .. } => {
				self.last_percent = *percent;

				return Some(Status::new(
					*percent,
					self.downloading_message(&format!("{percent}%"), *eta),
				));
			},
			DownloadProgress::SingleProcessing(_) => {
				let title = self.title.as_deref().unwrap_or("media");
				let message = match self.position() {
					Some((index, count)) => format!("Processing video {index}/{count}: {title}"),
					None => format!("Processing file: {title}"),
				};

				return Some(Status::new(100, message));
			},
			// the next "SingleStarting" or "UrlFinished" updates the status
			DownloadProgress::SingleFinished(_) => return None,
			DownloadProgress::Skipped(count) => {
				return Some(Status::new(
					self.last_percent,
					format!("Skipped {count} unavailable video(s)"),
				));
			},
			DownloadProgress::UrlFinished(_) => {
				if self.is_playlist() {
					return Some(Status::new(100, "Playlist download complete"));
				}

				return Some(Status::new(100, "Download complete"));
			},
			DownloadProgress::Paused(percent) => return Some(Status::new(*percent, "Download paused")),
			DownloadProgress::Cancelled => return Some(Status::new(0, "Download cancelled")),
		}
	}

	fn update_web(&mut self, progress: &WebProgress) -> Option<Status> {
		return match progress {
			WebProgress::Starting { filename, .. } => {
				self.title = Some(filename.clone());
				self.last_percent = 0;

				Some(Status::new(0, format!("Starting download: {filename}")))
			},
			WebProgress::Progress {
				downloaded, percent, ..
			} => match percent {
				Some(percent) => {
					self.last_percent = *percent;

					Some(Status::new(*percent, format!("Downloading: {percent}%")))
				},
				None => Some(Status::new(0, format!("Downloading: {downloaded} bytes"))),
			},
			WebProgress::Paused(percent) => Some(Status::new(*percent, "Download paused")),
			WebProgress::Cancelled => Some(Status::new(0, "Download cancelled")),
			WebProgress::Finished(_) => Some(Status::new(100, "Download complete")),
		};
	}

	/// Build the "Downloading ..." message for the current media
	fn downloading_message(&self, percent: &str, eta: Option<u64>) -> String {
		let eta_str = eta.map_or_else(String::new, |v| return format!(" - ETA: {}", format_eta(v)));

		return match (self.title.as_deref(), self.position()) {
			(Some(title), Some((index, count))) => {
				format!("Downloading video {index}/{count}: {title} - {percent}{eta_str}")
			},
			(Some(title), None) => format!("Downloading: {title} - {percent}{eta_str}"),
			(None, _) => format!("Downloading: {percent}{eta_str}"),
		};
	}
}
