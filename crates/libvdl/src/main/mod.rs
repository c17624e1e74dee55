//! Module for all the main functionality in the library (to keep everything sorted)

use crate::data::media_info::MediaInfo;

pub mod download;
pub mod downloader;
pub mod status;
pub mod web;

/// How a download run ended, when it did not end with a error
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
	/// Everything was processed, contains all media that was actually downloaded
	Completed(Vec<MediaInfo>),
	/// The run stopped because a pause was requested, it can be started again with "resume"
	Paused,
	/// The run stopped because a cancel was requested
	Cancelled,
}
