use libvdl::{
	main::{
		DownloadOutcome,
		download::MINIMAL_YTDL_VERSION,
		downloader::{
			DownloadRequest,
			DownloadSession,
		},
		status::StatusTracker,
	},
	quality::Quality,
	spawn::ytdl::{
		require_ytdl_installed,
		ytdl_parse_version_naivedate,
	},
	utils::default_download_dir,
};

fn main() -> Result<(), libvdl::Error> {
	let ytdl_version = require_ytdl_installed()?;

	let ytdl_version = ytdl_parse_version_naivedate(&ytdl_version).unwrap_or_else(|_| {
		eprintln!("Could not determine yt-dlp version properly, using default");

		return MINIMAL_YTDL_VERSION;
	});

	let mut args = std::env::args();

	let _ = args.next();

	let url = args.next().expect("Expected a URL as a argument");

	assert!(!url.is_empty(), "Given URL is empty!");

	let request = DownloadRequest::new(url, default_download_dir())
		.with_quality(Quality::P720)
		.with_ytdl_version(ytdl_version);
	let session = DownloadSession::new(request);

	let mut tracker = StatusTracker::new();
	let outcome = session.start(|event| {
		if let Some(status) = tracker.update(&event) {
			println!("[{:>3}%] {}", status.percent, status.message);
		}
	})?;

	match outcome {
		DownloadOutcome::Completed(media) => println!("Finished downloading everything, all media: {media:#?}"),
		DownloadOutcome::Paused => println!("Download paused"),
		DownloadOutcome::Cancelled => println!("Download cancelled"),
	}

	return Ok(());
}
