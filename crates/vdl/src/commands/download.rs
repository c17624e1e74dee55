use crate::{
	clap_conf::{
		CliDerive,
		CommandDownload,
	},
	utils,
};
use colored::{
	Color,
	Colorize,
};
use indicatif::{
	ProgressBar,
	ProgressStyle,
};
use libvdl::{
	main::{
		DownloadOutcome,
		download::MINIMAL_YTDL_VERSION,
		downloader::{
			DownloadRequest,
			DownloadSession,
			Progress,
		},
		status::{
			Status,
			StatusTracker,
		},
	},
	url_kind::UrlKind,
};
use std::{
	path::Path,
	sync::LazyLock,
};

/// Static for easily referencing the 100% length for a progressbar
const PG_PERCENT_100: u64 = 100;
/// Static size the Download Progress Style will take (plus some spacers)
/// currently accounts for `[00:00:00] ` + bar + ` 100% `
const STYLE_STATIC_SIZE: usize = 50;

/// ProgressBar Style for download, will look like `[00:00:00] [#>-] 42% CustomMsg`
static DOWNLOAD_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
	return ProgressStyle::default_bar()
		.template("[{elapsed_precise}] {bar:32.cyan/blue} {pos:>3}% {msg}")
		.expect("Expected ProgressStyle template to be valid")
		.progress_chars("#>-");
});

/// Displays download progress, either as a progressbar or as plain lines when not interactive
pub struct ProgressView {
	bar:         ProgressBar,
	tracker:     StatusTracker,
	interactive: bool,
	/// Last printed message, to not print the same line repeatedly in non-interactive mode
	last:        Option<String>,
}

impl ProgressView {
	pub fn new(main_args: &CliDerive) -> Self {
		let bar = ProgressBar::hidden().with_style(DOWNLOAD_STYLE.clone());
		utils::set_progressbar(&bar, main_args);

		return Self {
			bar,
			tracker: StatusTracker::new(),
			interactive: main_args.is_interactive(),
			last: None,
		};
	}

	/// Handle a progress event from the downloader
	pub fn handle(&mut self, progress: &Progress) {
		if let Some(status) = self.tracker.update(progress) {
			self.show(&status);
		}
	}

	/// Display a status
	pub fn show(&mut self, status: &Status) {
		if self.interactive {
			self.bar.set_position(u64::from(status.percent));
			self.bar
				.set_message(utils::truncate_message_term_width(&status.message, STYLE_STATIC_SIZE));

			return;
		}

		if self.last.as_deref() == Some(status.message.as_str()) {
			return;
		}

		println!("[{:>3}%] {}", status.percent, status.message);
		self.last = Some(status.message.clone());
	}

	/// Print a line without the progressbar drawing over it
	pub fn println<M: AsRef<str>>(&self, msg: M) {
		if self.interactive {
			self.bar.println(msg.as_ref());

			return;
		}

		println!("{}", msg.as_ref());
	}

	/// Remove the progressbar, keeping already printed lines
	pub fn finish(&self) {
		self.bar.finish_and_clear();
	}
}

impl Drop for ProgressView {
	fn drop(&mut self) {
		if !self.bar.is_finished() {
			self.bar.finish_and_clear();
		}
	}
}

/// Print the result of a finished download
pub fn print_outcome(outcome: &DownloadOutcome, output_dir: &Path) {
	match outcome {
		DownloadOutcome::Completed(media) => {
			println!(
				"{} {} file(s) in \"{}\"",
				"Download completed successfully!".color(Color::Green),
				media.len(),
				output_dir.display()
			);
			for media in media {
				if let Some(filename) = &media.filename {
					println!("  {}", filename.display());
				}
			}
		},
		DownloadOutcome::Paused => println!("{}", "Download paused".color(Color::Yellow)),
		DownloadOutcome::Cancelled => println!("{}", "Download cancelled".color(Color::Yellow)),
	}
}

/// Handler function for the "download" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_download(main_args: &CliDerive, sub_args: &CommandDownload) -> Result<(), crate::Error> {
	let output_dir = utils::resolve_output_dir(sub_args.output_path.as_deref());

	// yt-dlp and ffmpeg are only required when a url actually uses them
	let needs_ytdl = sub_args.urls.iter().any(|v| return UrlKind::classify(v).uses_ytdl());
	let (ytdl_version, ffmpeg) = if needs_ytdl {
		(utils::require_ytdl()?, utils::find_ffmpeg(main_args))
	} else {
		(MINIMAL_YTDL_VERSION, None)
	};

	let url_count = sub_args.urls.len();
	let mut failed = 0;

	for (index, url) in sub_args.urls.iter().enumerate() {
		if url_count > 1 {
			println!("[{}/{}] {}", index + 1, url_count, url.as_str().bold());
		}

		let mut request = DownloadRequest::new(url, &output_dir)
			.with_quality(sub_args.quality)
			.with_playlist(sub_args.playlist.clone())
			.with_ffmpeg(ffmpeg.clone())
			.with_ytdl_version(ytdl_version);
		request.extra_args = sub_args.extra_arguments();
		request.print_command_log = sub_args.print_ytdl_log;
		request.save_command_log = sub_args.save_ytdl_log;

		match download_with_view(main_args, DownloadSession::new(request)) {
			Ok(outcome) => {
				print_outcome(&outcome, &output_dir);

				// a cancel stops all remaining urls
				if outcome == DownloadOutcome::Cancelled {
					return Ok(());
				}
			},
			Err(err) => {
				error!("Failed to download \"{}\": {}", url, err);
				println!("{} {}", "Failed to download.".color(Color::Red), err);
				failed += 1;
			},
		}
	}

	if failed > 0 {
		return Err(crate::Error::other(format!(
			"Failed to download {failed} of {url_count} URL(s), see the log for details"
		)));
	}

	return Ok(());
}

/// Run a session to completion, displaying its progress
/// A termination signal cancels the session while it runs
fn download_with_view(main_args: &CliDerive, session: DownloadSession) -> Result<DownloadOutcome, crate::Error> {
	let mut view = ProgressView::new(main_args);

	crate::set_active_control(Some(session.control().clone()));
	let res = session.start(|v| {
		view.handle(&v);
	});
	crate::set_active_control(None);

	view.finish();

	return res;
}
