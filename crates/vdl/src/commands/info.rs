use crate::{
	clap_conf::{
		CliDerive,
		CommandInfo,
	},
	utils,
};
use colored::Colorize;
use indicatif::{
	ProgressBar,
	ProgressStyle,
};
use libvdl::{
	chrono::NaiveDate,
	info::{
		FetchProgress,
		MediaDetails,
		PlaylistInfo,
		VideoInfo,
		fetch_info,
	},
	url_kind::{
		UrlKind,
		validate_url,
	},
};
use std::{
	sync::LazyLock,
	time::Duration,
};

/// ProgressBar Style for fetching information, will look like `⠋ [00:00:00] CustomMsg`
static FETCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
	return ProgressStyle::default_spinner()
		.template("{spinner:.cyan} [{elapsed_precise}] {msg}")
		.expect("Expected ProgressStyle template to be valid");
});

/// Handler function for the "info" subcommand
/// This function is mainly to keep the code structured and sorted
#[inline]
pub fn command_info(main_args: &CliDerive, sub_args: &CommandInfo) -> Result<(), crate::Error> {
	let url = sub_args.url.trim();

	if !validate_url(url) {
		return Err(crate::Error::invalid_input("Invalid URL format"));
	}

	if !UrlKind::classify(url).uses_ytdl() {
		println!("\"{url}\" is not a YouTube URL, it will be downloaded directly without further information");

		return Ok(());
	}

	utils::require_ytdl()?;

	let details = fetch_with_spinner(main_args, url)?;
	print_details(&details);

	return Ok(());
}

/// Fetch the information for "url" while showing a spinner with the current status
pub fn fetch_with_spinner(main_args: &CliDerive, url: &str) -> Result<MediaDetails, crate::Error> {
	let spinner = ProgressBar::hidden().with_style(FETCH_STYLE.clone());
	utils::set_progressbar(&spinner, main_args);
	spinner.enable_steady_tick(Duration::from_millis(100));

	let res = fetch_info(url, |v| {
		let msg = fetch_message(&v);
		if main_args.is_interactive() {
			spinner.set_message(msg);
		} else {
			info!("{}", msg);
		}
	});

	spinner.finish_and_clear();

	return res;
}

/// Get the status message for a fetch event
fn fetch_message(progress: &FetchProgress) -> String {
	return match progress {
		FetchProgress::Started(msg) => format!("{msg} This may take a moment."),
		FetchProgress::Found { title, total } => format!("Found playlist: {title} with {total} videos"),
		FetchProgress::Entry { current, total, title } => {
			format!("Processing playlist: {current}/{total} - {title}")
		},
		FetchProgress::Finished { total } => format!("Fetched information for {total} video(s)"),
	};
}

/// Format a count with "," as thousands separator, like "1,234,567"
pub fn format_count(count: u64) -> String {
	let digits = count.to_string();
	let mut out = String::with_capacity(digits.len() + digits.len() / 3);

	for (index, digit) in digits.chars().enumerate() {
		if index > 0 && (digits.len() - index) % 3 == 0 {
			out.push(',');
		}
		out.push(digit);
	}

	return out;
}

/// Format a "YYYYMMDD" upload date as "YYYY-MM-DD", unknown formats are returned as-is
pub fn format_upload_date(date: &str) -> String {
	return NaiveDate::parse_from_str(date, "%Y%m%d")
		.map_or_else(|_| return date.to_owned(), |v| return v.format("%Y-%m-%d").to_string());
}

/// Print the details of a video or playlist
pub fn print_details(details: &MediaDetails) {
	match details {
		MediaDetails::Video(video) => print_video(video),
		MediaDetails::Playlist(playlist) => print_playlist(playlist),
	}
}

fn print_video(video: &VideoInfo) {
	println!("{} {}", "Title:".bold(), video.title);
	println!("{} {}", "Channel:".bold(), video.channel);
	if video.is_live {
		println!("{} live", "Duration:".bold());
	} else {
		println!("{} {}", "Duration:".bold(), video.duration_formatted);
	}
	if let Some(views) = video.view_count {
		println!("{} {}", "Views:".bold(), format_count(views));
	}
	if let Some(date) = &video.upload_date {
		println!("{} {}", "Uploaded:".bold(), format_upload_date(date));
	}
}

fn print_playlist(playlist: &PlaylistInfo) {
	println!("{} {}", "Playlist:".bold(), playlist.title);
	println!("{} {}", "Videos:".bold(), playlist.total_videos);
	println!("{} {}", "Total duration:".bold(), playlist.total_duration_str);

	if playlist.videos.len() < playlist.total_videos {
		println!(
			"{} video(s) are unavailable",
			playlist.total_videos - playlist.videos.len()
		);
	}

	for entry in &playlist.videos {
		println!("{:>4}. {} ({})", entry.index, entry.title, entry.duration_str.dimmed());
	}
}
