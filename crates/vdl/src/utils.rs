//! Utils for the `vdl` binary

use crate::clap_conf::CliDerive;
use indicatif::{
	ProgressBar,
	ProgressDrawTarget,
};
use libvdl::{
	chrono::NaiveDate,
	main::download::MINIMAL_YTDL_VERSION,
	spawn::{
		ffmpeg::locate_ffmpeg,
		ytdl::{
			YTDL_BIN_NAME,
			require_ytdl_installed,
			ytdl_parse_version_naivedate,
		},
	},
	utils::{
		default_download_dir,
		to_absolute,
	},
};
use std::{
	borrow::Cow,
	path::{
		Path,
		PathBuf,
	},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Helper function to set the progressbar to a draw target if mode is interactive
pub fn set_progressbar(bar: &ProgressBar, main_args: &CliDerive) {
	if main_args.is_interactive() {
		bar.set_draw_target(ProgressDrawTarget::stderr());
	}
}

/// Test if yt-dlp is installed and reachable, returns the version in use
///
/// A version that cannot be parsed is treated as [`MINIMAL_YTDL_VERSION`],
/// versions below it are warned about once a download starts
pub fn require_ytdl() -> Result<NaiveDate, crate::Error> {
	let version = require_ytdl_installed()?;

	return Ok(ytdl_parse_version_naivedate(&version).unwrap_or_else(|_| {
		warn!("Could not determine {} version properly, using default", YTDL_BIN_NAME);

		return MINIMAL_YTDL_VERSION;
	}));
}

/// Find the ffmpeg binary to give to yt-dlp
/// Returns [`None`] when "ffmpeg" from PATH should be used or when none could be found
pub fn find_ffmpeg(main_args: &CliDerive) -> Option<PathBuf> {
	return locate_ffmpeg(main_args.ffmpeg.as_deref())
		.ytdl_location()
		.map(Path::to_path_buf);
}

/// Resolve the output directory, handling "~" and relative paths
/// Uses [`default_download_dir`] when no path is given
pub fn resolve_output_dir(path: Option<&Path>) -> PathBuf {
	let Some(path) = path.filter(|v| return !v.as_os_str().is_empty()) else {
		return default_download_dir();
	};

	return to_absolute(path).unwrap_or_else(|err| {
		warn!("Could not make \"{}\" absolute: {}", path.display(), err);

		return path.to_path_buf();
	});
}

/// Characters appended when a message got truncated
const ELLIPSIS: &str = "...";

/// Get the display width of a single grapheme
fn grapheme_width(grapheme: &str) -> usize {
	let width = grapheme.width();

	// some terminals display emoji with VS16 as 2 characters
	if cfg!(feature = "workaround_fe0f") && grapheme.contains('\u{fe0f}') && width < 2 {
		return 2;
	}

	return width;
}

/// Get the display width of the whole message
pub fn display_width(msg: &str) -> usize {
	return msg.graphemes(true).map(grapheme_width).sum();
}

/// Truncate "msg" so that it takes at most "display_pos" positions in a terminal
/// If "add_ellipsis" is set, the truncated message ends with "..." (included in "display_pos")
pub fn truncate_message_display_pos(msg: &str, display_pos: usize, add_ellipsis: bool) -> Cow<'_, str> {
	if display_width(msg) <= display_pos {
		return Cow::Borrowed(msg);
	}

	let available = if add_ellipsis {
		display_pos.saturating_sub(ELLIPSIS.len())
	} else {
		display_pos
	};

	let mut width = 0;
	let mut end = 0;
	for (index, grapheme) in msg.grapheme_indices(true) {
		let current = grapheme_width(grapheme);

		if width + current > available {
			break;
		}

		width += current;
		end = index + grapheme.len();
	}

	let mut truncated = msg[..end].to_owned();

	if add_ellipsis {
		truncated.push_str(ELLIPSIS);
	}

	return Cow::Owned(truncated);
}

/// Truncate the given message to the terminal width minus "static_size", so that a progressbar does not do new-lines
/// Returns the message unchanged if the terminal size cannot be determined
pub fn truncate_message_term_width(msg: &str, static_size: usize) -> String {
	let display_width_available = terminal_size::terminal_size().map(|(w, _h)| {
		return usize::from(w.0).saturating_sub(static_size);
	});

	let Some(display_width_available) = display_width_available else {
		return msg.to_owned();
	};

	return truncate_message_display_pos(msg, display_width_available, true).into_owned();
}
