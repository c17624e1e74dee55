//! Module for handling yt-dlp

use assemble_cmd::assemble_ytdl_command;
use chrono::NaiveDate;
use parse_linetype::{
	CustomParseType,
	LineType,
};
use std::{
	fs::OpenOptions,
	io::{
		BufRead,
		BufReader,
		BufWriter,
		Write,
	},
	path::PathBuf,
	time::Duration,
};

use crate::{
	control::{
		DownloadControl,
		Interrupt,
	},
	data::media_info::MediaInfo,
	error::IOErrorToError,
	main::DownloadOutcome,
	spawn::ytdl::YTDL_BIN_NAME,
};

pub use assemble_cmd::{
	PLAYLIST_OUTPUT_TEMPLATE,
	SINGLE_OUTPUT_TEMPLATE,
};
pub use download_options::DownloadOptions;

mod assemble_cmd;
mod download_options;
mod parse_linetype;

/// The minimal yt-dlp version that is expected to be used.
///
/// Newer versions can be used to likely unlock extra functionality, but vdl is build around this as the minimal in mind.
pub const MINIMAL_YTDL_VERSION: chrono::NaiveDate = chrono::NaiveDate::from_ymd_opt(2023, 3, 24).unwrap();

/// Parts of yt-dlp warnings that are known to be harmless noise, these are only logged at debug level
const NOISY_WARNINGS: &[&str] = &["nsig extraction failed", "SABR streaming"];

/// Enum for hooks to know what is currently happening
/// All Variants will have a certian order in which they are called (like UrlStarting is always before a SingleStarting)
/// but not all may be called, like there may be "SingleStarting -> SingleProgress -> Skipped" instead of "SingleStarting -> SingleProgress -> SingleFinished"
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadProgress {
	/// Variant representing that the download of a single url is starting
	UrlStarting,
	/// Variant representing that playlist info has been found - may not trigger if not in a playlist
	/// values: (playlist_count)
	PlaylistInfo(usize),
	/// Variant representing a skipped element because of a error
	/// may be called after "SingleStarting" and / or "SingleProgress" instead of "SingleFinished"
	/// values: (skipped_count)
	Skipped(usize),
	/// Variant representing that a media has started the process
	SingleStarting {
		id:             String,
		title:          String,
		/// 1-based position among the selected playlist entries, if known
		playlist_index: Option<usize>,
		/// Amount of selected playlist entries, if known
		playlist_count: Option<usize>,
	},
	/// Variant representing that a started media has increased in progress
	/// "id" may be [`None`] when the previous parsing did not parse a title
	SingleProgress {
		id:      Option<String>,
		percent: u8,
		/// Estimated seconds left, if known
		eta:     Option<u64>,
	},
	/// Variant representing that a media is being post-processed (merging, extracting audio)
	/// values: (id)
	SingleProcessing(Option<String>),
	/// Variant representing that a media has finished the process
	/// the "id" is not guranteed to be the same as in [`DownloadProgress::SingleStarting`]
	/// will only be called if there was a download AND no error happened
	/// values: (id)
	SingleFinished(String),
	/// Variant representing that the download of a single url has finished
	/// The value in this tuple is the size of actually downloaded media, not just found media
	/// values: (downloaded media count)
	UrlFinished(usize),
	/// Variant representing that the download stopped because of a pause request
	/// values: (last known percent of the current media)
	Paused(u8),
	/// Variant representing that the download stopped because of a cancel request
	Cancelled,
}

/// Warn if a version lower than the minimal is used
fn warn_minimal_version(ytdl_version: NaiveDate) {
	if ytdl_version < MINIMAL_YTDL_VERSION {
		warn!(
			"Used {} version ({}) is lower than the recommended minimal {}",
			YTDL_BIN_NAME,
			ytdl_version.format("%Y.%m.%d"),
			MINIMAL_YTDL_VERSION.format("%Y.%m.%d"),
		);
	}
}

/// Download a single URL with yt-dlp, a playlist URL counts as a single URL
/// Assumes ytdl has already been checked to exist and work (like using [`crate::spawn::ytdl::ytdl_version`])
///
/// The "control" is checked on every output line, a pause or cancel kills the yt-dlp process.
/// Already downloaded parts are kept by yt-dlp, so running this function again will continue where it left off.
pub fn download_single<A: DownloadOptions, C: FnMut(DownloadProgress)>(
	options: &A,
	control: &DownloadControl,
	pgcb: C,
) -> Result<DownloadOutcome, crate::Error> {
	warn_minimal_version(options.ytdl_version());

	let ytdl_child = {
		let args = assemble_ytdl_command(options);

		// merge stderr into stdout
		duct::cmd(YTDL_BIN_NAME, args)
			.stderr_to_stdout()
			.reader()
			.attach_location_err("duct ytdl reader")?
	};

	let stdout_reader = BufReader::new(&ytdl_child);

	let mut mediainfo_vec: Vec<MediaInfo> = Vec::new();

	let res = handle_stdout(options, control, pgcb, stdout_reader, &mut mediainfo_vec);

	// stop the process in any case where the output was not read until the end
	if !matches!(res, Ok(StdoutEnd::Finished)) {
		debug!("Stopping {} before it finished", YTDL_BIN_NAME);
		if let Err(err) = ytdl_child.kill() {
			debug!("Killing {} failed: {}", YTDL_BIN_NAME, err);
		}
	}

	match res? {
		StdoutEnd::Interrupted(Interrupt::Paused) => return Ok(DownloadOutcome::Paused),
		StdoutEnd::Interrupted(Interrupt::Cancelled) => return Ok(DownloadOutcome::Cancelled),
		StdoutEnd::Finished => (),
	}

	loop {
		// wait loop, because somehow a "ReaderHandle" does not implement "wait", only "try_wait", but have to wait for it to exit here
		match ytdl_child.try_wait() {
			Ok(v) => {
				// only in the "Some" case is the wait actually finished
				if v.is_some() {
					break;
				}
			},
			Err(err) => {
				// ignore duct errors as non-"Err" worthy, errors for media are handled by the output
				warn!("yt-dlp exited with a non-0 code: {err}");
				break;
			},
		}

		std::thread::sleep(Duration::from_millis(100)); // sleep to same some time between the next wait (to not cause constant cpu spike)
	}

	return Ok(DownloadOutcome::Completed(mediainfo_vec));
}

/// How [`handle_stdout`] stopped reading
#[derive(Debug, Clone, Copy, PartialEq)]
enum StdoutEnd {
	/// All output was read
	Finished,
	/// Reading was stopped because of a pause or cancel request
	Interrupted(Interrupt),
}

/// Get the path the command log will be written to
#[must_use]
pub fn command_log_path(output_dir: &std::path::Path) -> PathBuf {
	return output_dir.join(format!("vdl_{}.log", std::process::id()));
}

/// Log a yt-dlp warning, known noise is demoted to debug level
fn log_ytdl_warning(line: &str) {
	if NOISY_WARNINGS.iter().any(|v| return line.contains(v)) {
		debug!("yt-dlp: {:#?}", line);
		return;
	}

	// ytdl warnings are non-fatal, but should still be logged
	warn!("yt-dlp: {:#?}", line);
}

/// State of the media that is currently processed while reading the output
#[derive(Debug, Default)]
struct OutputState {
	/// "current_mediainfo" may not be defined because it cannot be guranteed that a parsed output was emitted
	current_mediainfo: Option<MediaInfo>,
	/// value to determine if a media has actually been downloaded, or just found
	had_download:      bool,
	/// value to only report processing once per media
	had_processing:    bool,
	/// the last playlist size found, used when "PARSE_START" does not contain one
	playlist_count:    Option<usize>,
	/// the last progress percent reported, used when pausing
	last_percent:      u8,
}

impl OutputState {
	/// Get the id of the current media, if there is one
	fn current_id(&self) -> Option<String> {
		return self.current_mediainfo.as_ref().map(|v| return v.id.clone());
	}
}

/// Helper function to handle the output from a spawned ytdl command
/// Adds all non-skipped Media to the input [`Vec<MediaInfo>`]
#[inline]
fn handle_stdout<A: DownloadOptions, C: FnMut(DownloadProgress), R: BufRead>(
	options: &A,
	control: &DownloadControl,
	mut pgcb: C,
	reader: R,
	mediainfo_vec: &mut Vec<MediaInfo>,
) -> Result<StdoutEnd, crate::Error> {
	// report that the downloading is now starting
	pgcb(DownloadProgress::UrlStarting);

	// cache the bool for "print_command_stdout" to not execute the function for every line (should be a static value)
	let print_stdout = options.print_command_log();

	let mut state = OutputState::default();
	// store the last error line encountered
	let mut last_error = None;

	let mut maybe_command_file_log = if options.save_command_log() {
		let path = command_log_path(options.download_path());

		info!("Logging command output to \"{}\"", path.display());

		let mut file = BufWriter::new(
			OpenOptions::new()
				.create(true)
				.append(true)
				.open(&path)
				.attach_path_err(&path)?,
		);

		file.write_all(b"\nNew Instance\n").attach_path_err(&path)?;

		Some((file, path))
	} else {
		None
	};

	// HACK: .lines() iter never exits on non-0 exit codes in duct, see https://github.com/oconnor663/duct.rs/issues/112
	for line in reader.lines() {
		if let Some(interrupt) = control.checkpoint() {
			match interrupt {
				Interrupt::Paused => {
					info!("Download paused at {}%", state.last_percent);
					pgcb(DownloadProgress::Paused(state.last_percent));
				},
				Interrupt::Cancelled => {
					info!("Download cancelled");
					pgcb(DownloadProgress::Cancelled);
				},
			}

			return Ok(StdoutEnd::Interrupted(interrupt));
		}

		let line = match line {
			Ok(v) => v,
			Err(err) => {
				debug!("duct lines reader errored: {}", err);
				break; // handle it as a non-breaking case, because in 99% of cases it is just a error of "command ... exited with code ?"
			},
		};

		// only print STDOUT to output when requested
		if print_stdout {
			trace!("ytdl [STDOUT]: \"{}\"", line);
		}
		if let Some((file, path)) = &mut maybe_command_file_log {
			file.write_all(line.as_bytes()).attach_path_err(&path)?;
			file.write_all(b"\n").attach_path_err(path)?;
		}

		let Some(linetype) = LineType::try_from_line(&line) else {
			if !line.trim().is_empty() {
				debug!("No type has been found for line \"{}\"", line);
			}

			continue;
		};

		// clear last_error line once the linetype is not error anymore (like in playlist to not fail if the playlist is not just skipped / private media)
		if linetype != LineType::Error {
			last_error = None;
		}

		match linetype {
			// currently there is nothing that needs to be done with "Generic" Lines
			LineType::Generic => (),
			LineType::ProviderSpecific => {
				if let Some(count) = linetype.try_get_playlist_count(&line) {
					state.playlist_count = Some(count);
					pgcb(DownloadProgress::PlaylistInfo(count));
				}
			},
			LineType::PostProcess => {
				if !state.had_processing {
					state.had_processing = true;
					pgcb(DownloadProgress::SingleProcessing(state.current_id()));
				}
			},
			LineType::Download => {
				if let Some(percent) = linetype.try_get_download_percent(&line) {
					state.had_download = true;
					state.last_percent = percent;
					pgcb(DownloadProgress::SingleProgress {
						id: state.current_id(),
						percent,
						eta: linetype.try_get_download_eta(&line),
					});
				}
			},
			LineType::Custom => handle_linetype_custom(linetype, &line, &mut state, &mut pgcb, mediainfo_vec),
			LineType::Error => {
				// the following is using debug printing, because the line may include escape characters, which would mess-up the printing, but is still good to know when reading
				warn!("Encountered yt-dlp error: {:#?}", line);
				last_error = Some(crate::Error::other(line));
				pgcb(DownloadProgress::Skipped(1));
				state.current_mediainfo.take(); // replace with none, because this media should not be added
			},
			LineType::Warning => log_ytdl_warning(&line),
		}
	}

	if let Some((mut file, path)) = maybe_command_file_log {
		file.flush().attach_path_err(path)?;
	}

	// report that downloading is now finished
	pgcb(DownloadProgress::UrlFinished(mediainfo_vec.len()));

	if let Some(last_error) = last_error {
		return Err(last_error);
	}

	return Ok(StdoutEnd::Finished);
}

/// Handle [LineType::Custom]
///
/// outsourced, because it would otherwise become really nested
fn handle_linetype_custom<C: FnMut(DownloadProgress)>(
	linetype: LineType,
	line: &str,
	state: &mut OutputState,
	mut pgcb: C,
	mediainfo_vec: &mut Vec<MediaInfo>,
) {
	let Some(parsed_type) = linetype.try_get_parse_helper(line) else {
		return;
	};

	match parsed_type {
		CustomParseType::Start(mi, playlist_count) => {
			debug!(
				"Found PARSE_START: \"{}\" \"{}\" \"{:?}\"",
				mi.id, mi.provider, mi.title
			);
			if state.current_mediainfo.is_some() {
				warn!("Found PARSE_START, but \"current_mediainfo\" is still \"Some\"");
			}
			if playlist_count.is_some() {
				state.playlist_count = playlist_count;
			}

			state.had_download = false;
			state.had_processing = false;
			state.last_percent = 0;

			pgcb(DownloadProgress::SingleStarting {
				id:             mi.id.clone(),
				title:          mi.display_title().to_owned(),
				playlist_index: mi.playlist_index,
				playlist_count: state.playlist_count,
			});
			state.current_mediainfo.replace(mi);
		},
		CustomParseType::End(mi) => {
			debug!("Found PARSE_END: \"{}\" \"{}\"", mi.id, mi.provider);

			if let Some(last_mediainfo) = state.current_mediainfo.take() {
				pgcb(DownloadProgress::SingleFinished(mi.id.clone())); // callback inside here, because it should only be triggered if there was a media_info to take
				if mi.id != last_mediainfo.id {
					// warn in the weird case where the "current_mediainfo" and result from PARSE_END dont match
					warn!("Found PARSE_END, but the ID does dont match with \"current_mediainfo\"!");
				}

				// do not add videos to "mediainfo_vec", unless the media had actually been downloaded
				if state.had_download {
					mediainfo_vec.push(last_mediainfo);
				}
			} else {
				// write a log that PARSE_END was present but was None (like in the case of a Error happening)
				debug!("Found a PARSE_END, but \"current_mediainfo\" was \"None\"!");
			}

			// reset the value for the next download
			state.had_download = false;
		},
		CustomParseType::Playlist(count) => {
			debug!("Found PLAYLIST {count}");
			state.playlist_count = Some(count);
			pgcb(DownloadProgress::PlaylistInfo(count));
		},
		CustomParseType::Move(mi) => {
			debug!("Found MOVE: \"{}\" \"{}\" \"{:?}\"", mi.id, mi.provider, mi.filename);

			match (state.current_mediainfo.as_mut(), mi.filename) {
				(Some(last_mediainfo), Some(filename)) => last_mediainfo.set_filename(filename),
				(None, _) => warn!("Found MOVE, but did not have a current_mediainfo"),
				(_, None) => warn!("Found MOVE, but it did not contain a path"),
			}
		},
	}
}


#[cfg(test)]
mod test {
	use std::sync::Arc;
	use std::sync::atomic::{
		AtomicUsize,
		Ordering,
	};

	use super::*;

	/// Helper to create a "SingleStarting" event outside of a playlist
	fn starting(id: &str, title: &str) -> DownloadProgress {
		return DownloadProgress::SingleStarting {
			id:             id.to_owned(),
			title:          title.to_owned(),
			playlist_index: None,
			playlist_count: None,
		};
	}

	/// Helper to create a "SingleProgress" event
	fn progress(id: &str, percent: u8, eta: Option<u64>) -> DownloadProgress {
		return DownloadProgress::SingleProgress {
			id: Some(id.to_owned()),
			percent,
			eta,
		};
	}

	/// Create a control that is in the downloading state
	fn running_control() -> DownloadControl {
		let control = DownloadControl::new();
		assert!(control.begin());

		return control;
	}

	mod handle_stdout {
		use test_utils::{
			TestOptions,
			callback_counter,
		};

		use super::*;
		use crate::{
			main::{
				downloader::Progress,
				status::StatusTracker,
			},
			playlist::PlaylistSelection,
		};

		#[test]
		fn test_basic_single_usage() {
			let expected_pg = &vec![
				DownloadProgress::UrlStarting,
				starting("-----------", "Some Title Here"),
				progress("-----------", 0, Some(387)),
				progress("-----------", 50, Some(76)),
				progress("-----------", 100, Some(0)),
				progress("-----------", 100, None),
				progress("-----------", 0, Some(18)),
				progress("-----------", 57, Some(0)),
				progress("-----------", 100, Some(0)),
				progress("-----------", 100, None),
				DownloadProgress::SingleProcessing(Some("-----------".to_owned())),
				DownloadProgress::SingleFinished("-----------".to_owned()),
				DownloadProgress::UrlFinished(1),
			];
			let expect_index = Arc::new(AtomicUsize::new(0));

			let options = TestOptions::new_handle_stdout(false);

			let input = r#"
PARSE_START 'youtube' '-----------' 'NA' 'NA' Some Title Here
[download]   0.0% of 78.44MiB at 207.76KiB/s ETA 06:27
[download]  50.0% of 78.44MiB at 526.19KiB/s ETA 01:16
[download] 100% of 78.44MiB at  5.89MiB/s ETA 00:00
[download] 100% of 78.44MiB in 00:07
[download]   0.0% of 3.47MiB at 196.76KiB/s ETA 00:18
[download]  57.6% of 3.47MiB at  9.57MiB/s ETA 00:00
[download] 100% of 3.47MiB at 10.57MiB/s ETA 00:00
[download] 100% of 3.47MiB in 00:00
[Merger] Merging formats into "/tmp/Some Title Here.mp4"
Deleting original file /tmp/Some Title Here.f137.mp4 (pass -k to keep)
Deleting original file /tmp/Some Title Here.f140.m4a (pass -k to keep)
MOVE 'youtube' '-----------' /tmp/Some Title Here.mp4
PARSE_END 'youtube' '-----------'
			"#;

			let mut media_vec: Vec<MediaInfo> = Vec::new();

			let res = handle_stdout(
				&options,
				&running_control(),
				callback_counter(&expect_index, expected_pg),
				BufReader::new(input.as_bytes()),
				&mut media_vec,
			);

			assert_eq!(res, Ok(StdoutEnd::Finished));
			assert_eq!(expected_pg.len(), expect_index.load(Ordering::Acquire));

			assert_eq!(
				vec![
					MediaInfo::new("-----------", "youtube")
						.with_title("Some Title Here")
						.with_filename("/tmp/Some Title Here.mp4")
				],
				media_vec
			);
		}

		#[test]
		fn test_playlist_usage() {
			let expected_pg = &vec![
				DownloadProgress::UrlStarting,
				DownloadProgress::PlaylistInfo(2),
				DownloadProgress::PlaylistInfo(2),
				DownloadProgress::SingleStarting {
					id:             "----------0".to_owned(),
					title:          "Some Title Here 0".to_owned(),
					playlist_index: Some(1),
					playlist_count: Some(2),
				},
				progress("----------0", 0, Some(387)),
				progress("----------0", 100, None),
				DownloadProgress::SingleFinished("----------0".to_owned()),
				DownloadProgress::PlaylistInfo(2),
				DownloadProgress::SingleStarting {
					id:             "----------1".to_owned(),
					title:          "Some 'Title' Here 1".to_owned(),
					playlist_index: Some(2),
					playlist_count: Some(2),
				},
				progress("----------1", 0, Some(18)),
				progress("----------1", 100, None),
				DownloadProgress::SingleFinished("----------1".to_owned()),
				DownloadProgress::UrlFinished(2),
			];
			let expect_index = Arc::new(AtomicUsize::new(0));

			let options = TestOptions::new_handle_stdout(false);

			let input = r#"
[youtube:tab] Extracting URL: https://www.youtube.com/playlist?list=PLxxxxxxxx
[youtube:tab] PLxxxxxxxx: Downloading webpage
[download] Downloading playlist: Some Playlist
[youtube:tab] Playlist Some Playlist: Downloading 2 items of 2
[download] Downloading item 1 of 2
PLAYLIST '2'
PARSE_START 'youtube' '----------0' '1' '2' Some Title Here 0
[download]   0.0% of 78.44MiB at 207.76KiB/s ETA 06:27
[download] 100% of 78.44MiB in 00:07
PARSE_END 'youtube' '----------0'
[download] Downloading item 2 of 2
PLAYLIST '2'
PARSE_START 'youtube' '----------1' '2' '2' Some 'Title' Here 1
[download]   0.0% of 3.47MiB at 196.76KiB/s ETA 00:18
[download] 100% of 3.47MiB in 00:00
PARSE_END 'youtube' '----------1'
[download] Finished downloading playlist: Some Playlist
			"#;

			let mut media_vec: Vec<MediaInfo> = Vec::new();

			let res = handle_stdout(
				&options,
				&running_control(),
				callback_counter(&expect_index, expected_pg),
				BufReader::new(input.as_bytes()),
				&mut media_vec,
			);

			assert_eq!(res, Ok(StdoutEnd::Finished));
			assert_eq!(expected_pg.len(), expect_index.load(Ordering::Acquire));

			assert_eq!(
				vec![
					MediaInfo::new("----------0", "youtube")
						.with_title("Some Title Here 0")
						.with_playlist_index(Some(1)),
					MediaInfo::new("----------1", "youtube")
						.with_title("Some 'Title' Here 1")
						.with_playlist_index(Some(2)),
				],
				media_vec
			);
		}

		#[test]
		fn test_playlist_items_status() {
			let options =
				TestOptions::new_handle_stdout(false).with_playlist(PlaylistSelection::Items(vec![3, 5]));

			// items 3 and 5 of a 10 entry playlist
			let input = r#"
[youtube:tab] Extracting URL: https://www.youtube.com/playlist?list=PLxxxxxxxx
[youtube:tab] Playlist Some Playlist: Downloading 2 items of 10
[download] Downloading item 1 of 2
PLAYLIST '2'
PARSE_START 'youtube' '----------3' '1' '2' Third Video
[download]  50.0% of 3.47MiB at 196.76KiB/s ETA 00:01
[download] 100% of 3.47MiB in 00:00
[Merger] Merging formats into "/tmp/Some Playlist/03 - Third Video.mp4"
PARSE_END 'youtube' '----------3'
[download] Downloading item 2 of 2
PLAYLIST '2'
PARSE_START 'youtube' '----------5' '2' '2' Fifth Video
[download]   0.0% of 3.47MiB at 196.76KiB/s ETA 00:18
[download] 100% of 3.47MiB in 00:00
PARSE_END 'youtube' '----------5'
[download] Finished downloading playlist: Some Playlist
			"#;

			let mut tracker = StatusTracker::new();
			let mut messages: Vec<String> = Vec::new();
			let mut media_vec: Vec<MediaInfo> = Vec::new();

			let res = handle_stdout(
				&options,
				&running_control(),
				|v| {
					if let Some(status) = tracker.update(&Progress::Ytdl(v)) {
						messages.push(status.message);
					}
				},
				BufReader::new(input.as_bytes()),
				&mut media_vec,
			);

			assert_eq!(res, Ok(StdoutEnd::Finished));
			assert_eq!(
				messages,
				vec![
					"Preparing download...".to_owned(),
					"Downloading video 1/2: Third Video - 0%".to_owned(),
					"Downloading video 1/2: Third Video - 50% - ETA: 1s".to_owned(),
					"Downloading video 1/2: Third Video - 100%".to_owned(),
					"Processing video 1/2: Third Video".to_owned(),
					"Downloading video 2/2: Fifth Video - 0%".to_owned(),
					"Downloading video 2/2: Fifth Video - 0% - ETA: 18s".to_owned(),
					"Downloading video 2/2: Fifth Video - 100%".to_owned(),
					"Playlist download complete".to_owned(),
				]
			);
			assert_eq!(media_vec.len(), 2);
		}

		#[test]
		fn test_warning_line() {
			let expected_pg = &vec![
				DownloadProgress::UrlStarting,
				starting("-----------", "Some Title Here"),
				progress("-----------", 0, Some(387)),
				progress("-----------", 100, None),
				DownloadProgress::SingleFinished("-----------".to_owned()),
				DownloadProgress::UrlFinished(1),
			];
			let expect_index = Arc::new(AtomicUsize::new(0));

			let options = TestOptions::new_handle_stdout(false);

			let input = r#"
PARSE_START 'youtube' '-----------' 'NA' 'NA' Some Title Here
WARNING: [youtube] Falling back to generic n function search
         player = https://youtube.com/some.js
WARNING: [youtube] -----------: nsig extraction failed: Some formats may be missing
[download]   0.0% of 78.44MiB at 207.76KiB/s ETA 06:27
[download] 100% of 78.44MiB in 00:07
PARSE_END 'youtube' '-----------'
			"#;

			let mut media_vec: Vec<MediaInfo> = Vec::new();

			let res = handle_stdout(
				&options,
				&running_control(),
				callback_counter(&expect_index, expected_pg),
				BufReader::new(input.as_bytes()),
				&mut media_vec,
			);

			assert_eq!(res, Ok(StdoutEnd::Finished));
			assert_eq!(1, media_vec.len());
		}

		/// Test that when a error happens while downloading that the media is not added as a final media
		#[test]
		fn test_error_while_downloading() {
			let expected_pg = &vec![
				DownloadProgress::UrlStarting,
				DownloadProgress::PlaylistInfo(3),
				DownloadProgress::SingleStarting {
					id:             "someid1".to_owned(),
					title:          "Some Title Here".to_owned(),
					playlist_index: Some(1),
					playlist_count: Some(3),
				},
				progress("someid1", 0, Some(577)),
				progress("someid1", 100, None),
				DownloadProgress::SingleFinished("someid1".to_owned()),
				DownloadProgress::SingleStarting {
					id:             "someid2".to_owned(),
					title:          "Some Title Here".to_owned(),
					playlist_index: Some(2),
					playlist_count: Some(3),
				},
				progress("someid2", 2, Some(69)),
				DownloadProgress::Skipped(1),
				DownloadProgress::Skipped(1),
				DownloadProgress::UrlFinished(1),
			];
			let expect_index = Arc::new(AtomicUsize::new(0));

			let options = TestOptions::new_handle_stdout(false);

			let input = r#"
[aprovider] Playlist someplaylist: Downloading 3 items of 3
[download] Downloading item 1 of 3
PARSE_START 'aprovider' 'someid1' '1' 'NA' Some Title Here
[download]   0.1% of  3.47MiB at  10.57MiB/s ETA 09:37
[download] 100% of 3.47MiB in 00:00
MOVE 'aprovider' 'someid1' /path/to/somewhere.mp4
PARSE_END 'aprovider' 'someid1'
[download] Downloading item 2 of 3
PARSE_START 'aprovider' 'someid2' '2' 'NA' Some Title Here
[download]   2.7% of  5.00MiB at    4.18MiB/s ETA 01:09

ERROR: unable to write data: [Errno 28] No space left on device

PARSE_END 'aprovider' 'someid2'
[download] Downloading item 3 of 3
ERROR: [aprovider] someid3: Private video
[download] Finished downloading playlist: someplaylist
			"#;

			let mut media_vec: Vec<MediaInfo> = Vec::new();

			let res = handle_stdout(
				&options,
				&running_control(),
				callback_counter(&expect_index, expected_pg),
				BufReader::new(input.as_bytes()),
				&mut media_vec,
			);

			// the last error was followed by another line, so the whole download did not fail
			assert_eq!(res, Ok(StdoutEnd::Finished));

			assert_eq!(
				vec![
					MediaInfo::new("someid1", "aprovider")
						.with_title("Some Title Here")
						.with_playlist_index(Some(1))
						.with_filename("/path/to/somewhere.mp4")
				],
				media_vec
			);
		}

		#[test]
		fn test_error_as_last_line() {
			let options = TestOptions::new_handle_stdout(false);

			let input = r#"
[youtube] Extracting URL: https://www.youtube.com/watch?v=-----------
ERROR: [youtube] -----------: Video unavailable
			"#;

			let mut media_vec: Vec<MediaInfo> = Vec::new();

			let res = handle_stdout(
				&options,
				&running_control(),
				|_| {},
				BufReader::new(input.as_bytes()),
				&mut media_vec,
			);

			assert_eq!(
				res,
				Err(crate::Error::other(
					"ERROR: [youtube] -----------: Video unavailable"
				))
			);
			assert!(media_vec.is_empty());
		}

		#[test]
		fn test_pause_while_downloading() {
			let options = TestOptions::new_handle_stdout(false);
			let control = running_control();

			let input = r#"
PARSE_START 'youtube' '-----------' 'NA' 'NA' Some Title Here
[download]   0.0% of 78.44MiB at 207.76KiB/s ETA 06:27
[download]  50.0% of 78.44MiB at 526.19KiB/s ETA 01:16
[download]  75.0% of 78.44MiB at 526.19KiB/s ETA 00:38
[download] 100% of 78.44MiB in 00:07
PARSE_END 'youtube' '-----------'
			"#;

			let mut media_vec: Vec<MediaInfo> = Vec::new();
			let mut events: Vec<DownloadProgress> = Vec::new();

			let res = handle_stdout(
				&options,
				&control,
				|event| {
					// request a pause once half of the media is downloaded
					if let DownloadProgress::SingleProgress { percent: 50, .. } = event {
						assert!(control.pause());
					}
					events.push(event);
				},
				BufReader::new(input.as_bytes()),
				&mut media_vec,
			);

			assert_eq!(res, Ok(StdoutEnd::Interrupted(Interrupt::Paused)));
			assert_eq!(events.last(), Some(&DownloadProgress::Paused(50)));
			// no "UrlFinished" when interrupted
			assert!(!events.contains(&DownloadProgress::UrlFinished(0)));
			assert!(media_vec.is_empty());
			assert!(control.is_paused());
		}

		#[test]
		fn test_cancel_before_output() {
			let expected_pg = &vec![DownloadProgress::UrlStarting, DownloadProgress::Cancelled];
			let expect_index = Arc::new(AtomicUsize::new(0));

			let options = TestOptions::new_handle_stdout(false);
			let control = running_control();
			assert!(control.cancel());

			let mut media_vec: Vec<MediaInfo> = Vec::new();

			let res = handle_stdout(
				&options,
				&control,
				callback_counter(&expect_index, expected_pg),
				BufReader::new("[youtube] Extracting URL: https://youtu.be/-----------\n".as_bytes()),
				&mut media_vec,
			);

			assert_eq!(res, Ok(StdoutEnd::Interrupted(Interrupt::Cancelled)));
			assert_eq!(expected_pg.len(), expect_index.load(Ordering::Acquire));
		}

		#[test]
		fn test_save_command_log() {
			let tempdir = tempfile::Builder::new()
				.prefix("vdl-test-cmdlog-")
				.tempdir()
				.expect("Expected a temp dir to be created");

			let options = TestOptions::new_handle_stdout(false).with_save_command_log(tempdir.path().to_owned());

			let input = "PARSE_START 'youtube' '-----------' 'NA' 'NA' Some Title Here\n[download] 100% of 78.44MiB in 00:07\nPARSE_END 'youtube' '-----------'\n";

			let mut media_vec: Vec<MediaInfo> = Vec::new();

			let res = handle_stdout(
				&options,
				&running_control(),
				|_| {},
				BufReader::new(input.as_bytes()),
				&mut media_vec,
			);

			assert_eq!(res, Ok(StdoutEnd::Finished));

			let log = std::fs::read_to_string(command_log_path(tempdir.path())).expect("Expected the log to exist");
			assert!(log.contains("New Instance"));
			assert!(log.contains("PARSE_END 'youtube' '-----------'"));
		}
	}

	#[test]
	fn test_minimal_version_is_valid() {
		assert!(MINIMAL_YTDL_VERSION < chrono::offset::Utc::now().date_naive());
	}
}
