//! The interactive front end: prompts for everything a download needs and controls it while running

use crate::{
	clap_conf::{
		CliDerive,
		CommandInteractive,
	},
	commands::{
		download::{
			ProgressView,
			print_outcome,
		},
		info::{
			fetch_with_spinner,
			print_details,
		},
	},
	utils,
};
use colored::{
	Color,
	Colorize,
};
use dialoguer::{
	Confirm,
	Input,
	MultiSelect,
	Select,
	theme::ColorfulTheme,
};
use libvdl::{
	chrono::NaiveDate,
	error::{
		CustomThreadJoin,
		IOErrorToError,
	},
	info::{
		MediaDetails,
		PlaylistEntry,
		PlaylistInfo,
	},
	main::{
		DownloadOutcome,
		download::MINIMAL_YTDL_VERSION,
		downloader::{
			DownloadRequest,
			DownloadSession,
			Progress,
		},
		status::Status,
	},
	playlist::PlaylistSelection,
	quality::Quality,
	url_kind::{
		UrlKind,
		validate_url,
	},
};
use std::{
	io::BufRead,
	path::PathBuf,
	sync::{
		Arc,
		atomic::{
			AtomicBool,
			Ordering,
		},
		mpsc::{
			Receiver,
			RecvTimeoutError,
			Sender,
		},
	},
	thread::JoinHandle,
	time::Duration,
};

/// Map a prompt error into the crate error
fn prompt_err(err: dialoguer::Error) -> crate::Error {
	return crate::Error::other(format!("Prompt failed: {err}"));
}

/// Handler function for the "interactive" subcommand
/// This function is mainly to keep the code structured and sorted
pub fn command_interactive(main_args: &CliDerive, sub_args: &CommandInteractive) -> Result<(), crate::Error> {
	let theme = ColorfulTheme::default();

	println!("{}", "vdl - Video Downloader".bold());

	// yt-dlp is only required for youtube urls, web downloads still work without it
	let ytdl_version = match utils::require_ytdl() {
		Ok(v) => Some(v),
		Err(err) => {
			warn!("yt-dlp is not available: {}", err);
			println!(
				"{}",
				"yt-dlp could not be found, only direct web downloads are available".color(Color::Yellow)
			);

			None
		},
	};
	let ffmpeg = ytdl_version.and_then(|_| return utils::find_ffmpeg(main_args));
	let mut output_dir = utils::resolve_output_dir(sub_args.output_path.as_deref());

	loop {
		if let Some(request) = ask_request(main_args, &theme, ytdl_version, &mut output_dir)? {
			let request = request.with_ffmpeg(ffmpeg.clone());
			let target = request.output_dir.clone();

			match run_controlled(main_args, DownloadSession::new(request)) {
				Ok(outcome) => print_outcome(&outcome, &target),
				Err(err) => {
					error!("Download failed: {}", err);
					println!("{} {}", "Failed to download.".color(Color::Red), err);
				},
			}
		}

		let again = Confirm::with_theme(&theme)
			.with_prompt("Download another URL?")
			.default(true)
			.interact()
			.map_err(prompt_err)?;

		if !again {
			break;
		}
	}

	return Ok(());
}

/// Ask for everything needed for one download
/// Returns [`None`] when the user decided to not download the URL
fn ask_request(
	main_args: &CliDerive,
	theme: &ColorfulTheme,
	ytdl_version: Option<NaiveDate>,
	output_dir: &mut PathBuf,
) -> Result<Option<DownloadRequest>, crate::Error> {
	let url = ask_url(theme)?;
	let kind = UrlKind::classify(&url);

	let details = if kind.uses_ytdl() {
		if ytdl_version.is_none() {
			println!("{}", "yt-dlp is required for YouTube URLs".color(Color::Red));

			return Ok(None);
		}

		match fetch_with_spinner(main_args, &url) {
			Ok(details) => {
				print_details(&details);

				Some(details)
			},
			Err(err) => {
				println!("{} {}", "Failed to fetch information:".color(Color::Red), err);

				let anyway = Confirm::with_theme(theme)
					.with_prompt("Try to download anyway?")
					.default(false)
					.interact()
					.map_err(prompt_err)?;

				if !anyway {
					return Ok(None);
				}

				None
			},
		}
	} else {
		println!("Ready to download web video");

		None
	};

	// web downloads take the file as it is served
	let quality = if kind.uses_ytdl() {
		ask_quality(theme)?
	} else {
		Quality::default()
	};

	let playlist = match &details {
		Some(MediaDetails::Playlist(info)) => ask_playlist_selection(theme, info)?,
		_ => PlaylistSelection::Full,
	};

	*output_dir = ask_output_dir(theme, output_dir)?;

	return Ok(Some(
		DownloadRequest::new(url, output_dir.clone())
			.with_quality(quality)
			.with_playlist(playlist)
			.with_ytdl_version(ytdl_version.unwrap_or(MINIMAL_YTDL_VERSION)),
	));
}

/// Ask for a URL until a valid one is given
fn ask_url(theme: &ColorfulTheme) -> Result<String, crate::Error> {
	let url: String = Input::with_theme(theme)
		.with_prompt("URL")
		.validate_with(|input: &String| -> Result<(), &'static str> {
			if input.trim().is_empty() {
				return Err("Please enter a valid URL");
			}
			if !validate_url(input) {
				return Err("Invalid URL format");
			}

			return Ok(());
		})
		.interact_text()
		.map_err(prompt_err)?;

	return Ok(url.trim().to_owned());
}

/// Ask for the quality to download in
fn ask_quality(theme: &ColorfulTheme) -> Result<Quality, crate::Error> {
	let all = Quality::all();
	let labels: Vec<&str> = all.iter().map(|v| return v.label()).collect();
	let default = all.iter().position(|v| return *v == Quality::default()).unwrap_or(0);

	let selected = Select::with_theme(theme)
		.with_prompt("Quality")
		.items(&labels)
		.default(default)
		.interact()
		.map_err(prompt_err)?;

	return Ok(all.get(selected).copied().unwrap_or_default());
}

/// Ask for the output directory, "current" is the default
fn ask_output_dir(theme: &ColorfulTheme, current: &std::path::Path) -> Result<PathBuf, crate::Error> {
	let input: String = Input::with_theme(theme)
		.with_prompt("Save to")
		.default(current.display().to_string())
		.interact_text()
		.map_err(prompt_err)?;

	return Ok(utils::resolve_output_dir(Some(std::path::Path::new(input.trim()))));
}

/// Ask which part of a playlist to download
fn ask_playlist_selection(theme: &ColorfulTheme, info: &PlaylistInfo) -> Result<PlaylistSelection, crate::Error> {
	let options = [
		format!("Download full playlist ({} videos)", info.total_videos),
		"Select specific videos".to_owned(),
		"Download range of videos".to_owned(),
	];

	let selected = Select::with_theme(theme)
		.with_prompt("Playlist")
		.items(&options)
		.default(0)
		.interact()
		.map_err(prompt_err)?;

	return match selected {
		1 => ask_specific_videos(theme, info),
		2 => ask_range(theme, info.total_videos),
		_ => Ok(PlaylistSelection::Full),
	};
}

/// Ask for a range like "1-5" until one within the playlist is given
fn ask_range(theme: &ColorfulTheme, total: usize) -> Result<PlaylistSelection, crate::Error> {
	let input: String = Input::with_theme(theme)
		.with_prompt("Enter range (e.g. 1-5)")
		.validate_with(|input: &String| -> Result<(), String> {
			return range_within(input, total).map(|_| return ());
		})
		.interact_text()
		.map_err(prompt_err)?;

	return range_within(&input, total).map_err(crate::Error::invalid_input);
}

/// Parse a range and check that it starts inside the playlist
/// The end is clamped to the playlist size
fn range_within(input: &str, total: usize) -> Result<PlaylistSelection, String> {
	let Ok(PlaylistSelection::Range(start, end)) = PlaylistSelection::parse_range(input) else {
		return Err("Please enter a valid range (e.g. 1-5)".to_owned());
	};

	if total > 0 && start > total {
		return Err(format!("The playlist only has {total} videos"));
	}

	if total == 0 {
		return Ok(PlaylistSelection::Range(start, end));
	}

	return Ok(PlaylistSelection::Range(start, end.min(total)));
}

/// How the video list starts out before the user picks videos
#[derive(Debug, Clone, Copy, PartialEq)]
enum Preselect {
	All,
	None,
	Invert,
}

/// Compute the initial checked state for all "videos"
fn preselection(videos: &[PlaylistEntry], preselect: Preselect, range: Option<(usize, usize)>) -> Vec<bool> {
	return videos
		.iter()
		.map(|v| {
			let base = match range {
				Some((start, end)) => v.index >= start && v.index <= end,
				None => true,
			};

			return match preselect {
				Preselect::All => base,
				Preselect::None => false,
				Preselect::Invert => !base,
			};
		})
		.collect();
}

/// Let the user pick videos of the playlist
fn ask_specific_videos(theme: &ColorfulTheme, info: &PlaylistInfo) -> Result<PlaylistSelection, crate::Error> {
	if info.videos.is_empty() {
		println!("{}", "No playlist information available".color(Color::Red));

		return Ok(PlaylistSelection::Full);
	}

	let start_with = Select::with_theme(theme)
		.with_prompt("Start with")
		.items(&["All videos selected", "No videos selected", "A range selected", "A range deselected"])
		.default(0)
		.interact()
		.map_err(prompt_err)?;

	let defaults = match start_with {
		1 => preselection(&info.videos, Preselect::None, None),
		2 | 3 => {
			let PlaylistSelection::Range(start, end) = ask_range(theme, info.total_videos)? else {
				unreachable!("ask_range only returns ranges");
			};
			let preselect = if start_with == 2 {
				Preselect::All
			} else {
				Preselect::Invert
			};

			preselection(&info.videos, preselect, Some((start, end)))
		},
		_ => preselection(&info.videos, Preselect::All, None),
	};

	let labels: Vec<String> = info
		.videos
		.iter()
		.map(|v| return format!("{}. {} ({})", v.index, v.title, v.duration_str))
		.collect();

	loop {
		let picked = MultiSelect::with_theme(theme)
			.with_prompt("Select videos (space to toggle, enter to confirm)")
			.items(&labels)
			.defaults(&defaults)
			.interact()
			.map_err(prompt_err)?;

		if picked.is_empty() {
			println!("{}", "Please select videos from the playlist".color(Color::Red));
			continue;
		}

		println!("Selected {} of {} videos", picked.len(), info.videos.len());

		let indices = picked
			.into_iter()
			.filter_map(|v| return info.videos.get(v).map(|entry| return entry.index))
			.collect();

		return Ok(PlaylistSelection::Items(indices));
	}
}

/// A command typed while a download is running
#[derive(Debug, Clone, Copy, PartialEq)]
enum ControlCommand {
	Pause,
	Resume,
	Cancel,
}

impl ControlCommand {
	/// Parse a input line, [`None`] for unknown input
	fn parse(input: &str) -> Option<Self> {
		return match input.trim().to_lowercase().as_str() {
			"p" | "pause" => Some(Self::Pause),
			"r" | "resume" => Some(Self::Resume),
			"c" | "cancel" => Some(Self::Cancel),
			_ => None,
		};
	}
}

/// Events the controlling thread waits on
enum Event {
	Progress(Progress),
	Done(Result<DownloadOutcome, crate::Error>),
	Input(String),
}

/// Run the session on a worker thread, "resume" decides between starting and resuming
fn spawn_worker(session: DownloadSession, resume: bool, tx: Sender<Event>) -> Result<JoinHandle<()>, crate::Error> {
	return std::thread::Builder::new()
		.name("download worker".to_owned())
		.spawn(move || {
			let progress_tx = tx.clone();
			let pgcb = |v| {
				// the receiver only goes away after the worker is joined
				let _ = progress_tx.send(Event::Progress(v));
			};

			let res = if resume {
				session.resume(pgcb)
			} else {
				session.start(pgcb)
			};

			let _ = tx.send(Event::Done(res));
		})
		.attach_location_err("download worker spawn");
}

/// Read lines from stdin until "stop" is set after a line was read
fn spawn_input_reader(tx: Sender<Event>, stop: Arc<AtomicBool>) -> Result<JoinHandle<()>, crate::Error> {
	return std::thread::Builder::new()
		.name("stdin reader".to_owned())
		.spawn(move || {
			let stdin = std::io::stdin();
			let mut line = String::new();

			while !stop.load(Ordering::SeqCst) {
				line.clear();
				match stdin.lock().read_line(&mut line) {
					Ok(0) | Err(_) => break,
					Ok(_) => {
						if tx.send(Event::Input(line.clone())).is_err() {
							break;
						}
					},
				}
			}
		})
		.attach_location_err("stdin reader spawn");
}

/// Run a session while reading pause / resume / cancel commands from stdin
fn run_controlled(main_args: &CliDerive, session: DownloadSession) -> Result<DownloadOutcome, crate::Error> {
	let (tx, rx) = std::sync::mpsc::channel();
	let stop_input = Arc::new(AtomicBool::new(false));
	let input_handle = spawn_input_reader(tx.clone(), Arc::clone(&stop_input))?;

	println!(
		"Controls: {} pause, {} resume, {} cancel (followed by Enter)",
		"p".bold(),
		"r".bold(),
		"c".bold()
	);

	crate::set_active_control(Some(session.control().clone()));
	let mut view = ProgressView::new(main_args);

	let res = spawn_worker(session.clone(), false, tx.clone())
		.and_then(|worker| return control_loop(&session, &mut view, &rx, &tx, worker));

	crate::set_active_control(None);
	view.finish();
	drop(tx);

	// the reader is blocked on stdin, let it read one more line before it stops
	stop_input.store(true, Ordering::SeqCst);
	println!("Press Enter to continue");
	for event in &rx {
		if let Event::Input(_) = event {
			break;
		}
	}
	drop(rx);
	input_handle.join_err()?;

	return res;
}

/// How often the control loop checks for a cancel that no worker can notice
const CONTROL_POLL: Duration = Duration::from_millis(200);

/// Drive the session from input events until the download ends
fn control_loop(
	session: &DownloadSession,
	view: &mut ProgressView,
	rx: &Receiver<Event>,
	tx: &Sender<Event>,
	worker: JoinHandle<()>,
) -> Result<DownloadOutcome, crate::Error> {
	let control = session.control();
	let mut worker = Some(worker);

	loop {
		// a paused download has no worker, so a cancel (also from Ctrl+C) ends it here
		if worker.is_none() && control.should_cancel() {
			control.reset();
			view.show(&Status {
				percent: 0,
				message: "Download cancelled".to_owned(),
			});

			return Ok(DownloadOutcome::Cancelled);
		}

		let event = match rx.recv_timeout(CONTROL_POLL) {
			Ok(event) => event,
			Err(RecvTimeoutError::Timeout) => continue,
			Err(RecvTimeoutError::Disconnected) => {
				return Err(crate::Error::other("Download events stopped unexpectedly"));
			},
		};

		match event {
			Event::Progress(v) => view.handle(&v),
			Event::Input(line) => match ControlCommand::parse(&line) {
				Some(ControlCommand::Pause) => {
					if control.pause() {
						view.println("Pausing download...");
					} else {
						view.println("Nothing to pause");
					}
				},
				Some(ControlCommand::Resume) => {
					if worker.is_none() && control.resume() {
						view.println("Resuming download...");
						worker = Some(spawn_worker(session.clone(), true, tx.clone())?);
					} else {
						view.println("Download is not paused");
					}
				},
				Some(ControlCommand::Cancel) => {
					if control.cancel() {
						view.println("Cancelling download...");
					} else {
						view.println("Nothing to cancel");
					}
				},
				None => {
					if !line.trim().is_empty() {
						view.println(format!("Unknown command \"{}\", use p, r or c", line.trim()));
					}
				},
			},
			Event::Done(res) => {
				if let Some(handle) = worker.take() {
					handle.join_err()?;
				}

				match res {
					Ok(DownloadOutcome::Paused) if control.is_paused() => {
						view.println("Download paused, enter \"r\" to resume or \"c\" to cancel");
					},
					// a cancel arrived while the worker was stopping for a pause
					Ok(DownloadOutcome::Paused) => {
						control.reset();

						return Ok(DownloadOutcome::Cancelled);
					},
					other => return other,
				}
			},
		}
	}
}
