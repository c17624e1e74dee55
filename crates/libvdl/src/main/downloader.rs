//! Module for running a download request, choosing between yt-dlp and a direct web download

use std::{
	ffi::{
		OsStr,
		OsString,
	},
	path::{
		Path,
		PathBuf,
	},
};

use crate::{
	control::DownloadControl,
	main::{
		DownloadOutcome,
		download::{
			DownloadOptions,
			DownloadProgress,
			MINIMAL_YTDL_VERSION,
			download_single,
		},
		web::{
			WebProgress,
			download_web,
		},
	},
	playlist::PlaylistSelection,
	quality::Quality,
	url_kind::{
		UrlKind,
		validate_url,
	},
	utils::ensure_output_dir,
};

/// Everything needed to run (and re-run) a download
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
	pub url:               String,
	pub quality:           Quality,
	pub output_dir:        PathBuf,
	/// Only used when the URL is a playlist
	pub playlist:          PlaylistSelection,
	/// Explicit ffmpeg binary to give to yt-dlp
	pub ffmpeg:            Option<PathBuf>,
	pub extra_args:        Vec<OsString>,
	pub print_command_log: bool,
	pub save_command_log:  bool,
	pub ytdl_version:      chrono::NaiveDate,
}

impl DownloadRequest {
	/// Create a new request with default options
	pub fn new<U: Into<String>, P: Into<PathBuf>>(url: U, output_dir: P) -> Self {
		return Self {
			url:               url.into(),
			quality:           Quality::default(),
			output_dir:        output_dir.into(),
			playlist:          PlaylistSelection::default(),
			ffmpeg:            None,
			extra_args:        Vec::new(),
			print_command_log: false,
			save_command_log:  false,
			ytdl_version:      MINIMAL_YTDL_VERSION,
		};
	}

	/// Builder function to set the quality
	#[must_use]
	pub fn with_quality(mut self, quality: Quality) -> Self {
		self.quality = quality;

		return self;
	}

	/// Builder function to set the playlist selection
	#[must_use]
	pub fn with_playlist(mut self, playlist: PlaylistSelection) -> Self {
		self.playlist = playlist;

		return self;
	}

	/// Builder function to set the ffmpeg binary
	#[must_use]
	pub fn with_ffmpeg(mut self, ffmpeg: Option<PathBuf>) -> Self {
		self.ffmpeg = ffmpeg;

		return self;
	}

	/// Builder function to set the yt-dlp version in use
	#[must_use]
	pub fn with_ytdl_version(mut self, ytdl_version: chrono::NaiveDate) -> Self {
		self.ytdl_version = ytdl_version;

		return self;
	}

	/// Get how the URL will be downloaded
	pub fn kind(&self) -> UrlKind {
		return UrlKind::classify(&self.url);
	}
}

impl DownloadOptions for DownloadRequest {
	fn get_url(&self) -> &str {
		return &self.url;
	}

	fn quality(&self) -> Quality {
		return self.quality;
	}

	fn download_path(&self) -> &Path {
		return &self.output_dir;
	}

	fn playlist(&self) -> Option<&PlaylistSelection> {
		if self.kind() == UrlKind::YoutubePlaylist {
			return Some(&self.playlist);
		}

		return None;
	}

	fn ffmpeg_location(&self) -> Option<&Path> {
		return self.ffmpeg.as_deref();
	}

	fn extra_ytdl_arguments(&self) -> Vec<&OsStr> {
		return self.extra_args.iter().map(|v| return v.as_os_str()).collect();
	}

	fn print_command_log(&self) -> bool {
		return self.print_command_log;
	}

	fn save_command_log(&self) -> bool {
		return self.save_command_log;
	}

	fn ytdl_version(&self) -> chrono::NaiveDate {
		return self.ytdl_version;
	}
}

/// Progress of either kind of download
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
	Ytdl(DownloadProgress),
	Web(WebProgress),
}

/// Run a download request
///
/// "resume" continues a existing partial file for web downloads, yt-dlp always continues its ".part" files.
/// The control is set to downloading for the run and back to idle afterwards, unless the run was paused.
pub fn run_download<C: FnMut(Progress)>(
	request: &DownloadRequest,
	control: &DownloadControl,
	resume: bool,
	mut pgcb: C,
) -> Result<DownloadOutcome, crate::Error> {
	if !validate_url(&request.url) {
		return Err(crate::Error::invalid_input(format!(
			"\"{}\" is not a valid URL",
			request.url
		)));
	}

	ensure_output_dir(&request.output_dir)?;

	if !control.begin() {
		info!("Download was cancelled before it started");
		control.finish();

		return Ok(DownloadOutcome::Cancelled);
	}

	let kind = request.kind();
	debug!("Downloading \"{}\" as {:?} (resume: {})", request.url, kind, resume);

	let res = match kind {
		UrlKind::YoutubeVideo | UrlKind::YoutubePlaylist => download_single(request, control, |v| {
			pgcb(Progress::Ytdl(v));
		}),
		UrlKind::Web => download_web(&request.url, &request.output_dir, control, resume, |v| {
			pgcb(Progress::Web(v));
		}),
	};

	control.finish();

	return res;
}

/// A request together with its control, so that it can be paused and resumed
///
/// Cloning shares the control, so a clone can be moved to a worker thread
#[derive(Debug, Clone)]
pub struct DownloadSession {
	request: DownloadRequest,
	control: DownloadControl,
}

impl DownloadSession {
	/// Create a new session for the request
	pub fn new(request: DownloadRequest) -> Self {
		return Self {
			request,
			control: DownloadControl::new(),
		};
	}

	/// Get the request of this session
	pub fn request(&self) -> &DownloadRequest {
		return &self.request;
	}

	/// Get the control of this session
	pub fn control(&self) -> &DownloadControl {
		return &self.control;
	}

	/// Start the download from a clean state
	pub fn start<C: FnMut(Progress)>(&self, pgcb: C) -> Result<DownloadOutcome, crate::Error> {
		self.control.reset();

		return run_download(&self.request, &self.control, false, pgcb);
	}

	/// Run the download again after it was paused, continuing partial files
	pub fn resume<C: FnMut(Progress)>(&self, pgcb: C) -> Result<DownloadOutcome, crate::Error> {
		return run_download(&self.request, &self.control, true, pgcb);
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn create_dl_dir() -> tempfile::TempDir {
		return tempfile::Builder::new()
			.prefix("vdl-test-downloader-")
			.tempdir()
			.expect("Expected a temp dir to be created");
	}

	mod request {
		use super::*;

		#[test]
		fn test_playlist_only_for_playlist_urls() {
			let selection = PlaylistSelection::Range(1, 3);

			let video = DownloadRequest::new("https://www.youtube.com/watch?v=abc", "/tmp")
				.with_playlist(selection.clone());
			assert_eq!(video.kind(), UrlKind::YoutubeVideo);
			assert_eq!(video.playlist(), None);

			let playlist = DownloadRequest::new("https://www.youtube.com/playlist?list=PLabc", "/tmp")
				.with_playlist(selection.clone());
			assert_eq!(playlist.kind(), UrlKind::YoutubePlaylist);
			assert_eq!(playlist.playlist(), Some(&selection));

			let web = DownloadRequest::new("https://example.com/clip.mp4", "/tmp");
			assert_eq!(web.kind(), UrlKind::Web);
			assert_eq!(web.playlist(), None);
		}

		#[test]
		fn test_options() {
			let request = DownloadRequest::new("https://youtu.be/abc", "/tmp/out")
				.with_quality(Quality::P720)
				.with_ffmpeg(Some(PathBuf::from("/opt/ffmpeg")));

			assert_eq!(request.get_url(), "https://youtu.be/abc");
			assert_eq!(request.quality(), Quality::P720);
			assert_eq!(request.download_path(), Path::new("/tmp/out"));
			assert_eq!(request.ffmpeg_location(), Some(Path::new("/opt/ffmpeg")));
			assert!(request.extra_ytdl_arguments().is_empty());
		}
	}

	mod run_download {
		use super::*;

		#[test]
		fn test_invalid_url() {
			let dl_dir = create_dl_dir();
			let control = DownloadControl::new();

			let res = run_download(&DownloadRequest::new("not a url", dl_dir.path()), &control, false, |_| {});

			assert_eq!(
				res,
				Err(crate::Error::invalid_input("\"not a url\" is not a valid URL"))
			);
			// the control was not touched
			assert_eq!(control.state(), crate::control::ControlState::Idle);
		}

		#[test]
		fn test_output_not_a_directory() {
			let dl_dir = create_dl_dir();
			let file = dl_dir.path().join("somefile");
			std::fs::write(&file, b"").expect("Expected write to succeed");

			let res = run_download(
				&DownloadRequest::new("https://example.com/clip.mp4", &file),
				&DownloadControl::new(),
				false,
				|_| {},
			);

			assert!(res.is_err());
		}

		#[test]
		fn test_cancelled_before_start() {
			let dl_dir = create_dl_dir();
			let control = DownloadControl::new();
			assert!(control.begin());
			assert!(control.cancel());

			let mut events = Vec::new();
			let res = run_download(
				&DownloadRequest::new("https://example.com/clip.mp4", dl_dir.path().join("sub")),
				&control,
				false,
				|v| {
					events.push(v);
				},
			);

			assert_eq!(res, Ok(DownloadOutcome::Cancelled));
			assert!(events.is_empty());
			assert_eq!(control.state(), crate::control::ControlState::Idle);
			// the output directory is created before the control is checked
			assert!(dl_dir.path().join("sub").is_dir());
		}
	}

	mod session {
		use std::{
			io::{
				BufRead,
				BufReader,
				Write,
			},
			net::TcpListener,
		};

		use super::*;

		/// Serve "body" once on a local port, returns the base url
		fn serve_once(body: &'static [u8]) -> String {
			let listener = TcpListener::bind("127.0.0.1:0").expect("Expected to bind a local port");
			let addr = listener.local_addr().expect("Expected a local address");

			std::thread::spawn(move || {
				let Ok((mut stream, _)) = listener.accept() else {
					return;
				};

				{
					let mut reader = BufReader::new(&stream);
					let mut line = String::new();
					while reader.read_line(&mut line).unwrap_or(0) > 0 && line != "\r\n" {
						line.clear();
					}
				}

				let _ = write!(
					stream,
					"HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
					body.len()
				);
				let _ = stream.write_all(body);
			});

			return format!("http://{addr}");
		}

		#[test]
		fn test_web_start() {
			let dl_dir = create_dl_dir();
			let base = serve_once(b"some media content");

			let session = DownloadSession::new(DownloadRequest::new(format!("{base}/clip.mp4"), dl_dir.path()));

			// a previous cancel does not prevent a new start
			assert!(session.control().begin());
			assert!(session.control().cancel());

			let mut events = Vec::new();
			let res = session.start(|v| {
				events.push(v);
			});

			let path = dl_dir.path().join("clip.mp4");
			assert!(matches!(res, Ok(DownloadOutcome::Completed(ref v)) if v.len() == 1));
			assert_eq!(
				std::fs::read(&path).expect("Expected file to exist"),
				b"some media content"
			);
			assert_eq!(events.last(), Some(&Progress::Web(WebProgress::Finished(path))));
			assert_eq!(session.control().state(), crate::control::ControlState::Idle);
		}
	}
}
