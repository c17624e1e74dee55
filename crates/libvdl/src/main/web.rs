//! Module for downloading media directly over HTTP, used for everything that is not handled by yt-dlp
//!
//! Downloads are resumable, a existing partial file is continued with a "Range" request if the server supports it.

use std::{
	fs::{
		File,
		OpenOptions,
	},
	io::{
		BufWriter,
		Read,
		Write,
	},
	path::{
		Path,
		PathBuf,
	},
	sync::LazyLock,
	time::Duration,
};

use regex::Regex;
use reqwest::{
	StatusCode,
	blocking::{
		Client,
		Response,
	},
	header::{
		CONTENT_DISPOSITION,
		CONTENT_RANGE,
		HeaderMap,
		RANGE,
	},
};
use url::Url;

use crate::{
	control::{
		DownloadControl,
		Interrupt,
	},
	data::media_info::{
		MediaInfo,
		WEB_PROVIDER,
	},
	error::IOErrorToError,
	main::DownloadOutcome,
};

/// Size of a single chunk read from the response, the control is checked between chunks
pub const CHUNK_SIZE: u64 = 1024 * 1024;
/// Filename used when neither the headers nor the URL contain one
pub const FALLBACK_FILENAME: &str = "download.mp4";
/// User-Agent sent with every request
const USER_AGENT: &str = concat!("vdl/", env!("CARGO_PKG_VERSION"));

/// Events for web downloads
#[derive(Debug, Clone, PartialEq)]
pub enum WebProgress {
	/// The response has been received, "total" is the full size in bytes if known
	Starting { filename: String, total: Option<u64> },
	/// A chunk has been written, "percent" is only known when the total size is known
	Progress {
		downloaded: u64,
		total:      Option<u64>,
		percent:    Option<u8>,
	},
	/// The download stopped because of a pause request
	/// values: (percent)
	Paused(u8),
	/// The download stopped because of a cancel request
	Cancelled,
	/// The file is complete
	Finished(PathBuf),
}

/// Create the client used for web downloads
fn build_client() -> Result<Client, crate::Error> {
	return Ok(Client::builder()
		.user_agent(USER_AGENT)
		.connect_timeout(Duration::from_secs(30))
		// the default timeout covers the whole body, which is too short for large files
		.timeout(None)
		.build()?);
}

/// Get the filename from a "Content-Disposition" header value
/// Only the last path component is used, so the file always ends up in the output directory
pub fn content_disposition_filename(value: &str) -> Option<String> {
	/// Regex to get the filename from a "Content-Disposition" header
	/// cap1: filename
	static FILENAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
		return Regex::new(r#"(?i)\bfilename="?([^";]+)"?"#).unwrap();
	});

	let cap = FILENAME_REGEX.captures(value)?;

	return Path::new(cap[1].trim())
		.file_name()
		.map(|v| return v.to_string_lossy().into_owned())
		.filter(|v| return !v.trim().is_empty());
}

/// Get the last path segment of a URL as filename
pub fn url_filename(url: &Url) -> Option<String> {
	let segment = url.path_segments()?.next_back()?;

	if segment.is_empty() || segment == "." || segment == ".." {
		return None;
	}

	return Some(segment.to_owned());
}

/// Get the filename to save the response of "url" as
pub fn response_filename(headers: &HeaderMap, url: &Url) -> String {
	let from_header = headers
		.get(CONTENT_DISPOSITION)
		.and_then(|v| return v.to_str().ok())
		.and_then(content_disposition_filename);

	return from_header
		.or_else(|| return url_filename(url))
		.unwrap_or_else(|| return FALLBACK_FILENAME.to_owned());
}

/// Get the full size from a "Content-Range" header, like "bytes 100-199/200"
pub fn content_range_total(headers: &HeaderMap) -> Option<u64> {
	let value = headers.get(CONTENT_RANGE)?.to_str().ok()?;
	let (_, total) = value.rsplit_once('/')?;

	return total.trim().parse::<u64>().ok();
}

/// Calculate the percentage, [`None`] if the total is unknown or 0
pub fn percent_of(downloaded: u64, total: Option<u64>) -> Option<u8> {
	let total = total.filter(|v| return *v > 0)?;

	return Some(u8::try_from((downloaded.saturating_mul(100) / total).min(100)).unwrap_or(100));
}

/// Where the body of the response will be written to
struct Target {
	response:   Response,
	file:       File,
	downloaded: u64,
	total:      Option<u64>,
}

/// Download "url" into "output_dir"
///
/// When "resume" is set and the target file already exists, the download is continued from the existing length.
/// Servers not supporting ranges cause the file to be downloaded again from the start.
pub fn download_web<C: FnMut(WebProgress)>(
	url: &str,
	output_dir: &Path,
	control: &DownloadControl,
	resume: bool,
	mut pgcb: C,
) -> Result<DownloadOutcome, crate::Error> {
	let parsed = Url::parse(url.trim())?;
	let client = build_client()?;

	let response = client.get(parsed.clone()).send()?.error_for_status()?;

	let filename = response_filename(response.headers(), &parsed);
	let path = output_dir.join(&filename);
	let total = response.content_length();

	debug!("Web download \"{}\" to \"{}\"", parsed, path.display());
	pgcb(WebProgress::Starting {
		filename: filename.clone(),
		total,
	});

	let existing = if resume {
		std::fs::metadata(&path).map_or(0, |v| return v.len())
	} else {
		0
	};

	let finished_media = MediaInfo::new(&filename, WEB_PROVIDER)
		.with_title(&filename)
		.with_filename(&path);

	let target = if existing > 0 {
		if total.is_some_and(|v| return existing >= v) {
			info!("\"{}\" is already complete", path.display());
			pgcb(WebProgress::Finished(path));

			return Ok(DownloadOutcome::Completed(vec![finished_media]));
		}

		// the first response is only used for its headers
		drop(response);

		match resume_target(&client, parsed, &path, existing, total)? {
			Some(target) => target,
			None => {
				info!("\"{}\" is already complete", path.display());
				pgcb(WebProgress::Finished(path));

				return Ok(DownloadOutcome::Completed(vec![finished_media]));
			},
		}
	} else {
		Target {
			file: File::create(&path).attach_path_err(&path)?,
			response,
			downloaded: 0,
			total,
		}
	};

	return match write_body(target, &path, control, &mut pgcb)? {
		Some(Interrupt::Paused) => Ok(DownloadOutcome::Paused),
		Some(Interrupt::Cancelled) => Ok(DownloadOutcome::Cancelled),
		None => {
			info!("Downloaded \"{}\"", path.display());
			pgcb(WebProgress::Finished(path));

			Ok(DownloadOutcome::Completed(vec![finished_media]))
		},
	};
}

/// Send the "Range" request to continue a existing file
/// Returns [`None`] if the server reports there is nothing left to download
fn resume_target(
	client: &Client,
	url: Url,
	path: &Path,
	existing: u64,
	total: Option<u64>,
) -> Result<Option<Target>, crate::Error> {
	info!("Resuming \"{}\" from byte {}", path.display(), existing);

	let response = client
		.get(url)
		.header(RANGE, format!("bytes={existing}-"))
		.send()?;

	if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
		return Ok(None);
	}

	let response = response.error_for_status()?;

	if response.status() == StatusCode::PARTIAL_CONTENT {
		let total = content_range_total(response.headers()).or(total);

		return Ok(Some(Target {
			file: OpenOptions::new().append(true).open(path).attach_path_err(path)?,
			response,
			downloaded: existing,
			total,
		}));
	}

	// the server ignored the range and sends the whole file again
	info!("Server does not support ranges, restarting download");
	let total = response.content_length().or(total);

	return Ok(Some(Target {
		file: File::create(path).attach_path_err(path)?,
		response,
		downloaded: 0,
		total,
	}));
}

/// Write the response body to the file in chunks, checking the control between chunks
/// Returns the interrupt that stopped the writing, if any
fn write_body<C: FnMut(WebProgress)>(
	target: Target,
	path: &Path,
	control: &DownloadControl,
	pgcb: &mut C,
) -> Result<Option<Interrupt>, crate::Error> {
	let Target {
		mut response,
		file,
		mut downloaded,
		total,
	} = target;

	let mut writer = BufWriter::new(file);
	let mut buffer: Vec<u8> = Vec::new();

	loop {
		if let Some(interrupt) = control.checkpoint() {
			writer.flush().attach_path_err(path)?;

			match interrupt {
				Interrupt::Paused => {
					let percent = percent_of(downloaded, total).unwrap_or(0);
					info!("Download paused at {}%", percent);
					pgcb(WebProgress::Paused(percent));
				},
				Interrupt::Cancelled => {
					info!("Download cancelled");
					pgcb(WebProgress::Cancelled);
				},
			}

			return Ok(Some(interrupt));
		}

		buffer.clear();
		let read = (&mut response)
			.take(CHUNK_SIZE)
			.read_to_end(&mut buffer)
			.attach_location_err("web response read")?;

		if read == 0 {
			break;
		}

		writer.write_all(&buffer).attach_path_err(path)?;
		downloaded += read as u64;

		pgcb(WebProgress::Progress {
			downloaded,
			total,
			percent: percent_of(downloaded, total),
		});
	}

	writer.flush().attach_path_err(path)?;

	return Ok(None);
}
