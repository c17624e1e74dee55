//! Module for utility functions, that may be used in various other modules

use std::path::{
	Path,
	PathBuf,
};

use path_absolutize::Absolutize;

use crate::error::IOErrorToError;

/// Simple helper to resolve "~" to the Home directory
/// System agnostic as long as [`dirs::home_dir`] support's it
pub fn expand_tidle<I: AsRef<Path>>(input: I) -> Option<PathBuf> {
	let path = input.as_ref();

	if !path.starts_with("~") {
		return Some(path.to_owned());
	}
	if path == Path::new("~") {
		return dirs::home_dir();
	}
	// dont support "~user" syntax
	if !path.starts_with("~/") {
		unreachable!("This should never occur, because \"path.starts_with\" should have already returned");
	}

	return dirs::home_dir().map(|mut v| {
		// handle case where "home_dir" might be set to the root POSIX directory
		return if v == Path::new("/") {
			// "unwrap" can be used, because it is already checked that the variable starts with value
			path.strip_prefix("~").unwrap().to_owned() // return the input path, just without "~"
		} else {
			// "unwrap" can be used, because it is already checked that the variable starts with value
			v.push(path.strip_prefix("~/").unwrap());
			v
		};
	});
}

/// Convert input path to a absolute path, without hitting the filesystem.
/// This function handles `~`(home)
///
/// If the start is not absolute, CWD will be used.
///
/// This functions behavior:
/// - `/path/to/inner/../somewhere` -> `/path/to/somewhere`
/// - `relative/to/somewhere` -> `CWD/relative/to/somewhere`
/// - `./somewhere/./path` -> `CWD/somewhere/path`
/// - `~/somewhere/in/home` -> `HOME/somewhere/in/home`
pub fn to_absolute<P: AsRef<Path>>(input: P) -> std::io::Result<PathBuf> {
	let Some(converted) = expand_tidle(input) else {
		return Err(std::io::Error::new(
			std::io::ErrorKind::InvalidInput,
			"Could not resolve \"~\"",
		));
	};

	return converted.absolutize().map(|v| return v.to_path_buf());
}

/// Get the default directory downloads are placed into
///
/// Order: the system "Downloads" directory, "HOME/Downloads", the CWD
pub fn default_download_dir() -> PathBuf {
	if let Some(dir) = dirs::download_dir() {
		return dir;
	}

	if let Some(home) = dirs::home_dir() {
		return home.join("Downloads");
	}

	warn!("Could not determine a Downloads or HOME directory, using the current directory");

	return std::env::current_dir().unwrap_or_else(|_| return PathBuf::from("."));
}

/// Create the output directory (and all parents) if it does not exist yet
/// Errors if the path exists but is not a directory
pub fn ensure_output_dir(path: &Path) -> Result<(), crate::Error> {
	if path.exists() && !path.is_dir() {
		return Err(crate::Error::not_a_directory(
			"Output path exists, but is not a directory",
			path,
		));
	}

	std::fs::create_dir_all(path).attach_path_err(path)?;

	return Ok(());
}
