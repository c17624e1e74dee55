//! Module for Clap related structs (derived)

#![deny(missing_docs)] // comments are used for "--help" generation, so it should always be defined

use clap::{
	ArgAction,
	Parser,
	Subcommand,
};
use is_terminal::IsTerminal;
use libvdl::{
	playlist::PlaylistSelection,
	quality::Quality,
};
use std::path::PathBuf;

/// Environment variable for the output directory, used by "download" and "interactive"
pub const ENV_OUT: &str = "VDL_OUT";

/// Trait to check and transform all Command Structures
trait Check {
	/// Check and transform self to be correct
	fn check(&mut self) -> Result<(), crate::Error>;
}

#[derive(Debug, Parser, Clone, PartialEq)]
#[command(author, version = env!("VDL_VERSION"), about, long_about = None)]
#[command(bin_name("vdl"))]
#[command(disable_help_subcommand(true))] // Disable subcommand "help", only "-h --help" should be used
#[command(subcommand_negates_reqs(true))]
pub struct CliDerive {
	/// Set Logging verbosity (0 - Default - WARN, 1 - INFO, 2 - DEBUG, 3 - TRACE)
	#[arg(short, long, action = ArgAction::Count, env = "VDL_VERBOSITY", global = true)]
	pub verbosity:    u8,
	/// Explicitly set whether the terminal is interactive (progress bars, prompts)
	#[arg(long = "tty", global = true)]
	pub explicit_tty: Option<bool>,
	/// Force Color to be active in any mode
	#[arg(long = "color", global = true)]
	pub force_color:  bool,
	/// Path of the ffmpeg binary to use, otherwise "ffmpeg" from PATH is used
	#[arg(long = "ffmpeg", env = "VDL_FFMPEG", global = true)]
	pub ffmpeg:       Option<PathBuf>,

	/// Starts the interactive front end when no subcommand is given
	#[command(subcommand)]
	pub subcommands: Option<SubCommands>,
}

impl CliDerive {
	/// Execute clap::Parser::parse and apply custom validation and transformation logic
	pub fn custom_parse() -> Result<Self, crate::Error> {
		let mut parsed = Self::parse();

		Check::check(&mut parsed)?;

		return Ok(parsed);
	}

	/// Get if the mode is interactive or not
	#[must_use]
	pub fn is_interactive(&self) -> bool {
		if let Some(explicit) = self.explicit_tty {
			return explicit;
		}

		return std::io::stdout().is_terminal() && std::io::stdin().is_terminal();
	}

	/// Get if the colors are enabled or not
	#[must_use]
	pub fn enable_colors(&self) -> bool {
		return self.force_color | self.is_interactive();
	}
}

impl Check for CliDerive {
	fn check(&mut self) -> Result<(), crate::Error> {
		// no subcommand means the interactive front end, with the same environment defaults
		if self.subcommands.is_none() {
			self.subcommands = Some(SubCommands::Interactive(CommandInteractive {
				output_path: std::env::var_os(ENV_OUT).map(PathBuf::from),
			}));
		}

		if let Some(subcommands) = &mut self.subcommands {
			return Check::check(subcommands);
		}

		return Ok(());
	}
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum SubCommands {
	/// Download the given URL(s)
	Download(CommandDownload),
	/// Show information about a video or playlist
	Info(CommandInfo),
	/// Start the interactive front end
	#[command(alias = "gui")]
	Interactive(CommandInteractive),
	/// Generate shell completions
	Completions(CommandCompletions),
}

impl Check for SubCommands {
	fn check(&mut self) -> Result<(), crate::Error> {
		match self {
			SubCommands::Download(v) => return Check::check(v),
			SubCommands::Info(v) => return Check::check(v),
			SubCommands::Interactive(v) => return Check::check(v),
			SubCommands::Completions(v) => return Check::check(v),
		}
	}
}

/// Download one or more URLs
#[derive(Debug, Parser, Clone, PartialEq)]
pub struct CommandDownload {
	/// Quality to download in (2160p, 1440p, 1080p, 720p, 480p, 360p, highest, "audio only")
	#[arg(short, long, env = "VDL_QUALITY", default_value = "highest")]
	pub quality:          Quality,
	/// Output directory, by default the Downloads directory
	#[arg(short, long = "output", env = ENV_OUT)]
	pub output_path:      Option<PathBuf>,
	/// Only download a range of a playlist, like "1-5"
	#[arg(long = "playlist-range", conflicts_with = "playlist_items")]
	pub playlist_range:   Option<String>,
	/// Only download specific items of a playlist, like "1,3,5"
	#[arg(long = "playlist-items")]
	pub playlist_items:   Option<String>,
	/// Extra arguments to give to yt-dlp, key and value are split at the first space
	#[arg(long = "extra-ytdl-arg", allow_hyphen_values = true)]
	pub extra_ytdl_args:  Vec<String>,
	/// Print yt-dlp output as trace logs
	/// This will still require logging verbosity set to 3 or "RUST_LOG=trace"
	#[arg(long = "ytdl-log")]
	pub print_ytdl_log:   bool,
	/// Save yt-dlp output to a file in the output directory
	#[arg(long = "save-ytdl-log")]
	pub save_ytdl_log:    bool,
	/// The playlist selection, derived from "playlist_range" or "playlist_items"
	#[arg(skip)]
	pub playlist:         PlaylistSelection,

	/// URLs to download
	#[arg(required = true)]
	pub urls: Vec<String>,
}

impl CommandDownload {
	/// Get the extra yt-dlp arguments, split into key and value
	pub fn extra_arguments(&self) -> Vec<std::ffi::OsString> {
		return self
			.extra_ytdl_args
			.iter()
			.flat_map(|v| {
				if let Some((key, value)) = v.split_once(' ') {
					return Vec::from([key.into(), value.into()]);
				}

				return Vec::from([v.into()]);
			})
			.collect();
	}
}

impl Check for CommandDownload {
	fn check(&mut self) -> Result<(), crate::Error> {
		self.playlist = match (&self.playlist_range, &self.playlist_items) {
			(Some(_), Some(_)) => {
				return Err(crate::Error::invalid_input(
					"Only one of \"--playlist-range\" and \"--playlist-items\" can be used",
				));
			},
			(Some(range), None) => PlaylistSelection::parse_range(range)?,
			(None, Some(items)) => PlaylistSelection::parse_items(items)?,
			(None, None) => PlaylistSelection::Full,
		};

		return Ok(());
	}
}

/// Show information about a video or playlist
#[derive(Debug, Parser, Clone, PartialEq)]
pub struct CommandInfo {
	/// The URL to get information for
	pub url: String,
}

impl Check for CommandInfo {
	fn check(&mut self) -> Result<(), crate::Error> {
		return Ok(());
	}
}

/// Start the interactive front end
#[derive(Debug, Parser, Clone, PartialEq, Default)]
pub struct CommandInteractive {
	/// Default output directory to offer
	#[arg(short, long = "output", env = ENV_OUT)]
	pub output_path: Option<PathBuf>,
}

impl Check for CommandInteractive {
	fn check(&mut self) -> Result<(), crate::Error> {
		return Ok(());
	}
}

/// Generate shell completions
#[derive(Debug, Parser, Clone, PartialEq)]
pub struct CommandCompletions {
	/// Output file to write the completions to, default to Stdout
	#[arg(short, long = "out")]
	pub output_file_path: Option<PathBuf>,
	/// Shell to generate completions for
	#[arg(value_enum)]
	pub shell:            clap_complete::Shell,
}

impl Check for CommandCompletions {
	fn check(&mut self) -> Result<(), crate::Error> {
		return Ok(());
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn download_default() -> CommandDownload {
		return CommandDownload {
			quality:         Quality::Highest,
			output_path:     None,
			playlist_range:  None,
			playlist_items:  None,
			extra_ytdl_args: Vec::new(),
			print_ytdl_log:  false,
			save_ytdl_log:   false,
			playlist:        PlaylistSelection::Full,
			urls:            vec!["https://www.youtube.com/watch?v=abc".to_owned()],
		};
	}

	fn cli_default(explicit_tty: Option<bool>, force_color: bool) -> CliDerive {
		return CliDerive {
			verbosity: 0,
			explicit_tty,
			force_color,
			ffmpeg: None,
			subcommands: Some(SubCommands::Download(download_default())),
		};
	}

	mod command_download {
		use super::*;

		#[test]
		fn test_check() {
			let init_default = download_default();

			let mut cloned = init_default.clone();
			assert!(cloned.check().is_ok());
			assert_eq!(init_default, cloned);
		}

		#[test]
		fn test_check_range() {
			let mut init = download_default();
			init.playlist_range = Some("2-4".to_owned());

			assert!(init.check().is_ok());
			assert_eq!(init.playlist, PlaylistSelection::Range(2, 4));
		}

		#[test]
		fn test_check_items() {
			let mut init = download_default();
			init.playlist_items = Some("1, 3,5".to_owned());

			assert!(init.check().is_ok());
			assert_eq!(init.playlist, PlaylistSelection::Items(vec![1, 3, 5]));
		}

		#[test]
		fn test_check_invalid() {
			let mut init = download_default();
			init.playlist_range = Some("5-2".to_owned());
			assert!(init.check().is_err());

			let mut init = download_default();
			init.playlist_range = Some("1-2".to_owned());
			init.playlist_items = Some("1".to_owned());
			assert!(init.check().is_err());
		}

		#[test]
		fn test_extra_arguments() {
			let mut init = download_default();
			init.extra_ytdl_args = vec!["--limit-rate 1M".to_owned(), "--no-part".to_owned()];

			assert_eq!(
				init.extra_arguments(),
				vec![
					std::ffi::OsString::from("--limit-rate"),
					std::ffi::OsString::from("1M"),
					std::ffi::OsString::from("--no-part")
				]
			);
		}
	}

	mod cli_derive {
		use super::*;

		#[test]
		fn test_check() {
			let init_default = cli_default(None, false);

			let mut cloned = init_default.clone();
			assert!(cloned.check().is_ok());
			assert_eq!(init_default, cloned);
		}

		#[test]
		fn test_check_no_subcommand() {
			let mut init = cli_default(None, false);
			init.subcommands = None;

			assert!(init.check().is_ok());
			assert!(matches!(init.subcommands, Some(SubCommands::Interactive(_))));
		}

		#[test]
		fn test_is_interactive_explicit() {
			assert!(!cli_default(Some(false), false).is_interactive());
			assert!(cli_default(Some(true), false).is_interactive());
		}

		#[test]
		fn test_enable_colors_forced() {
			assert!(cli_default(None, true).enable_colors());
		}

		#[test]
		fn test_enable_colors_forced_interactive() {
			assert!(!cli_default(Some(false), false).enable_colors());
			assert!(cli_default(Some(true), false).enable_colors());
		}
	}

	mod parse {
		use super::*;

		#[test]
		fn test_download() {
			let parsed = CliDerive::try_parse_from([
				"vdl",
				"-vv",
				"download",
				"-q",
				"720p",
				"--playlist-items",
				"1,2",
				"https://www.youtube.com/playlist?list=PLabc",
			])
			.expect("Expected arguments to parse");

			assert_eq!(parsed.verbosity, 2);
			let Some(SubCommands::Download(download)) = parsed.subcommands else {
				panic!("Expected the download subcommand");
			};
			assert_eq!(download.quality, Quality::P720);
			assert_eq!(download.playlist_items, Some("1,2".to_owned()));
			assert_eq!(download.urls, vec!["https://www.youtube.com/playlist?list=PLabc".to_owned()]);
		}

		#[test]
		fn test_download_conflicting_selection() {
			let res = CliDerive::try_parse_from([
				"vdl",
				"download",
				"--playlist-items",
				"1,2",
				"--playlist-range",
				"1-2",
				"https://www.youtube.com/playlist?list=PLabc",
			]);

			assert!(res.is_err());
		}

		#[test]
		fn test_download_requires_url() {
			assert!(CliDerive::try_parse_from(["vdl", "download"]).is_err());
		}

		#[test]
		fn test_gui_alias() {
			let parsed = CliDerive::try_parse_from(["vdl", "gui"]).expect("Expected arguments to parse");

			assert!(matches!(parsed.subcommands, Some(SubCommands::Interactive(_))));
		}

		#[test]
		fn test_no_subcommand() {
			let parsed = CliDerive::try_parse_from(["vdl"]).expect("Expected arguments to parse");

			assert_eq!(parsed.subcommands, None);
		}
	}
}
