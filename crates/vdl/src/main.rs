#![allow(clippy::needless_return)]
#![warn(clippy::implicit_return)]

#[macro_use]
extern crate log;

use libvdl::{
	Error,
	control::DownloadControl,
};
use std::sync::{
	LazyLock,
	Mutex,
	PoisonError,
};

mod clap_conf;
mod commands;
mod logger;
mod utils;

use clap_conf::{
	CliDerive,
	SubCommands,
};

/// The control of the download that is currently running, which a termination signal cancels
static ACTIVE_CONTROL: LazyLock<Mutex<Option<DownloadControl>>> = LazyLock::new(|| return Mutex::new(None));

/// Set (or clear) the control of the currently running download
pub fn set_active_control(control: Option<DownloadControl>) {
	*ACTIVE_CONTROL.lock().unwrap_or_else(PoisonError::into_inner) = control;
}

/// Cancel the currently running download, returns "false" if there was nothing to cancel
fn cancel_active_control() -> bool {
	return ACTIVE_CONTROL
		.lock()
		.unwrap_or_else(PoisonError::into_inner)
		.as_ref()
		.is_some_and(DownloadControl::cancel);
}

/// Main
fn main() -> Result<(), crate::Error> {
	let mut logger_handle = logger::setup_logger()?;

	let cli_matches = CliDerive::custom_parse()?;

	log::info!("CLI Verbosity is {}", cli_matches.verbosity);

	// apply cli "verbosity" argument to the log level
	logger_handle.set_new_spec(logger::verbosity_spec(cli_matches.verbosity)?);

	colored::control::set_override(cli_matches.enable_colors());

	// the first termination signal cancels a running download, otherwise exit
	ctrlc::set_handler(|| {
		if cancel_active_control() {
			eprintln!("Cancelling the download, press Ctrl+C again to exit");
			return;
		}

		std::process::exit(130);
	})
	.map_err(|err| return crate::Error::other(format!("Failed to set the termination handler: {err}")))?;

	match &cli_matches.subcommands {
		Some(SubCommands::Download(v)) => commands::download::command_download(&cli_matches, v),
		Some(SubCommands::Info(v)) => commands::info::command_info(&cli_matches, v),
		Some(SubCommands::Interactive(v)) => commands::interactive::command_interactive(&cli_matches, v),
		Some(SubCommands::Completions(v)) => commands::completions::command_completions(&cli_matches, v),
		None => unreachable!("Check should have set a default subcommand"),
	}?;

	return Ok(());
}
