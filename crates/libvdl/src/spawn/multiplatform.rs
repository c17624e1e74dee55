use std::{
	ffi::OsStr,
	process::Command,
};

// This file still exists and is seperated for future quick changes

/// Spawn a binary in non-windows / DOS systems
#[cfg(not(target_os = "windows"))]
#[inline]
pub fn spawn_command<B: AsRef<OsStr>>(binary_name: B) -> Command {
	return Command::new(binary_name);
}

/// Spawn a binary for windows / DOS systems
/// Apparently, rust automatically adds a extensions (".exe") if none is specified
/// Also, rust automatically searches all the paths, including the vdl binary path
#[cfg(target_os = "windows")]
#[inline]
pub fn spawn_command<B: AsRef<OsStr>>(binary_name: B) -> Command {
	let mut cmd = Command::new(binary_name);

	// dont open a new console window for every spawned command
	{
		use std::os::windows::process::CommandExt;
		const CREATE_NO_WINDOW: u32 = 0x0800_0000;
		cmd.creation_flags(CREATE_NO_WINDOW);
	}

	return cmd;
}
