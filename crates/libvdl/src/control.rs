//! Module for controlling a running download (pause / resume / cancel)
//!
//! The download functions only read the state at checkpoints (every output line of yt-dlp or every chunk of a web download),
//! so a state change is not instant, but will be picked up at the next checkpoint.

use std::sync::{
	Arc,
	Mutex,
	MutexGuard,
	PoisonError,
};

/// The state a download can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
	/// No download is running
	#[default]
	Idle,
	/// A download is running
	Downloading,
	/// A download was paused, the context is kept so that it can be resumed
	Paused,
	/// A download was requested to be cancelled
	Cancelled,
}

/// Why a running download has to stop, returned by [`DownloadControl::checkpoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
	Paused,
	Cancelled,
}

/// Shared handle to the state of a download, cloning it will still refer to the same state
#[derive(Debug, Clone, Default)]
pub struct DownloadControl {
	state: Arc<Mutex<ControlState>>,
}

impl DownloadControl {
	/// Create a new instance in [`ControlState::Idle`]
	pub fn new() -> Self {
		return Self::default();
	}

	/// Lock the state, a poisoned lock is still used because the state is always valid
	fn lock(&self) -> MutexGuard<'_, ControlState> {
		return self.state.lock().unwrap_or_else(PoisonError::into_inner);
	}

	/// Get a copy of the current state
	pub fn state(&self) -> ControlState {
		return *self.lock();
	}

	/// Mark the start of a download run
	/// Returns `false` if a cancel was requested before the run could start, the state is not changed in that case
	pub fn begin(&self) -> bool {
		let mut state = self.lock();

		if *state == ControlState::Cancelled {
			return false;
		}

		*state = ControlState::Downloading;

		return true;
	}

	/// Request the running download to pause
	/// Returns `true` if the state changed
	pub fn pause(&self) -> bool {
		let mut state = self.lock();

		if *state != ControlState::Downloading {
			return false;
		}

		*state = ControlState::Paused;

		return true;
	}

	/// Mark a paused download as running again, the caller is expected to start the download again with "resume" set
	/// Returns `true` if the state changed
	pub fn resume(&self) -> bool {
		let mut state = self.lock();

		if *state != ControlState::Paused {
			return false;
		}

		*state = ControlState::Downloading;

		return true;
	}

	/// Request the running or paused download to be cancelled
	/// Returns `true` if the state changed
	pub fn cancel(&self) -> bool {
		let mut state = self.lock();

		if !matches!(*state, ControlState::Downloading | ControlState::Paused) {
			return false;
		}

		*state = ControlState::Cancelled;

		return true;
	}

	/// Mark the end of a download run
	/// A paused download stays paused so that it can be resumed
	pub fn finish(&self) {
		let mut state = self.lock();

		if *state != ControlState::Paused {
			*state = ControlState::Idle;
		}
	}

	/// Reset to [`ControlState::Idle`], regardless of the current state
	pub fn reset(&self) {
		*self.lock() = ControlState::Idle;
	}

	/// Get whether the download is currently paused
	pub fn is_paused(&self) -> bool {
		return self.state() == ControlState::Paused;
	}

	/// Get whether a cancel has been requested
	pub fn should_cancel(&self) -> bool {
		return self.state() == ControlState::Cancelled;
	}

	/// Get whether a download is currently running
	pub fn is_downloading(&self) -> bool {
		return self.state() == ControlState::Downloading;
	}

	/// Check if the running download has to stop
	pub fn checkpoint(&self) -> Option<Interrupt> {
		return match self.state() {
			ControlState::Paused => Some(Interrupt::Paused),
			ControlState::Cancelled => Some(Interrupt::Cancelled),
			ControlState::Idle | ControlState::Downloading => None,
		};
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_pause_resume_cycle() {
		let control = DownloadControl::new();
		assert_eq!(control.state(), ControlState::Idle);

		// cannot pause or resume without a running download
		assert!(!control.pause());
		assert!(!control.resume());

		assert!(control.begin());
		assert!(control.is_downloading());
		assert_eq!(control.checkpoint(), None);

		assert!(control.pause());
		assert!(control.is_paused());
		// pausing twice does nothing
		assert!(!control.pause());
		assert_eq!(control.checkpoint(), Some(Interrupt::Paused));

		// the worker exits, but the pause context is kept
		control.finish();
		assert!(control.is_paused());

		assert!(control.resume());
		assert!(control.is_downloading());
		assert!(control.begin());

		control.finish();
		assert_eq!(control.state(), ControlState::Idle);
	}

	#[test]
	fn test_cancel() {
		let control = DownloadControl::new();

		// nothing to cancel
		assert!(!control.cancel());

		assert!(control.begin());
		assert!(control.cancel());
		assert!(control.should_cancel());
		assert_eq!(control.checkpoint(), Some(Interrupt::Cancelled));
		// cannot pause or resume a cancelled download
		assert!(!control.pause());
		assert!(!control.resume());
		// a cancelled download cannot start again without a reset
		assert!(!control.begin());

		control.finish();
		assert_eq!(control.state(), ControlState::Idle);
	}

	#[test]
	fn test_cancel_while_paused() {
		let control = DownloadControl::new();

		assert!(control.begin());
		assert!(control.pause());
		assert!(control.cancel());
		assert!(!control.is_paused());
		assert!(control.should_cancel());
	}

	#[test]
	fn test_shared_between_threads() {
		let control = DownloadControl::new();
		assert!(control.begin());

		let cloned = control.clone();
		std::thread::spawn(move || {
			assert!(cloned.pause());
		})
		.join()
		.expect("Expected thread to not panic");

		assert!(control.is_paused());

		control.reset();
		assert_eq!(control.state(), ControlState::Idle);
	}
}
