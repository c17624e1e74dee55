//! Library of "vdl", contains all the logic needed for the binary
//!
//! The heavy lifting (extraction, format negotiation, muxing) is done by `yt-dlp` and `ffmpeg`,
//! this library classifies URLs, translates options to arguments, parses progress and controls running downloads.

#![allow(clippy::needless_return)]
#![allow(special_module_name)] // because of module "main", dont have a better name for that
#![warn(clippy::implicit_return)]

#[macro_use]
extern crate log;

pub mod control;
pub mod data;
pub mod error;
pub mod info;
pub mod main;
pub mod playlist;
pub mod quality;
pub mod spawn;
pub mod url_kind;
pub mod utils;
pub use error::Error;

pub use chrono;
