//! Module for data that is collected while downloading

pub mod media_info;
