//! vstream - DASH/HLS packaging over ffmpeg
//!
//! Validates encoding parameters, renders the ffmpeg command for segmented
//! DASH or HLS output, and runs it through the shell.

pub mod cli;
pub mod config;
pub mod error;
pub mod job;
pub mod media;
pub mod stream;
pub mod validate;
pub mod workflow;
