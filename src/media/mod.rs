// External media tool access
//
// - Commands: command builders for the codec query, audio probe and stream encodes
// - Processor: ffmpeg/ffprobe-backed implementation of the tools trait

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// The three interactions with external tools a job needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaToolsTrait: Send + Sync {
    /// Whether the encoder recognizes `codec`. Query failures count as not recognized.
    async fn is_codec_supported(&self, codec: &str) -> bool;

    /// Whether `input` has at least one audio stream. Probe failures count as no audio.
    async fn has_audio_stream(&self, input: &Path) -> bool;

    /// Run a rendered command line through the shell with inherited stdio
    async fn run_shell(&self, command_line: &str) -> Result<()>;
}

/// Factory for creating media tool instances
pub struct MediaToolsFactory;

impl MediaToolsFactory {
    /// Create the default implementation (ffmpeg/ffprobe on the system)
    pub fn create_tools(config: MediaConfig) -> Box<dyn MediaToolsTrait> {
        Box::new(processor::MediaToolsImpl::new(config))
    }
}
