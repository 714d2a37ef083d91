use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::MediaConfig;
use crate::error::Result;
use super::{CommandOutput, MediaCommandBuilder, MediaToolsTrait};

const NOT_RECOGNIZED_MARKER: &str = "is not recognized by FFmpeg";

/// Concrete implementation of the media tools (ffmpeg/ffprobe-based)
pub struct MediaToolsImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaToolsImpl {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.ffmpeg_path, &config.ffprobe_path);

        Self {
            config,
            command_builder,
        }
    }
}

/// Interpret the encoder's help output for a codec
pub fn codec_recognized(output: &CommandOutput) -> bool {
    output.success && !output.text.trim().is_empty() && !output.text.contains(NOT_RECOGNIZED_MARKER)
}

/// Interpret the prober's audio stream listing
pub fn audio_present(output: &CommandOutput) -> bool {
    output.success && !output.text.trim().is_empty()
}

#[async_trait]
impl MediaToolsTrait for MediaToolsImpl {
    async fn is_codec_supported(&self, codec: &str) -> bool {
        let command = self.command_builder.codec_query(codec);
        match command.capture().await {
            Ok(output) => {
                let recognized = codec_recognized(&output);
                debug!("Codec {} recognized: {}", codec, recognized);
                recognized
            }
            Err(e) => {
                warn!("Codec query for {} failed: {}", codec, e);
                false
            }
        }
    }

    async fn has_audio_stream(&self, input: &Path) -> bool {
        let command = self.command_builder.audio_probe(input);
        match command.capture().await {
            Ok(output) => audio_present(&output),
            Err(e) => {
                warn!("Audio probe for {} failed, assuming no audio: {}", input.display(), e);
                false
            }
        }
    }

    async fn run_shell(&self, command_line: &str) -> Result<()> {
        info!("Running transcode through {}", self.config.shell);

        let command = self.command_builder.shell(&self.config.shell, command_line);
        command.run_inherited().await?;

        info!("Transcode completed successfully");
        Ok(())
    }
}
