use std::path::Path;
use tracing::{Instrument, error, info, info_span, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, VstreamError};
use crate::job::{EncodingJob, EncodingRequest, check_extension};
use crate::media::{MediaCommandBuilder, MediaToolsFactory, MediaToolsTrait};
use crate::stream::StreamType;
use crate::validate::validate;

/// Outcome of a directory run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct Workflow {
    config: Config,
    tools: Box<dyn MediaToolsTrait>,
    command_builder: MediaCommandBuilder,
}

impl Workflow {
    pub fn new(config: Config) -> Self {
        let tools = MediaToolsFactory::create_tools(config.media.clone());
        Self::with_tools(config, tools)
    }

    /// Build a workflow over a custom tools implementation
    pub fn with_tools(config: Config, tools: Box<dyn MediaToolsTrait>) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.media.ffmpeg_path, &config.media.ffprobe_path);

        Self {
            config,
            tools,
            command_builder,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate the request and render its command without running it
    pub async fn plan(&self, request: EncodingRequest) -> Result<EncodingJob> {
        let mut job = validate(request, self.tools.as_ref(), &self.config.encode).await?;
        job.render(&self.command_builder);
        Ok(job)
    }

    /// Run a job's command. The job is consumed; a failed run surfaces as `ExecutionFailed`.
    pub async fn execute(&self, mut job: EncodingJob) -> Result<EncodingJob> {
        let span = info_span!("job", id = %job.id());
        async move {
            let command_line = job.render(&self.command_builder).to_string();
            info!("Encoding {} to {}", job.input_file().display(), job.output_file().display());

            match self.tools.run_shell(&command_line).await {
                Ok(()) => {
                    job.mark_executed();
                    info!("Wrote {} manifest {}", job.stream_type(), job.output_file().display());
                    Ok(job)
                }
                Err(e) => {
                    error!("Encoding {} failed: {}", job.input_file().display(), e);
                    if matches!(e, VstreamError::ExecutionFailed { .. }) {
                        Err(e)
                    } else {
                        Err(VstreamError::ExecutionFailed {
                            command: command_line,
                            reason: e.to_string(),
                        })
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Validate, render and execute a single file
    pub async fn encode(&self, request: EncodingRequest) -> Result<EncodingJob> {
        let job = self.plan(request).await?;
        self.execute(job).await
    }

    /// Encode every supported video file below `input_dir`, one at a time.
    /// Per-file failures are logged and counted, never fatal.
    pub async fn process_directory<P: AsRef<Path>>(
        &self,
        input_dir: P,
        stream_type: StreamType,
        codec: Option<&str>,
    ) -> Result<BatchSummary> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(VstreamError::Config(format!(
                "Input path is not a directory: {}",
                input_dir.display()
            )));
        }

        let video_files: Vec<_> = WalkDir::new(input_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && check_extension(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        info!("Found {} video files to process", video_files.len());

        let mut summary = BatchSummary::default();
        for video_path in video_files {
            let mut request = EncodingRequest::new(&video_path, stream_type);
            if let Some(codec) = codec {
                request = request.with_codec(codec);
            }

            match self.encode(request).await {
                Ok(_) => {
                    info!("Successfully processed: {}", video_path.display());
                    summary.succeeded += 1;
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", video_path.display(), e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobState;
    use crate::media::MockMediaToolsTrait;
    use assert_fs::prelude::*;

    fn tools(run_ok: bool) -> MockMediaToolsTrait {
        let mut tools = MockMediaToolsTrait::new();
        tools.expect_is_codec_supported().returning(|_| true);
        tools.expect_has_audio_stream().returning(|_| true);
        tools.expect_run_shell().returning(move |line: &str| {
            if run_ok {
                Ok(())
            } else {
                Err(VstreamError::ExecutionFailed {
                    command: line.to_string(),
                    reason: "exit status: 1".to_string(),
                })
            }
        });
        tools
    }

    #[tokio::test]
    async fn test_plan_renders_without_running() {
        let temp = assert_fs::TempDir::new().unwrap();
        let mut mock = MockMediaToolsTrait::new();
        mock.expect_is_codec_supported().returning(|_| true);
        mock.expect_has_audio_stream().returning(|_| false);
        mock.expect_run_shell().never();
        let workflow = Workflow::with_tools(Config::default(), Box::new(mock));

        let job = workflow
            .plan(EncodingRequest::new(temp.path().join("a.mp4"), StreamType::Hls))
            .await
            .unwrap();

        assert_eq!(job.state(), JobState::CommandRendered);
        assert!(job.rendered_command().starts_with("ffmpeg -i "));
        assert!(job.rendered_command().contains("-f hls"));
    }

    #[tokio::test]
    async fn test_encode_runs_rendered_command() {
        let temp = assert_fs::TempDir::new().unwrap();
        let mut mock = MockMediaToolsTrait::new();
        mock.expect_is_codec_supported().returning(|_| true);
        mock.expect_has_audio_stream().returning(|_| true);
        mock.expect_run_shell()
            .withf(|line: &str| line.contains("-f dash") && line.contains("-c:a libopus -b:a 128k"))
            .times(1)
            .returning(|_| Ok(()));
        let workflow = Workflow::with_tools(Config::default(), Box::new(mock));

        let job = workflow
            .encode(EncodingRequest::new(temp.path().join("a.mp4"), StreamType::Dash))
            .await
            .unwrap();
        assert_eq!(job.state(), JobState::Executed);
    }

    #[tokio::test]
    async fn test_encode_surfaces_execution_failure() {
        let temp = assert_fs::TempDir::new().unwrap();
        let workflow = Workflow::with_tools(Config::default(), Box::new(tools(false)));

        let result = workflow
            .encode(EncodingRequest::new(temp.path().join("a.mp4"), StreamType::Dash))
            .await;
        match result {
            Err(VstreamError::ExecutionFailed { command, .. }) => assert!(command.contains("-f dash")),
            other => panic!("expected ExecutionFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_process_directory_picks_supported_files() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.mp4").touch().unwrap();
        temp.child("notes.txt").touch().unwrap();
        temp.child("upper.MP4").touch().unwrap();
        temp.child("sub").create_dir_all().unwrap();
        temp.child("sub/b.webm").touch().unwrap();

        let mut mock = MockMediaToolsTrait::new();
        mock.expect_is_codec_supported().returning(|_| true);
        mock.expect_has_audio_stream().returning(|_| false);
        mock.expect_run_shell().times(2).returning(|_| Ok(()));
        let workflow = Workflow::with_tools(Config::default(), Box::new(mock));

        let summary = workflow
            .process_directory(temp.path(), StreamType::Hls, Some("libx264"))
            .await
            .unwrap();

        assert_eq!(summary, BatchSummary { succeeded: 2, failed: 0 });
        assert!(temp.path().join("a").is_dir());
        assert!(temp.path().join("sub").join("b").is_dir());
    }

    #[tokio::test]
    async fn test_process_directory_counts_failures() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.mov").touch().unwrap();
        temp.child("b.ogg").touch().unwrap();
        let workflow = Workflow::with_tools(Config::default(), Box::new(tools(false)));

        let summary = workflow
            .process_directory(temp.path(), StreamType::Dash, None)
            .await
            .unwrap();
        assert_eq!(summary, BatchSummary { succeeded: 0, failed: 2 });
    }

    #[tokio::test]
    async fn test_process_directory_rejects_file_path() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.mp4").touch().unwrap();
        let workflow = Workflow::with_tools(Config::default(), Box::new(tools(true)));

        let result = workflow
            .process_directory(temp.path().join("a.mp4"), StreamType::Dash, None)
            .await;
        assert!(matches!(result, Err(VstreamError::Config(_))));
    }
}
