use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::EncodeConfig;
use crate::error::{Result, VstreamError};
use crate::job::{EncodingJob, EncodingRequest, check_extension};
use crate::media::MediaToolsTrait;

/// Validate a request and fill in its defaults, producing a job ready to render.
///
/// Checks run in a fixed order: input present, extension supported, codec
/// recognized by the encoder. A missing codec falls back to
/// `defaults.default_codec`. The output directory is derived from the input
/// when not given and created when missing; a failed creation is only logged. Audio presence is probed last;
/// a failed probe means no audio.
pub async fn validate(
    request: EncodingRequest,
    tools: &dyn MediaToolsTrait,
    defaults: &EncodeConfig,
) -> Result<EncodingJob> {
    let EncodingRequest {
        input_file,
        codec,
        stream_type,
        output_dir,
    } = request;

    if input_file.as_os_str().is_empty() {
        warn!("Input file not set");
        return Err(VstreamError::MissingInput);
    }

    if !check_extension(&input_file) {
        return Err(VstreamError::InvalidExtension(input_file.display().to_string()));
    }

    let codec = match codec.filter(|c| !c.trim().is_empty()) {
        Some(codec) => codec,
        None => {
            warn!("Codec not set, using default codec {}", defaults.default_codec);
            defaults.default_codec.clone()
        }
    };

    if !tools.is_codec_supported(&codec).await {
        return Err(VstreamError::UnsupportedCodec(codec));
    }

    let mut job = EncodingJob::new(input_file, codec, stream_type);

    match output_dir.filter(|dir| !dir.as_os_str().is_empty()) {
        Some(dir) => job.use_output_dir(dir),
        None => {
            job.set_output_dir();
            debug!("Output directory derived as {}", job.output_dir().display());
        }
    }
    job.set_output_file();

    if fs::metadata(job.output_dir()).await.is_err() {
        warn!("Output directory does not exist, creating {}", job.output_dir().display());
        if let Err(e) = fs::create_dir_all(job.output_dir()).await {
            warn!("Could not create output directory {}: {}", job.output_dir().display(), e);
        }
    }

    if let Some(file_dir) = job.output_file().parent() {
        if file_dir != job.output_dir() {
            warn!("Output file directory does not match output directory, creating directory");
        }
        if fs::metadata(file_dir).await.is_err() {
            warn!("Output file directory does not exist, creating {}", file_dir.display());
            if let Err(e) = fs::create_dir_all(file_dir).await {
                warn!("Could not create output file directory {}: {}", file_dir.display(), e);
            }
        }
    }

    let has_audio = tools.has_audio_stream(job.input_file()).await;
    job.set_has_audio(has_audio);

    info!(
        "Validated {} job for {} (codec {}, audio: {})",
        job.stream_type(),
        job.input_file().display(),
        job.codec(),
        has_audio
    );

    Ok(job)
}
