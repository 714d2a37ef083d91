use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::Result;
use crate::media::MediaCommandBuilder;
use crate::stream::StreamType;

/// Input extensions accepted for encoding (case-sensitive, without the dot)
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["mp4", "webm", "ogg", "wmv", "mov", "avchd", "av1"];

/// Suffix after the last `.` of the final path component, without the dot.
/// A leading dot counts, so `.mp4` has the extension `mp4`.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) => (&name[..idx], Some(&name[idx + 1..])),
        None => (name, None),
    }
}

/// Whether `name` carries one of the supported video extensions
pub fn check_extension<P: AsRef<Path>>(name: P) -> bool {
    name.as_ref()
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| split_extension(n).1)
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// Output directory next to the input, named after its base name without extension.
/// A base name that is only an extension (`.mp4`) maps to the parent directory.
pub fn derive_output_dir<P: AsRef<Path>>(input_file: P) -> PathBuf {
    let input_file = input_file.as_ref();
    let parent = input_file.parent().unwrap_or_else(|| Path::new(""));
    let stem = match input_file.file_name() {
        Some(name) => match name.to_str() {
            Some(name) => split_extension(name).0.to_string(),
            None => input_file.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default(),
        },
        None => String::new(),
    };
    if stem.is_empty() {
        parent.to_path_buf()
    } else {
        parent.join(stem)
    }
}

/// An encoding request as given by the user, before validation
#[derive(Debug, Clone)]
pub struct EncodingRequest {
    pub input_file: PathBuf,
    pub codec: Option<String>,
    pub stream_type: StreamType,
    pub output_dir: Option<PathBuf>,
}

impl EncodingRequest {
    pub fn new<P: Into<PathBuf>>(input_file: P, stream_type: StreamType) -> Self {
        Self {
            input_file: input_file.into(),
            codec: None,
            stream_type,
            output_dir: None,
        }
    }

    pub fn with_codec<S: Into<String>>(mut self, codec: S) -> Self {
        self.codec = Some(codec.into());
        self
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, output_dir: P) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Validated,
    CommandRendered,
    Executed,
}

/// A validated encoding job. Only produced by [`crate::validate::validate`].
#[derive(Debug, Clone, Serialize)]
pub struct EncodingJob {
    id: Uuid,
    input_file: PathBuf,
    codec: String,
    stream_type: StreamType,
    output_dir: PathBuf,
    output_file: PathBuf,
    has_audio: bool,
    rendered_command: String,
    state: JobState,
}

impl EncodingJob {
    pub(crate) fn new(input_file: PathBuf, codec: String, stream_type: StreamType) -> Self {
        Self {
            id: Uuid::new_v4(),
            input_file,
            codec,
            stream_type,
            output_dir: PathBuf::new(),
            output_file: PathBuf::new(),
            has_audio: false,
            rendered_command: String::new(),
            state: JobState::Validated,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn input_file(&self) -> &Path {
        &self.input_file
    }

    pub fn codec(&self) -> &str {
        &self.codec
    }

    pub fn stream_type(&self) -> StreamType {
        self.stream_type
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    pub fn has_audio(&self) -> bool {
        self.has_audio
    }

    pub fn rendered_command(&self) -> &str {
        &self.rendered_command
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Derive the output directory from the input file
    pub(crate) fn set_output_dir(&mut self) {
        self.output_dir = derive_output_dir(&self.input_file);
    }

    pub(crate) fn use_output_dir(&mut self, output_dir: PathBuf) {
        self.output_dir = output_dir;
    }

    /// Place the stream type's manifest inside the output directory
    pub(crate) fn set_output_file(&mut self) {
        self.output_file = self.output_dir.join(self.stream_type.manifest_name());
    }

    pub(crate) fn set_has_audio(&mut self, has_audio: bool) {
        self.has_audio = has_audio;
    }

    pub(crate) fn mark_executed(&mut self) {
        self.state = JobState::Executed;
    }

    /// Render the shell command for this job, once
    pub fn render(&mut self, builder: &MediaCommandBuilder) -> &str {
        if self.state == JobState::Validated {
            self.rendered_command = builder.stream(self).to_shell_string();
            self.state = JobState::CommandRendered;
        }
        &self.rendered_command
    }

    /// Pretty-printed JSON view of the job, as shown by `plan --json`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable summary of every field
    pub fn summary(&self) -> String {
        format!(
            "InputFile: {}\nCodec: {}\nStreamType: {} | {}\nOutputDir: {}\nOutputFile: {}\nAudio: {}\nCommand: {}",
            self.input_file.display(),
            self.codec,
            self.stream_type.index(),
            self.stream_type,
            self.output_dir.display(),
            self.output_file.display(),
            self.has_audio,
            self.rendered_command,
        )
    }
}
