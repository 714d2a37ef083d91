use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, VstreamError};
use crate::job::EncodingJob;
use crate::stream::StreamType;

const VIDEO_BITRATE: &str = "1000k";
const AUDIO_BITRATE: &str = "128k";
const GOP_LENGTH: &str = "150";
const SCENE_CUT_THRESHOLD: &str = "0";
const SEGMENT_SECONDS: &str = "4";

const DASH_AUDIO_CODEC: &str = "libopus";
const DASH_INIT_SEGMENT: &str = "init-$RepresentationID$.m4s";
const DASH_MEDIA_SEGMENT: &str = "chunk-$RepresentationID$-$Number$.m4s";

const HLS_AUDIO_CODEC: &str = "aac";
const HLS_SEGMENT_PATTERN: &str = "segment_%03d.ts";
const HLS_MASTER_PLAYLIST: &str = "master.m3u8";

/// A single command-line token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandArg {
    /// Emitted verbatim in shell form, single-quoted only when it needs to be
    Plain(String),
    /// Always wrapped in double quotes in shell form
    Quoted(String),
}

impl CommandArg {
    pub fn as_str(&self) -> &str {
        match self {
            CommandArg::Plain(s) | CommandArg::Quoted(s) => s,
        }
    }

    fn to_shell(&self) -> String {
        match self {
            CommandArg::Plain(s) => shell_quote(s),
            CommandArg::Quoted(s) => format!("\"{}\"", s),
        }
    }
}

/// Quote a token for a POSIX shell, leaving plain words untouched.
pub fn shell_quote(token: &str) -> String {
    let safe = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:=,@%".contains(c));
    if safe {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

/// Captured result of a query command: exit status plus stdout and stderr combined
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub text: String,
}

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<CommandArg>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(CommandArg::Plain(arg.into()));
        self
    }

    /// Add an argument that is always double-quoted in shell form
    pub fn quoted<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(CommandArg::Quoted(arg.into()));
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| CommandArg::Plain(s.into())));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Map every input stream
    pub fn map_all(self) -> Self {
        self.arg("-map").arg("0")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    pub fn video_bitrate<S: Into<String>>(self, bitrate: S) -> Self {
        self.arg("-b:v").arg(bitrate)
    }

    pub fn audio_bitrate<S: Into<String>>(self, bitrate: S) -> Self {
        self.arg("-b:a").arg(bitrate)
    }

    /// Fixed keyframe interval with scene-cut keyframes disabled, so segments align
    pub fn fixed_gop<S: Into<String>>(self, length: S) -> Self {
        let length = length.into();
        self.arg("-keyint_min")
            .arg(length.clone())
            .arg("-g")
            .arg(length)
            .arg("-sc_threshold")
            .arg(SCENE_CUT_THRESHOLD)
    }

    /// Set output container format
    pub fn format<S: Into<String>>(self, format: S) -> Self {
        self.arg("-f").arg(format)
    }

    /// Render as a single shell command line
    pub fn to_shell_string(&self) -> String {
        let mut line = shell_quote(&self.binary_path);
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_shell());
        }
        line
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(self.args.iter().map(CommandArg::as_str));
        cmd
    }

    /// Run to completion and capture stdout and stderr together
    pub async fn capture(&self) -> Result<CommandOutput> {
        debug!("Executing media query: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| VstreamError::Media(format!("Failed to execute {}: {}", self.binary_path, e)))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            success: output.status.success(),
            text,
        })
    }

    /// Run to completion with stdin, stdout and stderr inherited from this process
    pub async fn run_inherited(&self) -> Result<()> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let status = self
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| VstreamError::ExecutionFailed {
                command: self.to_shell_string(),
                reason: format!("failed to spawn {}: {}", self.binary_path, e),
            })?;

        if !status.success() {
            return Err(VstreamError::ExecutionFailed {
                command: self.to_shell_string(),
                reason: format!("{} exited with {}", self.description, status),
            });
        }

        Ok(())
    }
}

impl fmt::Display for MediaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell_string())
    }
}

/// Builder for the commands this crate runs
#[derive(Debug, Clone)]
pub struct MediaCommandBuilder {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(ffmpeg_path: S1, ffprobe_path: S2) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Ask the encoder to describe `codec`; unknown names produce a "not recognized" message
    pub fn codec_query(&self, codec: &str) -> MediaCommand {
        MediaCommand::new(&self.ffmpeg_path, "Codec capability query")
            .arg("-h")
            .arg(format!("encoder={}", codec))
    }

    /// List audio streams of `input`; empty output means there are none
    pub fn audio_probe<P: AsRef<Path>>(&self, input: P) -> MediaCommand {
        MediaCommand::new(&self.ffprobe_path, "Audio stream probe")
            .input(input)
            .args(["-show_streams", "-select_streams", "a", "-loglevel", "error"])
    }

    /// Wrap a rendered command line for `<shell> -c`
    pub fn shell<S1: Into<String>, S2: Into<String>>(&self, shell: S1, command_line: S2) -> MediaCommand {
        MediaCommand::new(shell, "Transcode").arg("-c").arg(command_line)
    }

    /// Build the segmented-output command for the job's stream type
    pub fn stream(&self, job: &EncodingJob) -> MediaCommand {
        match job.stream_type() {
            StreamType::Dash => self.dash(job),
            StreamType::Hls => self.hls(job),
        }
    }

    fn encode_base(&self, job: &EncodingJob, audio_codec: &str) -> MediaCommand {
        let cmd = MediaCommand::new(&self.ffmpeg_path, format!("{} encode", job.stream_type()))
            .input(job.input_file())
            .map_all()
            .video_codec(job.codec())
            .video_bitrate(VIDEO_BITRATE)
            .fixed_gop(GOP_LENGTH);

        if job.has_audio() {
            cmd.audio_codec(audio_codec).audio_bitrate(AUDIO_BITRATE)
        } else {
            cmd
        }
    }

    /// DASH output with template + timeline addressing
    pub fn dash(&self, job: &EncodingJob) -> MediaCommand {
        let adaptation_sets = if job.has_audio() {
            "id=0,streams=v id=1,streams=a"
        } else {
            "id=0,streams=v"
        };

        self.encode_base(job, DASH_AUDIO_CODEC)
            .format("dash")
            .arg("-seg_duration")
            .arg(SEGMENT_SECONDS)
            .arg("-use_template")
            .arg("1")
            .arg("-use_timeline")
            .arg("1")
            .arg("-init_seg_name")
            .arg(DASH_INIT_SEGMENT)
            .arg("-media_seg_name")
            .arg(DASH_MEDIA_SEGMENT)
            .arg("-dash_segment_type")
            .arg("mp4")
            .arg("-adaptation_sets")
            .quoted(adaptation_sets)
            .output(job.output_file())
    }

    /// HLS VOD output with numbered transport-stream segments
    pub fn hls(&self, job: &EncodingJob) -> MediaCommand {
        let var_stream_map = if job.has_audio() { "v:0,a:0" } else { "v:0" };
        let segment_pattern = job.output_dir().join(HLS_SEGMENT_PATTERN);

        self.encode_base(job, HLS_AUDIO_CODEC)
            .format("hls")
            .arg("-hls_time")
            .arg(SEGMENT_SECONDS)
            .arg("-hls_playlist_type")
            .arg("vod")
            .arg("-hls_segment_filename")
            .arg(segment_pattern.to_string_lossy())
            .arg("-master_pl_name")
            .arg(HLS_MASTER_PLAYLIST)
            .arg("-var_stream_map")
            .quoted(var_stream_map)
            .output(job.output_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/videos/clip.mp4"), "/videos/clip.mp4");
        assert_eq!(shell_quote("-c:v"), "-c:v");
        assert_eq!(shell_quote("segment_%03d.ts"), "segment_%03d.ts");
        assert_eq!(shell_quote("init-$RepresentationID$.m4s"), "'init-$RepresentationID$.m4s'");
        assert_eq!(shell_quote("/my videos/a.mp4"), "'/my videos/a.mp4'");
        assert_eq!(shell_quote("it's.mp4"), r"'it'\''s.mp4'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_codec_query_args() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let cmd = builder.codec_query("libx264");
        assert_eq!(cmd.binary_path, "ffmpeg");
        assert_eq!(cmd.to_shell_string(), "ffmpeg -h encoder=libx264");
    }

    #[test]
    fn test_audio_probe_args() {
        let builder = MediaCommandBuilder::new("ffmpeg", "/opt/bin/ffprobe");
        let cmd = builder.audio_probe("/videos/clip.mp4");
        assert_eq!(
            cmd.to_shell_string(),
            "/opt/bin/ffprobe -i /videos/clip.mp4 -show_streams -select_streams a -loglevel error"
        );
    }

    #[test]
    fn test_shell_wrapper_keeps_command_as_one_argument() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let cmd = builder.shell("bash", "ffmpeg -i a.mp4 out.mpd");
        let raw: Vec<&str> = cmd.args.iter().map(CommandArg::as_str).collect();
        assert_eq!(cmd.binary_path, "bash");
        assert_eq!(raw, vec!["-c", "ffmpeg -i a.mp4 out.mpd"]);
    }

    #[test]
    fn test_quoted_args_keep_raw_value_for_argv() {
        let cmd = MediaCommand::new("ffmpeg", "test").arg("-var_stream_map").quoted("v:0");
        assert_eq!(cmd.args[1].as_str(), "v:0");
        assert_eq!(cmd.to_shell_string(), "ffmpeg -var_stream_map \"v:0\"");
    }
}
