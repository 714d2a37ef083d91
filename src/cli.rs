use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by the single-file commands
#[derive(ClapArgs, Debug, Clone)]
pub struct JobArgs {
    /// Input video file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Video encoder name (defaults to the configured codec)
    #[arg(short = 'C', long)]
    pub codec: Option<String>,

    /// Output format: dash or hls (also accepts 0 or 1)
    #[arg(short, long)]
    pub stream_type: Option<String>,

    /// Output directory (defaults to a directory named after the input file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcode a video file into DASH or HLS segments
    Encode {
        #[command(flatten)]
        job: JobArgs,
    },

    /// Validate a video file and print the command that would be run
    Plan {
        #[command(flatten)]
        job: JobArgs,

        /// Print the job as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transcode every supported video file in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short = 'd', long)]
        input_dir: PathBuf,

        /// Video encoder name (defaults to the configured codec)
        #[arg(short = 'C', long)]
        codec: Option<String>,

        /// Output format: dash or hls (also accepts 0 or 1)
        #[arg(short, long)]
        stream_type: Option<String>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "vstream.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_encode() {
        let args = Args::try_parse_from([
            "vstream", "-v", "encode", "-i", "/videos/clip.mp4", "-C", "libx265", "-s", "hls",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Commands::Encode { job } => {
                assert_eq!(job.input, PathBuf::from("/videos/clip.mp4"));
                assert_eq!(job.codec.as_deref(), Some("libx265"));
                assert_eq!(job.stream_type.as_deref(), Some("hls"));
                assert!(job.output_dir.is_none());
            }
            _ => panic!("expected encode"),
        }
    }

    #[test]
    fn test_parse_batch_and_init_config() {
        let args = Args::try_parse_from(["vstream", "batch", "-d", "/videos"]).unwrap();
        assert!(matches!(args.command, Commands::Batch { ref input_dir, .. } if input_dir == &PathBuf::from("/videos")));

        let args = Args::try_parse_from(["vstream", "init-config"]).unwrap();
        match args.command {
            Commands::InitConfig { path, force } => {
                assert_eq!(path, PathBuf::from("vstream.toml"));
                assert!(!force);
            }
            _ => panic!("expected init-config"),
        }
    }
}
