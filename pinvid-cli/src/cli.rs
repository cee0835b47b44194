use std::path::PathBuf;

use clap::Parser;

/// Download a Pinterest video and print the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "pinvid", author, version, about, long_about = None)]
pub struct Args {
    /// Pin URL (`https://www.pinterest.com/pin/...` or a `https://pin.it/...` short link)
    #[arg(value_name = "URL")]
    pub url: String,

    /// Directory the video is written into (created if missing)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "PINVID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the ffmpeg binary used for muxing
    #[arg(long, value_name = "PATH")]
    pub ffmpeg_path: Option<String>,

    /// Text burned into muxed videos
    #[arg(long, value_name = "TEXT")]
    pub watermark: Option<String>,

    /// User agent sent with every request
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}
