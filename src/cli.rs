use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "termcbt", version, about = "Terminal client for computer-based tests")]
pub struct Cli {
    /// Attempt id to resume
    pub attempt_id: Option<String>,

    /// Start a new attempt for this exam paper, then take it
    #[arg(long, value_name = "paper-id", conflicts_with = "attempt_id")]
    pub paper: Option<String>,

    /// Show attempt status without entering TUI
    #[arg(long)]
    pub status: bool,

    /// Server base URL (overrides config and TERMCBT_API_BASE_URL)
    #[arg(long, value_name = "url")]
    pub server: Option<String>,

    /// Bearer token (overrides config and TERMCBT_TOKEN)
    #[arg(long, value_name = "token")]
    pub token: Option<String>,

    /// Config file [default: ~/.config/termcbt/config.yaml]
    #[arg(long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log level for the file log (error, warn, info, debug, trace)
    #[arg(long, value_name = "level", default_value = "info")]
    pub log_level: String,
}
