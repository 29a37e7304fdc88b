use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(
    name = "sweep-relay",
    about = "Rebuild full-band sweeps from rtl_power output and publish them over MQTT"
)]
pub struct Cli {
    // ── Configuration ──────────────────────────────────────────────
    /// JSON configuration file (takes precedence over SPECTRUM_CFG)
    #[arg(long, help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Inline JSON configuration
    #[arg(long, env = "SPECTRUM_CFG", hide_env_values = true, help_heading = "Configuration")]
    pub spectrum_cfg: Option<String>,

    // ── Logging ────────────────────────────────────────────────────
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", help_heading = "Logging")]
    pub log_level: String,

    /// Directory for log files
    #[arg(long, default_value = "./logs", help_heading = "Logging")]
    pub log_dir: String,

    /// Enable file logging (console logging always enabled)
    #[arg(long, action, help_heading = "Logging")]
    pub log_to_file: bool,
}
