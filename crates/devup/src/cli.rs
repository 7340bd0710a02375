use clap::{Parser, ValueEnum};

/// Log format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON structured format
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

/// Development environment launcher.
///
/// Control keywords and compose arguments arrive as one mixed stream; the
/// launcher's own keyword scanner (not clap) splits them, so the whole
/// stream is captured as a single trailing variadic argument here.
#[derive(Debug, Parser)]
#[command(
    name = "devup",
    version,
    about = "Starts the development environment and attaches a terminal per service",
    after_help = "Run `devup help` for the control keyword reference."
)]
pub struct Cli {
    /// Log output format (overrides DEVUP_LOG_FORMAT)
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Control keywords followed by docker compose arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub tokens: Vec<String>,
}
