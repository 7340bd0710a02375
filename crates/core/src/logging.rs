//! Logging and observability
//!
//! Structured logging via tracing-subscriber, controlled at runtime through
//! environment variables. All output goes to stderr so stdout stays free for
//! manual-instruction fallbacks and usage text.

use anyhow::Result;
use std::{io, sync::Once};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the logging system with optional format specification.
///
/// Sets up tracing-subscriber with either JSON or text formatting. Safe to
/// call multiple times; subsequent calls are no-ops.
///
/// ## Environment Variables
///
/// * `DEVUP_LOG_FORMAT` - "json" for JSON output, anything else for text
/// * `DEVUP_LOG` - logging filter specification
/// * `RUST_LOG` - standard fallback filter
pub fn init(format: Option<&str>) -> Result<()> {
    INIT.call_once(|| {
        let filter = create_env_filter();

        let env_format = std::env::var("DEVUP_LOG_FORMAT").ok();
        let effective_format = format.or(env_format.as_deref()).unwrap_or("text");

        match effective_format {
            "json" => {
                tracing_subscriber::registry()
                    .with(fmt::layer().json().with_target(true).with_writer(io::stderr))
                    .with(filter)
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(fmt::layer().with_target(true).with_writer(io::stderr))
                    .with(filter)
                    .init();
            }
        }

        tracing::debug!("Logging initialized with format: {}", effective_format);
    });

    Ok(())
}

/// Create an EnvFilter based on environment variables
fn create_env_filter() -> EnvFilter {
    if let Ok(devup_log) = std::env::var("DEVUP_LOG") {
        EnvFilter::try_new(&devup_log).unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid DEVUP_LOG specification '{}', using default 'info'",
                devup_log
            );
            EnvFilter::new("info")
        })
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Check if logging has been initialized
pub fn is_initialized() -> bool {
    INIT.is_completed()
}
