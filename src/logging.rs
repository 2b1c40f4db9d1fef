/// Logging setup: plain-text and JSON log files plus terminal output.
///
/// Both files live in the log directory and are appended to across runs:
/// - `scraper.log` - human-readable text, no ANSI colors
/// - `scraper.json.log` - one JSON object per event, for later analysis
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const TEXT_LOG_FILE: &str = "scraper.log";
pub const JSON_LOG_FILE: &str = "scraper.json.log";

/// Keeps the background log writers alive; drop it only at process exit.
#[must_use = "dropping the guards stops file logging"]
pub struct LogGuards {
    _text: WorkerGuard,
    _json: WorkerGuard,
}

/// Initialize the tracing subscriber.
///
/// # Environment Variables
/// * `RUST_LOG` - Controls log level filtering (default: "info")
///   Examples:
///   - `RUST_LOG=debug` - Show all debug and above
///   - `RUST_LOG=movie_scraper=debug,reqwest=warn` - Debug for the scraper, warn for reqwest
pub fn init_logging<P: AsRef<Path>>(log_dir: P) -> Result<LogGuards, Box<dyn std::error::Error>> {
    let log_path = log_dir.as_ref();
    std::fs::create_dir_all(log_path)?;

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let text_file_appender = tracing_appender::rolling::never(log_path, TEXT_LOG_FILE);
    let (text_writer, text_guard) = tracing_appender::non_blocking(text_file_appender);

    let json_file_appender = tracing_appender::rolling::never(log_path, JSON_LOG_FILE);
    let (json_writer, json_guard) = tracing_appender::non_blocking(json_file_appender);

    let text_layer = fmt::layer()
        .with_writer(text_writer)
        .with_target(true)
        .with_line_number(true)
        .with_ansi(false)
        .compact()
        .with_filter(env_filter.clone());

    let json_layer = fmt::layer()
        .json()
        .with_writer(json_writer)
        .with_target(true)
        .with_line_number(true)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(env_filter.clone());

    // Terminal output stays terse
    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_line_number(false)
        .compact()
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(text_layer)
        .with(json_layer)
        .with(stdout_layer)
        .try_init()?;

    tracing::info!("Logging initialized - logs will be written to {}", log_path.display());

    Ok(LogGuards {
        _text: text_guard,
        _json: json_guard,
    })
}
