use anyhow::Result;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::string::strip_color_codes;

const LOG_FILE: &str = "mineros.log";

pub fn init_logger() -> Result<()> {
    let log_dir = get_log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // console and file output
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(true)
                .with_target(false),
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    tracing::info!("Logger initialized, writing to {:?}", log_dir.join(LOG_FILE));
    Ok(())
}

/// Logs go next to the executable so several bots can run side by side
fn get_log_dir() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe_path) => exe_path.parent().map(|p| p.to_path_buf()).unwrap_or_else(|| {
            eprintln!("Warning: Could not get parent directory of executable, using current directory");
            PathBuf::from(".")
        }),
        Err(e) => {
            eprintln!("Warning: Could not get executable path ({}), using current directory", e);
            PathBuf::from(".")
        }
    }
}

/// Log an in-game chat line with colour codes stripped
pub fn print_mc_chat(username: &str, message: &str) {
    tracing::info!("[MC Chat] <{}> {}", username, strip_color_codes(message));
}
