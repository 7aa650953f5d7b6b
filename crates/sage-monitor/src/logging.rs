//! Logging setup.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Setup logging with the given level.
///
/// When `log_dir` is set, output additionally goes to a daily-rolling
/// file in that directory. The returned guard must be held for the
/// process lifetime or buffered file output is lost.
pub fn setup_logging(level: &str, json: bool, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "coinsage.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);

            if json {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .with(fmt::layer().json().with_ansi(false).with_writer(writer))
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .with(fmt::layer().with_ansi(false).with_writer(writer))
                    .init();
            }
            Some(guard)
        }
        None => {
            if json {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
            None
        }
    }
}
