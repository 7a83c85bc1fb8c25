use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Stdout logging with local timestamps. The returned guard flushes pending lines
/// on drop, so hold it for the life of `main`.
pub fn init_default_logger() -> WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_timer(LocalTime)
        .with_target(false)
        .with_max_level(tracing::Level::INFO)
        .init();

    guard
}
