use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::format::{Format, Writer},
};

/// "DD Month - HH:MM:SS.micros" in local time.
struct CustomTimer;

impl tracing_subscriber::fmt::time::FormatTime for CustomTimer {
    fn format_time(&self, writer: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(writer, "{} - {}", now.format("%d %B"), now.format("%H:%M:%S%.6f"))
    }
}

/// Installs the global subscriber. `RUST_LOG` directives are honoured on top
/// of `log_level`; a second call is ignored.
pub fn setup_logger(log_level: LevelFilter) {
    let filter = EnvFilter::from_default_env().add_directive(log_level.into());

    let format = Format::default().with_timer(CustomTimer).with_level(true).with_target(false);

    let subscriber =
        tracing_subscriber::fmt().with_env_filter(filter).event_format(format).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // already installed
    }
}

pub fn setup_info_logger() {
    setup_logger(LevelFilter::INFO);
}
