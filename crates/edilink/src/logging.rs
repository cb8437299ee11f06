use clap::ValueEnum;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> tracing::level_filters::LevelFilter {
        match self {
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
        }
    }
}

/// Install the process-wide subscriber.
///
/// Everything goes to stderr unless `split_streams` is set, in which case
/// warnings and errors stay on stderr and lower levels go to stdout.
pub fn init_logging(format: LogFormat, level: LogLevel, split_streams: bool) {
    if split_streams {
        let writer = std::io::stderr
            .with_max_level(tracing::Level::WARN)
            .or_else(std::io::stdout);
        install(format, level, writer);
    } else {
        install(format, level, std::io::stderr);
    }
}

fn install<W>(format: LogFormat, level: LogLevel, writer: W)
where
    W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
