use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        writer::MakeWriterExt,
        FmtContext, FormatEvent, FormatFields,
    },
    registry::LookupSpan,
};

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }
}

/// Plain messages for INFO, bracketed level tags for everything else.
pub struct CliFormatter;

impl<S, N> FormatEvent<S, N> for CliFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        match *event.metadata().level() {
            Level::TRACE => write!(writer, "[TRACE] "),
            Level::DEBUG => write!(writer, "[DEBUG] "),
            Level::INFO => Ok(()),
            Level::WARN => write!(writer, "[WARN] "),
            Level::ERROR => write!(writer, "[ERROR] "),
        }?;

        match visitor.message {
            Some(message) => writeln!(writer, "{message}"),
            None => writeln!(writer),
        }
    }
}

/// Level selected by `-q` and the `-v` count.
pub fn filter_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose >= 2 {
        Level::TRACE
    } else if verbose == 1 {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install the global subscriber. Warnings and errors go to stderr.
pub fn setup_logging(verbose: u8, quiet: bool) {
    let level = filter_level(verbose, quiet);
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(format!("audio_streamer={level}"))
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .without_time()
        .event_format(CliFormatter)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("logging already initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_level() {
        assert_eq!(filter_level(0, false), Level::INFO);
        assert_eq!(filter_level(1, false), Level::DEBUG);
        assert_eq!(filter_level(5, false), Level::TRACE);
        assert_eq!(filter_level(3, true), Level::ERROR);
    }
}
