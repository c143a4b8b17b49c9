use std::{fmt::Write as _, io};

use nu_ansi_term::Color::{self, Blue, Magenta, Red, Yellow};
use tracing::{
    field::{Field, Visit},
    Event, Level, Metadata, Subscriber,
};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        writer::MakeWriterExt,
        FmtContext, FormatEvent, FormatFields,
    },
    registry::LookupSpan,
};

use crate::{cli::Args, utils::Colored};

/// Collects an event's message followed by its other fields as `key=value`.
#[derive(Default)]
struct EventLine(String);

impl EventLine {
    fn push(&mut self, field: &Field, value: std::fmt::Arguments<'_>) {
        if field.name() == "message" {
            let fields = std::mem::take(&mut self.0);
            let _ = write!(self.0, "{value}");
            self.0.push_str(&fields);
        } else {
            let _ = write!(self.0, " {}={}", field.name(), value);
        }
    }
}

impl Visit for EventLine {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, format_args!("{value}"));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, format_args!("{value:?}"));
    }
}

/// Tag printed in front of events of `level`; INFO events are printed bare.
fn level_tag(level: &Level) -> Option<(Color, &'static str)> {
    match *level {
        Level::TRACE => Some((Magenta, "[TRACE]")),
        Level::DEBUG => Some((Blue, "[DEBUG]")),
        Level::INFO => None,
        Level::WARN => Some((Yellow, "[WARN]")),
        Level::ERROR => Some((Red, "[ERROR]")),
    }
}

pub struct TaggedFormat;

impl<S, N> FormatEvent<S, N> for TaggedFormat
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
        if let Some((color, tag)) = level_tag(event.metadata().level()) {
            write!(writer, "{} ", Colored(color, tag))?;
        }

        let mut line = EventLine::default();
        event.record(&mut line);
        writeln!(writer, "{}", line.0)
    }
}

/// INFO goes to stdout so command output can be piped; diagnostics go to stderr.
fn is_output(meta: &Metadata<'_>) -> bool {
    *meta.level() == Level::INFO
}

fn filter_level(args: &Args) -> Level {
    if args.quiet {
        Level::ERROR
    } else if args.verbose >= 2 {
        Level::TRACE
    } else if args.verbose == 1 {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

pub fn setup_logging(args: &Args) {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(format!("rpool={}", filter_level(args)))
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(io::stdout.with_filter(is_output).or_else(io::stderr))
        .compact()
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(TaggedFormat).finish())
    };

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use clap::Parser;
    use tracing_subscriber::{
        layer::{Context, SubscriberExt},
        Layer,
    };

    use super::*;

    fn level_for(argv: &[&str]) -> Level {
        filter_level(&Args::parse_from(argv))
    }

    #[test]
    fn test_filter_level() {
        assert_eq!(level_for(&["rpool", "list"]), Level::INFO);
        assert_eq!(level_for(&["rpool", "-v", "list"]), Level::DEBUG);
        assert_eq!(level_for(&["rpool", "list", "-vv"]), Level::TRACE);
        assert_eq!(level_for(&["rpool", "-q", "-vv", "list"]), Level::ERROR);
    }

    #[test]
    fn test_level_tag() {
        assert_eq!(level_tag(&Level::INFO), None);
        assert_eq!(level_tag(&Level::WARN), Some((Yellow, "[WARN]")));
        assert_eq!(level_tag(&Level::ERROR), Some((Red, "[ERROR]")));
        assert_eq!(level_tag(&Level::TRACE).map(|(_, tag)| tag), Some("[TRACE]"));
    }

    #[test]
    fn test_event_line_puts_message_first() {
        struct LineLayer(Arc<Mutex<Vec<String>>>);

        impl<S: Subscriber> Layer<S> for LineLayer {
            fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
                let mut line = EventLine::default();
                event.record(&mut line);
                self.0.lock().unwrap().push(line.0);
            }
        }

        let lines = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(LineLayer(lines.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(count = 3, name = "curl", "registered");
        });

        assert_eq!(*lines.lock().unwrap(), vec!["registered count=3 name=curl"]);
    }
}
