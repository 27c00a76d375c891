use colored::*;
use domov_common::config::Config;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

use crate::terminal::spinner::SpinnerWriter;

const PROGRESS_TARGET: &str = "domov::progress";

pub struct DomovFormatter;

impl<S, N> FormatEvent<S, N> for DomovFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) = match *meta.level() {
            Level::TRACE => ("[ ]", |s| s.dimmed()),
            Level::DEBUG => ("[?]", |s| s.blue()),
            Level::INFO if meta.target() == PROGRESS_TARGET => ("[>]", |s| s.cyan().bold()),
            Level::INFO => ("[+]", |s| s.green().bold()),
            Level::WARN => ("[*]", |s| s.yellow().bold()),
            Level::ERROR => ("[-]", |s| s.red().bold()),
        };

        write!(writer, "{} ", color_func(symbol.into()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Filter used when `RUST_LOG` is unset. Progress messages stay visible by
/// default; library chatter needs `-v`.
fn default_directives(cfg: &Config) -> &'static str {
    if cfg.quiet > 0 {
        return "error";
    }
    match cfg.verbose {
        0 => "warn,domov::progress=info",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(cfg)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(DomovFormatter)
        .with_writer(|| SpinnerWriter)
        .init();
}
