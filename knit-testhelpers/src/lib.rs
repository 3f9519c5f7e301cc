#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub use knit_testhelpers_macros::test;

use std::sync::LazyLock;
use std::time::Instant;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter for test runs.
pub const LOG_ENV: &str = "KNIT_LOG";

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Prints seconds since the first test in the process started.
struct Elapsed;

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = START_TIME.elapsed();
        write!(w, "{:3}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

// Frames from the test harness and panic machinery that only add noise.
const NOISY_FRAME_PREFIXES: &[&str] = &[
    "test::run_test",
    "test::__rust_begin_short_backtrace",
    "std::panicking::",
    "std::panic::",
    "core::panicking::",
    "std::sys::",
    "std::thread::Builder::spawn_unchecked_",
    "core::ops::function::FnOnce::call_once",
    "<alloc::boxed::Box<F,A> as core::ops::function::FnOnce<Args>>::call_once",
    "__pthread",
];

fn install_backtrace_printer() {
    color_backtrace::BacktracePrinter::new()
        .verbosity(color_backtrace::Verbosity::Full)
        .add_frame_filter(Box::new(|frames| {
            frames.retain(|frame| match &frame.name {
                Some(name) => !NOISY_FRAME_PREFIXES.iter().any(|p| name.starts_with(p)),
                None => true,
            })
        }))
        .install(Box::new(termcolor::StandardStream::stderr(
            termcolor::ColorChoice::Auto,
        )));
}

fn log_filter() -> Targets {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(tracing::Level::TRACE))
}

static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    let _ = *START_TIME;
    install_backtrace_printer();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_timer(Elapsed)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .compact(),
        )
        .with(log_filter())
        .try_init()
        .ok();
});

/// Installs the process-wide tracing subscriber and panic printer.
///
/// Safe to call from every test; only the first call does any work.
pub fn setup() {
    #[allow(clippy::let_unit_value)]
    let _ = *SUBSCRIBER_INIT;
}

/// Installs the subscriber, then enters a span named after the running test.
///
/// Used by the [`test`] attribute so that every event a test emits carries
/// the test's name.
pub fn enter_test(name: &'static str) -> tracing::span::EnteredSpan {
    setup();
    tracing::info_span!("test", test.name = name).entered()
}

/// An error type that panics as soon as it is built, so tests can use `?`
/// on any error and still fail with the caller's location.
#[derive(Debug)]
pub struct IPanic;

impl<E> From<E> for IPanic
where
    E: core::error::Error + Send + Sync,
{
    #[track_caller]
    fn from(value: E) -> Self {
        panic!("{}: {value}", core::panic::Location::caller())
    }
}
