//! Reloadable tracing filter keyed off a `--debug EVENT` flag, so the debug
//! stream (fd 9, or stderr) can be toggled without re-exec.
//!
//! Grounded on `brush-shell/src/events.rs`'s `TraceEventConfig`: a
//! `tracing_subscriber::reload::Layer` wrapping a `Targets` filter, rebuilt
//! whenever the enabled/disabled event sets change. The event→target
//! mapping here points at [`argcomplete_core::trace_categories`] instead of
//! a shell-interpreter's own stages.

use std::collections::HashSet;
use std::fmt::Display;

use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{Layer as _, Registry};

/// One pipeline stage that can be traced independently.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, clap::ValueEnum)]
pub enum TraceEvent {
    /// Traces the line lexer.
    #[clap(name = "lexer")]
    Lexer,
    /// Traces grammar reflection.
    #[clap(name = "grammar")]
    Grammar,
    /// Traces the parse simulator.
    #[clap(name = "simulate")]
    Simulate,
    /// Traces candidate assembly.
    #[clap(name = "completion")]
    Completion,
    /// Traces shell quoting/escaping.
    #[clap(name = "quote")]
    Quote,
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.target())
    }
}

impl TraceEvent {
    fn target(self) -> &'static str {
        match self {
            Self::Lexer => argcomplete_core::trace_categories::LEXER,
            Self::Grammar => argcomplete_core::trace_categories::GRAMMAR,
            Self::Simulate => argcomplete_core::trace_categories::SIMULATE,
            Self::Completion => argcomplete_core::trace_categories::COMPLETION,
            Self::Quote => argcomplete_core::trace_categories::QUOTE,
        }
    }
}

/// Holds the reload handle for the active tracing filter, so `--debug`
/// events can be toggled after startup without tearing down the
/// subscriber.
pub struct TraceEventConfig {
    enabled: HashSet<TraceEvent>,
    handle: Option<Handle<Targets, Registry>>,
}

impl TraceEventConfig {
    /// Initializes the global tracing subscriber, writing to `writer`
    /// (typically the debug fd, or stderr when it's unavailable), with the
    /// given events enabled at `DEBUG` level and everything else at `INFO`.
    #[must_use]
    pub fn init<W>(enabled: &[TraceEvent], writer: W) -> Self
    where
        W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
    {
        let enabled: HashSet<TraceEvent> = enabled.iter().copied().collect();
        let mut config = Self {
            enabled,
            handle: None,
        };

        let filter = config.compose_filter();
        let (reload_filter, handle) = tracing_subscriber::reload::Layer::new(filter);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .without_time()
            .with_target(false)
            .with_filter(reload_filter);

        if tracing_subscriber::registry().with(layer).try_init().is_ok() {
            config.handle = Some(handle);
        } else {
            eprintln!("warning: failed to initialize tracing.");
        }

        config
    }

    fn compose_filter(&self) -> Targets {
        let mut filter = Targets::new().with_default(tracing::level_filters::LevelFilter::INFO);
        for event in &self.enabled {
            filter = filter.with_target(event.target(), tracing::Level::DEBUG);
        }
        filter
    }

    /// Enables `event`, reloading the live filter if it changed anything.
    pub fn enable(&mut self, event: TraceEvent) {
        if self.enabled.insert(event) {
            self.reload();
        }
    }

    fn reload(&self) {
        if let Some(handle) = &self.handle {
            let _ = handle.reload(self.compose_filter());
        }
    }
}
