use std::sync::Arc;

use tracing::{info, warn};

/// Events emitted while generating the home page
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    /// The episodes endpoint is being requested
    FetchingEpisodes { url: String },

    /// Raw records arrived and were normalized
    EpisodesFetched {
        total_episodes: usize,
        latest_episodes: usize,
    },

    /// The HTML document was rendered
    PageRendered { bytes: usize },

    /// A cached page was kept because regeneration failed
    RegenerationFailed { error: String },
}

/// Trait for reporting progress events during page generation.
///
/// Implementations can use this to display a spinner, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: GenerationEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: GenerationEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}

/// Forwards every event to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: GenerationEvent) {
        match event {
            GenerationEvent::FetchingEpisodes { url } => info!(%url, "fetching episodes"),
            GenerationEvent::EpisodesFetched {
                total_episodes,
                latest_episodes,
            } => info!(total_episodes, latest_episodes, "episodes fetched"),
            GenerationEvent::PageRendered { bytes } => info!(bytes, "page rendered"),
            GenerationEvent::RegenerationFailed { error } => {
                warn!(%error, "regeneration failed, serving previous page")
            }
        }
    }
}

impl TracingReporter {
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
