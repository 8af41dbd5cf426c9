pub mod api;
pub mod config;
pub mod episode;
pub mod error;
pub mod export;
pub mod http;
pub mod page;
pub mod player;
pub mod progress;
pub mod server;
pub mod strategy;

// Re-export main types for convenience
pub use api::{EpisodeQuery, RawEpisode, episodes_url, fetch_raw_episodes};
pub use config::{AppConfig, DEFAULT_API_URL};
pub use episode::{Episode, duration_to_time_string, format_published_at};
pub use error::{FetchError, PageError, RenderError, TransformError};
pub use export::{ExportResult, export_page};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use page::{
    HomePage, HomeProps, LATEST_EPISODES_COUNT, REVALIDATE_SECONDS, StaticProps, get_static_props,
    partition_episodes,
};
pub use player::{PlaybackDispatcher, PlayerQueue, PlayerState};
pub use progress::{
    GenerationEvent, NoopReporter, ProgressReporter, SharedProgressReporter, TracingReporter,
};
pub use server::{AppState, router, serve};
pub use strategy::{FetchStrategy, GeneratedPage, HomeResponse, PageGenerator};
