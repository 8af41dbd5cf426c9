mod fetch;
mod raw;

pub use fetch::{EpisodeQuery, SortOrder, episodes_url, fetch_raw_episodes};
pub use raw::{RawDuration, RawEpisode, RawEpisodeFile};

#[cfg(test)]
pub(crate) use fetch::tests;
