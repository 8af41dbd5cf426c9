// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Serialize;
use url::Url;

use crate::api::{EpisodeQuery, episodes_url, fetch_raw_episodes};
use crate::episode::Episode;
use crate::error::PageError;
use crate::http::HttpClient;
use crate::progress::{GenerationEvent, SharedProgressReporter};

/// Number of episodes requested from the API
pub const EPISODES_PAGE_SIZE: usize = 12;

/// Number of episodes shown in the highlight list
pub const LATEST_EPISODES_COUNT: usize = 2;

/// How long a generated page may be served before regenerating (8 hours)
pub const REVALIDATE_SECONDS: u64 = 60 * 60 * 8;

/// Input of the home page: the feed split by recency
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeProps {
    pub latest_episodes: Vec<Episode>,
    pub all_episodes: Vec<Episode>,
}

impl HomeProps {
    /// Latest episodes followed by all other episodes, in feed order
    pub fn episode_list(&self) -> Vec<Episode> {
        self.latest_episodes
            .iter()
            .chain(&self.all_episodes)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.latest_episodes.len() + self.all_episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Props plus the interval after which they should be regenerated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticProps {
    pub props: HomeProps,
    pub revalidate: u64,
}

/// Split an ordered episode list into its first `latest_count` and the rest
pub fn partition_episodes(mut episodes: Vec<Episode>, latest_count: usize) -> HomeProps {
    let split = latest_count.min(episodes.len());
    let all_episodes = episodes.split_off(split);

    HomeProps {
        latest_episodes: episodes,
        all_episodes,
    }
}

/// Fetch, normalize and partition the episodes for the home page
///
/// One request, no retry. Any record that fails to normalize aborts the
/// whole generation.
pub async fn get_static_props<C: HttpClient + ?Sized>(
    client: &C,
    base: &Url,
    reporter: &SharedProgressReporter,
) -> Result<StaticProps, PageError> {
    let query = EpisodeQuery::default();

    reporter.report(GenerationEvent::FetchingEpisodes {
        url: episodes_url(base, &query)?.to_string(),
    });

    let raw_episodes = fetch_raw_episodes(client, base, &query).await?;

    let episodes = raw_episodes
        .into_iter()
        .map(Episode::from_raw)
        .collect::<Result<Vec<_>, _>>()?;

    let props = partition_episodes(episodes, LATEST_EPISODES_COUNT);

    reporter.report(GenerationEvent::EpisodesFetched {
        total_episodes: props.len(),
        latest_episodes: props.latest_episodes.len(),
    });

    Ok(StaticProps {
        props,
        revalidate: REVALIDATE_SECONDS,
    })
}
