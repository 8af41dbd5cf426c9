// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use tracing::debug;
use url::Url;

use crate::error::FetchError;
use crate::http::HttpClient;

use super::raw::RawEpisode;

const EPISODES_PATH: &str = "episodes";

/// Sort direction understood by the episodes endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters sent with the episodes request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeQuery {
    /// Maximum number of records (`_limit`)
    pub limit: usize,
    /// Field to sort by (`_sort`)
    pub sort: String,
    /// Sort direction (`_order`)
    pub order: SortOrder,
}

impl Default for EpisodeQuery {
    fn default() -> Self {
        Self {
            limit: crate::page::EPISODES_PAGE_SIZE,
            sort: "published_at".to_string(),
            order: SortOrder::Desc,
        }
    }
}

/// Build the full episodes URL for an API base
///
/// A base without a trailing slash is treated as a directory, so
/// `http://host/api` becomes `http://host/api/episodes`.
pub fn episodes_url(base: &Url, query: &EpisodeQuery) -> Result<Url, FetchError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let mut url = base.join(EPISODES_PATH)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("_limit", &query.limit.to_string())
        .append_pair("_sort", &query.sort)
        .append_pair("_order", query.order.as_str());

    Ok(url)
}

/// Fetch the raw episode list with a single GET request
///
/// Transport failures, non-2xx statuses and malformed bodies are all fatal.
pub async fn fetch_raw_episodes<C: HttpClient + ?Sized>(
    client: &C,
    base: &Url,
    query: &EpisodeQuery,
) -> Result<Vec<RawEpisode>, FetchError> {
    let url = episodes_url(base, query)?;
    debug!(%url, "requesting episodes");

    let response = client
        .get(&url)
        .await
        .map_err(|e| FetchError::RequestFailed {
            url: url.to_string(),
            source: e,
        })?;

    if !response.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    serde_json::from_slice(&response.body).map_err(|e| FetchError::InvalidBody {
        url: url.to_string(),
        source: e,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::http::HttpResponse;

    /// Canned-response client that remembers every requested URL
    pub(crate) struct MockHttpClient {
        pub status: u16,
        pub body: String,
        pub requests: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        pub(crate) fn new(status: u16, body: impl Into<String>) -> Self {
            Self {
                status,
                body: body.into(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, url: &Url) -> Result<HttpResponse, reqwest::Error> {
            self.requests.lock().unwrap().push(url.to_string());
            Ok(HttpResponse {
                status: self.status,
                body: Bytes::from(self.body.clone()),
            })
        }
    }

    pub(crate) fn raw_episodes_json(count: usize) -> String {
        let records: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    r#"{{"id":"ep-{i}","title":"Episode {i}","members":"Diego e Richard","published_at":"2021-01-{day:02}T19:16:37Z","thumbnail":"https://example.com/{i}.jpg","file":{{"url":"https://example.com/{i}.m4a","duration":{duration}}}}}"#,
                    day = 28 - i,
                    duration = 3600 + i,
                )
            })
            .collect();
        format!("[{}]", records.join(","))
    }

    #[test]
    fn episodes_url_carries_fixed_query() {
        let base = Url::parse("http://localhost:3333/").unwrap();
        let url = episodes_url(&base, &EpisodeQuery::default()).unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:3333/episodes?_limit=12&_sort=published_at&_order=desc"
        );
    }

    #[test]
    fn episodes_url_appends_to_base_path() {
        let base = Url::parse("https://api.example.com/v1").unwrap();
        let url = episodes_url(&base, &EpisodeQuery::default()).unwrap();

        assert_eq!(url.path(), "/v1/episodes");
    }

    #[test]
    fn episodes_url_replaces_existing_query() {
        let base = Url::parse("https://api.example.com/?token=x").unwrap();
        let query = EpisodeQuery {
            limit: 3,
            order: SortOrder::Asc,
            ..Default::default()
        };
        let url = episodes_url(&base, &query).unwrap();

        assert_eq!(url.query(), Some("_limit=3&_sort=published_at&_order=asc"));
    }

    #[tokio::test]
    async fn fetch_issues_one_request_and_decodes() {
        let client = MockHttpClient::new(200, raw_episodes_json(3));
        let base = Url::parse("http://localhost:3333/").unwrap();

        let episodes = fetch_raw_episodes(&client, &base, &EpisodeQuery::default())
            .await
            .unwrap();

        assert_eq!(episodes.len(), 3);
        assert_eq!(episodes[0].id, "ep-0");
        assert_eq!(client.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_fails_on_non_2xx() {
        let client = MockHttpClient::new(503, "unavailable");
        let base = Url::parse("http://localhost:3333/").unwrap();

        let result = fetch_raw_episodes(&client, &base, &EpisodeQuery::default()).await;

        assert!(matches!(result, Err(FetchError::HttpStatus { status: 503, .. })));
    }

    #[tokio::test]
    async fn fetch_fails_on_non_array_body() {
        let client = MockHttpClient::new(200, r#"{"episodes": []}"#);
        let base = Url::parse("http://localhost:3333/").unwrap();

        let result = fetch_raw_episodes(&client, &base, &EpisodeQuery::default()).await;

        assert!(matches!(result, Err(FetchError::InvalidBody { .. })));
    }
}
