// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use clap::ValueEnum;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use url::Url;

use crate::error::PageError;
use crate::http::HttpClient;
use crate::page::{HomePage, StaticProps, get_static_props, render_client_shell};
use crate::progress::{GenerationEvent, SharedProgressReporter};

/// Path the client-side strategy loads props from
pub const PROPS_PATH: &str = "/api/props";

/// When the episode data is loaded for the home page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FetchStrategy {
    /// Serve an empty shell; the browser fetches props itself
    OnDemandClient,
    /// Fetch and render on every request
    PerRequestServer,
    /// Serve a cached page, regenerating it once the revalidation interval passed
    #[default]
    ScheduledRegeneration,
}

/// A rendered home page and when it was produced
#[derive(Debug, Clone)]
pub struct GeneratedPage {
    pub page: HomePage,
    pub html: String,
    /// Quoted hex SHA-256 of `html`
    pub etag: String,
    pub revalidate: u64,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedPage {
    /// Render static props into a page stamped with `generated_at`
    pub fn from_static_props(
        static_props: StaticProps,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, PageError> {
        let page = HomePage::new(static_props.props);
        let html = page.render()?;
        let etag = etag_for(&html);

        Ok(Self {
            page,
            html,
            etag,
            revalidate: static_props.revalidate,
            generated_at,
        })
    }

    /// Whether the page may still be served at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let max_age = i64::try_from(self.revalidate)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(self.generated_at) < max_age
    }
}

/// Strong ETag for a response body
pub fn etag_for(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    format!("\"{digest:x}\"")
}

/// What the home route should send back
#[derive(Debug, Clone)]
pub enum HomeResponse {
    Page(Arc<GeneratedPage>),
    ClientShell(String),
}

/// Produces home pages according to the selected [`FetchStrategy`]
pub struct PageGenerator {
    client: Arc<dyn HttpClient>,
    api_url: Url,
    strategy: FetchStrategy,
    reporter: SharedProgressReporter,
    cache: Mutex<Option<Arc<GeneratedPage>>>,
}

impl PageGenerator {
    pub fn new(
        client: Arc<dyn HttpClient>,
        api_url: Url,
        strategy: FetchStrategy,
        reporter: SharedProgressReporter,
    ) -> Self {
        Self {
            client,
            api_url,
            strategy,
            reporter,
            cache: Mutex::new(None),
        }
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    /// Fetch fresh props, bypassing any cache
    pub async fn static_props(&self) -> Result<StaticProps, PageError> {
        get_static_props(self.client.as_ref(), &self.api_url, &self.reporter).await
    }

    /// Fetch and render a page right now
    pub async fn generate(&self, now: DateTime<Utc>) -> Result<GeneratedPage, PageError> {
        let static_props = self.static_props().await?;
        let generated = GeneratedPage::from_static_props(static_props, now)?;

        self.reporter.report(GenerationEvent::PageRendered {
            bytes: generated.html.len(),
        });

        Ok(generated)
    }

    /// The last page this generator rendered, if any
    pub async fn cached(&self) -> Option<Arc<GeneratedPage>> {
        self.cache.lock().await.clone()
    }

    /// Response for the home route at time `now`
    pub async fn home(&self, now: DateTime<Utc>) -> Result<HomeResponse, PageError> {
        match self.strategy {
            FetchStrategy::OnDemandClient => Ok(HomeResponse::ClientShell(render_client_shell(
                PROPS_PATH,
            ))),
            FetchStrategy::PerRequestServer => {
                let page = Arc::new(self.generate(now).await?);
                *self.cache.lock().await = Some(page.clone());
                Ok(HomeResponse::Page(page))
            }
            FetchStrategy::ScheduledRegeneration => {
                self.regenerate_if_stale(now).await.map(HomeResponse::Page)
            }
        }
    }

    /// Serve the cached page while fresh, otherwise regenerate it
    ///
    /// The cache lock is held across the regeneration so concurrent
    /// requests wait for one fetch instead of starting their own. A failed
    /// regeneration keeps the previous page.
    async fn regenerate_if_stale(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Arc<GeneratedPage>, PageError> {
        let mut cache = self.cache.lock().await;

        if let Some(page) = cache.as_ref()
            && page.is_fresh(now)
        {
            return Ok(page.clone());
        }

        match self.generate(now).await {
            Ok(page) => {
                let page = Arc::new(page);
                *cache = Some(page.clone());
                Ok(page)
            }
            Err(e) => match cache.as_ref() {
                Some(stale) => {
                    self.reporter.report(GenerationEvent::RegenerationFailed {
                        error: e.to_string(),
                    });
                    Ok(stale.clone())
                }
                None => Err(e),
            },
        }
    }
}
