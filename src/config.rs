// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use url::Url;

use crate::http::ReqwestClient;
use crate::strategy::FetchStrategy;

/// API base used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3333/";

/// Runtime settings shared by the CLI commands and the server
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the REST API serving `episodes`
    pub api_url: Url,
    /// Per-request timeout; `None` leaves it to the transport
    pub timeout: Option<Duration>,
    pub strategy: FetchStrategy,
}

impl AppConfig {
    /// Settings pointing at [`DEFAULT_API_URL`]
    pub fn local() -> Result<Self, url::ParseError> {
        Url::parse(DEFAULT_API_URL).map(Self::new)
    }

    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            timeout: None,
            strategy: FetchStrategy::default(),
        }
    }

    /// HTTP client honoring the configured timeout
    pub fn http_client(&self) -> Result<ReqwestClient, reqwest::Error> {
        match self.timeout {
            Some(timeout) => ReqwestClient::with_timeout(timeout),
            None => Ok(ReqwestClient::new()),
        }
    }
}
