// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when fetching the episode list from the API
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch episodes from {url}: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid episodes response from {url}: {source}")]
    InvalidBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors that can occur when normalizing a raw episode record
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Episode '{id}': failed to parse date '{date_str}': {reason}")]
    InvalidDate {
        id: String,
        date_str: String,
        reason: String,
    },

    #[error("Episode '{id}': invalid duration '{raw}'")]
    InvalidDuration { id: String, raw: String },
}

/// Errors raised by the page renderer
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No play control with index {index} (page has {len})")]
    NoSuchControl { index: usize, len: usize },

    #[error("Failed to serialize episode list: {0}")]
    SerializeFailed(#[from] serde_json::Error),
}

/// Top-level errors for page generation
#[derive(Error, Debug)]
pub enum PageError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
