// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Serialize;

use crate::api::RawEpisode;
use crate::error::TransformError;

use super::format::{duration_to_time_string, format_published_at, parse_duration};

/// A normalized episode, ready to be rendered and played
///
/// Built once per generation from a [`RawEpisode`] and never mutated.
/// `duration_as_string` is always derived from `duration`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    id: String,
    title: String,
    thumbnail: String,
    members: String,
    published_at: String,
    duration: u64,
    duration_as_string: String,
    url: String,
}

impl Episode {
    /// Normalize a raw API record
    pub fn from_raw(raw: RawEpisode) -> Result<Self, TransformError> {
        let published_at = format_published_at(&raw.id, &raw.published_at)?;
        let duration = parse_duration(&raw.id, &raw.file.duration)?;

        Ok(Self {
            id: raw.id,
            title: raw.title,
            thumbnail: raw.thumbnail,
            members: raw.members,
            published_at,
            duration,
            duration_as_string: duration_to_time_string(duration),
            url: raw.file.url,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }

    pub fn members(&self) -> &str {
        &self.members
    }

    /// Publish date, already formatted for display
    pub fn published_at(&self) -> &str {
        &self.published_at
    }

    /// Duration in seconds
    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn duration_as_string(&self) -> &str {
        &self.duration_as_string
    }

    /// Media file URL handed to the player
    pub fn url(&self) -> &str {
        &self.url
    }
}
