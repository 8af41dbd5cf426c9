// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An episode record as returned by the `episodes` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEpisode {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub members: String,
    pub published_at: String,
    pub file: RawEpisodeFile,
}

/// The media file attached to a raw episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEpisodeFile {
    pub url: String,
    pub duration: RawDuration,
}

/// Duration as the API sends it: either a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDuration {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for RawDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawDuration::Number(n) => write!(f, "{n}"),
            RawDuration::Text(s) => f.write_str(s),
        }
    }
}
