// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::episode::Episode;
use crate::error::RenderError;
use crate::player::PlaybackDispatcher;

use super::props::HomeProps;

const PAGE_TITLE: &str = "Home | Podcastr";

/// Path the play buttons load their icon from
pub const PLAY_ICON_PATH: &str = "/play-green.svg";

/// Icon served at [`PLAY_ICON_PATH`]
pub const PLAY_ICON_SVG: &str = r##"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" xmlns="http://www.w3.org/2000/svg"><path d="M6 4.5v15l13-7.5-13-7.5z" fill="#04D361"/></svg>"##;

const PLAY_LABEL: &str = "Tocar episódio";

/// A rendered play button and the position it dispatches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayControl {
    pub episode_id: String,
    /// Index into [`HomePage::episode_list`]
    pub index: usize,
}

/// The home page: a highlight list of the latest episodes and a table of the rest
///
/// Every play control hands the whole concatenated list to the dispatcher,
/// so table rows are offset by the number of latest episodes.
#[derive(Debug, Clone)]
pub struct HomePage {
    props: HomeProps,
    episode_list: Vec<Episode>,
    controls: Vec<PlayControl>,
}

impl HomePage {
    pub fn new(props: HomeProps) -> Self {
        let episode_list = props.episode_list();

        let latest = props
            .latest_episodes
            .iter()
            .enumerate()
            .map(|(index, episode)| PlayControl {
                episode_id: episode.id().to_string(),
                index,
            });

        let offset = props.latest_episodes.len();
        let all = props
            .all_episodes
            .iter()
            .enumerate()
            .map(|(row, episode)| PlayControl {
                episode_id: episode.id().to_string(),
                index: row + offset,
            });

        let controls = latest.chain(all).collect();

        Self {
            props,
            episode_list,
            controls,
        }
    }

    pub fn props(&self) -> &HomeProps {
        &self.props
    }

    /// Latest episodes followed by all episodes
    pub fn episode_list(&self) -> &[Episode] {
        &self.episode_list
    }

    pub fn controls(&self) -> &[PlayControl] {
        &self.controls
    }

    /// Activate the play control at `index`
    pub fn play(&self, index: usize, dispatcher: &dyn PlaybackDispatcher) -> Result<(), RenderError> {
        let control = self
            .controls
            .iter()
            .find(|control| control.index == index)
            .ok_or(RenderError::NoSuchControl {
                index,
                len: self.controls.len(),
            })?;

        dispatcher.play_list(&self.episode_list, control.index);
        Ok(())
    }

    /// Render the full HTML document
    pub fn render(&self) -> Result<String, RenderError> {
        let mut html = String::with_capacity(4096 + self.episode_list.len() * 1024);

        html.push_str(&document_head(PAGE_TITLE));
        html.push_str("<div class=\"homepage\">\n");

        html.push_str("<section class=\"latestEpisodes\">\n<h2>Últimos lançamentos</h2>\n<ul>\n");
        for (episode, control) in self.props.latest_episodes.iter().zip(&self.controls) {
            html.push_str(&latest_item(episode, control.index));
        }
        html.push_str("</ul>\n</section>\n");

        html.push_str("<section class=\"allEpisodes\">\n<h2>Todos os episódios</h2>\n");
        html.push_str("<table cellspacing=\"0\">\n<thead>\n<tr>\n<th></th>\n<th>Podcast</th>\n<th>Integrantes</th>\n<th>Data</th>\n<th>Duração</th>\n<th></th>\n</tr>\n</thead>\n<tbody>\n");
        let offset = self.props.latest_episodes.len();
        for (episode, control) in self.props.all_episodes.iter().zip(&self.controls[offset..]) {
            html.push_str(&table_row(episode, control.index));
        }
        html.push_str("</tbody>\n</table>\n</section>\n");

        html.push_str("</div>\n");
        html.push_str(&format!(
            "<script type=\"application/json\" id=\"episode-list\">{}</script>\n",
            script_json(&self.episode_list)?
        ));
        html.push_str("</body>\n</html>\n");

        Ok(html)
    }
}

/// Shell page for client-side loading: the browser fetches props from `props_path`
pub fn render_client_shell(props_path: &str) -> String {
    let mut html = document_head(PAGE_TITLE);
    html.push_str(&format!(
        "<div class=\"homepage\" id=\"app\" data-props-src=\"{}\"></div>\n",
        attr(props_path)
    ));
    html.push_str(
        "<script>\nfetch(document.getElementById('app').dataset.propsSrc)\n  .then(response => response.json())\n  .then(data => console.log(data))\n</script>\n",
    );
    html.push_str("</body>\n</html>\n");
    html
}

fn document_head(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{}</title>\n</head>\n<body>\n",
        text(title)
    )
}

fn latest_item(episode: &Episode, index: usize) -> String {
    format!(
        "<li data-episode-id=\"{id}\">\n\
         <span style=\"width: 90px\">{thumbnail}</span>\n\
         <div class=\"episodeDetails\">\n\
         {link}\n\
         <p>{members}</p>\n\
         <span>{published_at}</span>\n\
         <span>{duration}</span>\n\
         </div>\n\
         {button}\n\
         </li>\n",
        id = attr(episode.id()),
        thumbnail = thumbnail(episode, 192),
        link = episode_link(episode),
        members = text(episode.members()),
        published_at = text(episode.published_at()),
        duration = text(episode.duration_as_string()),
        button = play_button(index),
    )
}

fn table_row(episode: &Episode, index: usize) -> String {
    format!(
        "<tr data-episode-id=\"{id}\">\n\
         <td style=\"width: 72px\">{thumbnail}</td>\n\
         <td>{link}</td>\n\
         <td>{members}</td>\n\
         <td style=\"width: 100px\">{published_at}</td>\n\
         <td>{duration}</td>\n\
         <td>{button}</td>\n\
         </tr>\n",
        id = attr(episode.id()),
        thumbnail = thumbnail(episode, 120),
        link = episode_link(episode),
        members = text(episode.members()),
        published_at = text(episode.published_at()),
        duration = text(episode.duration_as_string()),
        button = play_button(index),
    )
}

fn thumbnail(episode: &Episode, size: u32) -> String {
    format!(
        "<img width=\"{size}\" height=\"{size}\" src=\"{src}\" alt=\"{alt}\" style=\"object-fit: cover\">",
        src = attr(episode.thumbnail()),
        alt = attr(episode.title()),
    )
}

fn episode_link(episode: &Episode) -> String {
    format!(
        "<a href=\"{href}\">{title}</a>",
        href = attr(&episode_path(episode.id())),
        title = text(episode.title()),
    )
}

fn play_button(index: usize) -> String {
    format!(
        "<button type=\"button\" data-play-index=\"{index}\"><img src=\"{PLAY_ICON_PATH}\" alt=\"{}\"></button>",
        attr(PLAY_LABEL)
    )
}

/// Bytes escaped in an episode id path segment; `.` is included so `.` and
/// `..` stay literal segments instead of being resolved away
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'~');

/// `/episodes/{id}` with the id encoded as a single path segment
fn episode_path(id: &str) -> String {
    format!("/episodes/{}", utf8_percent_encode(id, SEGMENT))
}

/// JSON safe for embedding inside a `<script>` element
///
/// `<`, `>` and `&` only occur inside JSON strings, where the `\u` escapes
/// decode to the same text.
fn script_json(episodes: &[Episode]) -> Result<String, RenderError> {
    let json = serde_json::to_string(episodes)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}
