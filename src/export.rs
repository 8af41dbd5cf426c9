// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use crate::error::{PageError, RenderError};
use crate::page::StaticProps;
use crate::strategy::GeneratedPage;

const PROPS_FILENAME: &str = "props.json";

/// Files written by [`export_page`]
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub html_path: PathBuf,
    pub props_path: PathBuf,
    pub html_bytes: usize,
    pub episode_count: usize,
}

/// Write a generated page and its props next to each other
///
/// The props land in `props.json` in the same directory as `html_path`.
/// Missing parent directories are created.
pub fn export_page(page: &GeneratedPage, html_path: &Path) -> Result<ExportResult, PageError> {
    let dir = html_path.parent().unwrap_or(Path::new("."));
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir).map_err(|e| PageError::WriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }

    write_file(html_path, page.html.as_bytes())?;

    let static_props = StaticProps {
        props: page.page.props().clone(),
        revalidate: page.revalidate,
    };
    let json = serde_json::to_string_pretty(&static_props).map_err(RenderError::from)?;
    let props_path = dir.join(PROPS_FILENAME);
    write_file(&props_path, json.as_bytes())?;

    Ok(ExportResult {
        html_path: html_path.to_path_buf(),
        props_path,
        html_bytes: page.html.len(),
        episode_count: static_props.props.len(),
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), PageError> {
    std::fs::write(path, contents).map_err(|e| PageError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use tempfile::tempdir;

    use crate::page::{LATEST_EPISODES_COUNT, REVALIDATE_SECONDS, partition_episodes};
    use crate::page::tests::make_episodes;

    fn generated(count: usize) -> GeneratedPage {
        let static_props = StaticProps {
            props: partition_episodes(make_episodes(count), LATEST_EPISODES_COUNT),
            revalidate: REVALIDATE_SECONDS,
        };
        GeneratedPage::from_static_props(static_props, Utc::now()).unwrap()
    }

    #[test]
    fn writes_html_and_props() {
        let dir = tempdir().unwrap();
        let html_path = dir.path().join("site").join("index.html");

        let result = export_page(&generated(3), &html_path).unwrap();

        assert_eq!(result.episode_count, 3);
        assert_eq!(result.props_path, dir.path().join("site").join("props.json"));

        let html = std::fs::read_to_string(&html_path).unwrap();
        assert_eq!(html.len(), result.html_bytes);
        assert!(html.contains("Todos os episódios"));

        let props: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&result.props_path).unwrap()).unwrap();
        assert_eq!(props["revalidate"], 28800);
        assert_eq!(props["props"]["allEpisodes"][0]["id"], "ep-2");
    }

    #[test]
    fn reports_unwritable_target() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let result = export_page(&generated(0), &blocker.join("index.html"));

        assert!(matches!(result, Err(PageError::WriteFailed { .. })));
    }
}
