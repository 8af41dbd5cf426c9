// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::debug;

use crate::episode::Episode;

/// Capability that starts playback of an ordered list at a given index
///
/// The page only calls this; how playback happens is up to the implementor.
pub trait PlaybackDispatcher: Send + Sync {
    fn play_list(&self, episodes: &[Episode], start_index: usize);
}

/// What the player is currently holding
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub episode_list: Vec<Episode>,
    pub current_episode_index: usize,
    pub is_playing: bool,
}

impl PlayerState {
    pub fn current_episode(&self) -> Option<&Episode> {
        self.episode_list.get(self.current_episode_index)
    }
}

/// In-memory play queue, the server-side stand-in for a player
#[derive(Debug, Default)]
pub struct PlayerQueue {
    state: Mutex<PlayerState>,
}

impl PlayerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Copy of the current queue state
    pub fn snapshot(&self) -> PlayerState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PlaybackDispatcher for PlayerQueue {
    fn play_list(&self, episodes: &[Episode], start_index: usize) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.episode_list = episodes.to_vec();
        state.current_episode_index = start_index;
        state.is_playing = start_index < episodes.len();

        debug!(
            start_index,
            queue_len = episodes.len(),
            "play list dispatched"
        );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Remembers every dispatch call as (episode ids, start index)
    #[derive(Default)]
    pub(crate) struct RecordingDispatcher {
        pub calls: Mutex<Vec<(Vec<String>, usize)>>,
    }

    impl PlaybackDispatcher for RecordingDispatcher {
        fn play_list(&self, episodes: &[Episode], start_index: usize) {
            let ids = episodes.iter().map(|e| e.id().to_string()).collect();
            self.calls.lock().unwrap().push((ids, start_index));
        }
    }

    #[test]
    fn queue_starts_empty() {
        let queue = PlayerQueue::new();
        let state = queue.snapshot();

        assert!(state.episode_list.is_empty());
        assert!(!state.is_playing);
        assert!(state.current_episode().is_none());
    }

    #[test]
    fn play_list_replaces_queue() {
        let episodes = crate::page::tests::make_episodes(3);
        let queue = PlayerQueue::new();

        queue.play_list(&episodes, 2);
        let state = queue.snapshot();

        assert_eq!(state.episode_list.len(), 3);
        assert_eq!(state.current_episode_index, 2);
        assert!(state.is_playing);
        assert_eq!(state.current_episode().map(Episode::id), Some("ep-2"));

        queue.play_list(&episodes[..1], 0);
        assert_eq!(queue.snapshot().episode_list.len(), 1);
    }

    #[test]
    fn out_of_range_start_does_not_play() {
        let queue = PlayerQueue::new();
        queue.play_list(&[], 0);

        assert!(!queue.snapshot().is_playing);
    }
}
