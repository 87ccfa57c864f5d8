// Playback sequencing - decides which song becomes current on next/prev,
// track end, shuffle toggles and list reloads. Pure state, no I/O; the app
// owns one of these and drives it from the event loop.

use crate::api::Song;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// The loaded playlist plus playback position. `items` is the working order
/// (a shuffled permutation while shuffle is on); `original` keeps the server
/// order from the last load so switching shuffle off restores it exactly.
///
/// Invariant: `current` is `None` or a valid index into `items`.
pub struct PlaylistState {
    items: Vec<Song>,
    original: Vec<Song>,
    index_by_id: HashMap<i64, usize>,
    current: Option<usize>,
    shuffled: bool,
}

impl PlaylistState {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            original: Vec::new(),
            index_by_id: HashMap::new(),
            current: None,
            shuffled: false,
        }
    }

    /// Replace the playlist wholesale (fresh listing from the server).
    /// The previously current song is re-located by id in the new list;
    /// if it dropped out of the result set there is no current song anymore.
    pub fn load(&mut self, songs: Vec<Song>) {
        let previous_id = self.current_song().map(|s| s.id);
        self.original = songs.clone();
        self.items = songs;
        if self.shuffled {
            self.items.shuffle(&mut rand::thread_rng());
        }
        self.reindex();
        self.current = previous_id.and_then(|id| self.position_of(id));
    }

    /// Flip shuffle mode. Turning it on mid-playback re-deals the order but
    /// pins the current song by id so the listener doesn't lose their place;
    /// with nothing playing the re-deal waits for the first `next`. Turning
    /// it off restores the server order from the last load.
    pub fn toggle_shuffle(&mut self) {
        self.shuffled = !self.shuffled;
        let pinned_id = self.current_song().map(|s| s.id);
        if self.shuffled {
            if pinned_id.is_none() {
                return;
            }
            self.items.shuffle(&mut rand::thread_rng());
        } else {
            self.items = self.original.clone();
        }
        self.reindex();
        self.current = pinned_id.and_then(|id| self.position_of(id));
    }

    /// Advance circularly. From no position, playback starts at the top of
    /// a fresh shuffle order (or the list as-is when shuffle is off).
    pub fn next(&mut self) -> Option<&Song> {
        if self.items.is_empty() {
            return None;
        }
        let index = match self.current {
            Some(i) => (i + 1) % self.items.len(),
            None => {
                if self.shuffled {
                    self.items.shuffle(&mut rand::thread_rng());
                    self.reindex();
                }
                0
            }
        };
        self.current = Some(index);
        self.items.get(index)
    }

    /// Step back circularly. From no position this acts as if the last song
    /// were current and steps back from there.
    pub fn prev(&mut self) -> Option<&Song> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len();
        let from = self.current.unwrap_or(len - 1);
        let index = (from + len - 1) % len;
        self.current = Some(index);
        self.items.get(index)
    }

    /// The audio engine drained the current song to its natural end.
    /// No repeat modes here - finishing always advances.
    pub fn on_finished(&mut self) -> Option<&Song> {
        self.next()
    }

    /// Jump to a specific song (list row activated). Mirrors starting fresh
    /// playback: picking a song with shuffle on but nothing current deals a
    /// new order first, then locates the pick inside it.
    pub fn select(&mut self, song_id: i64) -> Option<&Song> {
        if self.shuffled && self.current.is_none() {
            self.items.shuffle(&mut rand::thread_rng());
            self.reindex();
        }
        let index = self.position_of(song_id)?;
        self.current = Some(index);
        self.items.get(index)
    }

    /// Apply a server-confirmed love/unlove to the matching song in both the
    /// working and original orders. Already in that state (or id unknown,
    /// e.g. filtered out of view) - nothing changes. Returns whether any
    /// song was touched so the caller knows to redraw.
    pub fn set_love_state(&mut self, song_id: i64, loved: bool) -> bool {
        let mut changed = false;
        for song in self.items.iter_mut().chain(self.original.iter_mut()) {
            if song.id == song_id && song.is_loved != loved {
                song.is_loved = loved;
                song.love_count = if loved {
                    song.love_count + 1
                } else {
                    (song.love_count - 1).max(0)
                };
                changed = true;
            }
        }
        changed
    }

    pub fn items(&self) -> &[Song] {
        &self.items
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current.and_then(|i| self.items.get(i))
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position_of(&self, song_id: i64) -> Option<usize> {
        self.index_by_id.get(&song_id).copied()
    }

    fn reindex(&mut self) {
        self.index_by_id = self
            .items
            .iter()
            .enumerate()
            .map(|(index, song)| (song.id, index))
            .collect();
    }
}

impl Default for PlaylistState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: i64, title: &str) -> Song {
        Song {
            id,
            title: title.to_string(),
            artist: "Test Artist".to_string(),
            duration_seconds: Some(180.0),
            filename: format!("{}.mp3", title.to_lowercase()),
            love_count: 3,
            is_loved: false,
        }
    }

    fn abc() -> Vec<Song> {
        vec![song(1, "Alpha"), song(2, "Bravo"), song(3, "Charlie")]
    }

    #[test]
    fn test_next_prev_walkthrough() {
        let mut state = PlaylistState::new();
        state.load(abc());

        assert_eq!(state.next().unwrap().id, 1);
        assert_eq!(state.current_index(), Some(0));
        assert_eq!(state.next().unwrap().id, 2);
        assert_eq!(state.current_index(), Some(1));
        assert_eq!(state.prev().unwrap().id, 1);
        assert_eq!(state.current_index(), Some(0));
    }

    #[test]
    fn test_next_wraps_around() {
        let mut state = PlaylistState::new();
        state.load(abc());
        state.next();
        let first_id = state.current_song().unwrap().id;

        // len() advances return to the starting song
        for _ in 0..state.len() {
            state.next();
        }
        assert_eq!(state.current_song().unwrap().id, first_id);
    }

    #[test]
    fn test_prev_wraps_to_end() {
        let mut state = PlaylistState::new();
        state.load(abc());
        state.next();
        assert_eq!(state.prev().unwrap().id, 3);
        assert_eq!(state.current_index(), Some(2));
    }

    #[test]
    fn test_prev_from_unset_position_lands_one_before_end() {
        let mut state = PlaylistState::new();
        state.load(abc());
        // Acts as if the last song were current, then steps back
        assert_eq!(state.prev().unwrap().id, 2);
        assert_eq!(state.current_index(), Some(1));
    }

    #[test]
    fn test_empty_playlist_is_a_noop() {
        let mut state = PlaylistState::new();
        assert!(state.next().is_none());
        assert!(state.prev().is_none());
        assert!(state.on_finished().is_none());
        assert_eq!(state.current_index(), None);
        assert!(!state.set_love_state(1, true));
    }

    #[test]
    fn test_single_song_wraps_to_itself() {
        let mut state = PlaylistState::new();
        state.load(vec![song(9, "Solo")]);
        assert_eq!(state.next().unwrap().id, 9);
        assert_eq!(state.next().unwrap().id, 9);
        assert_eq!(state.prev().unwrap().id, 9);
    }

    #[test]
    fn test_double_toggle_restores_original_order() {
        let mut state = PlaylistState::new();
        let songs: Vec<Song> = (1..=20).map(|i| song(i, &format!("Song{i}"))).collect();
        state.load(songs.clone());
        state.next();

        state.toggle_shuffle();
        state.next();
        let after_skip = state.current_song().unwrap().id;
        state.toggle_shuffle();

        assert!(!state.is_shuffled());
        assert_eq!(state.items(), &songs[..]);
        // Current song survives the order change at its original position
        assert_eq!(state.current_song().unwrap().id, after_skip);
        let expected_index = songs.iter().position(|s| s.id == after_skip).unwrap();
        assert_eq!(state.current_index(), Some(expected_index));
    }

    #[test]
    fn test_shuffle_on_pins_current_song() {
        let mut state = PlaylistState::new();
        let songs: Vec<Song> = (1..=50).map(|i| song(i, &format!("Song{i}"))).collect();
        state.load(songs);
        state.next();
        state.next();
        let playing = state.current_song().unwrap().id;

        state.toggle_shuffle();
        assert!(state.is_shuffled());
        assert_eq!(state.current_song().unwrap().id, playing);
        assert_eq!(state.len(), 50);
    }

    #[test]
    fn test_shuffle_on_with_nothing_playing_defers_the_deal() {
        let mut state = PlaylistState::new();
        state.load(abc());
        state.toggle_shuffle();

        // Order untouched until playback starts
        let ids: Vec<i64> = state.items().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(state.current_index(), None);

        // First next starts at position 0 of whatever order got dealt
        let started = state.next().unwrap().id;
        assert_eq!(state.current_index(), Some(0));
        assert!([1, 2, 3].contains(&started));
    }

    #[test]
    fn test_circularity_holds_while_shuffled() {
        let mut state = PlaylistState::new();
        state.load((1..=12).map(|i| song(i, &format!("Song{i}"))).collect());
        state.toggle_shuffle();
        state.next();
        let start = state.current_song().unwrap().id;
        for _ in 0..state.len() {
            state.next();
        }
        assert_eq!(state.current_song().unwrap().id, start);
    }

    #[test]
    fn test_reload_relocates_current_by_id() {
        let mut state = PlaylistState::new();
        state.load(abc());
        state.next();
        state.next(); // Bravo

        // Filtered reload returns a different ordering
        state.load(vec![song(3, "Charlie"), song(2, "Bravo")]);
        assert_eq!(state.current_song().unwrap().id, 2);
        assert_eq!(state.current_index(), Some(1));
    }

    #[test]
    fn test_reload_without_current_song_clears_position() {
        let mut state = PlaylistState::new();
        state.load(abc());
        state.next(); // Alpha

        state.load(vec![song(2, "Bravo"), song(3, "Charlie")]);
        assert_eq!(state.current_index(), None);
        assert!(state.current_song().is_none());

        // Playback restarts at a definite position afterwards
        assert_eq!(state.next().unwrap().id, 2);
    }

    #[test]
    fn test_shuffled_reload_keeps_original_order_for_unshuffle() {
        let mut state = PlaylistState::new();
        state.toggle_shuffle();
        let songs: Vec<Song> = (1..=15).map(|i| song(i, &format!("Song{i}"))).collect();
        state.load(songs.clone());

        state.toggle_shuffle();
        assert_eq!(state.items(), &songs[..]);
    }

    #[test]
    fn test_love_then_unlove_restores_count() {
        let mut state = PlaylistState::new();
        state.load(abc());

        assert!(state.set_love_state(1, true));
        let alpha = &state.items()[0];
        assert!(alpha.is_loved);
        assert_eq!(alpha.love_count, 4);

        assert!(state.set_love_state(1, false));
        let alpha = &state.items()[0];
        assert!(!alpha.is_loved);
        assert_eq!(alpha.love_count, 3);
    }

    #[test]
    fn test_love_is_idempotent() {
        let mut state = PlaylistState::new();
        state.load(abc());

        assert!(state.set_love_state(1, true));
        assert!(!state.set_love_state(1, true));
        assert_eq!(state.items()[0].love_count, 4);
    }

    #[test]
    fn test_love_unknown_id_is_a_noop() {
        let mut state = PlaylistState::new();
        state.load(abc());
        assert!(!state.set_love_state(99, true));
        assert_eq!(state.items()[0].love_count, 3);
    }

    #[test]
    fn test_love_survives_unshuffle() {
        let mut state = PlaylistState::new();
        state.load(abc());
        state.next();
        state.toggle_shuffle();

        state.set_love_state(2, true);
        state.toggle_shuffle();

        // The restored original order carries the love update too
        let bravo = state.items().iter().find(|s| s.id == 2).unwrap();
        assert!(bravo.is_loved);
        assert_eq!(bravo.love_count, 4);
    }

    #[test]
    fn test_select_jumps_to_song() {
        let mut state = PlaylistState::new();
        state.load(abc());
        assert_eq!(state.select(3).unwrap().id, 3);
        assert_eq!(state.current_index(), Some(2));
        assert!(state.select(42).is_none());
        // Failed select leaves the position alone
        assert_eq!(state.current_index(), Some(2));
    }
}
