use super::events::{key_to_app_event, key_to_search_event, AppEvent};
use super::TerminalManager;
use crate::api::{ApiClient, ApiError, Song, TokenStore};
use crate::audio::{AudioPlayer, PlaybackState, PlayerEvent, PlaylistState};
use crate::config::Config;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// How the interactive session ended - the caller decides what to print.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppExit {
    Quit,
    SessionExpired,
}

enum PlayAttempt {
    Played,
    Skip,
    AuthFailure,
}

pub struct App {
    config: Config,
    terminal: TerminalManager,
    api: ApiClient,
    token_store: TokenStore,
    playlist: PlaylistState,
    player: AudioPlayer,
    player_events: mpsc::UnboundedReceiver<PlayerEvent>,

    // UI state
    list_state: ListState,
    search_input: String,
    search_active: bool,
    search_deadline: Option<Instant>,
    status: Option<String>,
    username: String,
    should_quit: bool,
    session_expired: bool,
}

impl App {
    pub fn new(
        config: Config,
        api: ApiClient,
        token_store: TokenStore,
        username: String,
    ) -> Result<Self> {
        let terminal = TerminalManager::new()?;

        let mut player = AudioPlayer::new((&config).into())?;
        let (event_sender, player_events) = mpsc::unbounded_channel();
        player.set_event_sender(event_sender);

        Ok(Self {
            config,
            terminal,
            api,
            token_store,
            playlist: PlaylistState::new(),
            player,
            player_events,
            list_state: ListState::default(),
            search_input: String::new(),
            search_active: false,
            search_deadline: None,
            status: None,
            username,
            should_quit: false,
            session_expired: false,
        })
    }

    pub async fn run(&mut self) -> Result<AppExit> {
        self.reload_songs().await?;

        // One cooperative loop: render, handle at most one key to completion,
        // then the periodic work. Network awaits suspend only this handler.
        while !self.should_quit {
            self.draw()?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let mapped = if self.search_active {
                            key_to_search_event(key)
                        } else {
                            key_to_app_event(key)
                        };
                        if let Some(app_event) = mapped {
                            self.handle_event(app_event).await?;
                        }
                    }
                }
            }

            self.tick().await?;
        }

        let _ = self.player.stop();
        if self.session_expired {
            Ok(AppExit::SessionExpired)
        } else {
            Ok(AppExit::Quit)
        }
    }

    async fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Quit => {
                self.should_quit = true;
            }
            AppEvent::TogglePlayPause => {
                if self.playlist.current_song().is_none() {
                    self.playlist.next();
                    self.play_current_or_skip().await?;
                } else {
                    match self.player.get_state() {
                        PlaybackState::Playing => self.player.pause()?,
                        PlaybackState::Paused => self.player.resume()?,
                        PlaybackState::Stopped => self.play_current_or_skip().await?,
                    }
                }
            }
            AppEvent::NextTrack => {
                self.playlist.next();
                self.play_current_or_skip().await?;
            }
            AppEvent::PreviousTrack => {
                self.playlist.prev();
                self.play_current_or_skip().await?;
            }
            AppEvent::ToggleShuffle => {
                self.playlist.toggle_shuffle();
                self.status = Some(if self.playlist.is_shuffled() {
                    "Shuffle on".to_string()
                } else {
                    "Shuffle off".to_string()
                });
            }
            AppEvent::ToggleLove => {
                self.toggle_love().await?;
            }
            AppEvent::Up => {
                self.move_selection(-1);
            }
            AppEvent::Down => {
                self.move_selection(1);
            }
            AppEvent::Enter => {
                if let Some(selected) = self.list_state.selected() {
                    if let Some(song_id) = self.playlist.items().get(selected).map(|s| s.id) {
                        self.playlist.select(song_id);
                        self.play_current_or_skip().await?;
                    }
                }
            }
            AppEvent::VolumeUp => {
                let volume = (self.player.get_volume() + 0.1).min(1.0);
                self.player.set_volume(volume);
            }
            AppEvent::VolumeDown => {
                let volume = (self.player.get_volume() - 0.1).max(0.0);
                self.player.set_volume(volume);
            }
            AppEvent::SearchStart => {
                self.search_active = true;
            }
            AppEvent::SearchChar(c) => {
                self.search_input.push(c);
                self.schedule_search();
            }
            AppEvent::SearchBackspace => {
                self.search_input.pop();
                self.schedule_search();
            }
            AppEvent::SearchDone => {
                self.search_active = false;
                self.search_deadline = None;
                self.reload_songs().await?;
            }
            AppEvent::SearchCancel => {
                self.search_active = false;
            }
            AppEvent::Refresh => {
                self.reload_songs().await?;
            }
        }

        Ok(())
    }

    /// Periodic work between key events: player events, natural track end,
    /// and the search debounce timer.
    async fn tick(&mut self) -> Result<()> {
        while let Ok(player_event) = self.player_events.try_recv() {
            match player_event {
                PlayerEvent::TrackStarted(song) => {
                    self.status = None;
                    info!("now playing: {} - {}", song.display_title(), song.artist);
                    #[cfg(feature = "notify")]
                    notify_track(&song);
                }
                PlayerEvent::Error(message) => {
                    self.status = Some(message);
                }
                _ => {}
            }
        }

        // Track drained on its own - finishing always advances
        if self.player.get_state() == PlaybackState::Playing && self.player.is_finished() {
            self.playlist.on_finished();
            self.play_current_or_skip().await?;
        }

        // Debounced search: a quiet period after the last keystroke triggers
        // one reload. Overlapping in-flight reloads are last-writer-wins; a
        // slow stale response can briefly replace a fresher list.
        if let Some(deadline) = self.search_deadline {
            if Instant::now() >= deadline {
                self.search_deadline = None;
                self.reload_songs().await?;
            }
        }

        Ok(())
    }

    fn schedule_search(&mut self) {
        self.search_deadline =
            Some(Instant::now() + Duration::from_millis(self.config.ui.search_debounce_ms));
    }

    async fn reload_songs(&mut self) -> Result<()> {
        let query = self.search_input.trim().to_string();
        let search = if query.is_empty() {
            None
        } else {
            Some(query.as_str())
        };

        match self.api.list_songs(search).await {
            Ok(songs) => {
                info!("loaded {} songs (query: {:?})", songs.len(), search);
                self.playlist.load(songs);
                self.clamp_selection();
            }
            Err(ApiError::Unauthorized) => self.expire_session(),
            Err(e) => {
                warn!("song list reload failed: {}", e);
                self.status = Some(format!("Could not load songs: {e}"));
            }
        }

        Ok(())
    }

    /// Play whatever the sequencer points at. Unplayable songs (failed fetch
    /// or undecodable bytes) are skipped by advancing, at most one full cycle
    /// so an unreachable server can't spin us forever.
    async fn play_current_or_skip(&mut self) -> Result<()> {
        let mut attempts = self.playlist.len();
        while attempts > 0 {
            let Some(song) = self.playlist.current_song().cloned() else {
                return Ok(());
            };
            match self.fetch_and_play(song).await {
                PlayAttempt::Played => return Ok(()),
                PlayAttempt::AuthFailure => {
                    self.expire_session();
                    return Ok(());
                }
                PlayAttempt::Skip => {
                    self.playlist.next();
                    attempts -= 1;
                }
            }
        }

        if !self.playlist.is_empty() {
            self.status = Some("No playable songs in this list".to_string());
            self.player.stop()?;
        }
        Ok(())
    }

    async fn fetch_and_play(&mut self, song: Song) -> PlayAttempt {
        match self.api.stream_song(song.id).await {
            Ok(bytes) => match self.player.play_song(song.clone(), bytes) {
                Ok(()) => PlayAttempt::Played,
                Err(e) => {
                    warn!("playback failed for {}: {}", song.display_title(), e);
                    PlayAttempt::Skip
                }
            },
            Err(ApiError::Unauthorized) => PlayAttempt::AuthFailure,
            Err(e) => {
                warn!("stream fetch failed for {}: {}", song.display_title(), e);
                self.status = Some("Could not load song, skipping".to_string());
                PlayAttempt::Skip
            }
        }
    }

    /// Love is confirmation-first: ask the server, apply its answer, then
    /// refresh the list so counts match what everyone else sees.
    async fn toggle_love(&mut self) -> Result<()> {
        let Some(song) = self.playlist.current_song().cloned() else {
            return Ok(());
        };

        let result = if song.is_loved {
            self.api.unlove_song(song.id).await
        } else {
            self.api.love_song(song.id).await
        };

        match result {
            Ok(love) => {
                self.playlist.set_love_state(song.id, love.loved);
                self.reload_songs().await?;
            }
            Err(ApiError::Unauthorized) => self.expire_session(),
            Err(e) => {
                warn!("love toggle failed for song {}: {}", song.id, e);
                self.status = Some(format!("Love failed: {e}"));
            }
        }

        Ok(())
    }

    fn expire_session(&mut self) {
        let _ = self.token_store.clear();
        self.session_expired = true;
        self.should_quit = true;
    }

    fn move_selection(&mut self, delta: i32) {
        if self.playlist.is_empty() {
            return;
        }

        let current = self.list_state.selected().unwrap_or(0);
        let new_index = if delta < 0 {
            current.saturating_sub((-delta) as usize)
        } else {
            (current + delta as usize).min(self.playlist.len() - 1)
        };

        self.list_state.select(Some(new_index));
    }

    fn clamp_selection(&mut self) {
        if self.playlist.is_empty() {
            self.list_state.select(None);
            return;
        }
        let selected = self.list_state.selected().unwrap_or(0);
        self.list_state
            .select(Some(selected.min(self.playlist.len() - 1)));
    }

    fn draw(&mut self) -> Result<()> {
        let items = self.playlist.items();
        let current_index = self.playlist.current_index();
        let shuffled = self.playlist.is_shuffled();
        let state = self.player.get_state();
        let volume = self.player.get_volume();
        let search_input = &self.search_input;
        let search_active = self.search_active;
        let status = self.status.clone();
        let username = &self.username;
        let show_love = self.config.ui.show_love_counts;
        let mut list_state = self.list_state.clone();

        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Header
                    Constraint::Length(3), // Search
                    Constraint::Min(0),    // Song list
                    Constraint::Length(3), // Player controls
                ])
                .split(f.area());

            Self::render_header(f, chunks[0], username);
            Self::render_search(f, chunks[1], search_input, search_active);
            Self::render_song_list(f, chunks[2], items, current_index, show_love, &mut list_state);
            Self::render_controls(
                f,
                chunks[3],
                items,
                current_index,
                state,
                shuffled,
                volume,
                status.as_deref(),
            );
        })?;

        self.list_state = list_state;
        Ok(())
    }

    fn render_header(f: &mut Frame, area: Rect, username: &str) {
        let title = Paragraph::new(format!("🎵 syrinx - streaming as {}", username))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(title, area);
    }

    fn render_search(f: &mut Frame, area: Rect, search_input: &str, search_active: bool) {
        let (title, style) = if search_active {
            ("Search (Enter to apply, Esc to leave)", Style::default().fg(Color::Yellow))
        } else {
            ("Search (/)", Style::default())
        };

        let search = Paragraph::new(search_input)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(search, area);
    }

    fn render_song_list(
        f: &mut Frame,
        area: Rect,
        songs: &[Song],
        current_index: Option<usize>,
        show_love: bool,
        list_state: &mut ListState,
    ) {
        let items: Vec<ListItem> = songs
            .iter()
            .enumerate()
            .map(|(i, song)| {
                let is_current = current_index == Some(i);
                let prefix = if is_current { "♪ " } else { "  " };

                let duration = song.duration_string();
                let mut content = format!("{}{} - {}", prefix, song.display_title(), song.artist);
                if !duration.is_empty() {
                    content.push_str(&format!(" ({})", duration));
                }
                if show_love {
                    content.push_str(&format!("  {} {}", song.love_count, song.love_marker()));
                }

                let style = if is_current {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                ListItem::new(content).style(style)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Songs"))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("► ");

        f.render_stateful_widget(list, area, list_state);
    }

    #[allow(clippy::too_many_arguments)]
    fn render_controls(
        f: &mut Frame,
        area: Rect,
        songs: &[Song],
        current_index: Option<usize>,
        state: PlaybackState,
        shuffled: bool,
        volume: f32,
        status: Option<&str>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(55), // Now playing
                Constraint::Percentage(20), // Volume
                Constraint::Percentage(25), // Status
            ])
            .split(area);

        let now_playing = if let Some(song) = current_index.and_then(|i| songs.get(i)) {
            format!("♪ {} - {} {}", song.display_title(), song.artist, song.love_marker())
        } else {
            "Nothing playing - Enter or Space to start".to_string()
        };

        let info_widget = Paragraph::new(now_playing)
            .block(Block::default().borders(Borders::ALL).title("Now Playing"));
        f.render_widget(info_widget, chunks[0]);

        let volume_widget = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Volume"))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(volume as f64);
        f.render_widget(volume_widget, chunks[1]);

        let state_text = status.map(str::to_string).unwrap_or_else(|| {
            let mut text = match state {
                PlaybackState::Playing => "▶ Playing".to_string(),
                PlaybackState::Paused => "⏸ Paused".to_string(),
                PlaybackState::Stopped => "⏹ Stopped".to_string(),
            };
            if shuffled {
                text.push_str("  🔀");
            }
            text
        });

        let status_widget = Paragraph::new(state_text)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(status_widget, chunks[2]);
    }
}

#[cfg(feature = "notify")]
fn notify_track(song: &Song) {
    let _ = notify_rust::Notification::new()
        .summary("syrinx")
        .body(&format!("{} - {}", song.display_title(), song.artist))
        .show();
}
