use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone)]
pub enum AppEvent {
    // UI Events
    Quit,

    // Playback Events
    TogglePlayPause,
    NextTrack,
    PreviousTrack,
    ToggleShuffle,
    ToggleLove,

    // Navigation Events
    Up,
    Down,
    Enter,

    // Volume Events
    VolumeUp,
    VolumeDown,

    // Search Events
    SearchStart,
    SearchChar(char),
    SearchBackspace,
    SearchDone,
    SearchCancel,

    // Catalog Events
    Refresh,
}

/// Key mapping while the search box has focus - most characters are input.
pub fn key_to_search_event(key: KeyEvent) -> Option<AppEvent> {
    match key.code {
        KeyCode::Esc => Some(AppEvent::SearchCancel),
        KeyCode::Enter => Some(AppEvent::SearchDone),
        KeyCode::Backspace => Some(AppEvent::SearchBackspace),
        KeyCode::Char(c) => Some(AppEvent::SearchChar(c)),
        _ => None,
    }
}

/// Key mapping for normal playback mode.
pub fn key_to_app_event(key: KeyEvent) -> Option<AppEvent> {
    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Quit),

        // Playback controls
        KeyCode::Char(' ') => Some(AppEvent::TogglePlayPause),
        KeyCode::Char('n') | KeyCode::Right => Some(AppEvent::NextTrack),
        KeyCode::Char('b') | KeyCode::Left => Some(AppEvent::PreviousTrack),

        // Navigation
        KeyCode::Up => Some(AppEvent::Up),
        KeyCode::Down => Some(AppEvent::Down),
        KeyCode::Enter => Some(AppEvent::Enter),

        // Volume
        KeyCode::Char('+') | KeyCode::Char('=') => Some(AppEvent::VolumeUp),
        KeyCode::Char('-') => Some(AppEvent::VolumeDown),

        // Playlist controls
        KeyCode::Char('z') => Some(AppEvent::ToggleShuffle),
        KeyCode::Char('l') => Some(AppEvent::ToggleLove),

        // Catalog
        KeyCode::Char('/') => Some(AppEvent::SearchStart),
        KeyCode::F(5) | KeyCode::Char('r') => Some(AppEvent::Refresh),

        _ => None,
    }
}
