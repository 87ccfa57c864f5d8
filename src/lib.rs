// Syrinx Library - core modules for the streaming terminal client
// The server owns the catalog; we own playback order and the session

pub mod api;    // typed client for the streaming server
pub mod audio;  // playback engine and sequencing
pub mod config; // settings and preferences
#[cfg(all(feature = "tui", feature = "audio"))]
pub mod ui;     // terminal interface

// Export the stuff other modules actually use
pub use api::{ApiClient, ApiError, Song, TokenStore};
pub use audio::PlaylistState;
pub use config::Config;
